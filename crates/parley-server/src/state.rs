use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use parley_config::{expand_tilde, AuthSettings, Config};
use parley_llm::{
    create_provider, NoopSearch, ProviderConfig, ProviderGateway, ProviderKind, SearchAugmenter,
    SerperSearch, WebSearch,
};
use parley_memory::{agent_marker, LocalMemoryStore, MemoryManager, MemoryStore};

use crate::chat::{ChatService, ChatSettings};
use crate::error::AppError;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(chat: Arc<ChatService>) -> Self {
        Self {
            chat,
            started_at: Utc::now(),
        }
    }

    /// Wire provider, gateway and memory from configuration.
    ///
    /// A missing credential for the active provider is fatal here.
    pub async fn from_config<F>(config: &Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind: ProviderKind = config.llm.provider.parse()?;
        let settings = config.active_provider()?;
        let api_key = config.active_api_key(&lookup)?;

        let mut provider_config = ProviderConfig::for_kind(kind)
            .with_api_key(api_key)
            .with_timeout(Duration::from_secs(config.llm.timeout_seconds));
        if let Some(base_url) = &settings.base_url {
            provider_config = provider_config.with_base_url(base_url);
        }
        if let Some(model) = &settings.model {
            provider_config = provider_config.with_model(model);
        }
        if let AuthSettings::ApiKey { env } = &settings.auth {
            provider_config = provider_config.with_credential_env(env);
        }

        let provider = create_provider(kind, provider_config)?;
        provider.validate().await?;
        let profile = provider.profile();
        info!(
            "Provider: {} ({}), {} rpm / {} rpd",
            profile.display_name, profile.model_id, profile.requests_per_minute, profile.requests_per_day
        );

        let mut gateway = ProviderGateway::new(provider);
        if config.search.enabled {
            let searcher: Arc<dyn WebSearch> = match config.search_api_key(&lookup) {
                Some(api_key) => {
                    Arc::new(SerperSearch::new(Some(api_key))?.with_endpoint(&config.search.endpoint))
                }
                None => {
                    warn!("{} not set, web search disabled", config.search.api_key_env);
                    Arc::new(NoopSearch)
                }
            };
            let augmenter = SearchAugmenter::new(searcher)
                .with_timeout(Duration::from_secs(config.search.timeout_seconds))
                .with_num_results(config.search.num_results);
            gateway = gateway.with_search(augmenter, agent_marker(&config.agent.name));
        }

        let store: Arc<dyn MemoryStore> = match config.memory.store_path.as_deref().and_then(expand_tilde) {
            Some(root) => {
                info!("Facts persisted under {:?}", root);
                Arc::new(LocalMemoryStore::persistent(root))
            }
            None => Arc::new(LocalMemoryStore::in_memory()),
        };

        let memory = MemoryManager::new(store)
            .with_buffer_capacity(config.memory.buffer_capacity)
            .with_recent_window(config.memory.recent_window)
            .with_min_recall_chars(config.memory.min_recall_chars)
            .with_agent_name(&config.agent.name);

        let chat = ChatService::new(Arc::new(gateway), Arc::new(memory), ChatSettings::from(config));
        Ok(Self::new(Arc::new(chat)))
    }
}
