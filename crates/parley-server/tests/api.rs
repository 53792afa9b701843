use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use parley_llm::{
    fallback, Completion, CompletionRequest, LLMError, LLMProvider, ProviderGateway, ProviderKind,
    ProviderProfile,
};
use parley_memory::{LocalMemoryStore, MemoryManager};
use parley_server::{configure, json_config, AppState, ChatService, ChatSettings};

/// Replies from a queue and records every prompt it sees
struct RecordingProvider {
    profile: ProviderProfile,
    replies: Mutex<VecDeque<Result<Completion, LLMError>>>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingProvider {
    fn new(replies: Vec<Result<Completion, LLMError>>) -> Arc<Self> {
        Arc::new(Self {
            profile: ProviderKind::Groq.profile(),
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for RecordingProvider {
    fn provider_id(&self) -> &str {
        "recording"
    }

    fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LLMError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Completion::Text("Sounds fun!".to_string())))
    }

    async fn validate(&self) -> Result<(), LLMError> {
        Ok(())
    }
}

fn build_state(provider: Arc<RecordingProvider>) -> AppState {
    build_state_with_store(provider, LocalMemoryStore::in_memory())
}

fn build_state_with_store(provider: Arc<RecordingProvider>, store: LocalMemoryStore) -> AppState {
    let gateway = ProviderGateway::new(provider);
    let memory = MemoryManager::new(Arc::new(store)).with_agent_name("Juno");
    let settings = ChatSettings {
        agent_name: "Juno".to_string(),
        enable_search: false,
        ..ChatSettings::default()
    };
    AppState::new(Arc::new(ChatService::new(
        Arc::new(gateway),
        Arc::new(memory),
        settings,
    )))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(json_config())
                .configure(configure),
        )
        .await
    };
}

macro_rules! post_message {
    ($app:expr, $user_id:expr, $message:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/message")
            .set_json(json!({ "user_id": $user_id, "message": $message }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status().as_u16();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

#[actix_web::test]
async fn test_root_reports_liveness() {
    let app = app!(build_state(RecordingProvider::new(vec![])));

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["message"], "Juno backend is running");
}

#[actix_web::test]
async fn test_message_returns_reply_and_turn_id() {
    let provider = RecordingProvider::new(vec![Ok(Completion::Text("Hey Alex!".to_string()))]);
    let app = app!(build_state(provider.clone()));

    let (status, body) = post_message!(app, "alex", "hi, my name is Alex");
    assert_eq!(status, 200);
    assert_eq!(body["reply"], "Hey Alex!");
    assert_eq!(body["metadata"]["turn_id"], 1);

    let (_, body) = post_message!(app, "alex", "how are you");
    assert_eq!(body["metadata"]["turn_id"], 2);

    // counters are per user
    let (_, body) = post_message!(app, "sam", "hello");
    assert_eq!(body["metadata"]["turn_id"], 1);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].ends_with("alex: hi, my name is Alex\n\nJuno:"));
    // the second turn sees the first exchange as recent context
    assert!(prompts[1].contains("[Recent chat]:"));
    assert!(prompts[1].contains("Juno: Hey Alex!"));
}

#[actix_web::test]
async fn test_facts_are_recalled_in_later_prompts() {
    let provider = RecordingProvider::new(vec![]);
    let app = app!(build_state(provider.clone()));

    post_message!(app, "alex", "My name is Alex and I love anime, especially Attack on Titan");
    let (status, _) = post_message!(app, "alex", "What do I like?");
    assert_eq!(status, 200);

    let prompts = provider.prompts();
    let last = prompts.last().unwrap();
    assert!(last.contains("[You know]:"));
    assert!(last.contains("anime") || last.contains("Attack on Titan"));
}

#[actix_web::test]
async fn test_rate_limited_provider_yields_fallback_reply() {
    let provider = RecordingProvider::new(vec![
        Ok(Completion::RateLimited),
        Ok(Completion::RateLimited),
    ]);
    let app = app!(build_state(provider.clone()));

    let (status, body) = post_message!(app, "alex", "hello there");
    assert_eq!(status, 200);
    assert_eq!(body["reply"], fallback::RATE_LIMITED);
    assert_eq!(provider.prompts().len(), 2);
}

#[actix_web::test]
async fn test_empty_fields_are_rejected() {
    let provider = RecordingProvider::new(vec![]);
    let app = app!(build_state(provider.clone()));

    let (status, body) = post_message!(app, "alex", "   ");
    assert_eq!(status, 400);
    assert_eq!(body["error"], "message is required");

    let (status, body) = post_message!(app, "", "hello");
    assert_eq!(status, 400);
    assert_eq!(body["error"], "user_id is required");

    assert!(provider.prompts().is_empty());
}

#[actix_web::test]
async fn test_malformed_body_is_rejected() {
    let app = app!(build_state(RecordingProvider::new(vec![])));

    let req = test::TestRequest::post()
        .uri("/api/v1/message")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"user_id": "alex""#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_configuration_fault_is_server_error() {
    let provider = RecordingProvider::new(vec![Err(LLMError::Auth("GROQ_API_KEY not set".to_string()))]);
    let app = app!(build_state(provider));

    let (status, body) = post_message!(app, "alex", "hello there");
    assert_eq!(status, 500);
    assert!(body["error"].as_str().unwrap().contains("GROQ_API_KEY"));
}

#[actix_web::test]
async fn test_reset_clears_recent_context_only() {
    let provider = RecordingProvider::new(vec![]);
    let state = build_state(provider.clone());
    let chat = state.chat.clone();
    let app = app!(state);

    post_message!(app, "alex", "My name is Alex and I love anime");
    assert!(!chat.memory().get_recent_context("alex").is_empty());

    let req = test::TestRequest::post()
        .uri("/api/v1/reset")
        .set_json(json!({ "user_id": "alex" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "cleared");

    assert!(chat.memory().get_recent_context("alex").is_empty());
    let recalled = chat.memory().recall_context("alex", "anime", 5).await.unwrap();
    assert!(recalled.contains("anime"));

    // the turn counter keeps counting across resets
    let (_, body) = post_message!(app, "alex", "back again");
    assert_eq!(body["metadata"]["turn_id"], 2);
}

#[actix_web::test]
async fn test_usage_reports_requests() {
    let app = app!(build_state(RecordingProvider::new(vec![])));

    post_message!(app, "alex", "hello there");

    let req = test::TestRequest::get().uri("/api/v1/usage").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["usage"]["daily_used"], 1);
    assert_eq!(body["usage"]["daily_remaining"], 14_399);
    assert_eq!(body["provider"]["requests_per_minute"], 30);
    assert_eq!(body["rate_limit"]["capacity"], 28);
    assert_eq!(body["rate_limit"]["in_window"], 1);
}

#[actix_web::test]
async fn test_unreadable_fact_file_still_gets_a_reply() {
    let temp_dir = TempDir::new().unwrap();
    let store = LocalMemoryStore::persistent(temp_dir.path().to_path_buf());
    let path = store.path_for_user("u1").unwrap();
    std::fs::write(&path, "{not json").unwrap();

    let provider = RecordingProvider::new(vec![
        Ok(Completion::Text("Hi!".to_string())),
        Ok(Completion::Text("Nice to meet you, Alex.".to_string())),
    ]);
    let app = app!(build_state_with_store(provider.clone(), store));

    let (status, body) = post_message!(app, "u1", "hey");
    assert_eq!(status, 200);
    assert_eq!(body["reply"], "Hi!");

    // a fact-bearing message fails to store but the turn still completes
    let (status, body) = post_message!(app, "u1", "My name is Alex and I love anime");
    assert_eq!(status, 200);
    assert_eq!(body["reply"], "Nice to meet you, Alex.");
    assert_eq!(body["metadata"]["turn_id"], 2);

    let prompts = provider.prompts();
    assert!(!prompts[1].contains("[You know]:"));
    assert!(prompts[1].contains("Juno: Hi!"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
}
