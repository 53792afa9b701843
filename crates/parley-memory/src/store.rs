use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::{Fact, FactMetadata, UserFacts};
use crate::{MemoryError, MemoryResult};

/// Long-term fact storage with similarity lookup
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Store a fact. Returns `false` when it was rejected as a near-duplicate.
    async fn add(&self, user_id: &str, text: &str, metadata: FactMetadata) -> MemoryResult<bool>;

    /// Up to `k` stored texts for `user_id`, most similar first
    async fn query(&self, user_id: &str, text: &str, k: usize) -> MemoryResult<Vec<String>>;
}

/// In-process store ranking facts by lexical similarity.
///
/// With a root directory, each user's facts are kept in `<root>/<user>.json`
/// and loaded on first touch.
#[derive(Debug)]
pub struct LocalMemoryStore {
    root: Option<PathBuf>,
    users: DashMap<String, Vec<Fact>>,
    write_lock: Mutex<()>,
}

impl LocalMemoryStore {
    pub fn in_memory() -> Self {
        Self {
            root: None,
            users: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn persistent(root: PathBuf) -> Self {
        Self {
            root: Some(root),
            ..Self::in_memory()
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn path_for_user(&self, user_id: &str) -> Option<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(format!("{}.json", file_stem(user_id))))
    }

    /// All facts held for a user, oldest first
    pub async fn facts(&self, user_id: &str) -> MemoryResult<Vec<Fact>> {
        self.ensure_loaded(user_id).await?;
        Ok(self
            .users
            .get(user_id)
            .map(|facts| facts.value().clone())
            .unwrap_or_default())
    }

    async fn ensure_loaded(&self, user_id: &str) -> MemoryResult<()> {
        if self.users.contains_key(user_id) {
            return Ok(());
        }

        let facts = match self.path_for_user(user_id) {
            Some(path) => match fs::read_to_string(&path).await {
                Ok(content) => {
                    let stored: UserFacts = serde_json::from_str(&content)
                        .map_err(|e| MemoryError::Store(format!("{:?} is unreadable: {}", path, e)))?;
                    debug!("Loaded {} facts for {}", stored.facts.len(), user_id);
                    stored.facts
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
                Err(err) => return Err(MemoryError::Io(err)),
            },
            None => Vec::new(),
        };

        self.users.entry(user_id.to_string()).or_insert(facts);
        Ok(())
    }

    async fn persist(&self, user_id: &str) -> MemoryResult<()> {
        let Some(path) = self.path_for_user(user_id) else {
            return Ok(());
        };

        let _guard = self.write_lock.lock().await;

        let mut document = UserFacts::new(user_id);
        document.facts = self
            .users
            .get(user_id)
            .map(|facts| facts.value().clone())
            .unwrap_or_default();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, serde_json::to_string_pretty(&document)?).await?;
        Ok(())
    }

    fn rank(&self, user_id: &str, text: &str, k: usize) -> Vec<String> {
        let Some(facts) = self.users.get(user_id) else {
            return Vec::new();
        };

        let query = term_vector(text);
        let mut scored: Vec<(usize, f64)> = facts
            .iter()
            .enumerate()
            .map(|(index, fact)| (index, cosine(&query, &term_vector(&fact.text))))
            .collect();

        // best score first, newer facts first on ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(b.0.cmp(&a.0)));

        scored
            .into_iter()
            .take(k)
            .map(|(index, _)| facts[index].text.clone())
            .collect()
    }
}

#[async_trait]
impl MemoryStore for LocalMemoryStore {
    async fn add(&self, user_id: &str, text: &str, metadata: FactMetadata) -> MemoryResult<bool> {
        // never persist over a document that failed to load
        self.ensure_loaded(user_id).await?;

        if let Some(nearest) = self.rank(user_id, text, 1).first() {
            if nearest == text || nearest.contains(text) {
                debug!("Skipping duplicate fact for {}: {}", user_id, text);
                return Ok(false);
            }
        }

        let fact = Fact::new(user_id, text, metadata);
        self.users
            .entry(user_id.to_string())
            .or_default()
            .push(fact);

        self.persist(user_id).await?;
        Ok(true)
    }

    async fn query(&self, user_id: &str, text: &str, k: usize) -> MemoryResult<Vec<String>> {
        self.ensure_loaded(user_id).await?;
        Ok(self.rank(user_id, text, k))
    }
}

fn file_stem(user_id: &str) -> String {
    user_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Preference words treated as one concept when comparing
const PREFERENCE_WORDS: &[&str] = &["love", "like", "enjoy", "favorite", "favourite", "fav", "fan", "into"];
const PREFERENCE_CONCEPT: &str = "~preference";

fn normalize_token(token: &str) -> String {
    let lower = token.to_lowercase();
    let folded = match lower.strip_suffix('s') {
        Some(stem) if stem.chars().count() >= 3 && !stem.ends_with('s') => stem.to_string(),
        _ => lower,
    };

    if PREFERENCE_WORDS.contains(&folded.as_str()) {
        PREFERENCE_CONCEPT.to_string()
    } else {
        folded
    }
}

fn term_vector(text: &str) -> HashMap<String, f64> {
    let mut terms = HashMap::new();
    for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
        *terms.entry(normalize_token(token)).or_insert(0.0) += 1.0;
    }
    terms
}

fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(term, weight)| b.get(term).map(|other| weight * other))
        .sum();
    if dot == 0.0 {
        return 0.0;
    }

    let norm = |v: &HashMap<String, f64>| v.values().map(|w| w * w).sum::<f64>().sqrt();
    dot / (norm(a) * norm(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_folds_plurals_and_preferences() {
        assert_eq!(normalize_token("Games"), "game");
        assert_eq!(normalize_token("loves"), PREFERENCE_CONCEPT);
        assert_eq!(normalize_token("Favorite"), PREFERENCE_CONCEPT);
        assert_eq!(normalize_token("glass"), "glass");
        assert_eq!(normalize_token("is"), "is");
    }

    #[test]
    fn test_cosine() {
        let a = term_vector("Loves: anime");
        assert!((cosine(&a, &a) - 1.0).abs() < 1e-9);
        assert_eq!(cosine(&a, &term_vector("User's name: Alex")), 0.0);
        assert!(cosine(&a, &term_vector("what do I like")) > 0.0);
    }

    #[tokio::test]
    async fn test_query_ranks_by_similarity() {
        let store = LocalMemoryStore::in_memory();
        store.add("u1", "User's name: Alex", FactMetadata::user(1)).await.unwrap();
        store.add("u1", "Loves: anime", FactMetadata::user(1)).await.unwrap();
        store.add("u1", "Lives in: Lisbon", FactMetadata::user(2)).await.unwrap();

        let results = store.query("u1", "which anime do you love", 2).await.unwrap();
        assert_eq!(results[0], "Loves: anime");
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_query_returns_k_even_without_overlap() {
        let store = LocalMemoryStore::in_memory();
        store.add("u1", "Plays: chess", FactMetadata::user(1)).await.unwrap();
        store.add("u1", "From: Lisbon", FactMetadata::user(2)).await.unwrap();

        // no shared terms: newest first
        let results = store.query("u1", "zzz", 5).await.unwrap();
        assert_eq!(results, vec!["From: Lisbon", "Plays: chess"]);
    }

    #[tokio::test]
    async fn test_duplicates_rejected() {
        let store = LocalMemoryStore::in_memory();

        assert!(store.add("u1", "Loves: anime", FactMetadata::user(1)).await.unwrap());
        assert!(!store.add("u1", "Loves: anime", FactMetadata::user(2)).await.unwrap());
        // contained in the nearest stored text
        assert!(store.add("u1", "Favorite anime: Attack on Titan", FactMetadata::user(3)).await.unwrap());
        assert!(!store.add("u1", "Attack on Titan", FactMetadata::user(4)).await.unwrap());

        assert_eq!(store.facts("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = LocalMemoryStore::in_memory();
        store.add("a", "Loves: anime", FactMetadata::user(1)).await.unwrap();

        assert!(store.query("b", "anime", 5).await.unwrap().is_empty());
        assert!(store.add("b", "Loves: anime", FactMetadata::user(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_persists_and_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("memory");

        let store = LocalMemoryStore::persistent(root.clone());
        store.add("alex@home", "Loves: anime", FactMetadata::user(1)).await.unwrap();

        let path = store.path_for_user("alex@home").unwrap();
        assert_eq!(path, root.join("alex_home.json"));
        assert!(path.exists());

        let reopened = LocalMemoryStore::persistent(root);
        let facts = reopened.facts("alex@home").await.unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].text, "Loves: anime");
        assert_eq!(facts[0].metadata.role, "user");
        assert!(!reopened.add("alex@home", "Loves: anime", FactMetadata::user(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_damaged_file_is_never_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        let store = LocalMemoryStore::persistent(root.clone());
        store.add("u1", "User's name: Alex", FactMetadata::user(1)).await.unwrap();
        store.add("u1", "Lives in: Lisbon", FactMetadata::user(2)).await.unwrap();

        let path = store.path_for_user("u1").unwrap();
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push('x');
        std::fs::write(&path, &content).unwrap();

        let reopened = LocalMemoryStore::persistent(root);
        assert!(reopened.query("u1", "anything", 3).await.is_err());
        assert!(matches!(
            reopened.add("u1", "Plays: chess", FactMetadata::user(3)).await,
            Err(MemoryError::Store(_))
        ));

        // earlier facts are still on disk, untouched
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
        assert!(content.contains("User's name: Alex"));
        assert!(content.contains("Lives in: Lisbon"));
        assert!(!content.contains("Plays: chess"));
    }
}
