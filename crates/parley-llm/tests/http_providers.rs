use std::time::Duration;

use mockito::Matcher;
use serde_json::json;

use parley_llm::{
    create_provider, Completion, CompletionRequest, LLMError, ProviderConfig, ProviderKind,
    SerperSearch, WebSearch,
};

fn config(kind: ProviderKind, base_url: String) -> ProviderConfig {
    ProviderConfig::for_kind(kind)
        .with_base_url(base_url)
        .with_api_key("test-key")
        .with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_gemini_request_and_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-2.0-flash-exp:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "contents": [{ "parts": [{ "text": "hello" }] }],
            "generationConfig": { "topK": 40 }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"  Hi there!  "}]}}]}"#)
        .create_async()
        .await;

    let provider = create_provider(ProviderKind::Gemini, config(ProviderKind::Gemini, server.url())).unwrap();
    let completion = provider.complete(&CompletionRequest::new("hello")).await.unwrap();

    assert_eq!(completion, Completion::Text("Hi there!".to_string()));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_claude_sends_version_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/messages")
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .with_status(200)
        .with_body(r#"{"content":[{"type":"text","text":"Hello from Claude"}]}"#)
        .create_async()
        .await;

    let provider = create_provider(ProviderKind::Claude, config(ProviderKind::Claude, server.url())).unwrap();
    let completion = provider.complete(&CompletionRequest::new("hello")).await.unwrap();

    assert_eq!(completion, Completion::Text("Hello from Claude".to_string()));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_groq_rate_limit_is_an_outcome() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(429)
        .with_body(r#"{"error":"slow down"}"#)
        .create_async()
        .await;

    let provider = create_provider(ProviderKind::Groq, config(ProviderKind::Groq, server.url())).unwrap();
    let completion = provider.complete(&CompletionRequest::new("hello")).await.unwrap();

    assert_eq!(completion, Completion::RateLimited);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cohere_server_error_is_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat")
        .match_body(Matcher::PartialJson(json!({ "message": "hello" })))
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let provider = create_provider(ProviderKind::Cohere, config(ProviderKind::Cohere, server.url())).unwrap();
    let err = provider.complete(&CompletionRequest::new("hello")).await.unwrap_err();

    assert!(matches!(err, LLMError::Api { status: 503, .. }));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn test_body_without_text_is_empty() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let provider = create_provider(ProviderKind::Groq, config(ProviderKind::Groq, server.url())).unwrap();
    let completion = provider.complete(&CompletionRequest::new("hello")).await.unwrap();

    assert_eq!(completion, Completion::Empty);
}

#[tokio::test]
async fn test_malformed_body_is_transform_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let provider = create_provider(ProviderKind::Cohere, config(ProviderKind::Cohere, server.url())).unwrap();
    let err = provider.complete(&CompletionRequest::new("hello")).await.unwrap_err();

    assert!(matches!(err, LLMError::Transform(_)));
}

#[tokio::test]
async fn test_missing_key_fails_before_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/chat/completions").expect(0).create_async().await;

    let config = ProviderConfig::for_kind(ProviderKind::Groq)
        .with_base_url(server.url())
        .with_api_key("   ")
        .with_credential_env("GROQ_API_KEY");
    let provider = create_provider(ProviderKind::Groq, config).unwrap();
    let err = provider.complete(&CompletionRequest::new("hello")).await.unwrap_err();

    assert!(matches!(err, LLMError::Auth(ref msg) if msg == "GROQ_API_KEY not set"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_serper_answer_box() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/search")
        .match_header("x-api-key", "serper-key")
        .match_body(Matcher::Json(json!({ "q": "who is ada lovelace", "num": 3 })))
        .with_status(200)
        .with_body(r#"{"answerBox":{"answer":"English mathematician"}}"#)
        .create_async()
        .await;

    let search = SerperSearch::new(Some("serper-key".to_string()))
        .unwrap()
        .with_endpoint(format!("{}/search", server.url()));

    assert_eq!(
        search.search("who is ada lovelace", 3).await,
        "[Web]: English mathematician\n"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_serper_failure_yields_nothing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/search")
        .with_status(500)
        .create_async()
        .await;

    let search = SerperSearch::new(Some("serper-key".to_string()))
        .unwrap()
        .with_endpoint(format!("{}/search", server.url()));

    assert_eq!(search.search("what is rust", 3).await, "");
}
