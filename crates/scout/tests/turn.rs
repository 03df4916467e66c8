use scout::models::event::AgentEvent;
use scout::providers::configs::OpenAiProviderConfig;
use scout::session::{ChatEntry, ChatRole, ChatSession};
use scout::tools::{LookupConfig, ToolConfig};
use scout::turn::{run_turn, AgentConfig, TurnError};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(message: Value) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 15, "total_tokens": 27}
    })
}

fn tool_call(id: &str, name: &str, query: &str) -> Value {
    completion(json!({
        "role": "assistant",
        "content": null,
        "tool_calls": [{
            "id": id,
            "type": "function",
            "function": {
                "name": name,
                "arguments": json!({"query": query}).to_string()
            }
        }]
    }))
}

fn answer(text: &str) -> Value {
    completion(json!({"role": "assistant", "content": text}))
}

/// Mount model responses that are returned once each, in order
async fn script_model(server: &MockServer, responses: Vec<Value>) {
    for response in responses {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .up_to_n_times(1)
            .mount(server)
            .await;
    }
}

fn config(server: &MockServer) -> AgentConfig {
    let host = server.uri();
    let mut provider = OpenAiProviderConfig::new("sk-test");
    provider.host = host.clone();
    provider.stream = false;

    AgentConfig {
        provider,
        tools: ToolConfig {
            search: LookupConfig::new(host.clone(), 4, 1000),
            arxiv: LookupConfig::new(host.clone(), 1, 200),
            wikipedia: LookupConfig::new(host, 1, 200),
        },
        max_iterations: 10,
    }
}

#[tokio::test]
async fn test_wikipedia_turn_end_to_end() {
    let server = MockServer::start().await;
    script_model(
        &server,
        vec![
            tool_call("call_1", "wikipedia", "Dune novel"),
            answer("Dune is a 1965 novel by Frank Herbert."),
        ],
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "search"))
        .and(query_param("srsearch", "Dune novel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"search": [{"ns": 0, "title": "Dune (novel)"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let long_extract = "Dune is a 1965 epic science fiction novel by American author Frank Herbert. ".repeat(10);
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "extracts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": {"1": {"title": "Dune (novel)", "extract": long_extract}}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let agent = config(&server).build(None).unwrap();
    let mut session = ChatSession::new();
    let mut events = Vec::new();

    let text = run_turn(&mut session, &agent, "Who wrote Dune?", |e: &AgentEvent| {
        events.push(e.clone())
    })
    .await
    .unwrap();

    assert_eq!(text, "Dune is a 1965 novel by Frank Herbert.");
    assert_eq!(session.len(), 3);
    assert_eq!(
        session.last(),
        Some(&ChatEntry::assistant("Dune is a 1965 novel by Frank Herbert."))
    );

    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        AgentEvent::ToolInvoked {
            id: "call_1".into(),
            tool: "wikipedia".into(),
            query: "Dune novel".into(),
        }
    );
    match &events[1] {
        AgentEvent::ToolResult {
            output, is_error, ..
        } => {
            assert!(!is_error);
            assert!(output.starts_with("Page: Dune (novel)\nSummary: Dune is a 1965"));
            assert_eq!(output.chars().count(), 200);
        }
        other => panic!("Expected tool result, got {:?}", other),
    }
}

#[tokio::test]
async fn test_tool_result_is_sent_back_to_model() {
    let server = MockServer::start().await;
    script_model(&server, vec![tool_call("call_9", "search", "rust 2024 edition")]).await;

    // The follow-up request carries the tool output under the call id
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system"},
                {"role": "user", "content": "What is new in Rust 2024?"},
                {"role": "assistant"},
                {"role": "tool", "tool_call_id": "call_9"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer("Async closures.")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "rust 2024 edition"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><a class="result__snippet">The 2024 edition adds async closures.</a></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let agent = config(&server).build(None).unwrap();
    let mut session = ChatSession::new();

    let text = run_turn(&mut session, &agent, "What is new in Rust 2024?", |_: &AgentEvent| {})
        .await
        .unwrap();
    assert_eq!(text, "Async closures.");
}

#[tokio::test]
async fn test_unreachable_lookup_fails_turn() {
    let server = MockServer::start().await;
    script_model(
        &server,
        vec![
            tool_call("call_1", "arxiv", "attention is all you need"),
            answer("never used"),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let agent = config(&server).build(None).unwrap();
    let mut session = ChatSession::new();

    let err = run_turn(&mut session, &agent, "Find the transformer paper", |_: &AgentEvent| {})
        .await
        .unwrap_err();

    assert!(matches!(err, TurnError::Agent(_)));
    assert!(err.to_string().contains("502"));
    assert_eq!(session.len(), 2);
    assert_eq!(session.last().map(|e| e.role), Some(ChatRole::User));
}

#[tokio::test]
async fn test_session_key_overrides_configured_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer("hello")))
        .expect(1)
        .mount(&server)
        .await;

    let agent = config(&server).build(Some("sk-session")).unwrap();
    let mut session = ChatSession::new();

    let text = run_turn(&mut session, &agent, "hi", |_: &AgentEvent| {})
        .await
        .unwrap();
    assert_eq!(text, "hello");
}
