use flowting_stream::{
    ClientConfig, PersonaClient, PersonaTester, ResponseAccumulator, StreamEvent, StreamOutcome,
    TestPersonaInput,
};
use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::json;

const TEST_PATH: &str = "/personas/test/";

const SESSION: &str = "event: metadata\n\
data: {\"modelId\":123,\"modelName\":\"GPT\",\"provider\":\"openai\"}\n\
\n\
event: start\n\
data: {}\n\
\n\
event: chunk\n\
data: {\"delta\":\"partial \"}\n\
\n\
event: chunk\n\
data: {\"delta\":\"text\"}\n\
\n\
event: end\n\
data: {}\n\
\n\
event: done\n\
data: {\"response\":\"partial text\",\"inputTokens\":5,\"outputTokens\":2}\n\
\n";

fn client_for(server: &mockito::ServerGuard) -> PersonaClient {
    let config = ClientConfig::default().with_base_url(server.url());
    PersonaClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_streams_full_session() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", TEST_PATH)
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({"message": "Hi", "personaId": "p-1"})))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(SESSION)
        .create_async()
        .await;

    let client = client_for(&server);
    let accumulator = ResponseAccumulator::new();

    let handle = client
        .test_persona(TestPersonaInput::new("Hi").persona_id("p-1"), accumulator.clone())
        .await;
    let outcome = handle.join().await;

    mock.assert_async().await;
    assert_eq!(outcome, StreamOutcome::Completed);

    let response = accumulator.snapshot();
    assert_eq!(response.text, "partial text");
    assert_eq!(response.metadata.unwrap().model_id, 123);
    assert!(response.started && response.ended);
    assert_eq!(response.summary.unwrap().output_tokens, 2);
    assert_eq!(response.error, None);
}

#[tokio::test]
async fn test_channel_sink_receives_events_in_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", TEST_PATH)
        .with_status(200)
        .with_body(SESSION)
        .create_async()
        .await;

    let client = client_for(&server);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<StreamEvent>();

    let handle = PersonaTester::test_persona(&client, TestPersonaInput::new("Hi"), tx).await;
    assert_eq!(handle.join().await, StreamOutcome::Completed);

    let mut kinds = Vec::new();
    while let Some(event) = rx.recv().await {
        kinds.push(event.event_type());
    }
    assert_eq!(kinds, vec!["metadata", "start", "chunk", "chunk", "end", "done"]);
}

#[tokio::test]
async fn test_non_success_status_reports_body_text() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", TEST_PATH)
        .with_status(403)
        .with_body("CSRF verification failed")
        .create_async()
        .await;

    let client = client_for(&server);
    let accumulator = ResponseAccumulator::new();

    let handle = client.test_persona(TestPersonaInput::new("Hi"), accumulator.clone()).await;
    assert!(handle.is_finished());
    let outcome = handle.join().await;

    assert_eq!(
        outcome,
        StreamOutcome::Failed("CSRF verification failed".to_string())
    );
    let response = accumulator.snapshot();
    assert_eq!(response.error.as_deref(), Some("CSRF verification failed"));
    assert!(!response.started);
}

#[tokio::test]
async fn test_non_success_status_with_empty_body_uses_fallback() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", TEST_PATH)
        .with_status(500)
        .create_async()
        .await;

    let client = client_for(&server);
    let accumulator = ResponseAccumulator::new();

    let outcome = client
        .test_persona(TestPersonaInput::new("Hi"), accumulator.clone())
        .await
        .join()
        .await;

    assert_eq!(outcome, StreamOutcome::Failed("Failed to test persona".to_string()));
    assert_eq!(
        accumulator.snapshot().error.as_deref(),
        Some("Failed to test persona")
    );
}

#[tokio::test]
async fn test_no_content_reports_missing_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", TEST_PATH)
        .with_status(204)
        .create_async()
        .await;

    let client = client_for(&server);
    let accumulator = ResponseAccumulator::new();

    let outcome = client
        .test_persona(TestPersonaInput::new("Hi"), accumulator.clone())
        .await
        .join()
        .await;

    assert_eq!(outcome, StreamOutcome::Failed("No response body".to_string()));
    assert_eq!(accumulator.snapshot().error.as_deref(), Some("No response body"));
}

#[tokio::test]
async fn test_backend_error_frame_is_terminal() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", TEST_PATH)
        .with_status(200)
        .with_body(
            "event: start\ndata: {}\n\nevent: error\ndata: {\"error\":\"model unavailable\"}\n\nevent: chunk\ndata: {\"delta\":\"late\"}\n",
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let accumulator = ResponseAccumulator::new();

    let outcome = client
        .test_persona(TestPersonaInput::new("Hi"), accumulator.clone())
        .await
        .join()
        .await;

    assert_eq!(outcome, StreamOutcome::Failed("model unavailable".to_string()));
    let response = accumulator.snapshot();
    assert_eq!(response.error.as_deref(), Some("model unavailable"));
    assert_eq!(response.text, "");
}

#[tokio::test]
async fn test_csrf_token_header_is_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", TEST_PATH)
        .match_header("x-csrftoken", "token-123")
        .with_status(200)
        .with_body(SESSION)
        .create_async()
        .await;

    let config = ClientConfig::default()
        .with_base_url(server.url())
        .with_csrf_token("token-123");
    let client = PersonaClient::new(&config).unwrap();

    let outcome = client
        .test_persona(TestPersonaInput::new("Hi"), ResponseAccumulator::new())
        .await
        .join()
        .await;

    mock.assert_async().await;
    assert_eq!(outcome, StreamOutcome::Completed);
}

#[tokio::test]
async fn test_connection_failure_goes_to_error_callback() {
    let config = ClientConfig::default().with_base_url("http://127.0.0.1:1");
    let client = PersonaClient::new(&config).unwrap();
    let accumulator = ResponseAccumulator::new();

    let outcome = client
        .test_persona(TestPersonaInput::new("Hi"), accumulator.clone())
        .await
        .join()
        .await;

    let message = accumulator.snapshot().error.expect("error callback fired");
    assert!(!message.is_empty());
    assert_eq!(outcome, StreamOutcome::Failed(message));
}

async fn channel_events(
    client: &PersonaClient,
) -> (StreamOutcome, Vec<StreamEvent>) {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<StreamEvent>();
    let outcome = client
        .test_persona(TestPersonaInput::new("Hi"), tx)
        .await
        .join()
        .await;

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (outcome, events)
}

#[tokio::test]
async fn test_channel_sink_receives_status_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", TEST_PATH)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let (outcome, events) = channel_events(&client_for(&server)).await;

    assert_eq!(outcome, StreamOutcome::Failed("boom".to_string()));
    assert_eq!(events, vec![StreamEvent::error("boom")]);
}

#[tokio::test]
async fn test_channel_sink_receives_missing_body_on_no_content() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", TEST_PATH)
        .with_status(204)
        .create_async()
        .await;

    let (outcome, events) = channel_events(&client_for(&server)).await;

    assert_eq!(outcome, StreamOutcome::Failed("No response body".to_string()));
    assert_eq!(events, vec![StreamEvent::error("No response body")]);
}

#[tokio::test]
async fn test_empty_ok_body_reports_missing_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", TEST_PATH)
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("")
        .create_async()
        .await;

    let (outcome, events) = channel_events(&client_for(&server)).await;

    assert_eq!(outcome, StreamOutcome::Failed("No response body".to_string()));
    assert_eq!(events, vec![StreamEvent::error("No response body")]);
}

#[tokio::test]
async fn test_channel_sink_receives_connection_failure() {
    let config = ClientConfig::default().with_base_url("http://127.0.0.1:1");
    let client = PersonaClient::new(&config).unwrap();

    let (outcome, events) = channel_events(&client).await;

    let StreamOutcome::Failed(message) = outcome else {
        panic!("connection to a closed port should fail");
    };
    assert!(!message.is_empty());
    assert_eq!(events, vec![StreamEvent::error(message)]);
}
