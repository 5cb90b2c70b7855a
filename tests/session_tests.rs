use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use sparkchat::{
    CREDENTIAL_KEY, ChatError, ChatSession, FALLBACK_RESPONSE, FileStore, HuggingFaceClient,
    HuggingFaceConfig, KeyValueStore, MemoryStore, Message, SendState,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const MODEL_PATH: &str = "/models/mistralai/Mistral-7B-Instruct-v0.2";

fn session_for(server: &MockServer, store: Arc<dyn KeyValueStore>) -> ChatSession {
    let client = HuggingFaceClient::new(HuggingFaceConfig::new().with_base_url(server.uri()))
        .expect("client should build");
    ChatSession::new(client, store).expect("session should start")
}

fn authenticated_store() -> Arc<dyn KeyValueStore> {
    let store = MemoryStore::new();
    store.set(CREDENTIAL_KEY, "hf_test").unwrap();
    Arc::new(store)
}

async fn mount_response(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .expect("mock server should record requests")
        .len()
}

#[tokio::test]
async fn successful_exchange_appends_exactly_one_reply() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([{ "generated_text": "Hello, human." }])),
    )
    .await;

    let session = session_for(&server, authenticated_store());
    let reply = session.send("Hello").await.expect("send should succeed");

    assert_eq!(reply, Message::assistant("Hello, human."));
    assert_eq!(
        session.messages(),
        vec![Message::user("Hello"), Message::assistant("Hello, human.")]
    );
}

#[tokio::test]
async fn follow_up_sends_the_whole_history() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([{ "generated_text": "B" }])),
    )
    .await;

    let session = session_for(&server, authenticated_store());
    session.send("A").await.unwrap();
    session.send("C").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(body["inputs"], "<s>[INST] A [/INST]\nB\n<s>[INST] C [/INST]");
    assert_eq!(session.message_count(), 4);
}

#[tokio::test]
async fn empty_generation_appends_fallback_text() {
    let server = MockServer::start().await;
    mount_response(&server, ResponseTemplate::new(200).set_body_json(json!([{}]))).await;

    let session = session_for(&server, authenticated_store());
    let reply = session.send("Hello").await.unwrap();

    assert_eq!(reply.content, FALLBACK_RESPONSE);
    assert_eq!(session.messages().last(), Some(&Message::assistant(FALLBACK_RESPONSE)));
}

#[tokio::test]
async fn failed_exchange_leaves_only_the_user_message() {
    let server = MockServer::start().await;
    mount_response(&server, ResponseTemplate::new(500)).await;

    let session = session_for(&server, authenticated_store());
    let err = session.send("Hello").await.unwrap_err();

    assert!(matches!(err, ChatError::CompletionFailed { status_code: Some(500), .. }));
    assert_eq!(session.messages(), vec![Message::user("Hello")]);
    assert_eq!(session.state(), SendState::Idle);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn blank_submission_is_rejected_before_anything_happens() {
    let server = MockServer::start().await;
    let session = session_for(&server, authenticated_store());

    for blank in ["", "  ", "\t\n"] {
        let err = session.send(blank).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyInput));
    }

    assert_eq!(session.message_count(), 0);
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn unauthenticated_session_never_touches_the_network() {
    let server = MockServer::start().await;
    let session = session_for(&server, Arc::new(MemoryStore::new()));

    let err = session.send("Hello").await.unwrap_err();

    assert!(matches!(err, ChatError::Unauthenticated));
    assert_eq!(session.message_count(), 0);
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn second_submission_is_rejected_while_in_flight() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!([{ "generated_text": "slow reply" }]))
            .set_delay(Duration::from_millis(300)),
    )
    .await;

    let session = Arc::new(session_for(&server, authenticated_store()));

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.send("first").await }
    });

    while session.state() != SendState::Sending {
        tokio::task::yield_now().await;
    }

    let err = session.send("second").await.unwrap_err();
    assert!(matches!(err, ChatError::Busy));

    let reply = first.await.unwrap().unwrap();
    assert_eq!(reply.content, "slow reply");
    assert_eq!(
        session.messages(),
        vec![Message::user("first"), Message::assistant("slow reply")]
    );
    assert_eq!(request_count(&server).await, 1);

    session.send("third").await.expect("idle session accepts sends again");
}

#[tokio::test]
async fn saved_credential_survives_reload_from_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("storage.json");

    let session = session_for(&server, Arc::new(FileStore::new(&store_path)));
    assert!(!session.is_authenticated());
    session.save_credential("hf_saved").unwrap();
    drop(session);

    let reloaded = session_for(&server, Arc::new(FileStore::new(&store_path)));
    assert_eq!(reloaded.credential().expose(), "hf_saved");
    assert!(reloaded.messages().is_empty());

    reloaded.clear_credential().unwrap();
    let cleared = session_for(&server, Arc::new(FileStore::new(&store_path)));
    assert!(!cleared.is_authenticated());
}
