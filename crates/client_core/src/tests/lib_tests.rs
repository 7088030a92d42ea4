use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

use super::*;
use shared::domain::MessageStatus;

async fn serve(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[test]
fn server_url_trailing_slash_is_trimmed() {
    let client = RelayClient::new("http://127.0.0.1:5000/");
    assert_eq!(client.server_url(), "http://127.0.0.1:5000");
}

#[tokio::test]
async fn register_returns_echoed_receipt() {
    let app = Router::new().route(
        "/register",
        post(|Json(body): Json<RegisterRequest>| async move {
            Json(json!({
                "client_id": body.client_id,
                "long_term_key": "00ff",
                "derivation": {"algorithm": "HMAC-SHA256(master_key, client_id)"},
            }))
        }),
    );
    let client = RelayClient::new(serve(app).await);

    let receipt = client
        .register(&ClientId::from("alice"))
        .await
        .expect("register");
    assert_eq!(receipt.client_id, ClientId::from("alice"));
    assert_eq!(receipt.long_term_key.as_deref(), Some("00ff"));
    assert!(receipt.derivation.is_some());
}

#[tokio::test]
async fn register_rejection_surfaces_error_body() {
    let app = Router::new().route(
        "/register",
        post(|| async { (StatusCode::BAD_REQUEST, Json(json!({"error": "exists"}))) }),
    );
    let client = RelayClient::new(serve(app).await);

    let err = client
        .register(&ClientId::from("alice"))
        .await
        .expect_err("must be rejected");
    match err {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message, "exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn rejection_without_error_body_degrades_to_fallback() {
    let app = Router::new().route(
        "/shared-key",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = RelayClient::new(serve(app).await);

    let err = client
        .shared_key(&ClientId::from("a"), &ClientId::from("b"))
        .await
        .expect_err("must be rejected");
    let message = err.surface_message();
    assert!(message.contains("500"), "unexpected message: {message}");
}

#[tokio::test]
async fn shared_key_resolves_handle_or_raises_server_text() {
    let app = Router::new().route(
        "/shared-key",
        post(|Json(body): Json<SharedKeyRequest>| async move {
            if body.client_b == ClientId::from("mallory") {
                return (StatusCode::FORBIDDEN, Json(json!({"error": "not paired"})));
            }
            (StatusCode::OK, Json(json!({"shared_key": "aa55"})))
        }),
    );
    let client = RelayClient::new(serve(app).await);

    let ok = client
        .shared_key(&ClientId::from("alice"), &ClientId::from("bob"))
        .await
        .expect("derive");
    assert_eq!(ok.shared_key, "aa55");

    let err = client
        .shared_key(&ClientId::from("alice"), &ClientId::from("mallory"))
        .await
        .expect_err("must be rejected");
    assert_eq!(err.surface_message(), "not paired");
}

#[tokio::test]
async fn list_clients_returns_roster() {
    let app = Router::new().route("/clients", get(|| async { Json(json!(["alice", "bob"])) }));
    let client = RelayClient::new(serve(app).await);

    let roster = client.list_clients().await.expect("roster");
    assert_eq!(roster, vec![ClientId::from("alice"), ClientId::from("bob")]);
}

#[tokio::test]
async fn encrypt_and_decrypt_pass_payloads_through() {
    let app = Router::new()
        .route(
            "/encrypt",
            post(|Json(body): Json<EncryptRequest>| async move {
                Json(json!({
                    "ciphertext": format!("ct({})", body.message),
                    "iv": "0011",
                    "algorithm": "AES-256-CBC",
                }))
            }),
        )
        .route(
            "/decrypt",
            post(|Json(body): Json<DecryptRequest>| async move {
                Json(json!({"plaintext": format!("pt({})", body.ciphertext)}))
            }),
        );
    let client = RelayClient::new(serve(app).await);

    let encrypted = client.encrypt("aa55", "hi").await.expect("encrypt");
    assert_eq!(encrypted.ciphertext, "ct(hi)");
    assert_eq!(encrypted.iv.as_deref(), Some("0011"));
    assert_eq!(encrypted.algorithm.as_deref(), Some("AES-256-CBC"));

    let decrypted = client
        .decrypt("aa55", &encrypted.ciphertext)
        .await
        .expect("decrypt");
    assert_eq!(decrypted.plaintext, "pt(ct(hi))");
}

#[derive(Clone)]
struct CaptureState {
    tx: Arc<Mutex<Option<oneshot::Sender<SendRequest>>>>,
}

async fn handle_send(State(state): State<CaptureState>, Json(payload): Json<SendRequest>) {
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(payload);
    }
}

#[tokio::test]
async fn send_posts_exact_payload() {
    let (tx, rx) = oneshot::channel();
    let app = Router::new()
        .route("/send", post(handle_send))
        .with_state(CaptureState {
            tx: Arc::new(Mutex::new(Some(tx))),
        });
    let client = RelayClient::new(serve(app).await);

    client
        .send(&ClientId::from("alice"), &ClientId::from("bob"), "deadbeef")
        .await
        .expect("send");

    let payload = rx.await.expect("captured payload");
    assert_eq!(payload.sender, ClientId::from("alice"));
    assert_eq!(payload.receiver, ClientId::from("bob"));
    assert_eq!(payload.ciphertext, "deadbeef");
}

#[tokio::test]
async fn inbox_parses_relay_messages() {
    let app = Router::new().route(
        "/inbox/:user",
        get(|Path(user): Path<String>| async move {
            assert_eq!(user, "alice");
            Json(json!([
                {
                    "id": "11aa22bb",
                    "from": "bob",
                    "ciphertext": "c0ffee",
                    "timestamp": 1717171717.5,
                    "status": "read"
                },
                {
                    "from": "carol",
                    "ciphertext": "facade",
                    "timestamp": 1717171800.0,
                    "status": "unread"
                }
            ]))
        }),
    );
    let client = RelayClient::new(serve(app).await);

    let messages = client.inbox(&ClientId::from("alice")).await.expect("inbox");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id.as_deref(), Some("11aa22bb"));
    assert_eq!(messages[0].status, MessageStatus::Read);
    assert_eq!(messages[1].from, ClientId::from("carol"));
    assert!(messages[1].id.is_none());
}

#[tokio::test]
async fn clear_messages_posts_to_relay() {
    let app = Router::new().route(
        "/clear-messages",
        post(|| async { Json(json!({"status": "all messages deleted"})) }),
    );
    let client = RelayClient::new(serve(app).await);

    client.clear_messages().await.expect("clear");
}
