use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::ClientId,
    protocol::{
        DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, InboxMessage,
        RegisterReceipt, RegisterRequest, SendRequest, SharedKeyRequest, SharedKeyResponse,
    },
};
use tracing::debug;

pub mod controller;
pub mod error;
pub mod events;

pub use controller::{
    Badge, CardBody, ComposeFields, Controller, MessageCard, MessengerView, Panel,
};
pub use error::ClientError;
pub use events::{EventKind, EventSource, Subscription, UiAction, SUBSCRIPTIONS};

/// HTTP client for the relay backend. One method per endpoint; no retries,
/// no timeouts, no client-side key caching.
pub struct RelayClient {
    http: Client,
    server_url: String,
}

impl RelayClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            server_url,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub async fn register(&self, client_id: &ClientId) -> Result<RegisterReceipt, ClientError> {
        debug!(client_id = %client_id, "registering identity");
        let response = self
            .http
            .post(format!("{}/register", self.server_url))
            .json(&RegisterRequest {
                client_id: client_id.clone(),
            })
            .send()
            .await?;
        parse(response).await
    }

    pub async fn list_clients(&self) -> Result<Vec<ClientId>, ClientError> {
        let response = self
            .http
            .get(format!("{}/clients", self.server_url))
            .send()
            .await?;
        parse(response).await
    }

    /// Shared key material for an ordered pair of identities. Requested fresh
    /// for every encrypt/decrypt cycle.
    pub async fn shared_key(
        &self,
        client_a: &ClientId,
        client_b: &ClientId,
    ) -> Result<SharedKeyResponse, ClientError> {
        debug!(client_a = %client_a, client_b = %client_b, "requesting shared key");
        let response = self
            .http
            .post(format!("{}/shared-key", self.server_url))
            .json(&SharedKeyRequest {
                client_a: client_a.clone(),
                client_b: client_b.clone(),
            })
            .send()
            .await?;
        parse(response).await
    }

    pub async fn encrypt(&self, key: &str, message: &str) -> Result<EncryptResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/encrypt", self.server_url))
            .json(&EncryptRequest {
                key: key.to_string(),
                message: message.to_string(),
            })
            .send()
            .await?;
        parse(response).await
    }

    pub async fn decrypt(
        &self,
        key: &str,
        ciphertext: &str,
    ) -> Result<DecryptResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/decrypt", self.server_url))
            .json(&DecryptRequest {
                key: key.to_string(),
                ciphertext: ciphertext.to_string(),
            })
            .send()
            .await?;
        parse(response).await
    }

    /// Submits an already-encrypted message. The relay's receipt body is
    /// ignored; only the status matters.
    pub async fn send(
        &self,
        sender: &ClientId,
        receiver: &ClientId,
        ciphertext: &str,
    ) -> Result<(), ClientError> {
        debug!(sender = %sender, receiver = %receiver, "submitting message");
        let response = self
            .http
            .post(format!("{}/send", self.server_url))
            .json(&SendRequest {
                sender: sender.clone(),
                receiver: receiver.clone(),
                ciphertext: ciphertext.to_string(),
            })
            .send()
            .await?;
        accept(response).await
    }

    pub async fn inbox(&self, user: &ClientId) -> Result<Vec<InboxMessage>, ClientError> {
        let response = self
            .http
            .get(format!("{}/inbox/{}", self.server_url, user))
            .send()
            .await?;
        parse(response).await
    }

    /// Asks the relay to drop every stored message, for all users.
    pub async fn clear_messages(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/clear-messages", self.server_url))
            .send()
            .await?;
        accept(response).await
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::from_rejection(response).await);
    }
    Ok(response.json().await?)
}

async fn accept(response: Response) -> Result<(), ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::from_rejection(response).await);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
