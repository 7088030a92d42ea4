//! Controller layer: binds the relay operations to an injected view.

use chrono::Local;
use shared::{
    domain::{ClientId, MessageStatus},
    protocol::{EncryptResponse, InboxMessage, RegisterReceipt, SharedKeyResponse},
};
use tracing::{info, warn};

use crate::{error::ClientError, RelayClient};

/// Status badge for one panel. An operation moves its panel to `Busy` when it
/// starts and to `Success` or `Error` when it settles; nothing resets a badge
/// back to a neutral state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Badge {
    Busy(String),
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Register,
    SharedKey,
    Send,
    Inbox,
}

/// The compose form's bound fields, read together at dispatch time.
#[derive(Debug, Clone, Default)]
pub struct ComposeFields {
    pub sender: String,
    pub receiver: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBody {
    Plaintext(String),
    DecryptFailed(String),
}

/// One rendered inbox entry.
#[derive(Debug, Clone)]
pub struct MessageCard {
    pub id: Option<String>,
    pub sender: ClientId,
    pub status: MessageStatus,
    pub sent_at: String,
    pub ciphertext: String,
    pub body: CardBody,
}

/// The controller's window onto the UI. Input methods read the bound form
/// fields; output methods mutate badges, panels, and the identity selectors.
/// Implementations own all presentation state, which lets tests substitute a
/// recording double.
pub trait MessengerView {
    fn register_name(&self) -> String;
    fn key_pair_selection(&self) -> (String, String);
    fn compose_fields(&self) -> ComposeFields;
    fn inbox_user(&self) -> String;

    fn set_badge(&mut self, panel: Panel, badge: Badge);
    fn clear_register_name(&mut self);
    /// Replaces the option set of every identity selector with `roster`.
    fn set_roster(&mut self, roster: &[ClientId]);
    fn show_registration(&mut self, receipt: &RegisterReceipt);
    fn show_shared_key(&mut self, response: &SharedKeyResponse);
    fn show_key_preview(&mut self, shared_key: &str);
    fn show_ciphertext_preview(&mut self, encrypted: &EncryptResponse);
    fn render_inbox(&mut self, cards: &[MessageCard]);
    fn render_inbox_empty(&mut self);
}

/// Drives the five user operations against an injected view. One operation
/// runs per call; every network round trip is awaited to completion before
/// the next begins.
pub struct Controller<V: MessengerView> {
    client: RelayClient,
    view: V,
}

impl<V: MessengerView> Controller<V> {
    pub fn new(client: RelayClient, view: V) -> Self {
        Self { client, view }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Registers a new identity. Blank input is a no-op, not an error.
    pub async fn register_user(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let client_id = ClientId::from(name);
        self.view.set_badge(
            Panel::Register,
            Badge::Busy(format!("registering {client_id}")),
        );
        match self.client.register(&client_id).await {
            Ok(receipt) => {
                info!(client_id = %receipt.client_id, "identity registered");
                self.view.set_badge(
                    Panel::Register,
                    Badge::Success(format!("registered {}", receipt.client_id)),
                );
                self.view.show_registration(&receipt);
                self.view.clear_register_name();
                self.refresh_client_options().await;
            }
            Err(err) => {
                warn!(client_id = %client_id, error = %err, "registration rejected");
                self.view
                    .set_badge(Panel::Register, Badge::Error(err.surface_message()));
            }
        }
    }

    /// Repopulates every identity selector from the relay's roster. There is
    /// no badge bound to the roster, so a failure is only logged.
    pub async fn refresh_client_options(&mut self) {
        match self.client.list_clients().await {
            Ok(roster) => self.view.set_roster(&roster),
            Err(err) => warn!(error = %err, "failed to refresh identity roster"),
        }
    }

    pub async fn derive_shared_key(&mut self, a: &str, b: &str) {
        let a = ClientId::from(a);
        let b = ClientId::from(b);
        self.view.set_badge(
            Panel::SharedKey,
            Badge::Busy(format!("deriving key for {a} and {b}")),
        );
        match self.client.shared_key(&a, &b).await {
            Ok(response) => {
                self.view.show_shared_key(&response);
                self.view.set_badge(
                    Panel::SharedKey,
                    Badge::Success("shared key derived".to_string()),
                );
            }
            Err(err) => {
                self.view
                    .set_badge(Panel::SharedKey, Badge::Error(err.surface_message()));
            }
        }
    }

    /// Chains shared-key, encrypt, and send. Empty input is a no-op. A
    /// failure aborts the remaining stages; previews populated by completed
    /// stages are left in place.
    pub async fn send_message(&mut self, sender: &str, receiver: &str, plaintext: &str) {
        if plaintext.is_empty() {
            return;
        }
        let sender = ClientId::from(sender);
        let receiver = ClientId::from(receiver);
        self.view
            .set_badge(Panel::Send, Badge::Busy(format!("sending to {receiver}")));

        let key = match self.client.shared_key(&sender, &receiver).await {
            Ok(response) => {
                self.view.show_key_preview(&response.shared_key);
                response.shared_key
            }
            Err(err) => {
                self.view
                    .set_badge(Panel::Send, Badge::Error(err.surface_message()));
                return;
            }
        };

        let encrypted = match self.client.encrypt(&key, plaintext).await {
            Ok(encrypted) => {
                self.view.show_ciphertext_preview(&encrypted);
                encrypted
            }
            Err(err) => {
                self.view
                    .set_badge(Panel::Send, Badge::Error(err.surface_message()));
                return;
            }
        };

        match self
            .client
            .send(&sender, &receiver, &encrypted.ciphertext)
            .await
        {
            Ok(()) => {
                info!(sender = %sender, receiver = %receiver, "message sent");
                self.view.set_badge(
                    Panel::Send,
                    Badge::Success(format!("message sent to {receiver}")),
                );
            }
            Err(err) => {
                warn!(sender = %sender, receiver = %receiver, error = %err, "send failed");
                self.view
                    .set_badge(Panel::Send, Badge::Error(err.surface_message()));
            }
        }
    }

    /// Fetches and renders the inbox. Each message's key request and decrypt
    /// complete before the next message's begin, and a failure marks only its
    /// own card.
    pub async fn check_inbox(&mut self, user: &str) {
        let user = ClientId::from(user);
        self.view.set_badge(
            Panel::Inbox,
            Badge::Busy(format!("fetching inbox for {user}")),
        );
        let messages = match self.client.inbox(&user).await {
            Ok(messages) => messages,
            Err(err) => {
                self.view
                    .set_badge(Panel::Inbox, Badge::Error(err.surface_message()));
                return;
            }
        };

        if messages.is_empty() {
            self.view.render_inbox_empty();
            self.view.set_badge(
                Panel::Inbox,
                Badge::Success(format!("no messages for {user}")),
            );
            return;
        }

        let mut cards = Vec::with_capacity(messages.len());
        for message in &messages {
            let body = match self.decrypt_message_body(&user, message).await {
                Ok(plaintext) => CardBody::Plaintext(plaintext),
                Err(err) => {
                    warn!(sender = %message.from, error = %err, "inbox message failed to decrypt");
                    CardBody::DecryptFailed(err.surface_message())
                }
            };
            cards.push(MessageCard {
                id: message.id.clone(),
                sender: message.from.clone(),
                status: message.status,
                sent_at: format_timestamp(message),
                ciphertext: message.ciphertext.clone(),
                body,
            });
        }
        self.view.render_inbox(&cards);
        self.view.set_badge(
            Panel::Inbox,
            Badge::Success(format!("{} message(s) for {user}", cards.len())),
        );
    }

    /// Wipes the relay's message store.
    pub async fn clear_messages(&mut self) {
        self.view.set_badge(
            Panel::Inbox,
            Badge::Busy("clearing all messages".to_string()),
        );
        match self.client.clear_messages().await {
            Ok(()) => {
                self.view.set_badge(
                    Panel::Inbox,
                    Badge::Success("all messages deleted".to_string()),
                );
            }
            Err(err) => {
                self.view
                    .set_badge(Panel::Inbox, Badge::Error(err.surface_message()));
            }
        }
    }

    async fn decrypt_message_body(
        &self,
        user: &ClientId,
        message: &InboxMessage,
    ) -> Result<String, ClientError> {
        let key = self.client.shared_key(user, &message.from).await?;
        let decrypted = self
            .client
            .decrypt(&key.shared_key, &message.ciphertext)
            .await?;
        Ok(decrypted.plaintext)
    }
}

fn format_timestamp(message: &InboxMessage) -> String {
    match message.sent_at() {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => format!("@{}", message.timestamp),
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
