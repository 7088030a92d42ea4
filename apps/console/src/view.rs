//! Terminal rendering of the messenger view. Inputs come pre-filled from the
//! command line; outputs go to stdout.

use client_core::{Badge, CardBody, ComposeFields, MessageCard, MessengerView, Panel};
use shared::{
    domain::ClientId,
    protocol::{EncryptResponse, RegisterReceipt, SharedKeyResponse},
};

#[derive(Default)]
pub struct TerminalView {
    pub register_name: String,
    pub key_pair: (String, String),
    pub compose: ComposeFields,
    pub inbox_user: String,
}

fn panel_name(panel: Panel) -> &'static str {
    match panel {
        Panel::Register => "register",
        Panel::SharedKey => "shared-key",
        Panel::Send => "send",
        Panel::Inbox => "inbox",
    }
}

impl MessengerView for TerminalView {
    fn register_name(&self) -> String {
        self.register_name.clone()
    }

    fn key_pair_selection(&self) -> (String, String) {
        self.key_pair.clone()
    }

    fn compose_fields(&self) -> ComposeFields {
        self.compose.clone()
    }

    fn inbox_user(&self) -> String {
        self.inbox_user.clone()
    }

    fn set_badge(&mut self, panel: Panel, badge: Badge) {
        let panel = panel_name(panel);
        match badge {
            Badge::Busy(text) => println!("[{panel}] .. {text}"),
            Badge::Success(text) => println!("[{panel}] ok: {text}"),
            Badge::Error(text) => println!("[{panel}] error: {text}"),
        }
    }

    fn clear_register_name(&mut self) {
        self.register_name.clear();
    }

    fn set_roster(&mut self, roster: &[ClientId]) {
        if roster.is_empty() {
            println!("no registered clients");
            return;
        }
        println!("registered clients:");
        for client in roster {
            println!("  {client}");
        }
    }

    fn show_registration(&mut self, receipt: &RegisterReceipt) {
        if let Some(key) = &receipt.long_term_key {
            println!("long-term key for {}: {key}", receipt.client_id);
        }
        if let Some(derivation) = &receipt.derivation {
            println!("derivation: {derivation}");
        }
    }

    fn show_shared_key(&mut self, response: &SharedKeyResponse) {
        println!("shared key: {}", response.shared_key);
        if let Some(derivation) = &response.derivation {
            println!("derivation: {derivation}");
        }
    }

    fn show_key_preview(&mut self, shared_key: &str) {
        println!("key: {shared_key}");
    }

    fn show_ciphertext_preview(&mut self, encrypted: &EncryptResponse) {
        match &encrypted.algorithm {
            Some(algorithm) => println!("ciphertext ({algorithm}): {}", encrypted.ciphertext),
            None => println!("ciphertext: {}", encrypted.ciphertext),
        }
    }

    fn render_inbox(&mut self, cards: &[MessageCard]) {
        for card in cards {
            if let Some(id) = &card.id {
                println!("ID: {id}");
            }
            println!("Time: {}", card.sent_at);
            println!("From: {}", card.sender);
            println!("Encrypted: {}", card.ciphertext);
            match &card.body {
                CardBody::Plaintext(text) => println!("Decrypted: {text}"),
                CardBody::DecryptFailed(reason) => println!("Decrypted: <failed: {reason}>"),
            }
            println!("Status: {}", card.status);
            println!("{}", "-".repeat(40));
        }
    }

    fn render_inbox_empty(&mut self) {
        println!("inbox is empty");
    }
}
