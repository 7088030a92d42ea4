use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ClientId, MessageStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub client_id: ClientId,
}

/// Registration info echoed back by the relay. Everything beyond the id is
/// display-only material the relay chooses to attach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterReceipt {
    pub client_id: ClientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_term_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedKeyRequest {
    pub client_a: ClientId,
    pub client_b: ClientId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedKeyResponse {
    pub shared_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    pub key: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    pub ciphertext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRequest {
    pub key: String,
    pub ciphertext: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub plaintext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub sender: ClientId,
    pub receiver: ClientId,
    pub ciphertext: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub from: ClientId,
    pub ciphertext: String,
    pub status: MessageStatus,
    /// Unix seconds; the relay emits a float with sub-second precision.
    pub timestamp: f64,
}

impl InboxMessage {
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        if !self.timestamp.is_finite() {
            return None;
        }
        let secs = self.timestamp.trunc() as i64;
        let nanos = (self.timestamp.fract().abs() * 1e9).min(999_999_999.0) as u32;
        DateTime::from_timestamp(secs, nanos)
    }
}
