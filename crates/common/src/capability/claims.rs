use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::crypto::Secret;

use super::CapabilityError;

/// Claims carried inside a credential, exactly as serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityClaims {
    pub file_id: String,
    /// Standard base64 of the 32-byte object key
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// A verified credential with its key decoded
#[derive(Debug, Clone)]
pub struct Capability {
    pub file_id: String,
    pub secret: Secret,
    pub user_id: Option<String>,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl CapabilityClaims {
    pub(crate) fn new(
        file_id: &str,
        secret: &Secret,
        user_id: Option<&str>,
        issued_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            file_id: file_id.to_string(),
            key: STANDARD.encode(secret.bytes()),
            user_id: user_id.map(str::to_string),
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        }
    }

    pub(crate) fn into_capability(self) -> Result<Capability, CapabilityError> {
        if self.file_id.is_empty() {
            return Err(CapabilityError::Malformed("empty file_id claim".to_string()));
        }

        let mut key = STANDARD
            .decode(&self.key)
            .map_err(|e| CapabilityError::Malformed(format!("key claim: {}", e)))?;
        let secret = Secret::from_slice(&key)
            .map_err(|e| CapabilityError::Malformed(format!("key claim: {}", e)));
        zeroize::Zeroize::zeroize(&mut key);

        let issued_at = timestamp(self.iat, "iat")?;
        let expires_at = timestamp(self.exp, "exp")?;

        Ok(Capability {
            file_id: self.file_id,
            secret: secret?,
            user_id: self.user_id,
            issued_at,
            expires_at,
        })
    }
}

fn timestamp(value: i64, claim: &str) -> Result<OffsetDateTime, CapabilityError> {
    OffsetDateTime::from_unix_timestamp(value)
        .map_err(|e| CapabilityError::Malformed(format!("{} claim: {}", claim, e)))
}
