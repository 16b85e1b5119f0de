use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use time::OffsetDateTime;

use crate::crypto::{Secret, SigningSecret};

use super::claims::{Capability, CapabilityClaims};
use super::CapabilityError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// Header algorithms a credential may name. Anything else, `none` included,
/// is rejected before the signature is looked at.
pub const ALLOWED_ALGORITHMS: &[&str] = &[ALGORITHM];

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Mints and verifies capability credentials under one signing secret.
#[derive(Clone)]
pub struct CapabilityAuthority {
    secret: Arc<SigningSecret>,
    ttl: Duration,
}

impl fmt::Debug for CapabilityAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityAuthority")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CapabilityAuthority {
    /// # Errors
    ///
    /// Rejects a TTL shorter than one second.
    pub fn new(secret: SigningSecret, ttl: Duration) -> Result<Self, CapabilityError> {
        if ttl.as_secs() == 0 {
            return Err(CapabilityError::InvalidInput(
                "credential ttl must be at least one second".to_string(),
            ));
        }
        Ok(Self {
            secret: Arc::new(secret),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }

    /// Sign a credential for `file_id` carrying `key`, valid for the configured TTL.
    pub fn issue(
        &self,
        file_id: &str,
        key: &Secret,
        user_id: Option<&str>,
    ) -> Result<String, CapabilityError> {
        self.issue_at(file_id, key, user_id, OffsetDateTime::now_utc())
    }

    pub fn issue_at(
        &self,
        file_id: &str,
        key: &Secret,
        user_id: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<String, CapabilityError> {
        if file_id.is_empty() {
            return Err(CapabilityError::InvalidInput(
                "file_id must not be empty".to_string(),
            ));
        }

        let ttl = time::Duration::try_from(self.ttl)
            .map_err(|e| CapabilityError::InvalidInput(format!("ttl out of range: {}", e)))?;
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| CapabilityError::InvalidInput("ttl out of range".to_string()))?;

        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        };
        let claims = CapabilityClaims::new(file_id, key, user_id, now, expires_at);

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let signature = self.sign(signing_input.as_bytes())?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify a credential against the current time.
    pub fn verify(&self, token: &str) -> Result<Capability, CapabilityError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Verify a credential as of `now`.
    ///
    /// Checks run in order: token shape, header algorithm, signature, claims,
    /// expiry. A credential is expired once `now >= exp`.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Capability, CapabilityError> {
        let mut segments = token.split('.');
        let (header_b64, claims_b64, signature_b64) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(c), Some(s), None) if !h.is_empty() && !c.is_empty() => (h, c, s),
                _ => {
                    return Err(CapabilityError::Malformed(
                        "expected three dot-separated segments".to_string(),
                    ))
                }
            };

        let header: Header = decode_segment(header_b64, "header")?;
        if !ALLOWED_ALGORITHMS.contains(&header.alg.as_str()) {
            return Err(CapabilityError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| CapabilityError::Malformed(format!("signature: {}", e)))?;
        let signing_input_len = header_b64.len() + 1 + claims_b64.len();
        let mut mac = self.mac()?;
        mac.update(&token.as_bytes()[..signing_input_len]);
        mac.verify_slice(&signature)
            .map_err(|_| CapabilityError::InvalidSignature)?;

        let claims: CapabilityClaims = decode_segment(claims_b64, "claims")?;
        if now.unix_timestamp() >= claims.exp {
            return Err(CapabilityError::Expired);
        }

        claims.into_capability()
    }

    fn mac(&self) -> Result<HmacSha256, CapabilityError> {
        HmacSha256::new_from_slice(self.secret.bytes())
            .map_err(|e| CapabilityError::InvalidInput(format!("signing secret: {}", e)))
    }

    fn sign(&self, input: &[u8]) -> Result<Vec<u8>, CapabilityError> {
        let mut mac = self.mac()?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(
    segment: &str,
    what: &str,
) -> Result<T, CapabilityError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| CapabilityError::Malformed(format!("{}: {}", what, e)))?;
    serde_json::from_slice(&bytes).map_err(|e| CapabilityError::Malformed(format!("{}: {}", what, e)))
}
