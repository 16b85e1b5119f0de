//! Capability credentials
//!
//! A capability credential is a compact, HMAC-signed token binding an object
//! identifier to the object's decryption key (and optionally its owner). It is
//! both proof of authorization and the only place the key lives once an
//! upload completes.
//!
//! Wire form: `base64url(header) "." base64url(claims) "." base64url(hmac)`,
//! unpadded, with header `{"alg":"HS256","typ":"JWT"}`. The algorithm named
//! in the header is checked against an allow-list before the signature is.

mod authority;
mod claims;
mod error;

pub use authority::{CapabilityAuthority, ALLOWED_ALGORITHMS};
pub use claims::{Capability, CapabilityClaims};
pub use error::CapabilityError;
