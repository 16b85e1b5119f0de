/**
 * Capability credentials: signed, time-bounded
 *  envelopes that carry an object's decryption key.
 */
pub mod capability;
/**
 * Cryptographic types and operations.
 *  - Per-object AES-256-GCM secrets
 *  - Credential signing secret
 */
pub mod crypto;
/**
 * The custody use-case layer and the repository
 *  seam it persists object records through.
 */
pub mod custody;
/**
 * In-process harness for exercising custody
 *  flows in tests.
 */
pub mod testkit;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::capability::{Capability, CapabilityAuthority, CapabilityError};
    pub use crate::crypto::{Secret, SigningSecret};
    pub use crate::custody::{Custody, CustodyError, ObjectMetadata, ObjectRepository};
    pub use crate::version::build_info;
}
