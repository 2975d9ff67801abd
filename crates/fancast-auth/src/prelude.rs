pub use crate::identity::{IdentityConfig, IdentityToolkitVerifier};
pub use crate::verifier::{IdentityVerifier, StaticVerifier, VerifiedUser};
