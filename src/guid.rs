//! Scoped token generation.
//!
//! Tokens are 16 lowercase hex characters drawn from a random `u64`. They are
//! unique-enough for one build's class-name space: collisions are
//! statistically improbable and are not checked for. Tokens are regenerated
//! on every build pass, so generated class names differ between otherwise
//! identical runs.

/// Produce a 16-hex-character token from a random source.
pub fn token() -> String {
    format!("{:016x}", rand::random::<u64>())
}

/// A pod's generated identifier: the pod name suffixed with a fresh token.
pub fn pod_identifier(pod_name: &str) -> String {
    format!("{}-{}", pod_name, token())
}
