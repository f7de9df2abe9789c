//! Password hashing and session tokens.
//!
//! Password hashes are stored as `sha256$<iterations>$<salt>$<digest>` with
//! hex-encoded salt and digest, so the iteration count can be raised later
//! without invalidating existing hashes.
//!
//! Session tokens are 32 random bytes handed to the client once. The store
//! only ever sees [`token_digest`], a SHA-256 over the server secret and
//! the token.

use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LENGTH: usize = 16;
const TOKEN_LENGTH: usize = 32;

/// Salted, iterated SHA-256 password hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    /// A zero iteration count is treated as one.
    #[must_use]
    pub const fn new(iterations: u32) -> Self {
        Self {
            iterations: if iterations == 0 { 1 } else { iterations },
        }
    }

    #[must_use]
    pub const fn iterations(self) -> u32 {
        self.iterations
    }

    /// Hashes `password` with a fresh random salt.
    #[must_use]
    pub fn hash(self, password: &str) -> String {
        let salt: [u8; SALT_LENGTH] = rand::random();
        let digest = stretch(self.iterations, &salt, password);
        format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(digest)
        )
    }

    /// Checks `password` against a stored hash.
    ///
    /// The iteration count recorded in the hash is used, not the hasher's
    /// own. Malformed hashes never verify.
    #[must_use]
    pub fn verify(self, password: &str, stored: &str) -> bool {
        let mut parts = stored.splitn(4, '$');
        let (Some(SCHEME), Some(iterations), Some(salt), Some(expected)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        let Ok(iterations) = iterations.parse::<u32>() else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
            return false;
        };
        if iterations == 0 {
            return false;
        }

        constant_time_eq(&stretch(iterations, &salt, password), &expected)
    }
}

fn stretch(iterations: u32, salt: &[u8], password: &str) -> [u8; 32] {
    let mut digest: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize()
        .into();
    for _ in 1..iterations {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt)
            .finalize()
            .into();
    }
    digest
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0_u8, |difference, (a, b)| difference | (a ^ b))
            == 0
}

/// Generates a new hex-encoded session token.
#[must_use]
pub fn generate_session_token() -> String {
    let bytes: [u8; TOKEN_LENGTH] = rand::random();
    hex::encode(bytes)
}

/// Keyed digest under which a session token is stored.
#[must_use]
pub fn token_digest(secret_key: &str, token: &str) -> String {
    let digest = Sha256::new()
        .chain_update(secret_key.as_bytes())
        .chain_update([0_u8])
        .chain_update(token.as_bytes())
        .finalize();
    hex::encode(digest)
}
