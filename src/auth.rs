//! Access-key authentication and credential helpers

use log::debug;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::records::User;
use crate::store::Store;

/// Resolves an access key to the user it belongs to
pub trait AuthVerifier: Send + Sync {
    fn verify(&self, access_key: &str) -> Result<User>;
}

/// Verifier backed by the access keys stored on user records
pub struct StoreAuthVerifier {
    store: Arc<dyn Store>,
}

impl StoreAuthVerifier {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl AuthVerifier for StoreAuthVerifier {
    fn verify(&self, access_key: &str) -> Result<User> {
        match self.store.find_user_by_access_key(access_key)? {
            Some(user) if user.is_active => Ok(user),
            Some(user) => {
                debug!("Rejected access key of inactive user {}", user.id);
                Err(Error::Unauthorized("Invalid access key".to_string()))
            }
            None => Err(Error::Unauthorized("Invalid access key".to_string())),
        }
    }
}

/// Extract the access key from an `Authorization` header value.
///
/// Accepts both `Bearer <key>` and the bare key. Returns `None` when empty.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// New random access key: 32 bytes, hex encoded
pub fn generate_access_key() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// Salted SHA-256 digest in the form `<salt>$<digest>`
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);
    let salt = to_hex(&salt);
    let digest = salted_digest(&salt, password);
    format!("{}${}", salt, digest)
}

/// Check a password against a value produced by [`hash_password`]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    let candidate = salted_digest(salt, password);

    // Compare every byte regardless of where the first mismatch is
    candidate.len() == digest.len()
        && candidate
            .bytes()
            .zip(digest.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"$");
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::NewUser;
    use crate::store::MemoryStore;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("abc123"), Some("abc123"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn test_access_key_shape() {
        let key = generate_access_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(key, generate_access_key());
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let stored = hash_password("s3cret");
        assert!(verify_password("s3cret", &stored));
        assert!(!verify_password("S3cret", &stored));
        assert!(!verify_password("s3cret", "garbage"));

        // Salted: same password hashes differently
        assert_ne!(stored, hash_password("s3cret"));
    }

    #[test]
    fn test_store_verifier() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let user = store
            .insert_user(NewUser {
                username: "ana".into(),
                email: "ana@example.com".into(),
                password: hash_password("pw"),
                access_key: "key-ana".into(),
            })
            .unwrap();

        let verifier = StoreAuthVerifier::new(store.clone());
        assert_eq!(verifier.verify("key-ana").unwrap().id, user.id);
        assert!(matches!(verifier.verify("key-other"), Err(Error::Unauthorized(_))));

        let mut inactive = user;
        inactive.is_active = false;
        store.update_user(inactive).unwrap();
        assert!(matches!(verifier.verify("key-ana"), Err(Error::Unauthorized(_))));
    }
}
