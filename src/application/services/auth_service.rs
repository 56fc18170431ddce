//! Owner identity tokens.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// An authenticated owner identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: String,
    /// True when the identity was issued for this request, so the caller has
    /// never created anything yet.
    pub is_new: bool,
}

/// Issues and verifies signed owner tokens.
///
/// A token is `"{owner_id}.{mac}"` where `mac` is the hex HMAC-SHA256 of the
/// owner id keyed by `signing_secret`. Tokens cannot be forged without the
/// server-side secret.
#[derive(Clone)]
pub struct AuthService {
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `signing_secret` - HMAC key; must match the value used when tokens were issued
    pub fn new(signing_secret: String) -> Self {
        Self { signing_secret }
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length, including empty ones.
        match HmacSha256::new_from_slice(self.signing_secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC accepts any key length"),
        }
    }

    /// Signs `owner_id` and returns the full token.
    pub fn sign(&self, owner_id: &str) -> String {
        let mut mac = self.mac();
        mac.update(owner_id.as_bytes());
        format!("{}.{}", owner_id, hex::encode(mac.finalize().into_bytes()))
    }

    /// Generates a fresh owner id and its token.
    pub fn issue(&self) -> (Owner, String) {
        let id = hex::encode(rand::random::<[u8; 16]>());
        let token = self.sign(&id);
        (Owner { id, is_new: true }, token)
    }

    /// Returns the owner id carried by a valid token.
    ///
    /// Returns `None` for malformed tokens or a signature mismatch.
    pub fn verify(&self, token: &str) -> Option<String> {
        let (owner_id, signature) = token.rsplit_once('.')?;
        if owner_id.is_empty() {
            return None;
        }

        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac();
        mac.update(owner_id.as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(owner_id.to_string())
    }
}
