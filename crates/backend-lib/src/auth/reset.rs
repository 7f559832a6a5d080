// ============================
// backend-lib/src/auth/reset.rs
// ============================
//! Password-reset tokens: random, single-use, short-lived.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

/// Token size in bytes (32 bytes = 256 bits of entropy)
const RESET_TOKEN_BYTES: usize = 32;

/// A pending password-reset token stored on the user record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    /// Whether the token is still within its validity window
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Generate a cryptographically secure reset token.
///
/// Uses OS-provided entropy, base64 URL-safe encoded without padding so it
/// can ride in a query string.
pub fn generate_reset_token() -> String {
    let mut buffer = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_generation() {
        let token1 = generate_reset_token();
        let token2 = generate_reset_token();

        assert_ne!(token1, token2);

        // 32 bytes of entropy encoded in base64, should be about 43-44 chars
        assert!(token1.len() >= 42);
    }

    #[test]
    fn test_token_validity_window() {
        let now = Utc::now();
        let token = ResetToken {
            token: generate_reset_token(),
            expires_at: now + Duration::hours(1),
        };
        assert!(token.is_valid(now));
        assert!(!token.is_valid(now + Duration::hours(2)));
    }
}
