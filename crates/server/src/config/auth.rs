use secrecy::SecretString;
use serde::Deserialize;

/// Token issuing settings.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing session tokens.
    ///
    /// If not set, a random secret is generated on startup (tokens will not
    /// survive server restarts).
    pub jwt_secret: Option<SecretString>,
    /// Token lifetime in seconds.
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_seconds: u64,
    /// Mark the session cookie `Secure`.
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expiry_seconds: default_jwt_expiry(),
            cookie_secure: false,
        }
    }
}

fn default_jwt_expiry() -> u64 {
    72 * 60 * 60
}
