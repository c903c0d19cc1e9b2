use inkwell_core::{Role, UserProfile};
use inkwell_service::Actor;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// JWT claims embedded in issued session tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub sub: String,
    pub email: String,
    /// Role name.
    pub role: String,
    /// Expiry (seconds since epoch).
    pub exp: usize,
}

/// Issues and validates HS256 session tokens.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: u64,
}

impl JwtManager {
    pub fn new(secret: &SecretString, expiry_seconds: u64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry_seconds,
        }
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.expiry_seconds
    }

    /// Issue a token for a signed-in user. Returns the token and its
    /// lifetime in seconds.
    pub fn issue_token(&self, user: &UserProfile) -> Result<(String, u64), String> {
        #[allow(clippy::cast_possible_truncation)]
        let exp = jsonwebtoken::get_current_timestamp() as usize + self.expiry_seconds as usize;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            exp,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| format!("JWT encoding failed: {e}"))?;
        Ok((token, self.expiry_seconds))
    }

    /// Check signature and expiry and turn the claims into an [`Actor`].
    pub fn validate_token(&self, token: &str) -> Result<Actor, String> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| format!("invalid token: {e}"))?;

        let claims = token_data.claims;
        let role = Role::from_str_loose(&claims.role)
            .ok_or_else(|| format!("invalid role in token: {}", claims.role))?;

        Ok(Actor::new(claims.sub, role))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use inkwell_core::AccountStatus;

    use super::*;

    fn manager(secret: &str) -> JwtManager {
        JwtManager::new(&SecretString::new(secret.to_owned()), 3600)
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: "42".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            status: AccountStatus::Active,
            role: Role::Premium,
            avatar: String::new(),
            avatar_folder: String::new(),
            avatar_link: None,
            wallet_balance: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_validates_to_actor() {
        let jwt = manager("secret");
        let (token, ttl) = jwt.issue_token(&profile()).unwrap();
        assert_eq!(ttl, 3600);

        let actor = jwt.validate_token(&token).unwrap();
        assert_eq!(actor.id, "42");
        assert_eq!(actor.role, Role::Premium);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let (token, _) = manager("one").issue_token(&profile()).unwrap();
        let err = manager("two").validate_token(&token).unwrap_err();
        assert!(err.starts_with("invalid token"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = manager("secret");
        #[allow(clippy::cast_possible_truncation)]
        let claims = Claims {
            sub: "42".into(),
            email: "ada@example.com".into(),
            role: "basic".into(),
            exp: jsonwebtoken::get_current_timestamp() as usize - 3600,
        };
        let token = encode(&Header::default(), &claims, &jwt.encoding_key).unwrap();
        assert!(jwt.validate_token(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(manager("secret").validate_token("not-a-jwt").is_err());
    }
}
