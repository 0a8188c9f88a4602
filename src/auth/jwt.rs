use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{auth::claims::Claims, config::JwtConfig, state::AppState};

/// Access/refresh pair handed out on register and login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signing and verification keys for both token families.
///
/// Access and refresh tokens are signed with distinct secrets, so a token
/// presented to the wrong verifier fails on signature alone. Tokens are not
/// persisted anywhere: validity is purely signature plus expiry, and there is
/// no revocation list or rotation.
#[derive(Clone)]
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

impl TokenKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(cfg.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(cfg.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(cfg.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(cfg.refresh_secret.as_bytes()),
            access_ttl: Duration::minutes(cfg.access_ttl_minutes),
            refresh_ttl: Duration::days(cfg.refresh_ttl_days),
        }
    }

    fn sign(&self, user_id: Uuid, key: &EncodingKey, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: (now + ttl).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, key)?;
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        let token = self.sign(user_id, &self.access_encoding, self.access_ttl)?;
        debug!(user_id = %user_id, "access token signed");
        Ok(token)
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        let token = self.sign(user_id, &self.refresh_encoding, self.refresh_ttl)?;
        debug!(user_id = %user_id, "refresh token signed");
        Ok(token)
    }

    /// Issue a fresh access/refresh pair for the user.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.sign_access(user_id)?,
            refresh_token: self.sign_refresh(user_id)?,
        })
    }

    fn verify(&self, token: &str, key: &DecodingKey) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, key, &Validation::default())?;
        Ok(data.claims)
    }

    /// Fails on bad signature, expiry, or malformed input.
    pub fn verify_access(&self, token: &str) -> anyhow::Result<Claims> {
        self.verify(token, &self.access_decoding)
    }

    /// Same contract against the refresh secret.
    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        self.verify(token, &self.refresh_decoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &str = "access-test-secret";
    const REFRESH_SECRET: &str = "refresh-test-secret";

    fn make_keys() -> TokenKeys {
        TokenKeys::new(&JwtConfig {
            access_secret: ACCESS_SECRET.into(),
            refresh_secret: REFRESH_SECRET.into(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
        })
    }

    #[test]
    fn sign_and_verify_access_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).expect("sign access");
        let claims = keys.verify_access(&token).expect("verify access");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn sign_and_verify_refresh_token() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_refresh(user_id).expect("sign refresh");
        let claims = keys.verify_refresh(&token).expect("verify refresh");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn issue_produces_independently_signed_pair() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let pair = keys.issue(user_id).expect("issue pair");
        assert_ne!(pair.access_token, pair.refresh_token);
        assert!(keys.verify_access(&pair.access_token).is_ok());
        assert!(keys.verify_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        let keys = make_keys();
        let token = keys.sign_access(Uuid::new_v4()).expect("sign access");
        assert!(keys.verify_refresh(&token).is_err());
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let keys = make_keys();
        let token = keys.sign_refresh(Uuid::new_v4()).expect("sign refresh");
        assert!(keys.verify_access(&token).is_err());
    }

    #[test]
    fn garbled_token_is_rejected() {
        let keys = make_keys();
        assert!(keys.verify_access("not-a-token").is_err());
        assert!(keys.verify_refresh("").is_err());
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        // Far enough in the past to clear jsonwebtoken's default leeway.
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (now - Duration::minutes(30)).unix_timestamp() as usize,
            exp: (now - Duration::minutes(15)).unix_timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .expect("encode expired");
        assert!(keys.verify_access(&token).is_err());
    }

    #[test]
    fn refresh_token_mints_many_access_tokens() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let refresh = keys.sign_refresh(user_id).expect("sign refresh");
        // No server-side state: every exchange against a live refresh token
        // succeeds.
        for _ in 0..3 {
            let claims = keys.verify_refresh(&refresh).expect("refresh still valid");
            let access = keys.sign_access(claims.sub).expect("mint access");
            assert_eq!(keys.verify_access(&access).expect("verify").sub, user_id);
        }
    }
}
