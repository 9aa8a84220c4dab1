use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::app_config::ServiceAccount;
use crate::jwt::claims::IdTokenClaims;

/// Google publishes the secure-token signing keys here and rotates them;
/// the `Cache-Control: max-age` on the response says how long they are good.
const SECURE_TOKEN_JWK_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_KEY_TTL_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or malformed Authorization header")]
    MissingCredential,
    #[error("token header carries no key id")]
    MissingKeyId,
    #[error("no signing key published for kid {0}")]
    UnknownKeyId(String),
    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(#[from] reqwest::Error),
    #[error("token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token carries no email claim")]
    MissingEmailClaim,
    #[error("token verifier is not managed by this rocket")]
    Unconfigured,
}

/// Verifies Firebase ID tokens against Google's published RS256 keys.
///
/// Keys are cached in-process and refetched once their max-age passes or an
/// unseen kid shows up. Every failure mode collapses to 401 at the HTTP
/// boundary; callers never learn whether the token was bad or Google was
/// unreachable.
pub struct FirebaseAuth {
    project_id: String,
    issuer: String,
    http: reqwest::Client,
    keys: RwLock<KeyCache>,
}

#[derive(Default)]
struct KeyCache {
    keys: HashMap<String, DecodingKey>,
    expires_at: Option<DateTime<Utc>>,
}

impl KeyCache {
    fn is_fresh(&self) -> bool {
        matches!(self.expires_at, Some(at) if Utc::now() < at)
    }
}

impl FirebaseAuth {
    pub fn new(service_account: &ServiceAccount) -> Self {
        FirebaseAuth {
            issuer: format!(
                "https://securetoken.google.com/{}",
                service_account.project_id
            ),
            project_id: service_account.project_id.clone(),
            http: reqwest::Client::new(),
            keys: RwLock::new(KeyCache::default()),
        }
    }

    pub async fn verify_id_token(&self, token: &str) -> Result<IdTokenClaims, AuthError> {
        let header = decode_header(token)?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = self.signing_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);

        let token_data = decode::<IdTokenClaims>(token, &key, &validation)?;
        Ok(token_data.claims)
    }

    async fn signing_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.keys.read().await;
            if cache.is_fresh() {
                if let Some(key) = cache.keys.get(kid) {
                    return Ok(key.clone());
                }
            }
        }

        let mut cache = self.keys.write().await;
        if !cache.is_fresh() || !cache.keys.contains_key(kid) {
            let (keys, ttl) = self.fetch_keys().await?;
            cache.keys = keys;
            cache.expires_at = Some(Utc::now() + Duration::seconds(ttl));
        }
        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKeyId(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<(HashMap<String, DecodingKey>, i64), AuthError> {
        let response = self
            .http
            .get(SECURE_TOKEN_JWK_URL)
            .send()
            .await?
            .error_for_status()?;
        let ttl = cache_max_age(response.headers()).unwrap_or(DEFAULT_KEY_TTL_SECS);

        let jwks: JwkSet = response.json().await?;
        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(e) => tracing::warn!(kid = %jwk.kid, "skipping unusable signing key: {e}"),
            }
        }
        tracing::debug!(count = keys.len(), "refreshed Firebase signing keys, ttl {ttl}s");
        Ok((keys, ttl))
    }
}

#[derive(serde::Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(serde::Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

fn cache_max_age(headers: &reqwest::header::HeaderMap) -> Option<i64> {
    let value = headers
        .get(reqwest::header::CACHE_CONTROL)?
        .to_str()
        .ok()?;
    value
        .split(',')
        .find_map(|directive| directive.trim().strip_prefix("max-age=")?.parse().ok())
}

/// `<scheme> <token>`: the scheme is ignored, the second token wins.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.split_whitespace().nth(1)
}

/// The verified identity attached to a request. Guard failure surfaces as a
/// 401 through the catcher.
pub struct AuthenticatedUser {
    pub email: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(verifier) = request.rocket().state::<FirebaseAuth>() else {
            return Outcome::Error((Status::InternalServerError, AuthError::Unconfigured));
        };
        let Some(header) = request.headers().get_one("Authorization") else {
            return Outcome::Error((Status::Unauthorized, AuthError::MissingCredential));
        };
        let Some(token) = bearer_token(header) else {
            return Outcome::Error((Status::Unauthorized, AuthError::MissingCredential));
        };

        match verifier.verify_id_token(token).await {
            Ok(claims) => match claims.email {
                Some(email) => Outcome::Success(AuthenticatedUser { email }),
                None => Outcome::Error((Status::Unauthorized, AuthError::MissingEmailClaim)),
            },
            Err(e) => {
                tracing::debug!("rejected bearer token: {e}");
                Outcome::Error((Status::Unauthorized, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn verifier() -> FirebaseAuth {
        FirebaseAuth::new(&ServiceAccount {
            project_id: "smart-deals".to_string(),
            client_email: "firebase-adminsdk@smart-deals.iam.gserviceaccount.com".to_string(),
            private_key_id: None,
        })
    }

    #[test]
    fn bearer_token_takes_the_second_word() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("Bearer   abc123"), Some("abc123"));
        assert_eq!(bearer_token("abc123"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn cache_max_age_reads_the_directive() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CACHE_CONTROL,
            "public, max-age=19302, must-revalidate, no-transform"
                .parse()
                .unwrap(),
        );
        assert_eq!(cache_max_age(&headers), Some(19302));

        let empty = reqwest::header::HeaderMap::new();
        assert_eq!(cache_max_age(&empty), None);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_without_a_key_fetch() {
        let err = verifier().verify_id_token("garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn token_without_kid_is_rejected_offline() {
        // {"alg":"RS256","typ":"JWT"} . {"sub":"abc"} . "sig"
        let token = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiJhYmMifQ.c2ln";
        let err = verifier().verify_id_token(token).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingKeyId));
    }

    #[test]
    fn empty_cache_is_stale() {
        assert!(!KeyCache::default().is_fresh());
    }
}
