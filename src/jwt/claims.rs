use serde::{Deserialize, Serialize};

/// Claims of a Firebase ID token. Only the fields the gateway reads;
/// audience, issuer and expiry are enforced during decoding.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub aud: String,
    pub iss: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}
