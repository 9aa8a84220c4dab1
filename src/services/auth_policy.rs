use rocket::request::{FromRequest, Outcome, Request};

use crate::services::firebase_auth::{AuthenticatedUser, AuthError};

/// Who may hit the mutation routes. `Open` reproduces the historical
/// behavior: POST/PATCH/DELETE are unauthenticated. `Strict` requires the
/// same verified identity the bids listing requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    #[default]
    Open,
    Strict,
}

/// Guard that mutation handlers declare instead of carrying authorization
/// logic themselves. Swapping the policy is a configuration change; the
/// handlers do not change.
pub struct MutationGate;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for MutationGate {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let policy = request
            .rocket()
            .state::<AuthPolicy>()
            .copied()
            .unwrap_or_default();

        match policy {
            AuthPolicy::Open => Outcome::Success(MutationGate),
            AuthPolicy::Strict => match AuthenticatedUser::from_request(request).await {
                Outcome::Success(_) => Outcome::Success(MutationGate),
                Outcome::Error((status, e)) => Outcome::Error((status, e)),
                Outcome::Forward(status) => Outcome::Forward(status),
            },
        }
    }
}
