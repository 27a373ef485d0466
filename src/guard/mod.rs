use std::collections::HashMap;

use rocket::async_trait;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header. Include 'Authorization: Bearer <token>' in your request.")]
    Missing,
    #[error("Authorization header must be in the format 'Bearer <token>'.")]
    Malformed,
    #[error("Invalid authentication token. Please sign in again.")]
    Invalid,
    #[error("Authentication is not configured on this server.")]
    NotConfigured,
}

/// Resolves an opaque bearer credential to the stable id of the user it belongs to.
/// Implementations must not do any per-folder checks; ownership is enforced by the folder service
pub trait IdentityResolver: Send + Sync {
    fn resolve_identity(&self, credential: &str) -> Result<String, AuthError>;
}

/// resolves bearer tokens against a table of sha256 token digests, so plain tokens never need to be stored
pub struct HashedTokenResolver {
    /// hex sha256 digest of a token -> user id
    tokens: HashMap<String, String>,
}

impl HashedTokenResolver {
    pub fn new(tokens: HashMap<String, String>) -> HashedTokenResolver {
        let tokens = tokens
            .into_iter()
            .map(|(digest, user_id)| (digest.to_lowercase(), user_id))
            .collect();
        HashedTokenResolver { tokens }
    }

    /// builds a resolver from plain `(token, user_id)` pairs
    pub fn from_plain_tokens<'a>(
        tokens: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> HashedTokenResolver {
        HashedTokenResolver::new(
            tokens
                .into_iter()
                .map(|(token, user_id)| (hash_token(token), user_id.to_string()))
                .collect(),
        )
    }
}

impl IdentityResolver for HashedTokenResolver {
    fn resolve_identity(&self, credential: &str) -> Result<String, AuthError> {
        self.tokens
            .get(&hash_token(credential))
            .cloned()
            .ok_or(AuthError::Invalid)
    }
}

/// hex encoded sha256 digest of `token`
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// pulls the token out of an `Authorization: Bearer <token>` header value
fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    match header.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() && !token.trim().contains(' ') => {
            Ok(token.trim())
        }
        _ => Err(AuthError::Malformed),
    }
}

/// request guard for the id of the signed-in user. The resolver is looked up in managed state,
/// and is called exactly once per request
#[derive(Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

#[async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(header) = request.headers().get_one("Authorization") else {
            return Outcome::Error((Status::Unauthorized, AuthError::Missing));
        };
        let token = match parse_bearer(header) {
            Ok(token) => token,
            Err(e) => return Outcome::Error((Status::Unauthorized, e)),
        };
        let Some(resolver) = request.rocket().state::<Box<dyn IdentityResolver>>() else {
            log::error!("No identity resolver is managed by rocket!");
            return Outcome::Error((Status::InternalServerError, AuthError::NotConfigured));
        };
        match resolver.resolve_identity(token) {
            Ok(user_id) => Outcome::Success(AuthenticatedUser { user_id }),
            Err(e) => {
                log::warn!("Rejected bearer token: {e}");
                Outcome::Error((Status::Unauthorized, e))
            }
        }
    }
}
