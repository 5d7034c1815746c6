//! WebSocket authentication — validates the JWT supplied at handshake time.

use std::sync::Arc;

use uuid::Uuid;

use playroom_auth::jwt::JwtDecoder;
use playroom_core::error::AppError;

/// Identity extracted from a verified handshake token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub user_id: Uuid,
    /// Username.
    pub username: String,
}

/// Authenticates WebSocket connections using JWT tokens.
#[derive(Clone)]
pub struct WsAuthenticator {
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticates a connection using the token from the handshake query.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let claims = self.decoder.decode_access_token(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.user_id(),
            username: claims.username,
        })
    }
}
