use crate::core::{AppError, AppState};
use crate::entities::{CurrentUser, UserRole};
use axum::extract::{Query, State};
use axum::{Error, body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// claims issued by the identity provider; trusted once the signature checks out
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

#[instrument(skip(secret), fields(user_id = %user_id, role = ?role))]
pub fn encode_jwt(user_id: &str, role: UserRole, secret: &str) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let expire: chrono::TimeDelta = Duration::hours(24);
    let exp: usize = (now + expire).timestamp() as usize;
    let iat: usize = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        id: user_id.to_string(),
        role,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Pulls the bearer token from the Authorization header, falling back to a
/// `token` query parameter for WebSocket clients that cannot set headers.
fn extract_token(req: &Request) -> Result<Option<String>, AppError> {
    if let Some(header) = req.headers().get(http::header::AUTHORIZATION) {
        let header = header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::forbidden("Empty header is not allowed")
        })?;
        let mut parts = header.split_whitespace();
        return match (parts.next(), parts.next()) {
            (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => {
                Ok(Some(token.to_string()))
            }
            _ => {
                warn!("Authorization header is not a bearer token");
                Err(AppError::unauthorized("Unable to decode token"))
            }
        };
    }

    let query = Query::<TokenQuery>::try_from_uri(req.uri())
        .map(|Query(q)| q.token)
        .unwrap_or(None);
    Ok(query.filter(|t| !t.is_empty()))
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let token = match extract_token(&req)? {
        Some(token) => token,
        None => {
            warn!("Missing authorization token");
            return Err(AppError::forbidden(
                "Please add the JWT token to the header",
            ));
        }
    };

    let token_data = decode_jwt(&token, &state.jwt_secret)
        .map_err(|_| AppError::unauthorized("Unable to decode token"))?;

    if crate::dtos::validate_participant_id(&token_data.claims.id).is_err() {
        warn!("Token carries a malformed user id");
        return Err(AppError::unauthorized("You are not an authorized user"));
    }

    let current_user = CurrentUser {
        user_id: token_data.claims.id,
        role: token_data.claims.role,
    };
    info!(user_id = %current_user.user_id, role = ?current_user.role, "User authenticated");

    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}
