use actix_web::{dev::Payload, web, Error as ActixWebError};
use actix_web::{error::ErrorUnauthorized, http, FromRequest, HttpRequest};
use core::fmt;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::core::{AppConfig, AppError};
use crate::models::users::Role;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::to_string(&self).unwrap())
    }
}

/// The per-request session: who is calling, as which role, attached where
/// in the org tree. Issued at login, carried in the Authorization header,
/// dropped by the client on logout.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String, // user ID
    pub username: String,
    pub role: String,
    pub team_id: Option<i32>,
    pub department_id: Option<i32>,
    pub exp: usize, // expiration time
}

impl SessionClaims {
    pub fn user_id(&self) -> Result<i32, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    /// Unknown role strings degrade to the least-privileged role.
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }
}

pub fn generate_session_token(
    claims: &SessionClaims,
    config: &AppConfig,
) -> Result<String, AppError> {
    let header = Header::default();
    let encoding_key =
        EncodingKey::from_secret(config.jwt_auth_config.secret.expose_secret().as_ref());

    encode(&header, claims, &encoding_key)
        .map_err(|_| AppError::internal_error("Failed to generate session token"))
}

impl FromRequest for SessionClaims {
    type Error = ActixWebError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|value| value.to_string());

        let token = match token {
            Some(token) => token,
            None => {
                let error = ErrorResponse {
                    message: "No authentication token found".to_string(),
                    success: false,
                };
                return ready(Err(ErrorUnauthorized(error)));
            }
        };

        let config = match req.app_data::<web::Data<AppConfig>>() {
            Some(config) => config,
            None => {
                let error = ErrorResponse {
                    message: "Server configuration unavailable".to_string(),
                    success: false,
                };
                return ready(Err(ErrorUnauthorized(error)));
            }
        };

        let decoding_key =
            DecodingKey::from_secret(config.jwt_auth_config.secret.expose_secret().as_ref());

        match decode::<SessionClaims>(&token, &decoding_key, &Validation::default()) {
            Ok(data) => ready(Ok(data.claims)),
            Err(_) => {
                let error = ErrorResponse {
                    message: "Invalid token".to_string(),
                    success: false,
                };
                ready(Err(ErrorUnauthorized(error)))
            }
        }
    }
}
