use crate::core::jwt_auth::{generate_session_token, SessionClaims};
use crate::core::AppConfig;
use crate::core::AppError;
use crate::core::{AppErrorResponse, AppSuccessResponse};
use crate::db::users;
use crate::models::users::{
    AddUserRequest, ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest,
};
use actix_web::{get, post, web, HttpResponse, Result};
use chrono::{Duration, Utc};
use sqlx::PgPool;

/// Shared gate for both provisioning paths. Returns the rejection message
/// so the rule stays checkable without a live pool.
fn provisioning_rejection(password: &str, username_taken: bool) -> Option<&'static str> {
    if password.len() < 6 {
        return Some("Password must be at least 6 characters long");
    }
    if username_taken {
        return Some("A user with this username already exists");
    }
    None
}

#[tracing::instrument(name = "Register User", skip(pool, config, request))]
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    // The activation code is the whole gate: once it matches, the role
    // and org placement in the payload are taken as-is.
    if !config
        .activation_codes
        .matches(request.role, &request.activation_code)
    {
        return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
            success: false,
            message: "The activation code is not valid for this role".to_string(),
        }));
    }

    let username_taken = users::username_exists(&pool, &request.username).await?;
    if let Some(message) = provisioning_rejection(&request.password, username_taken) {
        return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
            success: false,
            message: message.to_string(),
        }));
    }

    let user = users::create_user(
        &pool,
        &users::NewUser {
            username: request.username.clone(),
            full_name: request.full_name.clone(),
            password: request.password.clone(),
            role: request.role,
            member_type: request.member_type.clone(),
            team_id: request.team_id,
            department_id: request.department_id,
        },
    )
    .await?;
    let profile = users::get_profile(&pool, user.id).await?;

    Ok(HttpResponse::Created().json(AppSuccessResponse {
        success: true,
        data: profile,
        message: "User registered successfully".to_string(),
    }))
}

#[tracing::instrument(name = "User Login", skip(pool, config, request))]
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    // Unknown user and wrong password collapse into one rejection so the
    // response does not say which one happened.
    let user = match users::get_user_by_username(&pool, &request.username).await {
        Ok(user) => user,
        Err(_) => {
            return Ok(HttpResponse::Unauthorized().json(AppErrorResponse {
                success: false,
                message: "Username or password is incorrect".to_string(),
            }));
        }
    };

    if !users::verify_password(&request.password, &user.password_hash).await? {
        return Ok(HttpResponse::Unauthorized().json(AppErrorResponse {
            success: false,
            message: "Username or password is incorrect".to_string(),
        }));
    }

    let expires_at = Utc::now() + Duration::hours(config.jwt_auth_config.token_expiration_time);
    let claims = SessionClaims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role: user.role.clone(),
        team_id: user.team_id,
        department_id: user.department_id,
        exp: expires_at.timestamp() as usize,
    };
    let token = generate_session_token(&claims, &config)?;

    let profile = users::get_profile(&pool, user.id).await?;
    let response = LoginResponse {
        user: profile,
        token,
        expires_at,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: response,
        message: "Login successful".to_string(),
    }))
}

#[tracing::instrument(name = "Add User Manually", skip(pool, claims, request))]
#[post("/add")]
pub async fn add_user(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    request: web::Json<AddUserRequest>,
) -> Result<HttpResponse, AppError> {
    if !claims.role().is_manager() {
        return Err(AppError::forbidden_error(
            "Only admins and department heads may provision accounts",
        ));
    }

    let username_taken = users::username_exists(&pool, &request.username).await?;
    if let Some(message) = provisioning_rejection(&request.password, username_taken) {
        return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
            success: false,
            message: message.to_string(),
        }));
    }

    let user = users::create_user(
        &pool,
        &users::NewUser {
            username: request.username.clone(),
            full_name: request.full_name.clone(),
            password: request.password.clone(),
            role: request.role,
            member_type: request.member_type.clone(),
            team_id: request.team_id,
            department_id: request.department_id,
        },
    )
    .await?;
    let profile = users::get_profile(&pool, user.id).await?;

    Ok(HttpResponse::Created().json(AppSuccessResponse {
        success: true,
        data: profile,
        message: "User added successfully".to_string(),
    }))
}

#[tracing::instrument(name = "Get User Profile", skip(pool, claims))]
#[get("/profile")]
pub async fn get_profile(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
) -> Result<HttpResponse, AppError> {
    let profile = users::get_profile(&pool, claims.user_id()?).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: profile,
        message: "Profile retrieved successfully".to_string(),
    }))
}

#[tracing::instrument(name = "Change User Password", skip(pool, claims, request))]
#[post("/change-password")]
pub async fn change_password(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    if request.new_password.len() < 6 {
        return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
            success: false,
            message: "New password must be at least 6 characters long".to_string(),
        }));
    }

    // No old-password check: holding a valid session is the only gate
    // here. Inherited contract; see DESIGN notes before tightening.
    users::change_user_password(&pool, claims.user_id()?, &request.new_password).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: MessageResponse {
            message: "Password changed successfully".to_string(),
        },
        message: "Password changed successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_username_is_rejected_with_a_distinct_message() {
        assert_eq!(
            provisioning_rejection("long-enough", true),
            Some("A user with this username already exists")
        );
    }

    #[test]
    fn short_passwords_are_rejected_before_the_duplicate_check() {
        assert_eq!(
            provisioning_rejection("short", false),
            Some("Password must be at least 6 characters long")
        );
        assert_eq!(
            provisioning_rejection("short", true),
            Some("Password must be at least 6 characters long")
        );
    }

    #[test]
    fn valid_requests_pass_the_gate() {
        assert_eq!(provisioning_rejection("long-enough", false), None);
    }
}
