use crate::core::AppError;
use crate::models::users::{Role, User, UserPlacement, UserProfile};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sqlx::PgPool;

pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
    pub member_type: String,
    pub team_id: Option<i32>,
    pub department_id: Option<i32>,
}

/// One hashing routine for both provisioning and password changes.
fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(AppError::hashing_failed)
}

pub async fn create_user(pool: &PgPool, new_user: &NewUser) -> Result<User, AppError> {
    let password_hash = hash_password(&new_user.password)?;

    let user_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO users (username, full_name, password_hash, role, member_type, team_id, department_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&new_user.username)
    .bind(&new_user.full_name)
    .bind(&password_hash)
    .bind(new_user.role.as_str())
    .bind(&new_user.member_type)
    .bind(new_user.team_id)
    .bind(new_user.department_id)
    .fetch_one(pool)
    .await
    .map_err(AppError::db_error)?;

    get_user_by_id(pool, user_id).await
}

pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, full_name, password_hash, role, member_type, team_id, department_id
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .map_err(AppError::db_error)?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &PgPool, user_id: i32) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, full_name, password_hash, role, member_type, team_id, department_id
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::db_error)?;

    user.ok_or_else(|| AppError::not_found("User not found"))
}

/// Profile with the team and department names resolved. A dept_head is
/// attached to a department directly; everyone else reaches one through
/// their team.
pub async fn get_profile(pool: &PgPool, user_id: i32) -> Result<UserProfile, AppError> {
    let profile = sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT u.id, u.username, u.full_name, u.role, u.member_type,
               u.team_id, u.department_id,
               t.name AS team, d.name_ar AS department
        FROM users u
        LEFT JOIN teams t ON u.team_id = t.id
        LEFT JOIN departments d ON COALESCE(u.department_id, t.department_id) = d.id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::db_error)?;

    profile.ok_or_else(|| AppError::not_found("User not found"))
}

/// The placement that decides whose scope a user's works fall under.
pub async fn get_user_placement(pool: &PgPool, user_id: i32) -> Result<UserPlacement, AppError> {
    let placement = sqlx::query_as::<_, UserPlacement>(
        r#"
        SELECT u.id AS user_id, u.team_id, t.department_id AS team_department_id
        FROM users u
        LEFT JOIN teams t ON u.team_id = t.id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::db_error)?;

    placement.ok_or_else(|| AppError::not_found("User not found"))
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(username)
        .fetch_one(pool)
        .await
        .map_err(AppError::db_error)?;

    Ok(count > 0)
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::internal_error("Invalid password"))?;

    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn change_user_password(
    pool: &PgPool,
    user_id: i32,
    new_password: &str,
) -> Result<(), AppError> {
    let password_hash = hash_password(new_password)?;

    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(&password_hash)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(AppError::db_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Registration followed by login boils down to hash-then-verify over
    // the same routines the handlers call.
    #[tokio::test]
    async fn fresh_credentials_authenticate_and_reject_impostors() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &hash).await.unwrap());
        assert!(!verify_password("wrong-pass", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn rehashing_the_same_password_still_verifies() {
        let first = hash_password("s3cret-pass").unwrap();
        let second = hash_password("s3cret-pass").unwrap();
        // per-hash random salt
        assert_ne!(first, second);
        assert!(verify_password("s3cret-pass", &second).await.unwrap());
    }
}
