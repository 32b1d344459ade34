use crate::core::AppError;
use crate::models::org::{Department, Team};
use sqlx::PgPool;

pub async fn fetch_departments(pool: &PgPool) -> Result<Vec<Department>, AppError> {
    let departments = sqlx::query_as::<_, Department>(
        "SELECT id, name_ar, name_la, short_name, head_name FROM departments ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .map_err(AppError::db_error)?;

    Ok(departments)
}

pub async fn fetch_teams(pool: &PgPool) -> Result<Vec<Team>, AppError> {
    let teams = sqlx::query_as::<_, Team>(
        "SELECT id, name, short_name, keywords, description, department_id FROM teams ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .map_err(AppError::db_error)?;

    Ok(teams)
}
