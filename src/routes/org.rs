use crate::core::AppError;
use crate::core::AppSuccessResponse;
use crate::db::org;
use actix_web::{get, web, HttpResponse, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "List Departments", skip(pool))]
#[get("/departments")]
pub async fn get_departments(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let departments = org::fetch_departments(&pool).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: departments,
        message: "Departments retrieved successfully".to_string(),
    }))
}

#[tracing::instrument(name = "List Teams", skip(pool))]
#[get("/teams")]
pub async fn get_teams(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let teams = org::fetch_teams(&pool).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: teams,
        message: "Teams retrieved successfully".to_string(),
    }))
}
