use crate::core::jwt_auth::SessionClaims;
use crate::core::AppError;
use crate::core::AppSuccessResponse;
use crate::db::works;
use crate::models::users::Role;
use crate::models::works::{CreateWorkRequest, NewWork, UpdateWorkRequest, WorkQueryFilter};
use crate::services::visibility::VisibilityScope;
use actix_web::{delete, get, post, put, web, HttpResponse, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Create Work", skip(pool, claims, request))]
#[post("")]
pub async fn create_work(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    request: web::Json<CreateWorkRequest>,
) -> Result<HttpResponse, AppError> {
    if request.details.activity_type() != request.activity_type {
        return Err(AppError::validation_error(
            "The details payload does not match the declared activity type",
        ));
    }

    let request = request.into_inner();
    let new_work = NewWork::assemble(
        claims.user_id()?,
        request.title,
        &request.details,
        request.activity_type,
        request.classification,
        request.publication_date,
    )?;
    let work = works::create_work(&pool, &new_work).await?;

    Ok(HttpResponse::Created().json(AppSuccessResponse {
        success: true,
        data: work,
        message: "Work recorded successfully".to_string(),
    }))
}

#[tracing::instrument(name = "List Works", skip(pool, claims))]
#[get("")]
pub async fn list_works(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    filter: web::Query<WorkQueryFilter>,
) -> Result<HttpResponse, AppError> {
    let scope = VisibilityScope::from_session(&claims)?;
    let rows = works::fetch_scoped(&pool, &scope, &filter).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: rows,
        message: "Works retrieved successfully".to_string(),
    }))
}

#[tracing::instrument(name = "Update Work", skip(pool, claims, request))]
#[put("/{work_id}")]
pub async fn update_work(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    path: web::Path<i32>,
    request: web::Json<UpdateWorkRequest>,
) -> Result<HttpResponse, AppError> {
    let work_id = path.into_inner();
    ensure_can_mutate(&pool, &claims, work_id).await?;

    let work = works::update_work(&pool, work_id, &request.title, request.publication_date).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: work,
        message: "Work updated successfully".to_string(),
    }))
}

#[tracing::instrument(name = "Delete Work", skip(pool, claims))]
#[delete("/{work_id}")]
pub async fn delete_work(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let work_id = path.into_inner();
    ensure_can_mutate(&pool, &claims, work_id).await?;

    works::delete_work(&pool, work_id).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: serde_json::json!({ "id": work_id }),
        message: "Work deleted successfully".to_string(),
    }))
}

/// Mutation is owner-or-admin only. Visibility over a row does not grant
/// the right to change it.
async fn ensure_can_mutate(
    pool: &PgPool,
    claims: &SessionClaims,
    work_id: i32,
) -> Result<(), AppError> {
    let work = works::get_work(pool, work_id).await?;
    if claims.role() == Role::Admin || work.user_id == claims.user_id()? {
        Ok(())
    } else {
        Err(AppError::forbidden_error(
            "Only the owning researcher or an admin may modify this work",
        ))
    }
}
