use crate::core::jwt_auth::SessionClaims;
use crate::core::AppConfig;
use crate::core::AppError;
use crate::db::{users, works};
use crate::models::works::WorkQueryFilter;
use crate::services::visibility::VisibilityScope;
use crate::services::{cv_pdf, export};
use actix_web::http::header::ContentDisposition;
use actix_web::{get, web, HttpResponse, Result};
use serde::Deserialize;
use sqlx::PgPool;

#[tracing::instrument(name = "Export Report", skip(pool, claims))]
#[get("/export")]
pub async fn export_report(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    filter: web::Query<WorkQueryFilter>,
) -> Result<HttpResponse, AppError> {
    let scope = VisibilityScope::from_session(&claims)?;
    let rows = works::fetch_scoped(&pool, &scope, &filter).await?;
    let csv_bytes = export::works_to_csv(&rows)?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition::attachment("research_report.csv"))
        .body(csv_bytes))
}

#[derive(Debug, Deserialize)]
pub struct CvQuery {
    /// Defaults to the caller's own CV.
    pub user_id: Option<i32>,
}

#[tracing::instrument(name = "Export CV PDF", skip(pool, config, claims))]
#[get("/cv")]
pub async fn export_cv(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    claims: SessionClaims,
    query: web::Query<CvQuery>,
) -> Result<HttpResponse, AppError> {
    let caller_id = claims.user_id()?;
    let target_id = query.user_id.unwrap_or(caller_id);

    // A CV may be pulled for any researcher whose works the caller can
    // already see.
    if target_id != caller_id {
        let scope = VisibilityScope::from_session(&claims)?;
        let placement = users::get_user_placement(&pool, target_id).await?;
        if !scope.permits_user(
            placement.user_id,
            placement.team_id,
            placement.team_department_id,
        ) {
            return Err(AppError::forbidden_error(
                "This researcher is outside your visibility",
            ));
        }
    }

    let profile = users::get_profile(&pool, target_id).await?;
    let rows = works::fetch_works_of_user(&pool, target_id).await?;

    let font_bytes = cv_pdf::ensure_font(&config.cv_font).await;
    let pdf_bytes = cv_pdf::render_cv(&profile, &rows, font_bytes.as_deref())?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition::attachment(format!(
            "cv_{}.pdf",
            profile.username
        )))
        .body(pdf_bytes))
}
