use crate::core::jwt_auth::SessionClaims;
use crate::core::AppError;
use crate::core::AppSuccessResponse;
use crate::db::works;
use crate::models::works::WorkQueryFilter;
use crate::services::aggregate;
use crate::services::visibility::VisibilityScope;
use actix_web::{get, web, HttpResponse, Result};
use serde::Deserialize;
use sqlx::PgPool;

#[tracing::instrument(name = "Dashboard Summary", skip(pool, claims))]
#[get("/summary")]
pub async fn summary(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    filter: web::Query<WorkQueryFilter>,
) -> Result<HttpResponse, AppError> {
    let scope = VisibilityScope::from_session(&claims)?;
    let rows = works::fetch_scoped(&pool, &scope, &filter).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: aggregate::summarize(&rows),
        message: "Summary computed successfully".to_string(),
    }))
}

#[tracing::instrument(name = "Works Per Year", skip(pool, claims))]
#[get("/by-year")]
pub async fn by_year(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    filter: web::Query<WorkQueryFilter>,
) -> Result<HttpResponse, AppError> {
    let scope = VisibilityScope::from_session(&claims)?;
    let rows = works::fetch_scoped(&pool, &scope, &filter).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: aggregate::count_by_year(&rows),
        message: "Yearly series computed successfully".to_string(),
    }))
}

#[tracing::instrument(name = "Works Per Activity Type", skip(pool, claims))]
#[get("/by-type")]
pub async fn by_type(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    filter: web::Query<WorkQueryFilter>,
) -> Result<HttpResponse, AppError> {
    let scope = VisibilityScope::from_session(&claims)?;
    let rows = works::fetch_scoped(&pool, &scope, &filter).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: aggregate::count_by_type(&rows),
        message: "Type breakdown computed successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[tracing::instrument(name = "Researcher Leaderboard", skip(pool, claims))]
#[get("/leaderboard")]
pub async fn leaderboard(
    pool: web::Data<PgPool>,
    claims: SessionClaims,
    filter: web::Query<WorkQueryFilter>,
    query: web::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let scope = VisibilityScope::from_session(&claims)?;
    let rows = works::fetch_scoped(&pool, &scope, &filter).await?;
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: aggregate::leaderboard(&rows, limit),
        message: "Leaderboard computed successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The leaderboard reads the same query string as the other dashboard
    // views, with `limit` on top; both extractors must parse one string.
    #[test]
    fn leaderboard_query_carries_the_dashboard_filters() {
        let query_string = "year_from=2021&team_id=2&limit=5";

        let filter = web::Query::<WorkQueryFilter>::from_query(query_string).unwrap();
        assert_eq!(filter.year_from, Some(2021));
        assert_eq!(filter.team_id, Some(2));

        let query = web::Query::<LeaderboardQuery>::from_query(query_string).unwrap();
        assert_eq!(query.limit, Some(5));
    }
}
