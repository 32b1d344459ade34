use chrono::{Datelike, NaiveDate};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::AppError;
use crate::models::works::{NewWork, WorkQueryFilter, WorkRecord};
use crate::services::visibility::VisibilityScope;

/// The one join every read surface uses: a Work with its owner and the
/// owner's team/department resolved.
const WORK_SELECT: &str = r#"
SELECT w.id, w.user_id, w.title, w.activity_type, w.classification,
       w.publication_date, w.year, w.points, w.details,
       u.full_name AS researcher, u.team_id, t.department_id,
       t.name AS team, d.name_ar AS department
FROM works w
JOIN users u ON w.user_id = u.id
LEFT JOIN teams t ON u.team_id = t.id
LEFT JOIN departments d ON t.department_id = d.id
"#;

/// The only translation of a `VisibilityScope` into SQL.
fn apply_scope(builder: &mut QueryBuilder<Postgres>, scope: &VisibilityScope) {
    match scope {
        VisibilityScope::All => {}
        VisibilityScope::Department(department_id) => {
            builder.push(" AND t.department_id = ").push_bind(*department_id);
        }
        VisibilityScope::Team(team_id) => {
            builder.push(" AND u.team_id = ").push_bind(*team_id);
        }
        VisibilityScope::Owner(user_id) => {
            builder.push(" AND w.user_id = ").push_bind(*user_id);
        }
        VisibilityScope::Nothing => {
            builder.push(" AND FALSE");
        }
    }
}

pub async fn fetch_scoped(
    pool: &PgPool,
    scope: &VisibilityScope,
    filter: &WorkQueryFilter,
) -> Result<Vec<WorkRecord>, AppError> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("{} WHERE TRUE", WORK_SELECT));
    apply_scope(&mut builder, scope);

    if let Some(year_from) = filter.year_from {
        builder.push(" AND w.year >= ").push_bind(year_from);
    }
    if let Some(year_to) = filter.year_to {
        builder.push(" AND w.year <= ").push_bind(year_to);
    }
    if let Some(department_id) = filter.department_id {
        builder.push(" AND t.department_id = ").push_bind(department_id);
    }
    if let Some(team_id) = filter.team_id {
        builder.push(" AND u.team_id = ").push_bind(team_id);
    }
    if let Some(activity_type) = &filter.activity_type {
        builder.push(" AND w.activity_type = ").push_bind(activity_type.clone());
    }

    builder.push(" ORDER BY w.publication_date DESC, w.id DESC");

    let rows = builder
        .build_query_as::<WorkRecord>()
        .fetch_all(pool)
        .await
        .map_err(AppError::db_error)?;

    Ok(rows)
}

pub async fn fetch_works_of_user(
    pool: &PgPool,
    user_id: i32,
) -> Result<Vec<WorkRecord>, AppError> {
    fetch_scoped(
        pool,
        &VisibilityScope::Owner(user_id),
        &WorkQueryFilter::default(),
    )
    .await
}

pub async fn get_work(pool: &PgPool, work_id: i32) -> Result<WorkRecord, AppError> {
    let sql = format!("{} WHERE w.id = $1", WORK_SELECT);
    let row = sqlx::query_as::<_, WorkRecord>(&sql)
        .bind(work_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::db_error)?;

    row.ok_or_else(|| AppError::not_found("Work not found"))
}

pub async fn create_work(pool: &PgPool, new_work: &NewWork) -> Result<WorkRecord, AppError> {
    let work_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO works (user_id, title, details, activity_type, classification,
                           publication_date, year, points)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(new_work.user_id)
    .bind(&new_work.title)
    .bind(&new_work.details)
    .bind(&new_work.activity_type)
    .bind(&new_work.classification)
    .bind(new_work.publication_date)
    .bind(new_work.year)
    .bind(new_work.points)
    .fetch_one(pool)
    .await
    .map_err(AppError::db_error)?;

    get_work(pool, work_id).await
}

/// Title and date only; `year` tracks the date and `points` stay frozen.
pub async fn update_work(
    pool: &PgPool,
    work_id: i32,
    title: &str,
    publication_date: NaiveDate,
) -> Result<WorkRecord, AppError> {
    sqlx::query(
        r#"
        UPDATE works
        SET title = $1, publication_date = $2, year = $3
        WHERE id = $4
        "#,
    )
    .bind(title)
    .bind(publication_date)
    .bind(publication_date.year())
    .bind(work_id)
    .execute(pool)
    .await
    .map_err(AppError::db_error)?;

    get_work(pool, work_id).await
}

pub async fn delete_work(pool: &PgPool, work_id: i32) -> Result<(), AppError> {
    sqlx::query("DELETE FROM works WHERE id = $1")
        .bind(work_id)
        .execute(pool)
        .await
        .map_err(AppError::db_error)?;

    Ok(())
}
