use actix_web::web::{scope, ServiceConfig};
use actix_web::Scope;

use dashboard::{by_type, by_year, leaderboard, summary};
use org::{get_departments, get_teams};
use reports::{export_cv, export_report};
use users::{add_user, change_password, get_profile, login, register};
use works::{create_work, delete_work, list_works, update_work};

mod dashboard;
mod health_check;
mod org;
mod reports;
mod users;
mod works;

use crate::routes::health_check::*;

fn users_routes() -> Scope {
    scope("users")
        .service(register)
        .service(login)
        .service(add_user)
        .service(get_profile)
        .service(change_password)
}

fn works_routes() -> Scope {
    scope("works")
        .service(list_works)
        .service(create_work)
        .service(update_work)
        .service(delete_work)
}

fn dashboard_routes() -> Scope {
    scope("dashboard")
        .service(summary)
        .service(by_year)
        .service(by_type)
        .service(leaderboard)
}

fn reports_routes() -> Scope {
    scope("reports").service(export_report).service(export_cv)
}

fn org_routes() -> Scope {
    scope("org").service(get_departments).service(get_teams)
}

fn util_routes() -> Scope {
    scope("").service(health_check)
}

pub fn portal_routes(conf: &mut ServiceConfig) {
    conf.service(
        scope("api/v1")
            .service(users_routes())
            .service(works_routes())
            .service(dashboard_routes())
            .service(reports_routes())
            .service(org_routes())
            .service(util_routes()),
    );
}
