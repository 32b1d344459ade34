use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    DeptHead,
    Leader,
    Researcher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::DeptHead => "dept_head",
            Role::Leader => "leader",
            Role::Researcher => "researcher",
        }
    }

    /// Any unknown role string is treated as a plain researcher.
    pub fn parse(value: &str) -> Role {
        match value {
            "admin" => Role::Admin,
            "dept_head" => Role::DeptHead,
            "leader" => Role::Leader,
            _ => Role::Researcher,
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Admin | Role::DeptHead)
    }
}

/// member_type was free-form in the early portal revisions; the stored
/// string is kept as-is and only mapped to a display label on render.
pub fn member_type_label_ar(member_type: &str) -> &str {
    match member_type {
        "permanent" => "عضو دائم",
        "phd_student" => "طالب دكتوراه",
        "affiliate" => "عضو منتسب",
        "associate" => "عضو مشارك",
        other => other,
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: String,
    pub member_type: String,
    pub team_id: Option<i32>,
    pub department_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub member_type: String,
    pub team_id: Option<i32>,
    pub department_id: Option<i32>,
    pub team: Option<String>,
    pub department: Option<String>,
}

/// Where a user's works hang in the org tree: their team, and the
/// department that team belongs to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserPlacement {
    pub user_id: i32,
    pub team_id: Option<i32>,
    pub team_department_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
    pub activation_code: String,
    pub member_type: String,
    pub team_id: Option<i32>,
    pub department_id: Option<i32>,
}

/// Manual provisioning by an admin or a department head; no activation
/// code involved.
#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
    pub member_type: String,
    pub team_id: Option<i32>,
    pub department_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_string_form() {
        for role in [Role::Admin, Role::DeptHead, Role::Leader, Role::Researcher] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }

    #[test]
    fn unknown_role_string_falls_back_to_researcher() {
        assert_eq!(Role::parse("superuser"), Role::Researcher);
        assert_eq!(Role::parse(""), Role::Researcher);
    }
}
