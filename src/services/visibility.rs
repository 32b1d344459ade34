use crate::core::jwt_auth::SessionClaims;
use crate::core::AppError;
use crate::models::users::Role;
use crate::models::works::WorkRecord;

/// The one place role and org placement turn into a data scope. Every
/// read surface (lists, dashboards, exports, the manage view) must go
/// through a `VisibilityScope`; nothing else may filter by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Admin: the whole Work table.
    All,
    /// Department head: works of users whose team belongs to this department.
    Department(i32),
    /// Team leader: works of users on this team.
    Team(i32),
    /// Researcher: own works only.
    Owner(i32),
    /// A manager with no org attachment sees nothing, not everything.
    Nothing,
}

pub fn scope_for(
    role: Role,
    user_id: i32,
    team_id: Option<i32>,
    department_id: Option<i32>,
) -> VisibilityScope {
    match role {
        Role::Admin => VisibilityScope::All,
        Role::DeptHead => department_id
            .map(VisibilityScope::Department)
            .unwrap_or(VisibilityScope::Nothing),
        Role::Leader => team_id
            .map(VisibilityScope::Team)
            .unwrap_or(VisibilityScope::Nothing),
        Role::Researcher => VisibilityScope::Owner(user_id),
    }
}

impl VisibilityScope {
    pub fn from_session(claims: &SessionClaims) -> Result<VisibilityScope, AppError> {
        Ok(scope_for(
            claims.role(),
            claims.user_id()?,
            claims.team_id,
            claims.department_id,
        ))
    }

    pub fn permits(&self, row: &WorkRecord) -> bool {
        self.permits_user(row.user_id, row.team_id, row.department_id)
    }

    /// Whether works owned by a user with the given placement fall inside
    /// this scope. `department_id` is the department of the user's team.
    pub fn permits_user(
        &self,
        user_id: i32,
        team_id: Option<i32>,
        department_id: Option<i32>,
    ) -> bool {
        match self {
            VisibilityScope::All => true,
            VisibilityScope::Department(dept) => department_id == Some(*dept),
            VisibilityScope::Team(team) => team_id == Some(*team),
            VisibilityScope::Owner(owner) => user_id == *owner,
            VisibilityScope::Nothing => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: i32, user_id: i32, team_id: Option<i32>, department_id: Option<i32>) -> WorkRecord {
        WorkRecord {
            id,
            user_id,
            title: format!("work {}", id),
            activity_type: "journal_article".to_string(),
            classification: Some("B".to_string()),
            publication_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            year: 2023,
            points: 75,
            details: None,
            researcher: format!("researcher {}", user_id),
            team_id,
            department_id,
            team: team_id.map(|t| format!("team {}", t)),
            department: department_id.map(|d| format!("dept {}", d)),
        }
    }

    /// Dept D1 holds teams T1 (researcher R1, 3 works) and T2 (R2, 2
    /// works); dept D2 holds T3 (R3, 4 works).
    fn campus() -> Vec<WorkRecord> {
        let mut rows = Vec::new();
        for i in 0..3 {
            rows.push(record(i, 1, Some(1), Some(1)));
        }
        for i in 3..5 {
            rows.push(record(i, 2, Some(2), Some(1)));
        }
        for i in 5..9 {
            rows.push(record(i, 3, Some(3), Some(2)));
        }
        rows
    }

    fn visible(scope: VisibilityScope, rows: &[WorkRecord]) -> Vec<i32> {
        rows.iter().filter(|r| scope.permits(r)).map(|r| r.id).collect()
    }

    #[test]
    fn admin_sees_every_row() {
        let rows = campus();
        assert_eq!(visible(VisibilityScope::All, &rows).len(), 9);
    }

    #[test]
    fn dept_head_sees_both_teams_of_their_department() {
        let rows = campus();
        let seen = visible(VisibilityScope::Department(1), &rows);
        assert_eq!(seen.len(), 5);
        assert!(seen.iter().all(|id| *id < 5));
    }

    #[test]
    fn leader_sees_only_their_team() {
        let rows = campus();
        assert_eq!(visible(VisibilityScope::Team(1), &rows).len(), 3);
        assert_eq!(visible(VisibilityScope::Team(2), &rows).len(), 2);
    }

    #[test]
    fn researcher_sees_only_their_own_rows() {
        let rows = campus();
        assert_eq!(visible(VisibilityScope::Owner(3), &rows).len(), 4);
        assert_eq!(visible(VisibilityScope::Owner(99), &rows).len(), 0);
    }

    #[test]
    fn scopes_nest_researcher_within_leader_within_dept_head_within_admin() {
        let rows = campus();
        let researcher = visible(VisibilityScope::Owner(1), &rows);
        let leader = visible(VisibilityScope::Team(1), &rows);
        let dept_head = visible(VisibilityScope::Department(1), &rows);
        let admin = visible(VisibilityScope::All, &rows);

        assert!(researcher.iter().all(|id| leader.contains(id)));
        assert!(leader.iter().all(|id| dept_head.contains(id)));
        assert!(dept_head.iter().all(|id| admin.contains(id)));
    }

    #[test]
    fn unattached_managers_fail_closed() {
        let rows = campus();
        let dept_head = scope_for(Role::DeptHead, 10, None, None);
        let leader = scope_for(Role::Leader, 11, None, None);
        assert_eq!(dept_head, VisibilityScope::Nothing);
        assert_eq!(leader, VisibilityScope::Nothing);
        assert!(visible(dept_head, &rows).is_empty());
        assert!(visible(leader, &rows).is_empty());
    }

    #[test]
    fn unknown_role_is_scoped_like_a_researcher() {
        let scope = scope_for(Role::parse("auditor"), 2, Some(2), Some(1));
        assert_eq!(scope, VisibilityScope::Owner(2));
    }
}
