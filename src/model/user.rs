use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::null_as_empty;
use crate::model::teacher::{AssignmentScope, TeacherAssignment};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    /// Active assignments. Only teachers carry any; `null` and a missing field both become empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub assignments: Vec<TeacherAssignment>,
}

impl User {
    /// Drops assignments that do not name the program or subcourse their scope
    /// refers to. A missing or `null` list is already empty after decoding.
    pub fn normalize(&mut self) {
        self.assignments.retain(|a| match a.scope_level {
            AssignmentScope::Program => a.program_id.is_some(),
            AssignmentScope::Subcourse => a.subcourse_id.is_some(),
        });
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_program_assignment(&self) -> bool {
        self.assignments.iter().any(|a| a.program_id.is_some())
    }

    pub fn has_any_assignment(&self) -> bool {
        self.assignments
            .iter()
            .any(|a| a.program_id.is_some() || a.subcourse_id.is_some())
    }
}

#[derive(Serialize, Debug)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_assignments_normalize_to_empty() {
        let json = r#"{
            "id": "7f1c3f3e-9d7a-4a58-9d0e-3b1f5d2a9c11",
            "username": "alice",
            "email": "alice@example.com",
            "role": "teacher",
            "status": "active",
            "assignments": null
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.assignments.is_empty());
        assert!(!user.has_any_assignment());
    }

    #[test]
    fn normalize_drops_assignments_without_a_target() {
        let json = r#"{
            "id": "7f1c3f3e-9d7a-4a58-9d0e-3b1f5d2a9c11",
            "username": "alice",
            "role": "teacher",
            "assignments": [
                {"id": "00000000-0000-0000-0000-000000000001", "teacher_id": "7f1c3f3e-9d7a-4a58-9d0e-3b1f5d2a9c11",
                 "scope_level": "program", "status": "active"},
                {"id": "00000000-0000-0000-0000-000000000002", "teacher_id": "7f1c3f3e-9d7a-4a58-9d0e-3b1f5d2a9c11",
                 "subcourse_id": "00000000-0000-0000-0000-000000000009", "scope_level": "subcourse", "status": "active"}
            ]
        }"#;
        let mut user: User = serde_json::from_str(json).unwrap();
        user.normalize();
        assert_eq!(user.assignments.len(), 1);
        assert!(user.has_any_assignment());
        assert!(!user.has_program_assignment());
    }

    #[test]
    fn admin_without_assignments_field() {
        let json = r#"{
            "id": "7f1c3f3e-9d7a-4a58-9d0e-3b1f5d2a9c11",
            "username": "root",
            "role": "admin"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_admin());
        assert_eq!(user.status, UserStatus::Active);
    }
}
