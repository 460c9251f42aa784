use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::user::UserStatus;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentScope {
    Program,
    Subcourse,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Active,
    Revoked,
}

/// A scoped grant letting a teacher manage one program or one subcourse.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct TeacherAssignment {
    pub id: Uuid,
    pub teacher_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcourse_id: Option<Uuid>,
    pub scope_level: AssignmentScope,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
pub struct NewAssignment {
    pub teacher_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcourse_id: Option<Uuid>,
    pub scope_level: AssignmentScope,
}

impl NewAssignment {
    pub fn program(teacher_id: Uuid, program_id: Uuid) -> Self {
        NewAssignment {
            teacher_id,
            program_id: Some(program_id),
            subcourse_id: None,
            scope_level: AssignmentScope::Program,
        }
    }

    pub fn subcourse(teacher_id: Uuid, subcourse_id: Uuid) -> Self {
        NewAssignment {
            teacher_id,
            program_id: None,
            subcourse_id: Some(subcourse_id),
            scope_level: AssignmentScope::Subcourse,
        }
    }
}

/// Optional validity window sent with bulk assignment updates.
#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct AssignmentWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
pub(crate) struct ProgramAssignmentsBody<'a> {
    pub program_ids: &'a [Uuid],
    #[serde(flatten)]
    pub window: AssignmentWindow,
}

#[derive(Serialize, Debug)]
pub(crate) struct SubcourseAssignmentsBody<'a> {
    pub subcourse_ids: &'a [Uuid],
    #[serde(flatten)]
    pub window: AssignmentWindow,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct AssignmentsEnvelope {
    #[serde(default, deserialize_with = "crate::model::null_as_empty")]
    pub assignments: Vec<TeacherAssignment>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Teacher {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
pub struct NewTeacher {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// One row of the admin-wide lesson authorship history.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct TeacherLessonHistory {
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub lesson_id: Uuid,
    pub lesson_title: String,
    pub lesson_slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: String,
}

/// Lessons authored by a single teacher.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct LessonHistoryItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub subcourse_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_history_item_keeps_its_timestamps() {
        let json = r#"{
            "id": "7f1c3f3e-9d7a-4a58-9d0e-3b1f5d2a9c11",
            "title": "Gear trains",
            "slug": "gear-trains",
            "subcourse_id": "00000000-0000-0000-0000-000000000003",
            "status": "draft",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T08:30:00Z"
        }"#;
        let item: LessonHistoryItem = serde_json::from_str(json).unwrap();
        assert!(item.updated_at > item.created_at);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["updated_at"], "2025-01-02T08:30:00Z");
    }

    #[test]
    fn bulk_body_skips_empty_window() {
        let ids = [Uuid::nil()];
        let body = ProgramAssignmentsBody { program_ids: &ids, window: AssignmentWindow::default() };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("start_at").is_none());
        assert_eq!(value["program_ids"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn new_assignment_carries_only_its_scope() {
        let a = NewAssignment::subcourse(Uuid::nil(), Uuid::nil());
        let value = serde_json::to_value(&a).unwrap();
        assert!(value.get("program_id").is_none());
        assert_eq!(value["scope_level"], "subcourse");
    }
}
