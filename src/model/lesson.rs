use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::media::{Media, MediaOwnerType};
use crate::model::null_as_empty;
use crate::model::status::PublishStatus;
use crate::model::subcourse::Subcourse;

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LessonObjective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub knowledge: String,
    #[serde(default)]
    pub thinking: String,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub attitude: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LessonModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub media: Vec<Media>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LessonPreparation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub media: Vec<Media>,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    #[default]
    Pdf,
    Images,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LessonBuild {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub build_type: BuildType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub media: Vec<Media>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LessonContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub usage_text: String,
    #[serde(default)]
    pub example_text: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub media: Vec<Media>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LessonAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub media: Vec<Media>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LessonChallenge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub media: Vec<Media>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LessonQuizOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<Uuid>,
    pub content: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuizType {
    #[default]
    Single,
    Multiple,
    Open,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct LessonQuiz {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quiz_type: QuizType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<LessonQuizOption>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub media: Vec<Media>,
}

/// A single learning unit.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct Lesson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub subcourse_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_types: Option<Vec<String>>,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<Media>,
    #[serde(default, skip_serializing)]
    pub subcourse: Option<Box<Subcourse>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<LessonObjective>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub models: Vec<LessonModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<LessonPreparation>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub builds: Vec<LessonBuild>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content_blocks: Vec<LessonContentBlock>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attachments: Vec<LessonAttachment>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub challenges: Vec<LessonChallenge>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub quizzes: Vec<LessonQuiz>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The repeatable child lists of a lesson.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildKind {
    Model,
    Build,
    ContentBlock,
    Attachment,
    Challenge,
    Quiz,
}

impl ChildKind {
    pub const ALL: [ChildKind; 6] = [
        ChildKind::Model,
        ChildKind::Build,
        ChildKind::ContentBlock,
        ChildKind::Attachment,
        ChildKind::Challenge,
        ChildKind::Quiz,
    ];

    /// Word used in generated titles, e.g. `Auto build 2`.
    pub fn label(&self) -> &'static str {
        match self {
            ChildKind::Model => "model",
            ChildKind::Build => "build",
            ChildKind::ContentBlock => "content",
            ChildKind::Attachment => "attachment",
            ChildKind::Challenge => "challenge",
            ChildKind::Quiz => "quiz",
        }
    }

    /// Prefix of the staged-file key, e.g. `content-block-0`.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            ChildKind::Model => "model",
            ChildKind::Build => "build",
            ChildKind::ContentBlock => "content-block",
            ChildKind::Attachment => "attachment",
            ChildKind::Challenge => "challenge",
            ChildKind::Quiz => "quiz",
        }
    }

    pub fn owner_type(&self) -> MediaOwnerType {
        match self {
            ChildKind::Model => MediaOwnerType::LessonModel,
            ChildKind::Build => MediaOwnerType::LessonBuild,
            ChildKind::ContentBlock => MediaOwnerType::LessonContentBlock,
            ChildKind::Attachment => MediaOwnerType::LessonAttachment,
            ChildKind::Challenge => MediaOwnerType::LessonChallenge,
            ChildKind::Quiz => MediaOwnerType::LessonQuiz,
        }
    }
}

/// Common surface of the titled child records.
pub trait LessonChild {
    const KIND: ChildKind;

    fn id(&self) -> Option<Uuid>;
    fn title(&self) -> &str;
    fn set_title(&mut self, title: String);
    fn media_mut(&mut self) -> &mut Vec<Media>;
    /// Clears server identity so the record is sent as new.
    fn clear_ids(&mut self);
}

macro_rules! lesson_child {
    ($ty:ty, $kind:expr) => {
        impl LessonChild for $ty {
            const KIND: ChildKind = $kind;

            fn id(&self) -> Option<Uuid> {
                self.id
            }

            fn title(&self) -> &str {
                &self.title
            }

            fn set_title(&mut self, title: String) {
                self.title = title;
            }

            fn media_mut(&mut self) -> &mut Vec<Media> {
                &mut self.media
            }

            fn clear_ids(&mut self) {
                self.id = None;
                self.lesson_id = None;
            }
        }
    };
}

lesson_child!(LessonModel, ChildKind::Model);
lesson_child!(LessonBuild, ChildKind::Build);
lesson_child!(LessonContentBlock, ChildKind::ContentBlock);
lesson_child!(LessonAttachment, ChildKind::Attachment);
lesson_child!(LessonChallenge, ChildKind::Challenge);
lesson_child!(LessonQuiz, ChildKind::Quiz);

impl Lesson {
    /// Server id of the child at `index` in the given list.
    pub fn child_id(&self, kind: ChildKind, index: usize) -> Option<Uuid> {
        match kind {
            ChildKind::Model => self.models.get(index).and_then(|c| c.id),
            ChildKind::Build => self.builds.get(index).and_then(|c| c.id),
            ChildKind::ContentBlock => self.content_blocks.get(index).and_then(|c| c.id),
            ChildKind::Attachment => self.attachments.get(index).and_then(|c| c.id),
            ChildKind::Challenge => self.challenges.get(index).and_then(|c| c.id),
            ChildKind::Quiz => self.quizzes.get(index).and_then(|c| c.id),
        }
    }

    pub fn child_count(&self, kind: ChildKind) -> usize {
        match kind {
            ChildKind::Model => self.models.len(),
            ChildKind::Build => self.builds.len(),
            ChildKind::ContentBlock => self.content_blocks.len(),
            ChildKind::Attachment => self.attachments.len(),
            ChildKind::Challenge => self.challenges.len(),
            ChildKind::Quiz => self.quizzes.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_tolerates_null_children() {
        let json = r#"{
            "id": "0b0e2f4e-3c5a-4c1e-8e55-1d6a2b7c8d90",
            "subcourse_id": "5a8e2c1d-7b3f-4e6a-9c2d-8f1e0a3b4c5d",
            "title": "Gears",
            "slug": "gears",
            "status": "published",
            "models": null,
            "quizzes": [{"title": "Q1", "quiz_type": "open", "options": null}]
        }"#;
        let lesson: Lesson = serde_json::from_str(json).unwrap();
        assert!(lesson.models.is_empty());
        assert_eq!(lesson.quizzes[0].quiz_type, QuizType::Open);
        assert!(lesson.quizzes[0].options.is_empty());
        assert_eq!(lesson.child_count(ChildKind::Quiz), 1);
    }

    #[test]
    fn child_id_looks_up_by_kind_and_index() {
        let id = Uuid::new_v4();
        let lesson = Lesson {
            builds: vec![
                LessonBuild::default(),
                LessonBuild { id: Some(id), ..Default::default() },
            ],
            ..Default::default()
        };
        assert_eq!(lesson.child_id(ChildKind::Build, 1), Some(id));
        assert_eq!(lesson.child_id(ChildKind::Build, 0), None);
        assert_eq!(lesson.child_id(ChildKind::Model, 0), None);
    }

    #[test]
    fn create_payload_omits_server_fields() {
        let lesson = Lesson { title: "Intro".into(), slug: "intro".into(), ..Default::default() };
        let value = serde_json::to_value(&lesson).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("created_at").is_none());
        assert_eq!(value["status"], "draft");
    }
}
