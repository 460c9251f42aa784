use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix of local preview URLs. These must never be sent to or accepted from the API.
pub const LOCAL_PREVIEW_SCHEME: &str = "blob:";

#[derive(Clone, Copy, Serialize, Deserialize, ValueEnum, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaPurpose {
    Cover,
    Intro,
    Main,
    Gallery,
    Slide,
    #[default]
    #[serde(other)]
    Other,
}

impl MediaPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaPurpose::Cover => "cover",
            MediaPurpose::Intro => "intro",
            MediaPurpose::Main => "main",
            MediaPurpose::Gallery => "gallery",
            MediaPurpose::Slide => "slide",
            MediaPurpose::Other => "other",
        }
    }
}

/// Entity kinds that can own uploaded media.
#[derive(Clone, Copy, Serialize, Deserialize, ValueEnum, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum MediaOwnerType {
    Program,
    Subcourse,
    Lesson,
    LessonModel,
    LessonPreparation,
    LessonBuild,
    LessonContentBlock,
    LessonAttachment,
    LessonChallenge,
    LessonQuiz,
}

impl MediaOwnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaOwnerType::Program => "program",
            MediaOwnerType::Subcourse => "subcourse",
            MediaOwnerType::Lesson => "lesson",
            MediaOwnerType::LessonModel => "lesson_model",
            MediaOwnerType::LessonPreparation => "lesson_preparation",
            MediaOwnerType::LessonBuild => "lesson_build",
            MediaOwnerType::LessonContentBlock => "lesson_content_block",
            MediaOwnerType::LessonAttachment => "lesson_attachment",
            MediaOwnerType::LessonChallenge => "lesson_challenge",
            MediaOwnerType::LessonQuiz => "lesson_quiz",
        }
    }
}

impl fmt::Display for MediaOwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (owner_type, owner_id) pair an upload is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaOwner {
    pub owner_type: MediaOwnerType,
    pub owner_id: Uuid,
}

impl MediaOwner {
    pub fn new(owner_type: MediaOwnerType, owner_id: Uuid) -> Self {
        MediaOwner { owner_type, owner_id }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Media {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default)]
    pub purpose: MediaPurpose,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl Media {
    pub fn is_local_preview(&self) -> bool {
        self.url.starts_with(LOCAL_PREVIEW_SCHEME)
    }
}

/// Drops media entries that only exist as local previews.
pub fn retain_persisted(media: &mut Vec<Media>) {
    media.retain(|m| !m.is_local_preview());
}
