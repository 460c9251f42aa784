use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication state shared by programs, subcourses and lessons.
#[derive(Clone, Copy, Serialize, Deserialize, ValueEnum, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Published => "published",
            PublishStatus::Archived => "archived",
        }
    }

    /// Lenient parse used for history rows, where the server sends a plain string.
    /// Anything unknown is treated as a draft.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "published" => PublishStatus::Published,
            "archived" => PublishStatus::Archived,
            _ => PublishStatus::Draft,
        }
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
