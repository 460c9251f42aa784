use std::path::{Path, PathBuf};

use serde::Deserialize;
use uuid::Uuid;

use course_portal::core::staging::StagedFile;
use course_portal::error::portal::PortalError;
use course_portal::forms::lesson_editor::{FileKey, LessonEditor};
use course_portal::model::lesson::{
    ChildKind, LessonAttachment, LessonBuild, LessonChallenge, LessonContentBlock, LessonModel,
    LessonObjective, LessonPreparation, LessonQuiz,
};
use course_portal::model::status::PublishStatus;

/// A record of the manifest plus an optional local file to attach to it.
#[derive(Deserialize, Debug)]
pub struct Entry<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Lesson described in a JSON or TOML file for `lessons save`.
///
/// With an `id` the existing lesson is updated and lists left out of the file
/// stay as they are on the server.
#[derive(Deserialize, Debug)]
pub struct LessonManifest {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub subcourse_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub status: Option<PublishStatus>,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub objectives: Option<LessonObjective>,
    #[serde(default)]
    pub preparation: Option<Entry<LessonPreparation>>,
    #[serde(default)]
    pub models: Option<Vec<Entry<LessonModel>>>,
    #[serde(default)]
    pub builds: Option<Vec<Entry<LessonBuild>>>,
    #[serde(default)]
    pub content_blocks: Option<Vec<Entry<LessonContentBlock>>>,
    #[serde(default)]
    pub attachments: Option<Vec<Entry<LessonAttachment>>>,
    #[serde(default)]
    pub challenges: Option<Vec<Entry<LessonChallenge>>>,
    #[serde(default)]
    pub quizzes: Option<Vec<Entry<LessonQuiz>>>,
}

impl LessonManifest {
    /// Reads `path` as TOML when it ends in `.toml`, JSON otherwise.
    pub fn load(path: &Path) -> Result<LessonManifest, PortalError> {
        let text = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Ok(toml::from_str(&text)?)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }

    /// Copies the manifest into `editor` and stages its files. Relative file
    /// paths are taken from `base_dir`.
    pub fn apply(self, editor: &mut LessonEditor, base_dir: &Path) -> Result<(), PortalError> {
        if let Some(subcourse_id) = self.subcourse_id {
            editor.subcourse_id = Some(subcourse_id);
        }
        if let Some(title) = self.title {
            editor.title = title;
        }
        if let Some(slug) = self.slug {
            editor.slug = slug;
        }
        if let Some(overview) = self.overview {
            editor.overview = overview;
        }
        if let Some(status) = self.status {
            editor.status = status;
        }
        if let Some(objectives) = self.objectives {
            editor.objectives = objectives;
        }

        let mut staged = Vec::new();
        if let Some(file) = self.file {
            staged.push((FileKey::Lesson, file));
        }
        if let Some(entry) = self.preparation {
            editor.preparation = entry.record;
            if let Some(file) = entry.file {
                staged.push((FileKey::Preparation, file));
            }
        }

        take_list(self.models, &mut editor.models, ChildKind::Model, &mut staged);
        take_list(self.builds, &mut editor.builds, ChildKind::Build, &mut staged);
        take_list(self.content_blocks, &mut editor.content_blocks, ChildKind::ContentBlock, &mut staged);
        take_list(self.attachments, &mut editor.attachments, ChildKind::Attachment, &mut staged);
        take_list(self.challenges, &mut editor.challenges, ChildKind::Challenge, &mut staged);
        take_list(self.quizzes, &mut editor.quizzes, ChildKind::Quiz, &mut staged);

        for (key, path) in staged {
            let path = if path.is_absolute() { path } else { base_dir.join(path) };
            let file = StagedFile::open(&path)?;
            let preview = editor.stage_file(key, file)?;
            log::debug!("staged {} for {} as {}", path.display(), key, preview);
        }
        Ok(())
    }
}

fn take_list<T>(
    entries: Option<Vec<Entry<T>>>,
    target: &mut Vec<T>,
    kind: ChildKind,
    staged: &mut Vec<(FileKey, PathBuf)>,
) {
    let Some(entries) = entries else {
        return;
    };
    target.clear();
    for (index, entry) in entries.into_iter().enumerate() {
        if let Some(file) = entry.file {
            staged.push((FileKey::Child(kind, index), file));
        }
        target.push(entry.record);
    }
}
