use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::core::client::PortalClient;
use crate::core::staging::{PreviewRegistry, StagedFile};
use crate::core::validation::{UploadPolicy, check_required, check_slug};
use crate::error::portal::{FieldErrors, PortalError};
use crate::model::lesson::{
    ChildKind, Lesson, LessonAttachment, LessonBuild, LessonChallenge, LessonChild,
    LessonContentBlock, LessonModel, LessonObjective, LessonPreparation, LessonQuiz,
};
use crate::model::media::{Media, MediaOwner, MediaOwnerType, retain_persisted};
use crate::model::status::PublishStatus;

/// Slot a staged file belongs to: the lesson itself, its preparation, or the
/// child at an index of one of its lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileKey {
    Lesson,
    Preparation,
    Child(ChildKind, usize),
}

impl FileKey {
    pub fn owner_type(&self) -> MediaOwnerType {
        match self {
            FileKey::Lesson => MediaOwnerType::Lesson,
            FileKey::Preparation => MediaOwnerType::LessonPreparation,
            FileKey::Child(kind, _) => kind.owner_type(),
        }
    }

    /// Parses `lesson`, `preparation` or `<kind>-<index>` (e.g. `content-block-2`).
    pub fn parse(text: &str) -> Option<FileKey> {
        match text {
            "lesson" => return Some(FileKey::Lesson),
            "preparation" => return Some(FileKey::Preparation),
            _ => {}
        }
        let (prefix, index) = text.rsplit_once('-')?;
        let index = index.parse().ok()?;
        ChildKind::ALL
            .into_iter()
            .find(|kind| kind.key_prefix() == prefix)
            .map(|kind| FileKey::Child(kind, index))
    }

    /// Server id of the record this key points at inside `lesson`.
    fn owner_id(&self, lesson: &Lesson) -> Option<Uuid> {
        match self {
            FileKey::Lesson => lesson.id,
            FileKey::Preparation => lesson.preparation.as_ref().and_then(|p| p.id),
            FileKey::Child(kind, index) => lesson.child_id(*kind, *index),
        }
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKey::Lesson => f.write_str("lesson"),
            FileKey::Preparation => f.write_str("preparation"),
            FileKey::Child(kind, index) => write!(f, "{}-{}", kind.key_prefix(), index),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditorTab {
    #[default]
    Basic,
    Objectives,
    Models,
    Preparation,
    Builds,
    Content,
    Attachments,
    Challenges,
    Quizzes,
}

impl EditorTab {
    pub const ALL: [EditorTab; 9] = [
        EditorTab::Basic,
        EditorTab::Objectives,
        EditorTab::Models,
        EditorTab::Preparation,
        EditorTab::Builds,
        EditorTab::Content,
        EditorTab::Attachments,
        EditorTab::Challenges,
        EditorTab::Quizzes,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EditorTab::Basic => "basic",
            EditorTab::Objectives => "objectives",
            EditorTab::Models => "models",
            EditorTab::Preparation => "preparation",
            EditorTab::Builds => "builds",
            EditorTab::Content => "content",
            EditorTab::Attachments => "attachments",
            EditorTab::Challenges => "challenges",
            EditorTab::Quizzes => "quizzes",
        }
    }

    pub fn from_label(label: &str) -> Option<EditorTab> {
        EditorTab::ALL.into_iter().find(|t| t.label() == label)
    }

    /// The child list edited on this tab, if it is a list tab.
    pub fn child_kind(&self) -> Option<ChildKind> {
        match self {
            EditorTab::Models => Some(ChildKind::Model),
            EditorTab::Builds => Some(ChildKind::Build),
            EditorTab::Content => Some(ChildKind::ContentBlock),
            EditorTab::Attachments => Some(ChildKind::Attachment),
            EditorTab::Challenges => Some(ChildKind::Challenge),
            EditorTab::Quizzes => Some(ChildKind::Quiz),
            EditorTab::Basic | EditorTab::Objectives | EditorTab::Preparation => None,
        }
    }
}

/// A lesson payload ready to send, with where each staged file's owner ends up.
#[derive(Debug)]
pub struct PreparedLesson {
    pub lesson: Lesson,
    /// Editor key to the key of the same record inside `lesson`. Children dropped
    /// for being empty shift later ones down, so the two can differ.
    pub positions: BTreeMap<FileKey, FileKey>,
}

/// Form state of the multi-tab lesson editor.
///
/// Files are staged locally under a [`FileKey`] and only uploaded once the
/// server has assigned ids to the records that will own them.
#[derive(Debug)]
pub struct LessonEditor {
    id: Option<Uuid>,
    pub subcourse_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub overview: String,
    pub status: PublishStatus,
    pub media: Vec<Media>,
    pub objectives: LessonObjective,
    pub models: Vec<LessonModel>,
    pub preparation: LessonPreparation,
    pub builds: Vec<LessonBuild>,
    pub content_blocks: Vec<LessonContentBlock>,
    pub attachments: Vec<LessonAttachment>,
    pub challenges: Vec<LessonChallenge>,
    pub quizzes: Vec<LessonQuiz>,
    active_tab: EditorTab,
    files: BTreeMap<FileKey, StagedFile>,
    previews: PreviewRegistry<FileKey>,
}

impl Default for LessonEditor {
    fn default() -> Self {
        LessonEditor::new()
    }
}

impl LessonEditor {
    /// Blank editor with one empty entry in every child list.
    pub fn new() -> Self {
        LessonEditor {
            id: None,
            subcourse_id: None,
            title: String::new(),
            slug: String::new(),
            overview: String::new(),
            status: PublishStatus::Draft,
            media: Vec::new(),
            objectives: LessonObjective::default(),
            models: vec![LessonModel::default()],
            preparation: LessonPreparation::default(),
            builds: vec![LessonBuild::default()],
            content_blocks: vec![LessonContentBlock::default()],
            attachments: vec![LessonAttachment::default()],
            challenges: vec![LessonChallenge::default()],
            quizzes: vec![LessonQuiz::default()],
            active_tab: EditorTab::Basic,
            files: BTreeMap::new(),
            previews: PreviewRegistry::new(),
        }
    }

    /// Editor for an existing lesson, children taken as the server sent them.
    pub fn edit(lesson: &Lesson) -> Self {
        let mut editor = LessonEditor::new();
        editor.id = lesson.id;
        editor.subcourse_id = Some(lesson.subcourse_id);
        editor.title = lesson.title.clone();
        editor.slug = lesson.slug.clone();
        editor.overview = lesson.overview.clone().unwrap_or_default();
        editor.status = lesson.status;
        editor.objectives = lesson.objectives.clone().unwrap_or_default();
        editor.load_children(lesson);
        editor
    }

    fn load_children(&mut self, lesson: &Lesson) {
        self.media = lesson.media.clone();
        self.models = lesson.models.clone();
        self.preparation = lesson.preparation.clone().unwrap_or_default();
        self.builds = lesson.builds.clone();
        self.content_blocks = lesson.content_blocks.clone();
        self.attachments = lesson.attachments.clone();
        self.challenges = lesson.challenges.clone();
        self.quizzes = lesson.quizzes.clone();
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn active_tab(&self) -> EditorTab {
        self.active_tab
    }

    pub fn set_tab(&mut self, tab: EditorTab) {
        self.active_tab = tab;
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

    /// Appends an empty child and returns its index.
    pub fn add_child(&mut self, kind: ChildKind) -> usize {
        match kind {
            ChildKind::Model => self.models.push(LessonModel::default()),
            ChildKind::Build => self.builds.push(LessonBuild::default()),
            ChildKind::ContentBlock => {
                let sort_order = self.content_blocks.len() as i32;
                self.content_blocks.push(LessonContentBlock { sort_order, ..Default::default() });
            }
            ChildKind::Attachment => {
                let sort_order = self.attachments.len() as i32;
                self.attachments.push(LessonAttachment { sort_order, ..Default::default() });
            }
            ChildKind::Challenge => {
                let sort_order = self.challenges.len() as i32;
                self.challenges.push(LessonChallenge { sort_order, ..Default::default() });
            }
            ChildKind::Quiz => self.quizzes.push(LessonQuiz::default()),
        }
        self.child_count(kind) - 1
    }

    /// Removes a child together with its staged file. Files staged for later
    /// children of the same list move down with them.
    pub fn remove_child(&mut self, kind: ChildKind, index: usize) -> bool {
        if index >= self.child_count(kind) {
            return false;
        }
        match kind {
            ChildKind::Model => {
                self.models.remove(index);
            }
            ChildKind::Build => {
                self.builds.remove(index);
            }
            ChildKind::ContentBlock => {
                self.content_blocks.remove(index);
            }
            ChildKind::Attachment => {
                self.attachments.remove(index);
            }
            ChildKind::Challenge => {
                self.challenges.remove(index);
            }
            ChildKind::Quiz => {
                self.quizzes.remove(index);
            }
        }

        self.remove_file(FileKey::Child(kind, index));
        let shifted: Vec<usize> = self
            .files
            .keys()
            .filter_map(|key| match key {
                FileKey::Child(k, i) if *k == kind && *i > index => Some(*i),
                _ => None,
            })
            .collect();
        for i in shifted {
            let from = FileKey::Child(kind, i);
            let to = FileKey::Child(kind, i - 1);
            if let Some(file) = self.files.remove(&from) {
                self.files.insert(to, file);
            }
            self.previews.rekey(&from, to);
        }
        true
    }

    fn key_exists(&self, key: FileKey) -> bool {
        match key {
            FileKey::Lesson | FileKey::Preparation => true,
            FileKey::Child(kind, index) => index < self.child_count(kind),
        }
    }

    /// Stages `file` for upload under `key` and returns its preview url.
    pub fn stage_file(&mut self, key: FileKey, file: StagedFile) -> Result<String, PortalError> {
        if !self.key_exists(key) {
            return Err(PortalError::new(&format!("no {} entry to attach a file to", key)));
        }
        UploadPolicy::LESSON_ASSET.check(&file)?;
        self.files.insert(key, file);
        Ok(self.previews.create(key))
    }

    pub fn remove_file(&mut self, key: FileKey) -> bool {
        self.previews.revoke(&key);
        self.files.remove(&key).is_some()
    }

    pub fn staged_file(&self, key: FileKey) -> Option<&StagedFile> {
        self.files.get(&key)
    }

    pub fn staged_keys(&self) -> Vec<FileKey> {
        self.files.keys().copied().collect()
    }

    pub fn preview(&self, key: FileKey) -> Option<&str> {
        self.previews.get(&key)
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.subcourse_id.is_none() {
            errors.insert("subcourse_id", "Subcourse is required");
        }
        check_required("title", &self.title, "Title is required", &mut errors);
        check_slug(&self.slug, &mut errors);
        errors
    }

    /// Builds the request body.
    ///
    /// Untitled children without a staged file are dropped, untitled ones with a
    /// file get a generated title. Preview media never leave the editor. On
    /// create, no client-side ids are sent.
    pub fn payload(&self) -> Result<PreparedLesson, PortalError> {
        let subcourse_id = self
            .subcourse_id
            .ok_or_else(|| PortalError::new("subcourse is required"))?;
        let creating = self.id.is_none();
        let mut positions = BTreeMap::new();

        let mut objectives = self.objectives.clone();
        let mut preparation = self.preparation.clone();
        let mut media = self.media.clone();
        retain_persisted(&mut preparation.media);
        retain_persisted(&mut media);
        if creating {
            objectives.id = None;
            objectives.lesson_id = None;
            preparation.id = None;
            preparation.lesson_id = None;
        }
        for key in [FileKey::Lesson, FileKey::Preparation] {
            if self.files.contains_key(&key) {
                positions.insert(key, key);
            }
        }

        let lesson = Lesson {
            subcourse_id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            overview: Some(self.overview.clone()),
            status: self.status,
            media,
            objectives: Some(objectives),
            preparation: Some(preparation),
            models: prepare_children(&self.models, &self.files, creating, &mut positions),
            builds: prepare_children(&self.builds, &self.files, creating, &mut positions),
            content_blocks: prepare_children(&self.content_blocks, &self.files, creating, &mut positions),
            attachments: prepare_children(&self.attachments, &self.files, creating, &mut positions),
            challenges: prepare_children(&self.challenges, &self.files, creating, &mut positions),
            quizzes: prepare_children(&self.quizzes, &self.files, creating, &mut positions),
            ..Default::default()
        };

        Ok(PreparedLesson { lesson, positions })
    }

    /// Saves the lesson, then uploads staged files to the records the server created.
    ///
    /// New lessons are created first so their children get ids; existing lessons
    /// are updated and re-read, since an update replaces every child. The editor is
    /// reloaded from the returned lesson.
    pub async fn submit(&mut self, client: &PortalClient) -> Result<Lesson, PortalError> {
        self.validate().into_result()?;
        let PreparedLesson { lesson: payload, positions } = self.payload()?;

        let creating = self.id.is_none();
        let saved = match self.id {
            None => {
                let created = client.lessons().create(&payload).await?;
                log::info!("created lesson {} ({:?})", created.slug, created.id);
                created
            }
            Some(id) => {
                let updated = client.lessons().update(id, &payload).await?;
                log::info!("updated lesson {}", id);
                updated
            }
        };
        self.id = saved.id.or(self.id);

        let Some(lesson_id) = self.id else {
            return Err(PortalError::new("server did not return a lesson id"));
        };

        if self.files.is_empty() {
            self.load_children(&saved);
            return Ok(saved);
        }

        // A create answers with the new child ids; an update recreates children,
        // so the ids have to be read back first.
        let authoritative = if creating {
            saved
        } else {
            client.lessons().get(lesson_id).await?
        };
        if let Err(err) = self.upload_staged(client, &authoritative, &positions).await {
            // The server rebuilds media from the next payload, so the editor has
            // to carry whatever already landed before a retry.
            let latest = match client.lessons().get(lesson_id).await {
                Ok(latest) => latest,
                Err(reload_err) => {
                    log::warn!("failed to reload lesson {} after a failed upload: {}", lesson_id, reload_err);
                    authoritative
                }
            };
            self.load_children(&latest);
            self.move_staged_to(&positions);
            return Err(err);
        }

        let fresh = match client.lessons().get(lesson_id).await {
            Ok(fresh) => fresh,
            Err(err) => {
                log::warn!("failed to reload lesson {} after upload: {}", lesson_id, err);
                authoritative
            }
        };
        self.load_children(&fresh);
        Ok(fresh)
    }

    /// Re-keys the files still staged from editor positions to the positions
    /// they had in the saved payload, matching a list reloaded from the server.
    fn move_staged_to(&mut self, positions: &BTreeMap<FileKey, FileKey>) {
        // targets never exceed their source, so ascending order cannot collide
        for key in self.staged_keys() {
            let Some(&to) = positions.get(&key) else {
                continue;
            };
            if to == key {
                continue;
            }
            if let Some(file) = self.files.remove(&key) {
                self.files.insert(to, file);
            }
            self.previews.rekey(&key, to);
        }
    }

    async fn upload_staged(
        &mut self,
        client: &PortalClient,
        owner_lesson: &Lesson,
        positions: &BTreeMap<FileKey, FileKey>,
    ) -> Result<(), PortalError> {
        for key in self.staged_keys() {
            let target = positions.get(&key).copied().unwrap_or(key);
            let owner_id = target
                .owner_id(owner_lesson)
                .ok_or_else(|| PortalError::MissingOwner(target.to_string()))?;
            let Some(file) = self.files.get(&key) else {
                continue;
            };
            let owner = MediaOwner::new(target.owner_type(), owner_id);
            client.media().upload(owner, file, None).await?;
            self.remove_file(key);
        }
        Ok(())
    }
}

fn prepare_children<T: LessonChild + Clone>(
    items: &[T],
    files: &BTreeMap<FileKey, StagedFile>,
    creating: bool,
    positions: &mut BTreeMap<FileKey, FileKey>,
) -> Vec<T> {
    let mut prepared = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let key = FileKey::Child(T::KIND, index);
        let has_file = files.contains_key(&key);
        if item.title().trim().is_empty() && !has_file {
            continue;
        }

        let mut item = item.clone();
        if item.title().trim().is_empty() {
            item.set_title(format!("Auto {} {}", T::KIND.label(), index + 1));
        }
        retain_persisted(item.media_mut());
        if creating {
            item.clear_ids();
        }
        if has_file {
            positions.insert(key, FileKey::Child(T::KIND, prepared.len()));
        }
        prepared.push(item);
    }
    prepared
}
