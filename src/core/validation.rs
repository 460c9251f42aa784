use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::staging::StagedFile;
use crate::error::portal::{FieldErrors, PortalError};

static SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("static regex"));

const MIB: u64 = 1024 * 1024;

/// Checks a slug and records the problem under `slug`.
pub fn check_slug(slug: &str, errors: &mut FieldErrors) {
    if slug.trim().is_empty() {
        errors.insert("slug", "Slug is required");
    } else if !SLUG.is_match(slug) {
        errors.insert("slug", "Slug may contain only lowercase letters, numbers and hyphens");
    }
}

pub fn check_required(field: &'static str, value: &str, message: &str, errors: &mut FieldErrors) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

/// Lowercases `text` and joins its alphanumeric runs with hyphens.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Which files an upload slot accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    pub mime_prefixes: &'static [&'static str],
    pub max_bytes: u64,
    pub description: &'static str,
}

impl UploadPolicy {
    /// Program and subcourse covers.
    pub const COVER: UploadPolicy = UploadPolicy {
        mime_prefixes: &["image/", "video/"],
        max_bytes: 8 * MIB,
        description: "image or video",
    };

    /// Any file attached inside the lesson editor.
    pub const LESSON_ASSET: UploadPolicy = UploadPolicy {
        mime_prefixes: &["image/", "video/", "application/pdf"],
        max_bytes: 50 * MIB,
        description: "image, video or PDF",
    };

    pub fn check(&self, file: &StagedFile) -> Result<(), PortalError> {
        if !self.mime_prefixes.iter().any(|p| file.mime_type.starts_with(p)) {
            return Err(PortalError::FileRejected(format!(
                "{}: only {} files are allowed (got {})",
                file.file_name, self.description, file.mime_type
            )));
        }
        if file.size() > self.max_bytes {
            return Err(PortalError::FileRejected(format!(
                "{}: file is too large (max {}MB)",
                file.file_name,
                self.max_bytes / MIB
            )));
        }
        Ok(())
    }
}
