use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::portal::PortalError;
use crate::model::media::LOCAL_PREVIEW_SCHEME;

/// A local file picked for upload but not yet sent.
#[derive(Clone, Debug)]
pub struct StagedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    /// Reads the file and works out its MIME type from its content, falling back
    /// to the extension for formats without a magic number.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PortalError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = sniff_mime(&bytes, path);
        log::debug!("staged {} ({}, {} bytes)", path.display(), mime_type, bytes.len());
        Ok(StagedFile { path: path.to_path_buf(), file_name, mime_type, bytes })
    }

    pub fn from_bytes(file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        StagedFile {
            path: PathBuf::from(file_name),
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn sniff_mime(bytes: &[u8], path: &Path) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Local preview handles for staged files, one per key.
///
/// A preview url (`blob:<uuid>`) is live from `create` until it is revoked,
/// replaced under the same key, or the registry is dropped.
#[derive(Debug)]
pub struct PreviewRegistry<K: Eq + Hash + Clone> {
    live: HashMap<K, String>,
    revoked: Vec<String>,
}

impl<K: Eq + Hash + Clone> Default for PreviewRegistry<K> {
    fn default() -> Self {
        PreviewRegistry { live: HashMap::new(), revoked: Vec::new() }
    }
}

impl<K: Eq + Hash + Clone> PreviewRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh preview url for `key`, revoking whatever it replaced.
    pub fn create(&mut self, key: K) -> String {
        let url = format!("{}{}", LOCAL_PREVIEW_SCHEME, Uuid::new_v4());
        if let Some(old) = self.live.insert(key, url.clone()) {
            self.revoked.push(old);
        }
        url
    }

    pub fn revoke(&mut self, key: &K) -> bool {
        match self.live.remove(key) {
            Some(url) => {
                self.revoked.push(url);
                true
            }
            None => false,
        }
    }

    pub fn revoke_all(&mut self) {
        let urls: Vec<String> = self.live.drain().map(|(_, url)| url).collect();
        self.revoked.extend(urls);
    }

    pub fn get(&self, key: &K) -> Option<&str> {
        self.live.get(key).map(String::as_str)
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.values().any(|u| u == url)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Moves the preview held under `from` to `to`, dropping any preview at `to`.
    pub fn rekey(&mut self, from: &K, to: K) {
        if let Some(url) = self.live.remove(from) {
            if let Some(old) = self.live.insert(to, url) {
                self.revoked.push(old);
            }
        }
    }

    /// Urls revoked so far, oldest first.
    pub fn revoked(&self) -> &[String] {
        &self.revoked
    }
}

impl<K: Eq + Hash + Clone> Drop for PreviewRegistry<K> {
    fn drop(&mut self) {
        if !self.live.is_empty() {
            log::debug!("releasing {} preview(s)", self.live.len());
        }
        self.revoke_all();
    }
}
