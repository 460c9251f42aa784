use std::future::Future;

use crate::core::client::PortalClient;
use crate::core::staging::{PreviewRegistry, StagedFile};
use crate::core::validation::UploadPolicy;
use crate::error::portal::PortalError;
use crate::forms::FormOutcome;
use crate::model::media::{MediaOwner, MediaPurpose};

/// The single cover file slot of the program and subcourse forms.
#[derive(Debug, Default)]
pub struct CoverSlot {
    file: Option<StagedFile>,
    previews: PreviewRegistry<()>,
}

impl CoverSlot {
    /// Stages `file` after checking it against [`UploadPolicy::COVER`]. A rejected
    /// file also clears whatever was staged before.
    pub fn stage(&mut self, file: StagedFile) -> Result<&str, PortalError> {
        if let Err(err) = UploadPolicy::COVER.check(&file) {
            self.clear();
            return Err(err);
        }
        self.file = Some(file);
        self.previews.create(());
        Ok(self.previews.get(&()).unwrap_or_default())
    }

    pub fn clear(&mut self) {
        self.file = None;
        self.previews.revoke(&());
    }

    pub fn preview(&self) -> Option<&str> {
        self.previews.get(&())
    }

    pub fn file(&self) -> Option<&StagedFile> {
        self.file.as_ref()
    }

    /// Uploads the staged cover for `owner`, then reloads the record so it carries
    /// the stored media url. Upload failures do not undo the save: the record is
    /// returned as saved, with a warning.
    pub(crate) async fn upload_then_reload<T, F, Fut>(
        &mut self,
        client: &PortalClient,
        owner: MediaOwner,
        saved: T,
        reload: F,
    ) -> FormOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, PortalError>>,
    {
        let Some(file) = self.file.as_ref() else {
            return FormOutcome::clean(saved);
        };

        let uploaded = client.media().upload(owner, file, Some(MediaPurpose::Cover)).await;
        let result = match uploaded {
            Ok(_) => reload().await,
            Err(err) => Err(err),
        };

        match result {
            Ok(fresh) => {
                self.clear();
                FormOutcome::clean(fresh)
            }
            Err(err) => {
                log::warn!("cover upload for {} {} failed: {}", owner.owner_type, owner.owner_id, err);
                FormOutcome {
                    record: saved,
                    warning: Some(err.describe("Failed to upload media")),
                }
            }
        }
    }
}
