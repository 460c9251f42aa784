use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::core::client::PortalClient;
use crate::core::staging::StagedFile;
use crate::error::portal::PortalError;
use crate::model::media::{Media, MediaOwner, MediaPurpose};

pub struct MediaApi<'a> {
    pub(crate) client: &'a PortalClient,
}

#[derive(Deserialize, Debug, Default)]
struct UploadResponse {
    #[serde(default, deserialize_with = "crate::model::null_as_empty")]
    media: Vec<Media>,
}

impl MediaApi<'_> {
    /// `POST /admin/media/upload` as multipart. The server checks that the owner exists.
    pub async fn upload(
        &self,
        owner: MediaOwner,
        file: &StagedFile,
        purpose: Option<MediaPurpose>,
    ) -> Result<Vec<Media>, PortalError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)?;

        let mut form = Form::new()
            .text("owner_type", owner.owner_type.as_str())
            .text("owner_id", owner.owner_id.to_string());
        if let Some(purpose) = purpose {
            form = form.text("purpose", purpose.as_str());
        }
        let form = form.part("file", part);

        log::info!("uploading {} for {} {}", file.file_name, owner.owner_type, owner.owner_id);
        let response: UploadResponse = self.client.post_multipart("admin/media/upload", form).await?;
        Ok(response.media)
    }
}
