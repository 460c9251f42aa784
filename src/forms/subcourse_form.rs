use uuid::Uuid;

use crate::core::client::PortalClient;
use crate::core::staging::StagedFile;
use crate::core::validation::{check_required, check_slug};
use crate::error::portal::{FieldErrors, PortalError};
use crate::forms::FormOutcome;
use crate::forms::cover::CoverSlot;
use crate::model::media::{MediaOwner, MediaOwnerType};
use crate::model::status::PublishStatus;
use crate::model::subcourse::Subcourse;

#[derive(Debug, Default)]
pub struct SubcourseForm {
    pub id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub age_range: String,
    pub status: PublishStatus,
    cover: CoverSlot,
}

impl SubcourseForm {
    pub fn new(program_id: Option<Uuid>) -> Self {
        SubcourseForm { program_id, ..Default::default() }
    }

    pub fn edit(subcourse: &Subcourse) -> Self {
        SubcourseForm {
            id: subcourse.id,
            program_id: Some(subcourse.program_id),
            name: subcourse.name.clone(),
            slug: subcourse.slug.clone(),
            age_range: subcourse.age_range.clone().unwrap_or_default(),
            status: subcourse.status,
            cover: CoverSlot::default(),
        }
    }

    pub fn set_cover(&mut self, file: StagedFile) -> Result<&str, PortalError> {
        self.cover.stage(file)
    }

    pub fn cover(&self) -> &CoverSlot {
        &self.cover
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.program_id.is_none() {
            errors.insert("program_id", "Program is required");
        }
        check_required("name", &self.name, "Name is required", &mut errors);
        check_slug(&self.slug, &mut errors);
        errors
    }

    pub fn payload(&self) -> Result<Subcourse, PortalError> {
        let program_id = self
            .program_id
            .ok_or_else(|| PortalError::new("program is required"))?;
        Ok(Subcourse {
            program_id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            age_range: Some(self.age_range.clone()),
            status: self.status,
            ..Default::default()
        })
    }

    pub async fn submit(&mut self, client: &PortalClient) -> Result<FormOutcome<Subcourse>, PortalError> {
        self.validate().into_result()?;

        let payload = self.payload()?;
        let saved = match self.id {
            Some(id) => client.subcourses().update(id, &payload).await?,
            None => client.subcourses().create(&payload).await?,
        };
        self.id = saved.id;

        let Some(id) = saved.id else {
            return Ok(FormOutcome::clean(saved));
        };
        let owner = MediaOwner::new(MediaOwnerType::Subcourse, id);
        let outcome = self
            .cover
            .upload_then_reload(client, owner, saved, || async move { client.subcourses().get(id).await })
            .await;
        Ok(outcome)
    }
}
