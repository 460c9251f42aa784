use uuid::Uuid;

use crate::core::client::PortalClient;
use crate::core::staging::StagedFile;
use crate::core::validation::{check_required, check_slug};
use crate::error::portal::{FieldErrors, PortalError};
use crate::forms::FormOutcome;
use crate::forms::cover::CoverSlot;
use crate::model::media::{MediaOwner, MediaOwnerType};
use crate::model::program::Program;
use crate::model::status::PublishStatus;

#[derive(Debug, Default)]
pub struct ProgramForm {
    pub id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub short_description: String,
    pub status: PublishStatus,
    pub sort_order: i32,
    cover: CoverSlot,
}

impl ProgramForm {
    pub fn new() -> Self {
        ProgramForm::default()
    }

    pub fn edit(program: &Program) -> Self {
        ProgramForm {
            id: program.id,
            name: program.name.clone(),
            slug: program.slug.clone(),
            short_description: program.short_description.clone().unwrap_or_default(),
            status: program.status,
            sort_order: program.sort_order.unwrap_or_default(),
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
        check_required("name", &self.name, "Name is required", &mut errors);
        check_slug(&self.slug, &mut errors);
        errors
    }

    pub fn payload(&self) -> Program {
        Program {
            name: self.name.clone(),
            slug: self.slug.clone(),
            short_description: Some(self.short_description.clone()),
            status: self.status,
            sort_order: Some(self.sort_order),
            ..Default::default()
        }
    }

    /// Creates or updates the program, then uploads the staged cover.
    pub async fn submit(&mut self, client: &PortalClient) -> Result<FormOutcome<Program>, PortalError> {
        self.validate().into_result()?;

        let payload = self.payload();
        let saved = match self.id {
            Some(id) => client.programs().update(id, &payload).await?,
            None => client.programs().create(&payload).await?,
        };
        self.id = saved.id;

        let Some(id) = saved.id else {
            return Ok(FormOutcome::clean(saved));
        };
        let owner = MediaOwner::new(MediaOwnerType::Program, id);
        let outcome = self
            .cover
            .upload_then_reload(client, owner, saved, || async move { client.programs().get(id).await })
            .await;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_requires_name_and_clean_slug() {
        let form = ProgramForm { slug: "Bad Slug".into(), ..Default::default() };
        let errors = form.validate();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert!(errors.get("slug").is_some());

        let form = ProgramForm { name: "Robotics".into(), slug: "robotics".into(), ..Default::default() };
        assert!(form.validate().is_empty());
    }

    #[test]
    fn payload_never_carries_an_id_or_media() {
        let program = Program {
            id: Some(Uuid::new_v4()),
            name: "Robotics".into(),
            slug: "robotics".into(),
            media: vec![Default::default()],
            ..Default::default()
        };
        let form = ProgramForm::edit(&program);
        let payload = form.payload();
        assert!(payload.id.is_none());
        assert!(payload.media.is_empty());
        assert_eq!(form.id, program.id);
    }
}
