use reqwest::Method;
use uuid::Uuid;

use crate::core::client::{AuthMode, PortalClient};
use crate::error::portal::PortalError;
use crate::model::program::Program;

pub struct ProgramsApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl ProgramsApi<'_> {
    pub async fn list(&self) -> Result<Vec<Program>, PortalError> {
        self.client.get_json("admin/programs", &[]).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Program, PortalError> {
        self.client.get_json(&format!("admin/programs/{}", id), &[]).await
    }

    pub async fn create(&self, program: &Program) -> Result<Program, PortalError> {
        self.client
            .send_json(Method::POST, "admin/programs", program, AuthMode::Session)
            .await
    }

    pub async fn update(&self, id: Uuid, program: &Program) -> Result<Program, PortalError> {
        self.client
            .send_json(Method::PUT, &format!("admin/programs/{}", id), program, AuthMode::Session)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), PortalError> {
        self.client.delete(&format!("admin/programs/{}", id)).await
    }
}
