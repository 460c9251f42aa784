use reqwest::Method;
use uuid::Uuid;

use crate::core::client::{AuthMode, PortalClient};
use crate::error::portal::PortalError;
use crate::model::subcourse::Subcourse;

pub struct SubcoursesApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl SubcoursesApi<'_> {
    /// All subcourses the caller may manage, optionally narrowed to one program.
    pub async fn list(&self, program_id: Option<Uuid>) -> Result<Vec<Subcourse>, PortalError> {
        let query: Vec<(&str, String)> = program_id
            .map(|id| vec![("program_id", id.to_string())])
            .unwrap_or_default();
        self.client.get_json("admin/subcourses", &query).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Subcourse, PortalError> {
        self.client.get_json(&format!("admin/subcourses/{}", id), &[]).await
    }

    pub async fn by_program(&self, program_id: Uuid) -> Result<Vec<Subcourse>, PortalError> {
        self.client
            .get_json(&format!("admin/programs/{}/subcourses", program_id), &[])
            .await
    }

    pub async fn create(&self, subcourse: &Subcourse) -> Result<Subcourse, PortalError> {
        self.client
            .send_json(Method::POST, "admin/subcourses", subcourse, AuthMode::Session)
            .await
    }

    pub async fn update(&self, id: Uuid, subcourse: &Subcourse) -> Result<Subcourse, PortalError> {
        self.client
            .send_json(Method::PUT, &format!("admin/subcourses/{}", id), subcourse, AuthMode::Session)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), PortalError> {
        self.client.delete(&format!("admin/subcourses/{}", id)).await
    }
}
