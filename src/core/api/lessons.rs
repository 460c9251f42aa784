use reqwest::Method;
use uuid::Uuid;

use crate::core::client::{AuthMode, PortalClient};
use crate::error::portal::PortalError;
use crate::model::lesson::Lesson;

pub struct LessonsApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl LessonsApi<'_> {
    pub async fn list(&self, subcourse_id: Option<Uuid>) -> Result<Vec<Lesson>, PortalError> {
        let query: Vec<(&str, String)> = subcourse_id
            .map(|id| vec![("subcourse_id", id.to_string())])
            .unwrap_or_default();
        self.client.get_json("admin/lessons", &query).await
    }

    /// Full lesson including every child record and its media.
    pub async fn get(&self, id: Uuid) -> Result<Lesson, PortalError> {
        self.client.get_json(&format!("admin/lessons/{}", id), &[]).await
    }

    pub async fn by_subcourse(&self, subcourse_id: Uuid) -> Result<Vec<Lesson>, PortalError> {
        self.client
            .get_json(&format!("admin/subcourses/{}/lessons", subcourse_id), &[])
            .await
    }

    pub async fn create(&self, lesson: &Lesson) -> Result<Lesson, PortalError> {
        self.client
            .send_json(Method::POST, "admin/lessons", lesson, AuthMode::Session)
            .await
    }

    pub async fn update(&self, id: Uuid, lesson: &Lesson) -> Result<Lesson, PortalError> {
        self.client
            .send_json(Method::PUT, &format!("admin/lessons/{}", id), lesson, AuthMode::Session)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), PortalError> {
        self.client.delete(&format!("admin/lessons/{}", id)).await
    }
}
