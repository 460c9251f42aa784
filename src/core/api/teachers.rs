use reqwest::Method;
use uuid::Uuid;

use crate::core::client::{AuthMode, PortalClient};
use crate::error::portal::PortalError;
use crate::model::teacher::{LessonHistoryItem, NewTeacher, Teacher, TeacherLessonHistory};

pub struct TeachersApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl TeachersApi<'_> {
    pub async fn list(&self) -> Result<Vec<Teacher>, PortalError> {
        self.client.get_json("admin/teachers", &[]).await
    }

    pub async fn create(&self, teacher: &NewTeacher) -> Result<Teacher, PortalError> {
        self.client
            .send_json(Method::POST, "admin/teachers", teacher, AuthMode::Session)
            .await
    }

    /// Lessons authored by any teacher, most recently updated first.
    pub async fn history(&self) -> Result<Vec<TeacherLessonHistory>, PortalError> {
        let history: Option<Vec<TeacherLessonHistory>> =
            self.client.get_json("admin/teachers/history", &[]).await?;
        Ok(history.unwrap_or_default())
    }

    pub async fn lesson_history(&self, teacher_id: Uuid) -> Result<Vec<LessonHistoryItem>, PortalError> {
        let items: Option<Vec<LessonHistoryItem>> = self
            .client
            .get_json(&format!("admin/teachers/{}/lesson-history", teacher_id), &[])
            .await?;
        Ok(items.unwrap_or_default())
    }
}
