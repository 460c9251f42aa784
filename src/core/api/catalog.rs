use futures::future::try_join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::core::client::PortalClient;
use crate::error::portal::PortalError;
use crate::model::lesson::Lesson;
use crate::model::program::Program;
use crate::model::subcourse::Subcourse;

/// Public, read-only browsing. Works without a token.
pub struct CatalogApi<'a> {
    pub(crate) client: &'a PortalClient,
}

/// A program together with its subcourses.
#[derive(Serialize, Debug)]
pub struct ProgramBranch {
    pub program: Program,
    pub subcourses: Vec<Subcourse>,
}

impl CatalogApi<'_> {
    pub async fn programs(&self) -> Result<Vec<Program>, PortalError> {
        self.client.get_json("programs", &[]).await
    }

    pub async fn program(&self, id: Uuid) -> Result<Program, PortalError> {
        self.client.get_json(&format!("programs/{}", id), &[]).await
    }

    pub async fn subcourses(&self, program_id: Option<Uuid>) -> Result<Vec<Subcourse>, PortalError> {
        let query: Vec<(&str, String)> = program_id
            .map(|id| vec![("program_id", id.to_string())])
            .unwrap_or_default();
        self.client.get_json("subcourses", &query).await
    }

    pub async fn subcourses_by_program(&self, program_id: Uuid) -> Result<Vec<Subcourse>, PortalError> {
        self.client
            .get_json(&format!("programs/{}/subcourses", program_id), &[])
            .await
    }

    pub async fn subcourse(&self, id: Uuid) -> Result<Subcourse, PortalError> {
        self.client.get_json(&format!("subcourses/{}", id), &[]).await
    }

    pub async fn lessons(&self, subcourse_id: Option<Uuid>) -> Result<Vec<Lesson>, PortalError> {
        let query: Vec<(&str, String)> = subcourse_id
            .map(|id| vec![("subcourse_id", id.to_string())])
            .unwrap_or_default();
        self.client.get_json("lessons", &query).await
    }

    pub async fn lessons_by_subcourse(&self, subcourse_id: Uuid) -> Result<Vec<Lesson>, PortalError> {
        self.client
            .get_json(&format!("subcourses/{}/lessons", subcourse_id), &[])
            .await
    }

    pub async fn lesson(&self, id: Uuid) -> Result<Lesson, PortalError> {
        self.client.get_json(&format!("lessons/{}", id), &[]).await
    }

    /// Subcourses of one program via its nested route, or every subcourse.
    pub async fn browse_subcourses(&self, program_id: Option<Uuid>) -> Result<Vec<Subcourse>, PortalError> {
        match program_id {
            Some(id) => self.subcourses_by_program(id).await,
            None => self.subcourses(None).await,
        }
    }

    /// Lessons of one subcourse via its nested route, or every lesson.
    pub async fn browse_lessons(&self, subcourse_id: Option<Uuid>) -> Result<Vec<Lesson>, PortalError> {
        match subcourse_id {
            Some(id) => self.lessons_by_subcourse(id).await,
            None => self.lessons(None).await,
        }
    }

    /// Every program with its subcourses, fetched concurrently.
    pub async fn tree(&self) -> Result<Vec<ProgramBranch>, PortalError> {
        let programs = self.programs().await?;
        let branches = programs.into_iter().map(|program| async move {
            let subcourses = match program.id {
                Some(id) => self.subcourses_by_program(id).await?,
                None => Vec::new(),
            };
            Ok::<_, PortalError>(ProgramBranch { program, subcourses })
        });
        try_join_all(branches).await
    }
}
