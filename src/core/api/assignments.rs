use reqwest::Method;
use uuid::Uuid;

use crate::core::client::{AuthMode, PortalClient};
use crate::error::portal::PortalError;
use crate::model::teacher::{
    AssignmentWindow, AssignmentsEnvelope, NewAssignment, ProgramAssignmentsBody,
    SubcourseAssignmentsBody, TeacherAssignment,
};

pub struct AssignmentsApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl AssignmentsApi<'_> {
    pub async fn list(&self) -> Result<Vec<TeacherAssignment>, PortalError> {
        self.client.get_json("admin/teacher-assignments", &[]).await
    }

    pub async fn create(&self, assignment: &NewAssignment) -> Result<TeacherAssignment, PortalError> {
        self.client
            .send_json(Method::POST, "admin/teacher-assignments", assignment, AuthMode::Session)
            .await
    }

    pub async fn revoke(&self, id: Uuid) -> Result<(), PortalError> {
        self.client.delete(&format!("admin/teacher-assignments/{}", id)).await
    }

    /// Replaces the teacher's program-scoped assignments with `program_ids`.
    pub async fn assign_programs(
        &self,
        teacher_id: Uuid,
        program_ids: &[Uuid],
        window: AssignmentWindow,
    ) -> Result<Vec<TeacherAssignment>, PortalError> {
        let body = ProgramAssignmentsBody { program_ids, window };
        let envelope: AssignmentsEnvelope = self
            .client
            .send_json(
                Method::PUT,
                &format!("admin/teachers/{}/program-assignments", teacher_id),
                &body,
                AuthMode::Session,
            )
            .await?;
        Ok(envelope.assignments)
    }

    /// Replaces the teacher's subcourse-scoped assignments with `subcourse_ids`.
    pub async fn assign_subcourses(
        &self,
        teacher_id: Uuid,
        subcourse_ids: &[Uuid],
        window: AssignmentWindow,
    ) -> Result<Vec<TeacherAssignment>, PortalError> {
        let body = SubcourseAssignmentsBody { subcourse_ids, window };
        let envelope: AssignmentsEnvelope = self
            .client
            .send_json(
                Method::PUT,
                &format!("admin/teachers/{}/subcourse-assignments", teacher_id),
                &body,
                AuthMode::Session,
            )
            .await?;
        Ok(envelope.assignments)
    }

    /// Active assignments of one teacher.
    pub async fn for_teacher(&self, teacher_id: Uuid) -> Result<Vec<TeacherAssignment>, PortalError> {
        let envelope: AssignmentsEnvelope = self
            .client
            .get_json(&format!("admin/teachers/{}/assignments", teacher_id), &[])
            .await?;
        Ok(envelope.assignments)
    }
}
