//! Endpoint groups of the portal API.
//!
//! Admin groups (`programs`, `subcourses`, `lessons`, `teachers`, `assignments`,
//! `media`) require a logged-in user; `catalog` is the public read-only surface.

pub mod assignments;
pub mod auth;
pub mod catalog;
pub mod lessons;
pub mod media;
pub mod programs;
pub mod subcourses;
pub mod teachers;

use crate::core::client::PortalClient;

impl PortalClient {
    pub fn auth(&self) -> auth::AuthApi<'_> {
        auth::AuthApi { client: self }
    }

    pub fn programs(&self) -> programs::ProgramsApi<'_> {
        programs::ProgramsApi { client: self }
    }

    pub fn subcourses(&self) -> subcourses::SubcoursesApi<'_> {
        subcourses::SubcoursesApi { client: self }
    }

    pub fn lessons(&self) -> lessons::LessonsApi<'_> {
        lessons::LessonsApi { client: self }
    }

    pub fn catalog(&self) -> catalog::CatalogApi<'_> {
        catalog::CatalogApi { client: self }
    }

    pub fn teachers(&self) -> teachers::TeachersApi<'_> {
        teachers::TeachersApi { client: self }
    }

    pub fn assignments(&self) -> assignments::AssignmentsApi<'_> {
        assignments::AssignmentsApi { client: self }
    }

    pub fn media(&self) -> media::MediaApi<'_> {
        media::MediaApi { client: self }
    }
}
