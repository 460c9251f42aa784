use std::fmt;

use uuid::Uuid;

use crate::core::session::SessionState;
use crate::error::portal::PortalError;
use crate::model::user::User;

/// Every page of the portal, public and admin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Elementary,
    Login,
    Programs,
    ProgramSubcourses(Uuid),
    Subcourses,
    SubcourseLessons(Uuid),
    Lessons,
    Lesson(Uuid),
    Admin(AdminRoute),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminRoute {
    Home,
    Programs,
    Program(Uuid),
    ProgramSubcourses(Uuid),
    Subcourses,
    SubcourseLessons(Uuid),
    Lessons,
    Lesson(Uuid),
    Teachers,
    TeacherHistory,
}

/// Areas of the admin console, each with its own visibility rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Programs,
    Subcourses,
    Lessons,
    Teachers,
    TeacherHistory,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Dashboard,
        Section::Programs,
        Section::Subcourses,
        Section::Lessons,
        Section::Teachers,
        Section::TeacherHistory,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Programs => "Programs",
            Section::Subcourses => "Subcourses",
            Section::Lessons => "Lessons",
            Section::Teachers => "Teachers",
            Section::TeacherHistory => "Teacher history",
        }
    }

    pub fn is_visible_to(&self, user: &User) -> bool {
        if user.is_admin() {
            return true;
        }
        match self {
            Section::Dashboard => true,
            Section::Programs | Section::Teachers | Section::TeacherHistory => false,
            Section::Subcourses => user.has_program_assignment(),
            Section::Lessons => user.has_any_assignment(),
        }
    }
}

/// Sections shown in the admin menu for `user`.
pub fn visible_sections(user: &User) -> Vec<Section> {
    Section::ALL
        .into_iter()
        .filter(|s| s.is_visible_to(user))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// The session is still being restored; decide later.
    Pending,
    Redirect { to: Route, forbidden: bool },
}

impl AdminRoute {
    pub fn section(&self) -> Section {
        match self {
            AdminRoute::Home => Section::Dashboard,
            AdminRoute::Programs | AdminRoute::Program(_) => Section::Programs,
            AdminRoute::ProgramSubcourses(_) | AdminRoute::Subcourses => Section::Subcourses,
            AdminRoute::SubcourseLessons(_) | AdminRoute::Lessons | AdminRoute::Lesson(_) => {
                Section::Lessons
            }
            AdminRoute::Teachers => Section::Teachers,
            AdminRoute::TeacherHistory => Section::TeacherHistory,
        }
    }
}

impl Route {
    pub fn is_public(&self) -> bool {
        !matches!(self, Route::Admin(_))
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Elementary => "/elementary".into(),
            Route::Login => "/login".into(),
            Route::Programs => "/programs".into(),
            Route::ProgramSubcourses(id) => format!("/programs/{}/subcourses", id),
            Route::Subcourses => "/subcourses".into(),
            Route::SubcourseLessons(id) => format!("/subcourses/{}/lessons", id),
            Route::Lessons => "/lessons".into(),
            Route::Lesson(id) => format!("/lessons/{}", id),
            Route::Admin(admin) => match admin {
                AdminRoute::Home => "/admin".into(),
                AdminRoute::Programs => "/admin/programs".into(),
                AdminRoute::Program(id) => format!("/admin/programs/{}", id),
                AdminRoute::ProgramSubcourses(id) => format!("/admin/programs/{}/subcourses", id),
                AdminRoute::Subcourses => "/admin/subcourses".into(),
                AdminRoute::SubcourseLessons(id) => format!("/admin/subcourses/{}/lessons", id),
                AdminRoute::Lessons => "/admin/lessons".into(),
                AdminRoute::Lesson(id) => format!("/admin/lessons/{}", id),
                AdminRoute::Teachers => "/admin/teachers".into(),
                AdminRoute::TeacherHistory => "/admin/teacher-history".into(),
            },
        }
    }

    /// Path of a redirect target, flagged so the page can explain the bounce.
    pub fn with_forbidden_flag(&self) -> String {
        format!("{}?forbidden=1", self.path())
    }

    /// Parses a portal path. Query strings and a trailing slash are ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let id = |s: &str| Uuid::parse_str(s).ok();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["elementary"] => Route::Elementary,
            ["login"] => Route::Login,
            ["programs"] => Route::Programs,
            ["programs", p, "subcourses"] => Route::ProgramSubcourses(id(p)?),
            ["subcourses"] => Route::Subcourses,
            ["subcourses", s, "lessons"] => Route::SubcourseLessons(id(s)?),
            ["lessons"] => Route::Lessons,
            ["lessons", l] => Route::Lesson(id(l)?),
            ["admin"] | ["admin", "home"] => Route::Admin(AdminRoute::Home),
            ["admin", "programs"] => Route::Admin(AdminRoute::Programs),
            ["admin", "programs", p] => Route::Admin(AdminRoute::Program(id(p)?)),
            ["admin", "programs", p, "subcourses"] => Route::Admin(AdminRoute::ProgramSubcourses(id(p)?)),
            ["admin", "subcourses"] => Route::Admin(AdminRoute::Subcourses),
            ["admin", "subcourses", s, "lessons"] => Route::Admin(AdminRoute::SubcourseLessons(id(s)?)),
            ["admin", "lessons"] => Route::Admin(AdminRoute::Lessons),
            ["admin", "lessons", l] => Route::Admin(AdminRoute::Lesson(id(l)?)),
            ["admin", "teachers"] => Route::Admin(AdminRoute::Teachers),
            ["admin", "teacher-history"] => Route::Admin(AdminRoute::TeacherHistory),
            _ => return None,
        };
        Some(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Decides whether the current session may open `route`.
pub fn guard(route: Route, state: SessionState<'_>) -> Access {
    let Route::Admin(admin) = route else {
        return Access::Allow;
    };
    match state {
        SessionState::Loading => Access::Pending,
        SessionState::Anonymous => Access::Redirect { to: Route::Login, forbidden: false },
        SessionState::SignedIn(user) if admin.section().is_visible_to(user) => Access::Allow,
        SessionState::SignedIn(_) => Access::Redirect { to: Route::Home, forbidden: true },
    }
}

/// Where the UI goes after an API error, if anywhere.
pub fn redirect_for_error(err: &PortalError) -> Option<Access> {
    match err {
        PortalError::Unauthorized => Some(Access::Redirect { to: Route::Login, forbidden: false }),
        PortalError::Forbidden => Some(Access::Redirect { to: Route::Home, forbidden: true }),
        _ => None,
    }
}
