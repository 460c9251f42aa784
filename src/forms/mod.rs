//! Editable form state for programs, subcourses and lessons, with the
//! save-then-upload flows that go with them.

pub mod cover;
pub mod lesson_editor;
pub mod program_form;
pub mod subcourse_form;

/// A saved record plus a non-fatal problem worth telling the user about.
#[derive(Debug)]
pub struct FormOutcome<T> {
    pub record: T,
    pub warning: Option<String>,
}

impl<T> FormOutcome<T> {
    pub fn clean(record: T) -> Self {
        FormOutcome { record, warning: None }
    }
}
