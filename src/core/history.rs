use crate::model::status::PublishStatus;
use crate::model::teacher::TeacherLessonHistory;

/// Rows whose teacher name or lesson title contains `term`, ignoring case.
/// A blank term keeps everything.
pub fn filter_history<'a>(
    rows: &'a [TeacherLessonHistory],
    term: &str,
) -> Vec<&'a TeacherLessonHistory> {
    let term = term.trim().to_lowercase();
    rows.iter()
        .filter(|row| {
            term.is_empty()
                || row.teacher_name.to_lowercase().contains(&term)
                || row.lesson_title.to_lowercase().contains(&term)
        })
        .collect()
}

/// Capitalized status label, unknown statuses shown as drafts.
pub fn status_label(status: &str) -> String {
    let status = PublishStatus::from_label(status);
    let raw = status.as_str();
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
