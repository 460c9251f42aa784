pub mod lesson;
pub mod media;
pub mod program;
pub mod session_info;
pub mod status;
pub mod subcourse;
pub mod teacher;
pub mod user;

use serde::{Deserialize, Deserializer};

/// The API sends `null` for empty relations; treat it like a missing list.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
