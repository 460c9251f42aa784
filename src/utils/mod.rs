pub mod input;
pub mod media_url;
pub mod sanitize;
