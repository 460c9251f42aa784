pub mod auth_middleware;
pub mod preview_filter_middleware;
