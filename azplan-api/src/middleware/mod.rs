/// Middleware modules for the API server
///
/// Request authentication lives in `azplan_shared::auth::middleware`; this
/// module holds response middleware.

pub mod security;
