use axum::Router;

/// A pluggable domain module.
///
/// Each module owns its storage schema and exposes a self-contained
/// router; the server binary collects and mounts them under `/api/v1`.
pub trait Module {
    /// Short module name, used for logging.
    fn name(&self) -> &str;

    /// Build this module's routes. The returned router has already
    /// captured its own state.
    fn routes(&self) -> Router;
}
