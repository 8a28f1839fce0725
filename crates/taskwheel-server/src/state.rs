use taskwheel_core::repository::SqliteRepository;

/// State shared by all request handlers.
///
/// The recurrence engine itself is pure and needs no state here; the
/// repository owns the connection pool and is safe to share across
/// handler tasks.
pub struct AppState {
    pub repo: SqliteRepository,
}
