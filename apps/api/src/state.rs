use sqlx::PgPool;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The pool is the only cross-request state: it is created in `main`,
/// cloned in here, and closed on shutdown. Handlers acquire a connection
/// per query and release it when the query future completes.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}
