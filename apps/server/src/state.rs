//! Shared application state.

use tindahan_db::Database;

/// State handed to every handler. Cheap to clone; the database handle
/// shares one pool.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
