mod errors;
mod models;
mod mysql_store;
pub mod schema;
mod sqlite_store;
mod trait_def;

pub use errors::StoreError;
pub use models::*;
pub use mysql_store::MysqlCatalogStore;
pub use sqlite_store::SqliteCatalogStore;
pub use trait_def::{CatalogStore, Lookup};

use crate::server::metrics::{record_db_error, record_db_query};
use std::time::Instant;
use tracing::warn;

/// Record the duration of a finished query and, if it failed, why.
pub(crate) fn record_query(operation: &'static str, start: Instant, error: Option<&StoreError>) {
    record_db_query(operation, start.elapsed());
    if let Some(err) = error {
        warn!("{} failed: {}", operation, err);
        record_db_error(operation, err.kind());
    }
}
