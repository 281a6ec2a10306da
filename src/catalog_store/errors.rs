use super::models::EntityKind;

/// Failures of a data access operation.
///
/// A zero-row lookup is not an error; see [`super::Lookup::NotFound`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or a connection could not be checked out.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// The query was rejected or failed while executing.
    #[error("query failed: {0}")]
    Query(String),

    /// A row did not match the entity's declared columns.
    #[error("could not read {entity} row: {reason}")]
    Materialization { entity: EntityKind, reason: String },

    /// The query was aborted before completing.
    #[error("query interrupted")]
    Interrupted,
}

impl StoreError {
    pub fn materialization(entity: EntityKind, reason: impl ToString) -> Self {
        StoreError::Materialization {
            entity,
            reason: reason.to_string(),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Connection(_) => "connection",
            StoreError::Query(_) => "query",
            StoreError::Materialization { .. } => "materialization",
            StoreError::Interrupted => "interrupted",
        }
    }
}
