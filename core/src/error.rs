use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanopyError {
    /// A mapped column does not exist on the target entity
    #[error("Column `{column}` (mapped as {field}) does not exist on `{entity}`")]
    ColumnNotFound {
        field: &'static str,
        column: String,
        entity: String,
    },

    /// An audited entity has no primary key to join on
    #[error("Entity `{entity}` has no primary key")]
    NoPrimaryKey { entity: String },

    /// An audited entity has a composite primary key
    #[error("Entity `{entity}` has a composite primary key ({count} fields), expected exactly one")]
    UnsupportedCompositeKey { entity: String, count: usize },

    /// An explicit default-sort column does not exist
    #[error("Default sort column `{column}` does not exist on `{entity}`")]
    InvalidSortColumn { column: String, entity: String },

    /// A tree read was requested without an id or parent-id column
    #[error("Tree read on `{entity}` needs a `{field}` column")]
    MissingTreeColumn { field: &'static str, entity: String },

    /// A seed column reads a table the expansion phase never joins
    #[error(
        "Column `{output}` of a hierarchical read on `{entity}` reads `{relation}`, \
         which is not joined in the expansion phase"
    )]
    UnjoinedRelation {
        output: String,
        relation: String,
        entity: String,
    },

    /// The schema knows nothing about this entity
    #[error("Unknown entity `{0}`")]
    UnknownEntity(String),

    /// `configure` was called before `setup`
    #[error("Query composer for `{0}` used before setup")]
    NotSetUp(String),

    /// An option was registered after `setup` froze the composer
    #[error("Query composer for `{0}` is already set up")]
    AlreadySetUp(String),

    /// A typed option was applied to criteria of another type
    #[error("Option `{option}` expects criteria of type `{expected}`, got `{found}`")]
    CriteriaTypeMismatch {
        option: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Error executing a query
    #[error("Execution error: {0}")]
    Execution(String),

    /// Error mapping a row into a record
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// A failure raised by caller-supplied options, appliers or providers
    #[error("Query error: {0}")]
    Other(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl CanopyError {
    /// Returns true for errors raised while registering an endpoint
    /// (as opposed to per-request validation or store failures).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CanopyError::NoPrimaryKey { .. }
                | CanopyError::UnsupportedCompositeKey { .. }
                | CanopyError::InvalidSortColumn { .. }
                | CanopyError::MissingTreeColumn { .. }
                | CanopyError::UnjoinedRelation { .. }
                | CanopyError::UnknownEntity(_)
                | CanopyError::NotSetUp(_)
                | CanopyError::AlreadySetUp(_)
                | CanopyError::CriteriaTypeMismatch { .. }
        )
    }
}

/// Result type for query composition and retrieval
pub type Result<T> = std::result::Result<T, CanopyError>;
