//! Loading desired state from schema documents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::SchemaError;
use crate::model::Schema;

/// Schema name used when none is given.
pub const DEFAULT_SCHEMA_NAME: &str = "sailhouse";

/// Source of desired state.
pub trait SchemaLoader: Send + Sync {
    /// Loads and validates the schema at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the file is absent,
    /// `SchemaError::Parse` if it is not a schema document and
    /// `SchemaError::Validation` if it breaks a schema rule.
    fn load(&self, path: &Path) -> Result<Schema, SchemaError>;
}

/// Reads schema documents from YAML files.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlSchemaLoader;

impl SchemaLoader for YamlSchemaLoader {
    fn load(&self, path: &Path) -> Result<Schema, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                SchemaError::NotFound(path.to_path_buf())
            } else {
                SchemaError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let schema = parse_schema(&content)?;
        tracing::debug!(
            path = %path.display(),
            key = %schema.key,
            topics = schema.topics.len(),
            subscriptions = schema.subscriptions.len(),
            "loaded schema"
        );
        Ok(schema)
    }
}

/// Parses and validates a schema document.
pub fn parse_schema(content: &str) -> Result<Schema, SchemaError> {
    let schema: Schema = serde_yaml::from_str(content)?;
    schema.validate()?;
    Ok(schema)
}

/// Maps a schema name to its file, e.g. `sailhouse` -> `sailhouse.yaml`.
pub fn schema_path(name: Option<&str>) -> PathBuf {
    let name = name.unwrap_or(DEFAULT_SCHEMA_NAME);
    if name.ends_with(".yaml") || name.ends_with(".yml") {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{name}.yaml"))
    }
}
