use std::collections::BTreeMap;

use crate::error::StorageError;
use crate::filesystem::FilesystemDriver;
use crate::inmemory::InMemoryDriver;
use crate::traits::StorageDriver;

// ---------------------------------------------------------------------------
// DriverBuilder
// ---------------------------------------------------------------------------

/// Configures and constructs a storage driver by name.
///
/// Created via [`registry_storage::driver()`](crate::driver). Add parameters
/// with chained calls, then call [`build()`](DriverBuilder::build).
///
/// | driver       | parameters                          |
/// |--------------|-------------------------------------|
/// | `inmemory`   | none                                |
/// | `filesystem` | `rootdirectory` (required)          |
///
/// # Example
///
/// ```rust,ignore
/// let driver = registry_storage::driver("filesystem")
///     .parameter("rootdirectory", "/var/lib/registry")
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct DriverBuilder {
    name:       String,
    parameters: BTreeMap<String, String>,
}

impl DriverBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name:       name.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Set one driver parameter. Later values replace earlier ones.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Set several parameters at once, e.g. from a parsed config file.
    pub fn parameters<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    // ── Build ─────────────────────────────────────────────────────────────

    /// Construct the configured driver.
    ///
    /// # Errors
    ///
    /// [`StorageError::UnknownDriver`] for an unrecognised name, and
    /// [`StorageError::InvalidParameter`] when a required parameter is
    /// missing or empty.
    pub fn build(self) -> Result<Box<dyn StorageDriver>, StorageError> {
        match self.name.as_str() {
            "inmemory" => Ok(Box::new(InMemoryDriver::new())),
            "filesystem" => {
                let root = self.required("rootdirectory")?;
                Ok(Box::new(FilesystemDriver::new(root)))
            }
            other => Err(StorageError::UnknownDriver(other.to_string())),
        }
    }

    fn required(&self, key: &str) -> Result<&str, StorageError> {
        match self.parameters.get(key).map(|v| v.trim()) {
            Some(v) if !v.is_empty() => Ok(v),
            Some(_) => Err(StorageError::InvalidParameter {
                name:   key.to_string(),
                reason: "must not be empty".into(),
            }),
            None => Err(StorageError::InvalidParameter {
                name:   key.to_string(),
                reason: format!("required by the {} driver", self.name),
            }),
        }
    }
}
