//! Registry of SCM plugins and what they declared.
//!
//! The [`PluginRegistry`] holds one immutable record per plugin. Records are
//! replaced wholesale on re-registration, so readers always see a complete
//! snapshot: the declared protocol versions plus, once built, the plugin's
//! info (configuration, view and capabilities). The registry uses interior
//! locking and can be shared by reference between the lifecycle code that
//! registers plugins and the extension facade that resolves versions.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::ProtocolError;
use crate::plugin_info::ScmPluginInfo;
use crate::version::ProtocolVersion;

const REGISTRY_TARGET: &str = "tether_scm::registry";

/// What a plugin declared when it was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    id: String,
    versions: Vec<ProtocolVersion>,
}

impl PluginDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(id: impl Into<String>, versions: Vec<ProtocolVersion>) -> Self {
        Self {
            id: id.into(),
            versions,
        }
    }

    /// Returns the plugin identifier.
    #[must_use]
    pub const fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the declared protocol versions.
    #[must_use]
    pub const fn versions(&self) -> &[ProtocolVersion] {
        self.versions.as_slice()
    }

    /// Validates the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidDescriptor`] for a blank identifier or
    /// an empty version list.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.id.trim().is_empty() {
            return Err(ProtocolError::InvalidDescriptor {
                message: String::from("plugin id must not be empty"),
            });
        }
        if self.versions.is_empty() {
            return Err(ProtocolError::InvalidDescriptor {
                message: format!("plugin '{}' declares no protocol versions", self.id),
            });
        }
        Ok(())
    }
}

/// A registry entry: the descriptor and, once built, the plugin info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRecord {
    descriptor: PluginDescriptor,
    info: Option<ScmPluginInfo>,
}

impl PluginRecord {
    /// Returns the descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// Returns the plugin info, if it has been published.
    #[must_use]
    pub const fn info(&self) -> Option<&ScmPluginInfo> {
        self.info.as_ref()
    }
}

/// Source of declared protocol versions, consulted on every call.
pub trait VersionCatalog {
    /// Returns the versions `plugin_id` declared, or `None` if it is unknown.
    fn declared_versions(&self, plugin_id: &str) -> Option<Vec<ProtocolVersion>>;
}

impl<C: VersionCatalog + ?Sized> VersionCatalog for &C {
    fn declared_versions(&self, plugin_id: &str) -> Option<Vec<ProtocolVersion>> {
        (**self).declared_versions(plugin_id)
    }
}

impl<C: VersionCatalog + ?Sized> VersionCatalog for Arc<C> {
    fn declared_versions(&self, plugin_id: &str) -> Option<Vec<ProtocolVersion>> {
        (**self).declared_versions(plugin_id)
    }
}

/// Thread-safe registry of SCM plugins.
///
/// # Example
///
/// ```
/// use tether_scm::{PluginDescriptor, PluginRegistry, ProtocolVersion, VersionCatalog};
///
/// let registry = PluginRegistry::new();
/// registry
///     .register(PluginDescriptor::new("git", vec![ProtocolVersion::V1]))
///     .expect("valid descriptor");
/// assert_eq!(registry.declared_versions("git"), Some(vec![ProtocolVersion::V1]));
/// ```
#[derive(Debug, Default)]
pub struct PluginRegistry {
    records: RwLock<HashMap<String, Arc<PluginRecord>>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin, replacing any previous record for the same id.
    ///
    /// Replacement discards previously published info.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidDescriptor`] if validation fails.
    pub fn register(&self, descriptor: PluginDescriptor) -> Result<(), ProtocolError> {
        descriptor.validate()?;
        let id = descriptor.id().to_owned();
        let record = Arc::new(PluginRecord {
            descriptor,
            info: None,
        });
        let replaced = self.write().insert(id.clone(), record).is_some();
        debug!(
            target: REGISTRY_TARGET,
            plugin = %id,
            replaced,
            "registered SCM plugin"
        );
        Ok(())
    }

    /// Attaches built plugin info to a registered plugin.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::PluginNotFound`] if the plugin is not
    /// registered.
    pub fn publish_info(&self, info: ScmPluginInfo) -> Result<(), ProtocolError> {
        let mut records = self.write();
        let Some(current) = records.get_mut(info.plugin_id()) else {
            return Err(ProtocolError::PluginNotFound {
                plugin_id: info.plugin_id().to_owned(),
            });
        };
        *current = Arc::new(PluginRecord {
            descriptor: current.descriptor.clone(),
            info: Some(info),
        });
        Ok(())
    }

    /// Removes a plugin, returning its last record.
    pub fn deregister(&self, plugin_id: &str) -> Option<Arc<PluginRecord>> {
        self.write().remove(plugin_id)
    }

    /// Returns the current record for a plugin.
    #[must_use]
    pub fn get(&self, plugin_id: &str) -> Option<Arc<PluginRecord>> {
        self.read().get(plugin_id).cloned()
    }

    /// Returns whether the plugin published support for `(provider, event)`.
    ///
    /// Unknown plugins and plugins without published info support nothing.
    #[must_use]
    pub fn supports_webhook(&self, plugin_id: &str, provider: &str, event: &str) -> bool {
        self.get(plugin_id)
            .and_then(|record| {
                record
                    .info()
                    .map(|info| info.capabilities().supports_webhook(provider, event))
            })
            .unwrap_or(false)
    }

    /// Returns the number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` when no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<PluginRecord>>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<PluginRecord>>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VersionCatalog for PluginRegistry {
    fn declared_versions(&self, plugin_id: &str) -> Option<Vec<ProtocolVersion>> {
        self.get(plugin_id)
            .map(|record| record.descriptor().versions().to_vec())
    }
}
