//! Driver lookup by component identity.
//!
//! The [`DriverRegistry`] is assembled once at startup and shared read-only
//! by every session. Each entry maps a [`DriverKey`], derived from the
//! identity fields of an interface specification, to a factory that opens a
//! fresh driver instance for one session. Sessions never share driver
//! state; only the immutable dispatch tables captured by the factories are
//! shared.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use halprobe_types::{ComponentClass, InterfaceSpecification};

use crate::error::DriverError;
use crate::invoker::FunctionInvoker;

/// Identity of the interface a driver serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DriverKey {
    class: ComponentClass,
    package: String,
    component_type: i32,
    version: String,
    component_name: String,
}

impl DriverKey {
    /// Builds a key from identity fields.
    #[must_use]
    pub fn new(
        class: ComponentClass,
        package: Option<&str>,
        component_type: i32,
        version: f32,
        component_name: &str,
    ) -> Self {
        Self {
            class,
            package: package.unwrap_or_default().to_owned(),
            component_type,
            version: format!("{version:?}"),
            component_name: component_name.to_owned(),
        }
    }

    /// Key of the driver serving `spec`.
    #[must_use]
    pub fn for_interface(spec: &InterfaceSpecification) -> Self {
        Self::new(
            spec.component_class,
            spec.package.as_deref(),
            spec.component_type,
            spec.component_type_version,
            &spec.component_name,
        )
    }

    /// Component class of the served interface.
    #[must_use]
    pub const fn class(&self) -> ComponentClass {
        self.class
    }
}

impl fmt::Display for DriverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(
                f,
                "class {} type {}@{}::{}",
                self.class.id(),
                self.component_type,
                self.version,
                self.component_name
            )
        } else {
            write!(
                f,
                "{}@{}::{}",
                self.package, self.version, self.component_name
            )
        }
    }
}

/// The concrete component a driver is opened against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetComponent {
    /// Library path; empty for components opened by service name.
    pub path: Utf8PathBuf,
    /// Service instance name.
    pub service_name: String,
}

impl TargetComponent {
    /// A component loaded from the library at `path`.
    #[must_use]
    pub fn library(path: impl Into<Utf8PathBuf>, service_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            service_name: service_name.into(),
        }
    }

    /// A component reached through the named service instance.
    #[must_use]
    pub fn service(service_name: impl Into<String>) -> Self {
        Self {
            path: Utf8PathBuf::new(),
            service_name: service_name.into(),
        }
    }

    /// Library path, if the component has one.
    #[must_use]
    pub fn library_path(&self) -> Option<&Utf8Path> {
        (!self.path.as_str().is_empty()).then_some(self.path.as_path())
    }
}

/// Opens one driver instance for a session.
pub type DriverFactory =
    Arc<dyn Fn(&TargetComponent) -> Result<Box<dyn FunctionInvoker>, DriverError> + Send + Sync>;

/// Immutable map from component identity to driver factory.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: HashMap<DriverKey, DriverFactory>,
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl DriverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Duplicate`] when `key` already has a driver.
    pub fn register<F>(&mut self, key: DriverKey, factory: F) -> Result<(), DriverError>
    where
        F: Fn(&TargetComponent) -> Result<Box<dyn FunctionInvoker>, DriverError>
            + Send
            + Sync
            + 'static,
    {
        if self.factories.contains_key(&key) {
            return Err(DriverError::Duplicate {
                key: key.to_string(),
            });
        }
        self.factories.insert(key, Arc::new(factory));
        Ok(())
    }

    /// Whether a driver is registered for `key`.
    #[must_use]
    pub fn contains(&self, key: &DriverKey) -> bool {
        self.factories.contains_key(key)
    }

    /// Opens a driver for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotRegistered`] when no factory matches `key`,
    /// or the factory's own failure.
    pub fn open(
        &self,
        key: &DriverKey,
        target: &TargetComponent,
    ) -> Result<Box<dyn FunctionInvoker>, DriverError> {
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| DriverError::NotRegistered {
                key: key.to_string(),
            })?;
        factory(target)
    }

    /// Number of registered drivers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` when no driver is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests;
