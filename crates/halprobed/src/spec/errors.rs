//! Errors raised while loading or calling a target component.

use std::io;

use camino::Utf8PathBuf;
use halprobe_invoker::{DriverError, InvokeError};
use halprobe_types::UnknownComponentClass;
use thiserror::Error;

/// Failure to load a target component.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The requested class names no component class.
    #[error(transparent)]
    UnknownClass(#[from] UnknownComponentClass),
    /// A service-style request named no package.
    #[error("module name '{module}' names no package")]
    MissingPackage {
        /// Module name as requested.
        module: String,
    },
    /// The specification directory could not be listed.
    #[error("failed to read specification directory {dir}: {source}")]
    SpecDirectory {
        /// Directory searched.
        dir: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// No specification file matched the request.
    #[error("no interface specification in {dir} matches {query}")]
    SpecNotFound {
        /// Directory searched.
        dir: Utf8PathBuf,
        /// Rendered lookup terms.
        query: String,
    },
    /// The target library does not exist.
    #[error("target component {path} does not exist")]
    MissingTarget {
        /// Requested path.
        path: String,
    },
    /// No driver could be opened for the specification.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Failure to serve a `CALL_FUNCTION` request.
#[derive(Debug, Error)]
pub enum CallError {
    /// No component has been loaded in this session.
    #[error("no target component is loaded")]
    NothingLoaded,
    /// The driver rejected or failed the call.
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}
