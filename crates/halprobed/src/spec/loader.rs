//! Resolution of interface specification files.
//!
//! Packaged components keep their files under
//! `<spec_dir>/<package with dots as slashes>/<version>/`; unpackaged
//! components keep theirs directly in `<spec_dir>`. Files are tried in name
//! order and the first one describing the requested component wins.

use std::fmt;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use halprobe_types::{ComponentClass, InterfaceSpecification, LoadRequest};
use tracing::{debug, warn};

use super::{LoadError, SPEC_TARGET};

/// Suffix of interface specification files.
pub(crate) const SPEC_FILE_SUFFIX: &str = ".spec.json";

/// Lookup terms derived from a `LOAD_HAL` request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ComponentQuery {
    class: ComponentClass,
    component_type: i32,
    version: f32,
    package: Option<String>,
    component_name: Option<String>,
}

impl ComponentQuery {
    /// Interprets `request`.
    ///
    /// Service-style classes read the module name as `package`,
    /// `package::Interface` or `package@version::Interface`; other classes
    /// are matched on type and version alone.
    pub(crate) fn from_request(request: &LoadRequest) -> Result<Self, LoadError> {
        let class = ComponentClass::try_from(request.class)?;
        let (package, component_name) = if class.is_service() {
            let (package, component_name) = split_module_name(&request.module_name)?;
            (Some(package), component_name)
        } else {
            (None, None)
        };
        Ok(Self {
            class,
            component_type: request.component_type,
            version: request.version,
            package,
            component_name,
        })
    }

    pub(crate) const fn class(&self) -> ComponentClass {
        self.class
    }

    fn directory(&self, spec_dir: &Utf8Path) -> Utf8PathBuf {
        let mut dir = spec_dir.to_path_buf();
        if let Some(package) = &self.package {
            dir.extend(package.split('.'));
            dir.push(format!("{:?}", self.version));
        }
        dir
    }

    fn matches(&self, spec: &InterfaceSpecification) -> bool {
        if spec.component_class != self.class || spec.component_type_version != self.version {
            return false;
        }
        match &self.package {
            None => spec.component_type == self.component_type,
            Some(package) => {
                spec.package.as_deref() == Some(package.as_str())
                    && self
                        .component_name
                        .as_deref()
                        .is_none_or(|name| name == spec.component_name)
            }
        }
    }
}

impl fmt::Display for ComponentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(package) => {
                write!(f, "{package}@{:?}", self.version)?;
                if let Some(name) = &self.component_name {
                    write!(f, "::{name}")?;
                }
                Ok(())
            }
            None => write!(
                f,
                "class {} type {} version {:?}",
                self.class.id(),
                self.component_type,
                self.version
            ),
        }
    }
}

fn split_module_name(module: &str) -> Result<(String, Option<String>), LoadError> {
    let (package, component) = match module.split_once("::") {
        Some((package, component)) => (package, Some(component)),
        None => (module, None),
    };
    let package = package
        .split_once('@')
        .map_or(package, |(name, _)| name)
        .trim();
    if package.is_empty() {
        return Err(LoadError::MissingPackage {
            module: module.to_owned(),
        });
    }
    let component = component
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned);
    Ok((package.to_owned(), component))
}

/// Finds the specification file describing the component `query` names.
///
/// Files that cannot be read or parsed are skipped with a warning.
pub(crate) fn find_component_specification(
    spec_dir: &Utf8Path,
    query: &ComponentQuery,
) -> Result<InterfaceSpecification, LoadError> {
    let dir = query.directory(spec_dir);
    let mut candidates = spec_files(&dir)?;
    candidates.sort();
    for path in candidates {
        let Some(spec) = read_spec(&path) else {
            continue;
        };
        if query.matches(&spec) {
            debug!(
                target: SPEC_TARGET,
                path = %path,
                "interface specification found"
            );
            return Ok(spec);
        }
    }
    Err(LoadError::SpecNotFound {
        dir,
        query: query.to_string(),
    })
}

fn spec_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, LoadError> {
    let directory_error = |source| LoadError::SpecDirectory {
        dir: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in dir.read_dir_utf8().map_err(directory_error)? {
        let entry = entry.map_err(directory_error)?;
        let is_file = entry.file_type().is_ok_and(|kind| kind.is_file());
        if is_file && entry.file_name().ends_with(SPEC_FILE_SUFFIX) {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

fn read_spec(path: &Utf8Path) -> Option<InterfaceSpecification> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            warn!(
                target: SPEC_TARGET,
                path = %path,
                error = %error,
                "skipping unreadable specification file"
            );
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(spec) => Some(spec),
        Err(error) => {
            warn!(
                target: SPEC_TARGET,
                path = %path,
                error = %error,
                "skipping malformed specification file"
            );
            None
        }
    }
}
