//! Interface specifications of loadable components.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::TypeDescriptor;

/// Kind of component a specification describes.
///
/// Serialised as its numeric identifier so `LOAD_HAL` class fields and
/// specification files share one vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ComponentClass {
    /// Conventional HAL module.
    HalConventional,
    /// Submodule of a conventional HAL.
    HalConventionalSubmodule,
    /// Legacy HAL.
    HalLegacy,
    /// Service-style HAL addressed by package and service name.
    HalHidl,
    /// Service-style HAL wrapping a conventional module.
    HalHidlWrappedConventional,
    /// Plain shared library.
    LibShared,
    /// Kernel interface.
    Kernel,
    /// Kernel module.
    KernelModule,
}

impl ComponentClass {
    /// Numeric identifier used on the wire.
    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::HalConventional => 1,
            Self::HalConventionalSubmodule => 2,
            Self::HalLegacy => 3,
            Self::HalHidl => 4,
            Self::HalHidlWrappedConventional => 5,
            Self::LibShared => 11,
            Self::Kernel => 21,
            Self::KernelModule => 22,
        }
    }

    /// Whether components of this class are opened by package and service
    /// name rather than by library path.
    ///
    /// Only [`Self::HalHidl`] qualifies. A wrapped conventional module is
    /// still located by type and version and opened from its library.
    #[must_use]
    pub const fn is_service(self) -> bool {
        matches!(self, Self::HalHidl)
    }
}

/// Returned when a numeric identifier names no [`ComponentClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown component class {0}")]
pub struct UnknownComponentClass(pub i32);

impl TryFrom<i32> for ComponentClass {
    type Error = UnknownComponentClass;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::HalConventional),
            2 => Ok(Self::HalConventionalSubmodule),
            3 => Ok(Self::HalLegacy),
            4 => Ok(Self::HalHidl),
            5 => Ok(Self::HalHidlWrappedConventional),
            11 => Ok(Self::LibShared),
            21 => Ok(Self::Kernel),
            22 => Ok(Self::KernelModule),
            other => Err(UnknownComponentClass(other)),
        }
    }
}

impl From<ComponentClass> for i32 {
    fn from(value: ComponentClass) -> Self {
        value.id()
    }
}

/// Declared shape of one callable function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name.
    pub name: String,
    /// Parameter types in declaration order.
    #[serde(default)]
    pub args: Vec<TypeDescriptor>,
    /// Return types in declaration order.
    #[serde(default)]
    pub returns: Vec<TypeDescriptor>,
}

impl FunctionSignature {
    /// Builds a signature.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        args: Vec<TypeDescriptor>,
        returns: Vec<TypeDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            args,
            returns,
        }
    }
}

/// Declared type of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Attribute name.
    pub name: String,
    /// Attribute type.
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

/// Everything a loaded component exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSpecification {
    /// Component class.
    pub component_class: ComponentClass,
    /// Numeric component type; zero when the class has none.
    #[serde(default)]
    pub component_type: i32,
    /// Component version, e.g. `1.0`.
    pub component_type_version: f32,
    /// Package of service-style components, e.g. `android.hardware.nfc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Interface or module name, e.g. `INfc`.
    #[serde(default)]
    pub component_name: String,
    /// Callable functions.
    #[serde(default)]
    pub functions: Vec<FunctionSignature>,
    /// Readable attributes.
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
}

impl InterfaceSpecification {
    /// Looks up a function signature by exact name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.iter().find(|function| function.name == name)
    }

    /// Looks up an attribute by exact name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }
}
