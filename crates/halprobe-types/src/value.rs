//! Recursive value model shared by call arguments and results.
//!
//! Values carry their own kind tag, so a verifier or marshaller matches on
//! the tag instead of trusting the sender to know the native type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive kinds a scalar may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// Boolean.
    Bool,
    /// Signed 8-bit integer.
    Int8,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    Uint16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    Uint64,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
}

impl ScalarKind {
    /// Wire spelling of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive value tagged with its kind, e.g. `{"uint8": 5}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarValue {
    /// Boolean.
    Bool(bool),
    /// Signed 8-bit integer.
    Int8(i8),
    /// Unsigned 8-bit integer.
    Uint8(u8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Unsigned 16-bit integer.
    Uint16(u16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    Uint32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    Uint64(u64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
}

impl ScalarValue {
    /// Kind tag of this value.
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int8(_) => ScalarKind::Int8,
            Self::Uint8(_) => ScalarKind::Uint8,
            Self::Int16(_) => ScalarKind::Int16,
            Self::Uint16(_) => ScalarKind::Uint16,
            Self::Int32(_) => ScalarKind::Int32,
            Self::Uint32(_) => ScalarKind::Uint32,
            Self::Int64(_) => ScalarKind::Int64,
            Self::Uint64(_) => ScalarKind::Uint64,
            Self::Float(_) => ScalarKind::Float,
            Self::Double(_) => ScalarKind::Double,
        }
    }
}

/// A generic argument or result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableValue {
    /// A primitive value.
    Scalar {
        /// The tagged primitive.
        value: ScalarValue,
    },
    /// A member of a named enumerated type.
    Enum {
        /// Fully qualified enum type name.
        type_name: String,
        /// Underlying numeric value.
        value: ScalarValue,
    },
    /// An ordered sequence; element order is significant.
    Vector {
        /// Elements in declaration order.
        elements: Vec<VariableValue>,
    },
    /// A text value.
    String {
        /// The text.
        value: String,
    },
    /// Reference to an agent-side callback object.
    Callback {
        /// Callback name the agent registered.
        name: String,
    },
}

impl VariableValue {
    /// Wraps a primitive.
    #[must_use]
    pub const fn scalar(value: ScalarValue) -> Self {
        Self::Scalar { value }
    }

    /// Builds an enum value.
    #[must_use]
    pub fn enumerated(type_name: impl Into<String>, value: ScalarValue) -> Self {
        Self::Enum {
            type_name: type_name.into(),
            value,
        }
    }

    /// Builds a vector from ordered elements.
    #[must_use]
    pub const fn vector(elements: Vec<Self>) -> Self {
        Self::Vector { elements }
    }

    /// Builds a text value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String {
            value: value.into(),
        }
    }

    /// Short label of the value's shape, used in mismatch reports.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Scalar { .. } => "scalar",
            Self::Enum { .. } => "enum",
            Self::Vector { .. } => "vector",
            Self::String { .. } => "string",
            Self::Callback { .. } => "callback",
        }
    }

    /// Whether the value is acceptable where `descriptor` is declared.
    ///
    /// Arrays accept vectors of exactly the declared length. Empty vectors
    /// match any element type.
    #[must_use]
    pub fn conforms_to(&self, descriptor: &TypeDescriptor) -> bool {
        match (self, descriptor) {
            (Self::Scalar { value }, TypeDescriptor::Scalar { scalar }) => value.kind() == *scalar,
            (
                Self::Enum { type_name, value },
                TypeDescriptor::Enum {
                    type_name: declared,
                    underlying,
                },
            ) => type_name == declared && value.kind() == *underlying,
            (Self::Vector { elements }, TypeDescriptor::Vector { element }) => {
                elements.iter().all(|item| item.conforms_to(element))
            }
            (Self::Vector { elements }, TypeDescriptor::Array { element, len }) => {
                elements.len() == *len && elements.iter().all(|item| item.conforms_to(element))
            }
            (Self::String { .. }, TypeDescriptor::String)
            | (Self::Callback { .. }, TypeDescriptor::Callback { .. }) => true,
            _ => false,
        }
    }
}

impl From<ScalarValue> for VariableValue {
    fn from(value: ScalarValue) -> Self {
        Self::scalar(value)
    }
}

/// Declared type of a parameter, return value or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// A primitive of the given kind.
    Scalar {
        /// Primitive kind.
        scalar: ScalarKind,
    },
    /// A named enumerated type.
    Enum {
        /// Fully qualified enum type name.
        type_name: String,
        /// Kind of the underlying numeric value.
        underlying: ScalarKind,
    },
    /// A variable-length sequence.
    Vector {
        /// Element type.
        element: Box<TypeDescriptor>,
    },
    /// A fixed-length sequence.
    Array {
        /// Element type.
        element: Box<TypeDescriptor>,
        /// Required element count.
        len: usize,
    },
    /// Text.
    String,
    /// An agent-side callback object implementing `interface`.
    Callback {
        /// Callback interface name.
        interface: String,
    },
}

impl TypeDescriptor {
    /// A scalar descriptor.
    #[must_use]
    pub const fn scalar(scalar: ScalarKind) -> Self {
        Self::Scalar { scalar }
    }

    /// An enum descriptor.
    #[must_use]
    pub fn enumerated(type_name: impl Into<String>, underlying: ScalarKind) -> Self {
        Self::Enum {
            type_name: type_name.into(),
            underlying,
        }
    }

    /// A vector descriptor.
    #[must_use]
    pub fn vector(element: Self) -> Self {
        Self::Vector {
            element: Box::new(element),
        }
    }

    /// A fixed array descriptor.
    #[must_use]
    pub fn array(element: Self, len: usize) -> Self {
        Self::Array {
            element: Box::new(element),
            len,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar { scalar } => write!(f, "{scalar}"),
            Self::Enum { type_name, .. } => f.write_str(type_name),
            Self::Vector { element } => write!(f, "vec<{element}>"),
            Self::Array { element, len } => write!(f, "{element}[{len}]"),
            Self::String => f.write_str("string"),
            Self::Callback { interface } => write!(f, "callback<{interface}>"),
        }
    }
}
