//! Conversion between tagged values and native call parameters.
//!
//! [`Arguments`] gives handlers typed, positional access to the values in a
//! call description. Every accessor checks the value's tag against the
//! native type it is asked for, so a kind or length mismatch surfaces as a
//! [`MarshalError`] naming the offending position. The `pack_*` functions go
//! the other way, wrapping native return values with the tag of their
//! native type.

use halprobe_types::{ScalarKind, ScalarValue, TypeDescriptor, VariableValue};

use crate::error::MarshalError;

/// A native primitive that maps to exactly one [`ScalarKind`].
pub trait Primitive: Copy {
    /// Kind tag carried by values of this type.
    const KIND: ScalarKind;

    /// Extracts the native value when `value` carries this type's tag.
    fn from_scalar(value: ScalarValue) -> Option<Self>;

    /// Wraps the native value with this type's tag.
    fn into_scalar(self) -> ScalarValue;
}

macro_rules! primitive {
    ($native:ty, $variant:ident) => {
        impl Primitive for $native {
            const KIND: ScalarKind = ScalarKind::$variant;

            fn from_scalar(value: ScalarValue) -> Option<Self> {
                match value {
                    ScalarValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_scalar(self) -> ScalarValue {
                ScalarValue::$variant(self)
            }
        }
    };
}

primitive!(bool, Bool);
primitive!(i8, Int8);
primitive!(u8, Uint8);
primitive!(i16, Int16);
primitive!(u16, Uint16);
primitive!(i32, Int32);
primitive!(u32, Uint32);
primitive!(i64, Int64);
primitive!(u64, Uint64);
primitive!(f32, Float);
primitive!(f64, Double);

/// A native enumerated type with a primitive representation.
///
/// Results of this type are compared through the native type's equality
/// after decoding, so two encodings of the same member always match and an
/// undefined discriminant never does.
pub trait NativeEnum: Copy + PartialEq {
    /// Fully qualified type name used in the value tag.
    const TYPE_NAME: &'static str;

    /// Underlying representation.
    type Repr: Primitive;

    /// Decodes a raw representation, if it names a member.
    fn from_repr(repr: Self::Repr) -> Option<Self>;

    /// Encodes the member as its raw representation.
    fn to_repr(self) -> Self::Repr;

    /// Declared type of this enum.
    #[must_use]
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::enumerated(Self::TYPE_NAME, <Self::Repr as Primitive>::KIND)
    }

    /// Decodes a tagged value into a member.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::Kind`] when the value is not an enum of this
    /// type and [`MarshalError::UnknownEnumValue`] when the discriminant
    /// names no member.
    fn from_value(index: usize, tagged: &VariableValue) -> Result<Self, MarshalError> {
        let VariableValue::Enum { type_name, value } = tagged else {
            return Err(kind_error(index, &Self::descriptor(), tagged));
        };
        if type_name != Self::TYPE_NAME {
            return Err(MarshalError::Kind {
                index,
                expected: Self::TYPE_NAME.to_owned(),
                found: type_name.clone(),
            });
        }
        let repr = <Self::Repr as Primitive>::from_scalar(*value).ok_or_else(|| {
            MarshalError::Kind {
                index,
                expected: <Self::Repr as Primitive>::KIND.to_string(),
                found: value.kind().to_string(),
            }
        })?;
        Self::from_repr(repr).ok_or_else(|| MarshalError::UnknownEnumValue {
            type_name: Self::TYPE_NAME.to_owned(),
            value: format!("{value:?}"),
        })
    }
}

fn kind_error(index: usize, expected: &TypeDescriptor, found: &VariableValue) -> MarshalError {
    MarshalError::Kind {
        index,
        expected: expected.to_string(),
        found: found.shape().to_owned(),
    }
}

/// Positional view over the arguments of one call.
#[derive(Debug, Clone, Copy)]
pub struct Arguments<'a> {
    values: &'a [VariableValue],
}

impl<'a> Arguments<'a> {
    /// Wraps the argument slice of a call description.
    #[must_use]
    pub const fn new(values: &'a [VariableValue]) -> Self {
        Self { values }
    }

    /// Number of supplied arguments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the call supplied no arguments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::Missing`] when `index` is out of range.
    pub fn value(&self, index: usize) -> Result<&'a VariableValue, MarshalError> {
        self.values
            .get(index)
            .ok_or(MarshalError::Missing { index })
    }

    /// Primitive at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::Kind`] unless the argument is a scalar of
    /// `T`'s kind.
    pub fn scalar<T: Primitive>(&self, index: usize) -> Result<T, MarshalError> {
        let value = self.value(index)?;
        match value {
            VariableValue::Scalar { value: scalar } => {
                T::from_scalar(*scalar).ok_or_else(|| MarshalError::Kind {
                    index,
                    expected: T::KIND.to_string(),
                    found: scalar.kind().to_string(),
                })
            }
            other => Err(kind_error(index, &TypeDescriptor::scalar(T::KIND), other)),
        }
    }

    /// Enum member at `index`.
    ///
    /// # Errors
    ///
    /// See [`NativeEnum::from_value`].
    pub fn enumerated<E: NativeEnum>(&self, index: usize) -> Result<E, MarshalError> {
        E::from_value(index, self.value(index)?)
    }

    /// Vector of primitives at `index`, in their original order.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::Kind`] unless the argument is a vector and
    /// [`MarshalError::Element`] for the first element of the wrong kind.
    pub fn vector<T: Primitive>(&self, index: usize) -> Result<Vec<T>, MarshalError> {
        let value = self.value(index)?;
        let VariableValue::Vector { elements } = value else {
            return Err(kind_error(
                index,
                &TypeDescriptor::vector(TypeDescriptor::scalar(T::KIND)),
                value,
            ));
        };
        elements
            .iter()
            .enumerate()
            .map(|(position, element)| {
                let native = match element {
                    VariableValue::Scalar { value: scalar } => T::from_scalar(*scalar),
                    _ => None,
                };
                native.ok_or(MarshalError::Element {
                    index,
                    position,
                    expected: T::KIND,
                })
            })
            .collect()
    }

    /// Fixed-size array of primitives at `index`.
    ///
    /// # Errors
    ///
    /// As [`Arguments::vector`], plus [`MarshalError::Length`] when the
    /// vector does not hold exactly `N` elements.
    pub fn array<T: Primitive, const N: usize>(&self, index: usize) -> Result<[T; N], MarshalError> {
        let items = self.vector::<T>(index)?;
        let actual = items.len();
        <[T; N]>::try_from(items).map_err(|_| MarshalError::Length {
            index,
            expected: N,
            actual,
        })
    }

    /// Text at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::Kind`] unless the argument is a string.
    pub fn string(&self, index: usize) -> Result<&'a str, MarshalError> {
        match self.value(index)? {
            VariableValue::String { value } => Ok(value),
            other => Err(kind_error(index, &TypeDescriptor::String, other)),
        }
    }

    /// Name of the agent callback passed at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError::Kind`] unless the argument is a callback.
    pub fn callback(&self, index: usize) -> Result<&'a str, MarshalError> {
        match self.value(index)? {
            VariableValue::Callback { name } => Ok(name),
            other => Err(MarshalError::Kind {
                index,
                expected: "callback".to_owned(),
                found: other.shape().to_owned(),
            }),
        }
    }
}

/// Wraps a native primitive result.
#[must_use]
pub fn pack_scalar<T: Primitive>(value: T) -> VariableValue {
    VariableValue::scalar(value.into_scalar())
}

/// Wraps a native sequence, preserving element order.
#[must_use]
pub fn pack_vector<T: Primitive>(values: &[T]) -> VariableValue {
    VariableValue::vector(values.iter().copied().map(pack_scalar).collect())
}

/// Wraps a native enum member.
#[must_use]
pub fn pack_enum<E: NativeEnum>(value: E) -> VariableValue {
    VariableValue::enumerated(E::TYPE_NAME, value.to_repr().into_scalar())
}
