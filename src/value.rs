//! The closed value model
//!
//! [`Value`] is the tagged union mirroring [`TypeDescriptor`]: every
//! decodable ABI value is an instance of it. Values carry no behavior
//! beyond equality, projection to and from native Rust values (see
//! [`native`](crate::native)), and the bulk payload replacement defined
//! here; they are constructed either by the caller (for encoding) or by the
//! decoder, and are not mutated afterwards except through
//! [`Value::set_payload`].

use num_bigint::BigInt;

use crate::descriptor::TypeDescriptor;
use crate::error::{CodecError, CodecResult};
use crate::native::{FromValue, IntoValue};

/// One ABI value of any shape
///
/// Integer values of every declared width share the [`Int`](Value::Int)
/// variant; the descriptor a value is encoded against decides signedness and
/// width, and rejects out-of-range magnitudes at encode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(BigInt),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    Address([u8; 32]),
    /// Field values in declaration order.
    Struct(Vec<Value>),
    Enum {
        discriminant: u8,
        fields: Vec<Value>,
    },
    List(Vec<Value>),
    Option(Option<Box<Value>>),
    /// Realizes a multi-value descriptor: one member per sub-type.
    Tuple(Vec<Value>),
    /// Items of a variadic group, counted or not.
    Variadic(Vec<Value>),
}

impl Value {
    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::Bytes(_) => "bytes",
            Value::Str(_) => "string",
            Value::Address(_) => "address",
            Value::Struct(_) => "struct",
            Value::Enum { .. } => "enum",
            Value::List(_) => "list",
            Value::Option(_) => "option",
            Value::Tuple(_) => "tuple",
            Value::Variadic(_) => "variadic",
        }
    }

    /// Wraps a present optional value.
    #[must_use]
    pub fn some(inner: Value) -> Self {
        Value::Option(Some(Box::new(inner)))
    }

    /// The absent optional value.
    #[must_use]
    pub const fn none() -> Self {
        Value::Option(None)
    }

    /// Replaces the entire item list of a `List` or `Variadic` value with
    /// items converted from a native payload.
    ///
    /// Each native item is converted through the [`IntoValue`] factory bound
    /// to the declared item descriptor. The replacement is atomic: every
    /// item is converted before the previous list is touched, and on any
    /// conversion failure the whole operation is rejected with
    /// [`CodecError::ItemConversion`], leaving the prior items intact.
    pub fn set_payload<T: IntoValue>(
        &mut self,
        item_type: &TypeDescriptor,
        payload: impl IntoIterator<Item = T>,
    ) -> CodecResult<()> {
        let items = match self {
            Value::List(items) | Value::Variadic(items) => items,
            other => {
                return Err(CodecError::TypeMismatch {
                    expected: format!("List<{0}> or variadic<{0}>", item_type),
                    found: other.kind_name(),
                })
            }
        };
        let mut fresh = Vec::new();
        for (index, native) in payload.into_iter().enumerate() {
            match native.into_value(item_type) {
                Ok(value) => fresh.push(value),
                Err(source) => {
                    return Err(CodecError::ItemConversion {
                        index,
                        source: Box::new(source),
                    })
                }
            }
        }
        *items = fresh;
        Ok(())
    }

    /// Projects the items of a `List` or `Variadic` value back into a native
    /// payload, converting each through [`FromValue`].
    pub fn payload<T: FromValue>(&self) -> CodecResult<Vec<T>> {
        let items = match self {
            Value::List(items) | Value::Variadic(items) => items,
            other => {
                return Err(CodecError::TypeMismatch {
                    expected: "List or variadic".to_owned(),
                    found: other.kind_name(),
                })
            }
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                T::from_value(item).map_err(|source| CodecError::ItemConversion {
                    index,
                    source: Box::new(source),
                })
            })
            .collect()
    }

    /// Returns the items of a `List`, `Tuple`, or `Variadic` value.
    #[must_use]
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Variadic(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::descriptor::IntWidth;

    #[test]
    fn set_payload_replaces_items() {
        let mut value = Value::Variadic(Vec::new());
        value
            .set_payload(&TypeDescriptor::Unsigned(IntWidth::W32), [1u32, 2, 3])
            .unwrap();
        assert_eq!(
            value,
            Value::Variadic(vec![
                Value::Int(BigInt::from(1)),
                Value::Int(BigInt::from(2)),
                Value::Int(BigInt::from(3)),
            ])
        );
        assert_eq!(value.payload::<u32>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn set_payload_is_atomic() {
        let mut value = Value::List(vec![Value::Int(BigInt::from(7))]);
        let before = value.clone();
        // 300 does not fit in u8, so the whole replacement must be rejected.
        let err = value
            .set_payload(&TypeDescriptor::Unsigned(IntWidth::W8), [1u16, 300, 2])
            .unwrap_err();
        assert!(matches!(err, CodecError::ItemConversion { index: 1, .. }));
        assert_eq!(value, before);
    }

    #[test]
    fn set_payload_requires_collection() {
        let mut value = Value::Bool(true);
        assert!(matches!(
            value.set_payload(&TypeDescriptor::Bool, [true]),
            Err(CodecError::TypeMismatch { .. })
        ));
    }
}
