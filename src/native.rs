//! Projection between native Rust values and the value model
//!
//! Two traits cover the boundary:
//!
//! * [`IntoValue`] — fallibly converts a native value into a [`Value`]
//!   against a declared descriptor. This is the item factory used by
//!   [`Value::set_payload`]: the descriptor decides what shapes and ranges
//!   are admissible, so a `u16` payload item of `300` converts fine against
//!   `u16` but is rejected against `u8`.
//! * [`FromValue`] — fallibly projects a decoded [`Value`] back into a
//!   native type.
//!
//! Infallible [`From`] impls for `Value` are provided alongside, for
//! building values directly when no descriptor check is wanted.

use num_bigint::{BigInt, BigUint, Sign};

use crate::descriptor::TypeDescriptor;
use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Fallible conversion of a native value into a [`Value`] of a declared type
pub trait IntoValue {
    fn into_value(self, ty: &TypeDescriptor) -> CodecResult<Value>;
}

/// Fallible projection of a [`Value`] into a native type
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> CodecResult<Self>;
}

/// Checks that an integer magnitude is representable by an integer
/// descriptor, rejecting non-integer descriptors outright.
pub(crate) fn check_int_range(ty: &TypeDescriptor, value: &BigInt) -> CodecResult<()> {
    let fits = match ty {
        TypeDescriptor::Unsigned(width) => {
            value.sign() != Sign::Minus && value.bits() <= (width.bytes() * 8) as u64
        }
        // Minimal two's-complement length doubles as the range check.
        TypeDescriptor::Signed(width) => value.to_signed_bytes_be().len() <= width.bytes(),
        TypeDescriptor::BigUnsigned => value.sign() != Sign::Minus,
        TypeDescriptor::BigSigned => true,
        other => {
            return Err(CodecError::TypeMismatch {
                expected: other.to_string(),
                found: "integer",
            })
        }
    };
    if fits {
        Ok(())
    } else {
        Err(CodecError::IntOutOfRange {
            type_name: ty.to_string(),
            value: value.clone(),
        })
    }
}

macro_rules! impl_int_into_value {
    ($($src:ty),* $(,)?) => {
        $(
            impl IntoValue for $src {
                fn into_value(self, ty: &TypeDescriptor) -> CodecResult<Value> {
                    let magnitude = BigInt::from(self);
                    check_int_range(ty, &magnitude)?;
                    Ok(Value::Int(magnitude))
                }
            }

            impl From<$src> for Value {
                fn from(val: $src) -> Self {
                    Value::Int(BigInt::from(val))
                }
            }
        )*
    };
}

impl_int_into_value!(u8, u16, u32, u64, i8, i16, i32, i64);

impl IntoValue for BigUint {
    fn into_value(self, ty: &TypeDescriptor) -> CodecResult<Value> {
        let magnitude = BigInt::from(self);
        check_int_range(ty, &magnitude)?;
        Ok(Value::Int(magnitude))
    }
}

impl IntoValue for BigInt {
    fn into_value(self, ty: &TypeDescriptor) -> CodecResult<Value> {
        check_int_range(ty, &self)?;
        Ok(Value::Int(self))
    }
}

impl IntoValue for bool {
    fn into_value(self, ty: &TypeDescriptor) -> CodecResult<Value> {
        match ty {
            TypeDescriptor::Bool => Ok(Value::Bool(self)),
            other => Err(CodecError::TypeMismatch {
                expected: other.to_string(),
                found: "boolean",
            }),
        }
    }
}

impl IntoValue for String {
    fn into_value(self, ty: &TypeDescriptor) -> CodecResult<Value> {
        match ty {
            TypeDescriptor::Str => Ok(Value::Str(self)),
            TypeDescriptor::Bytes => Ok(Value::Bytes(self.into_bytes())),
            other => Err(CodecError::TypeMismatch {
                expected: other.to_string(),
                found: "string",
            }),
        }
    }
}

impl IntoValue for &str {
    fn into_value(self, ty: &TypeDescriptor) -> CodecResult<Value> {
        self.to_owned().into_value(ty)
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self, ty: &TypeDescriptor) -> CodecResult<Value> {
        match ty {
            TypeDescriptor::Bytes => Ok(Value::Bytes(self)),
            TypeDescriptor::Address => {
                let actual = self.len();
                let raw: [u8; 32] = self
                    .try_into()
                    .map_err(|_| CodecError::InvalidAddressLength { actual })?;
                Ok(Value::Address(raw))
            }
            other => Err(CodecError::TypeMismatch {
                expected: other.to_string(),
                found: "bytes",
            }),
        }
    }
}

impl IntoValue for &[u8] {
    fn into_value(self, ty: &TypeDescriptor) -> CodecResult<Value> {
        self.to_vec().into_value(ty)
    }
}

impl IntoValue for [u8; 32] {
    fn into_value(self, ty: &TypeDescriptor) -> CodecResult<Value> {
        match ty {
            TypeDescriptor::Address => Ok(Value::Address(self)),
            TypeDescriptor::Bytes => Ok(Value::Bytes(self.to_vec())),
            other => Err(CodecError::TypeMismatch {
                expected: other.to_string(),
                found: "address",
            }),
        }
    }
}

impl IntoValue for Value {
    /// Pre-built values pass through unchecked; the codec validates their
    /// shape against the descriptor when they are encoded.
    fn into_value(self, _ty: &TypeDescriptor) -> CodecResult<Value> {
        Ok(self)
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Str(val.to_owned())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::Str(val)
    }
}

impl From<Vec<u8>> for Value {
    fn from(val: Vec<u8>) -> Self {
        Value::Bytes(val)
    }
}

impl From<BigUint> for Value {
    fn from(val: BigUint) -> Self {
        Value::Int(BigInt::from(val))
    }
}

impl From<BigInt> for Value {
    fn from(val: BigInt) -> Self {
        Value::Int(val)
    }
}

macro_rules! impl_int_from_value {
    ($($tgt:ty => $name:literal),* $(,)?) => {
        $(
            impl FromValue for $tgt {
                fn from_value(value: &Value) -> CodecResult<Self> {
                    match value {
                        Value::Int(magnitude) => <$tgt>::try_from(magnitude).map_err(|_| {
                            CodecError::IntOutOfRange {
                                type_name: $name.to_owned(),
                                value: magnitude.clone(),
                            }
                        }),
                        other => Err(CodecError::TypeMismatch {
                            expected: $name.to_owned(),
                            found: other.kind_name(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_int_from_value!(
    u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64",
    i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64",
);

impl FromValue for BigUint {
    fn from_value(value: &Value) -> CodecResult<Self> {
        match value {
            Value::Int(magnitude) => {
                magnitude
                    .to_biguint()
                    .ok_or_else(|| CodecError::IntOutOfRange {
                        type_name: "BigUint".to_owned(),
                        value: magnitude.clone(),
                    })
            }
            other => Err(CodecError::TypeMismatch {
                expected: "BigUint".to_owned(),
                found: other.kind_name(),
            }),
        }
    }
}

impl FromValue for BigInt {
    fn from_value(value: &Value) -> CodecResult<Self> {
        match value {
            Value::Int(magnitude) => Ok(magnitude.clone()),
            other => Err(CodecError::TypeMismatch {
                expected: "BigInt".to_owned(),
                found: other.kind_name(),
            }),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> CodecResult<Self> {
        match value {
            Value::Bool(flag) => Ok(*flag),
            other => Err(CodecError::TypeMismatch {
                expected: "bool".to_owned(),
                found: other.kind_name(),
            }),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> CodecResult<Self> {
        match value {
            Value::Str(text) => Ok(text.clone()),
            other => Err(CodecError::TypeMismatch {
                expected: "utf-8 string".to_owned(),
                found: other.kind_name(),
            }),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> CodecResult<Self> {
        match value {
            Value::Bytes(raw) => Ok(raw.clone()),
            Value::Address(raw) => Ok(raw.to_vec()),
            other => Err(CodecError::TypeMismatch {
                expected: "bytes".to_owned(),
                found: other.kind_name(),
            }),
        }
    }
}

impl FromValue for [u8; 32] {
    fn from_value(value: &Value) -> CodecResult<Self> {
        match value {
            Value::Address(raw) => Ok(*raw),
            other => Err(CodecError::TypeMismatch {
                expected: "Address".to_owned(),
                found: other.kind_name(),
            }),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> CodecResult<Self> {
        Ok(value.clone())
    }
}
