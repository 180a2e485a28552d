//! Error types for schema resolution and value transcoding
//!
//! This module defines the two error families of the crate, and the
//! umbrella type that unifies them at the public boundary:
//!
//! * [`ResolveError`] — failures while resolving type expressions against a
//!   schema, before any value is encoded or decoded.
//! * [`CodecError`] — failures while converting between values and their
//!   binary form, or while sequencing argument buffers.
//! * [`AbiError`] — either of the above, for callers that drive resolution
//!   and transcoding through one code path.
//!
//! Every error is terminal for the call that produced it: nothing in this
//! crate retries, defaults, or partially succeeds. A buffer that cannot be
//! fully and exactly consumed is rejected.

use std::error::Error;
use std::fmt::{Display, Formatter, Result};
use std::string::FromUtf8Error;

use num_bigint::BigInt;

/// Errors arising while resolving type expressions against a [`Schema`]
///
/// All of these are reported at schema-load time, by the
/// [`TypeRegistry`](crate::registry::TypeRegistry); once an endpoint has
/// resolved successfully, encoding and decoding against its descriptors can
/// no longer fail for any of the reasons listed here.
///
/// [`Schema`]: crate::schema::Schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A type expression referenced a struct or enum name absent from the schema.
    UnknownType { name: String },
    /// A struct or enum definition recursed into itself during field resolution.
    ///
    /// Descriptors form an eager immutable tree, so recursive definitions are
    /// rejected outright, even when the recursion passes through an `Option`
    /// or `List` constructor.
    CyclicType { name: String },
    /// An endpoint name absent from the schema was requested.
    UnknownEndpoint { name: String },
    /// A formatted type name could not be parsed into a type expression.
    MalformedType { input: String },
    /// A parameterized constructor was applied to the wrong number of arguments.
    WrongArity {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// A variadic type appeared anywhere other than the last position of an
    /// endpoint parameter list.
    MisplacedVariadic { name: String },
    /// A multi-value type appeared outside of an endpoint parameter list, a
    /// list element, or a variadic item.
    MisplacedMulti { name: String },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ResolveError::UnknownType { name } => {
                write!(f, "schema has no type definition named `{}`", name)
            }
            ResolveError::CyclicType { name } => {
                write!(f, "type definition `{}` is part of a reference cycle", name)
            }
            ResolveError::UnknownEndpoint { name } => {
                write!(f, "schema has no endpoint named `{}`", name)
            }
            ResolveError::MalformedType { input } => {
                write!(f, "cannot parse `{}` as a type expression", input)
            }
            ResolveError::WrongArity {
                name,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "type constructor `{}` takes {} argument(s), found {}",
                    name, expected, actual
                )
            }
            ResolveError::MisplacedVariadic { name } => {
                write!(
                    f,
                    "variadic type `{}` may only appear as the last endpoint parameter",
                    name
                )
            }
            ResolveError::MisplacedMulti { name } => {
                write!(
                    f,
                    "multi-value type `{}` may only appear as an endpoint parameter, list element, or variadic item",
                    name
                )
            }
        }
    }
}

impl Error for ResolveError {}

/// Type alias for `Result` with an error type of [`ResolveError`]
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Errors arising while encoding or decoding values, or while sequencing
/// argument buffers
///
/// Decoding errors reject corrupt or truncated input outright; encoding
/// errors reject values whose shape or range does not match the descriptor
/// they are encoded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A read ran past the end of the available input.
    UnexpectedEnd { needed: usize, available: usize },
    /// Input bytes remained after a value was fully decoded.
    TrailingBytes { remaining: usize },
    /// A 4-byte length prefix declared more bytes than the input holds.
    LengthPrefixOverrun { declared: usize, available: usize },
    /// A nested payload was too large to describe with a 4-byte length prefix.
    OversizedPayload { len: usize },
    /// A byte that was neither `0x00` nor `0x01` where a boolean was expected.
    InvalidBoolean(u8),
    /// String payload held malformed UTF-8.
    InvalidUtf8(FromUtf8Error),
    /// An address payload was not exactly 32 bytes.
    InvalidAddressLength { actual: usize },
    /// Input was exhausted partway through the declared fields of a struct.
    IncompleteStruct { type_name: String, field: String },
    /// A decoded discriminant matched no declared variant of an enum.
    UnknownVariant { type_name: String, discriminant: u8 },
    /// Fewer argument buffers were available than the declared types require.
    InsufficientArguments { expected: usize, actual: usize },
    /// The number of argument buffers or values did not match the declared
    /// parameter list.
    ArityMismatch { expected: usize, actual: usize },
    /// A value's shape did not match the descriptor it was used with.
    TypeMismatch {
        expected: String,
        found: &'static str,
    },
    /// An integer value does not fit the width declared by its descriptor.
    IntOutOfRange { type_name: String, value: BigInt },
    /// A multi-value or variadic descriptor reached the single-value codec in
    /// a context where it cannot be expressed as one buffer's worth of bytes.
    InvalidSingleValue { type_name: String },
    /// One item of a bulk payload replacement failed to convert; the
    /// replacement as a whole was rejected.
    ItemConversion {
        index: usize,
        source: Box<CodecError>,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            CodecError::UnexpectedEnd { needed, available } => {
                write!(
                    f,
                    "cannot read {} byte(s): only {} remaining",
                    needed, available
                )
            }
            CodecError::TrailingBytes { remaining } => {
                write!(f, "{} byte(s) left over after decoding", remaining)
            }
            CodecError::LengthPrefixOverrun {
                declared,
                available,
            } => {
                write!(
                    f,
                    "length prefix declares {} byte(s) but only {} remain",
                    declared, available
                )
            }
            CodecError::OversizedPayload { len } => {
                write!(
                    f,
                    "payload of {} bytes exceeds the 4-byte length-prefix range",
                    len
                )
            }
            CodecError::InvalidBoolean(byte) => {
                write!(f, "invalid boolean encoding 0x{:02x}", byte)
            }
            CodecError::InvalidUtf8(err) => {
                write!(f, "string payload is not valid UTF-8: {}", err)
            }
            CodecError::InvalidAddressLength { actual } => {
                write!(f, "address must be exactly 32 bytes, found {}", actual)
            }
            CodecError::IncompleteStruct { type_name, field } => {
                write!(
                    f,
                    "input exhausted while decoding field `{}` of struct `{}`",
                    field, type_name
                )
            }
            CodecError::UnknownVariant {
                type_name,
                discriminant,
            } => {
                write!(
                    f,
                    "unknown discriminant 0x{:02x} for enum `{}`",
                    discriminant, type_name
                )
            }
            CodecError::InsufficientArguments { expected, actual } => {
                write!(
                    f,
                    "expected {} argument buffer(s), only {} available",
                    expected, actual
                )
            }
            CodecError::ArityMismatch { expected, actual } => {
                write!(
                    f,
                    "argument count mismatch: declared {}, found {}",
                    expected, actual
                )
            }
            CodecError::TypeMismatch { expected, found } => {
                write!(
                    f,
                    "value of kind {} cannot be encoded as `{}`",
                    found, expected
                )
            }
            CodecError::IntOutOfRange { type_name, value } => {
                write!(f, "integer {} does not fit in `{}`", value, type_name)
            }
            CodecError::InvalidSingleValue { type_name } => {
                write!(
                    f,
                    "`{}` cannot be encoded as a single standalone value in this context",
                    type_name
                )
            }
            CodecError::ItemConversion { index, source } => {
                write!(
                    f,
                    "payload replacement rejected: item {} failed to convert ({})",
                    index, source
                )
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CodecError::InvalidUtf8(err) => Some(err),
            CodecError::ItemConversion { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<FromUtf8Error> for CodecError {
    fn from(err: FromUtf8Error) -> Self {
        Self::InvalidUtf8(err)
    }
}

/// Type alias for `Result` with an error type of [`CodecError`]
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Umbrella error for callers that drive both resolution and transcoding
/// through one fallible code path
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AbiError {
    Resolve(ResolveError),
    Codec(CodecError),
}

impl From<ResolveError> for AbiError {
    fn from(err: ResolveError) -> Self {
        Self::Resolve(err)
    }
}

impl From<CodecError> for AbiError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

impl Display for AbiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            AbiError::Resolve(err) => {
                write!(f, "schema resolution failed: {}", err)
            }
            AbiError::Codec(err) => {
                write!(f, "transcoding failed: {}", err)
            }
        }
    }
}

impl Error for AbiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AbiError::Resolve(err) => Some(err),
            AbiError::Codec(err) => Some(err),
        }
    }
}
