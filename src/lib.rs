//! # Overview
//!
//! A schema-driven codec for the call-data format of Dharitri smart
//! contracts: typed values are serialized into the ordered byte-buffer
//! arguments a contract call carries, and raw buffers coming back from a
//! call are deserialized against the contract's declared types.
//!
//! The pipeline runs in three stages:
//!
//! 1. **Schema & resolution** — [`schema`] models a contract's ABI
//!    description (named struct/enum definitions, endpoints with formatted
//!    type names such as `List<u32>` or `variadic<multi<u32,bytes>>`), and
//!    [`registry`] resolves those names into immutable, shared
//!    [`TypeDescriptor`](descriptor::TypeDescriptor) trees, enforcing
//!    placement rules for variadic and multi constructors up front.
//! 2. **Single values** — [`codec`] serializes one [`Value`](value::Value)
//!    against one descriptor, in either top-level context (unprefixed,
//!    delimited by its buffer) or nested context (variable-length data
//!    carries a 4-byte big-endian length prefix).
//! 3. **Argument sequences** — [`args`] lays whole parameter lists out
//!    across buffer sequences, expanding multi-values into one buffer per
//!    member and variadic groups into their item buffers.
//!
//! Conversion between native Rust types and the value model goes through
//! the [`IntoValue`](native::IntoValue)/[`FromValue`](native::FromValue)
//! traits in [`native`].
//!
//! # Example
//!
//! ```
//! use drtabi::codec::{decode_value, encode_value, Context};
//! use drtabi::registry::TypeRegistry;
//! use drtabi::schema::{FieldDef, Schema, StructDef, TypeExpr};
//! use drtabi::value::Value;
//!
//! # fn main() -> Result<(), drtabi::error::AbiError> {
//! let mut schema = Schema::new();
//! schema.define_struct(StructDef::new(
//!     "Pair",
//!     vec![
//!         FieldDef::new("a", "u8")?,
//!         FieldDef::new("b", "utf-8 string")?,
//!     ],
//! ));
//! let mut registry = TypeRegistry::new(&schema);
//! let ty = registry.resolve(&TypeExpr::parse("List<Pair>")?)?;
//!
//! let value = Value::List(vec![Value::Struct(vec![
//!     Value::from(5u8),
//!     Value::from("hi"),
//! ])]);
//! let encoded = encode_value(&ty, &value, Context::TopLevel)?;
//! assert_eq!(encoded, [0x05, 0x00, 0x00, 0x00, 0x02, b'h', b'i']);
//! assert_eq!(decode_value(&ty, Context::TopLevel, &encoded)?, value);
//! # Ok(())
//! # }
//! ```
//!
//! # Feature flags
//!
//! * `relaxed_absent_option` — tolerate trailing bytes after an absent
//!   top-level option when decoding, instead of failing with
//!   [`CodecError::TrailingBytes`](error::CodecError::TrailingBytes).

pub mod args;
pub mod bignum;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod native;
pub mod parse;
pub mod registry;
pub mod schema;
pub mod target;
pub mod value;

pub use args::{decode_arguments, encode_arguments};
pub use codec::{decode_value, encode_value, read_value, write_value, Context};
pub use descriptor::{IntWidth, TypeDescriptor};
pub use error::{AbiError, CodecError, ResolveError};
pub use native::{FromValue, IntoValue};
pub use registry::{EndpointDescriptor, TypeRegistry};
pub use schema::{Schema, TypeExpr};
pub use value::Value;
