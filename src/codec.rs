//! The single-value codec
//!
//! Serializes one [`Value`] against one [`TypeDescriptor`] and back, in one
//! of the two encoding contexts:
//!
//! * [`Context::TopLevel`] — the value occupies an entire standalone
//!   argument buffer. Variable-length values are written with no length
//!   prefix; the buffer boundary itself delimits them.
//! * [`Context::Nested`] — the value is embedded inside a parent value.
//!   Variable-length values carry a 4-byte unsigned big-endian byte-length
//!   prefix; fixed-width values carry none, since their length follows from
//!   the type alone.
//!
//! Structs, enums, and options never carry a prefix of their own in either
//! context: their fields delimit them structurally. Multi-values are
//! expressible here only in nested context (as the concatenation of their
//! members); at the top level they span several buffers and belong to the
//! [`args`](crate::args) sequencer, as do variadic groups, which this codec
//! rejects outright.
//!
//! Failure is local and non-recoverable: a corrupt or truncated buffer is
//! rejected with a typed error, never a partial result.

use cfg_if::cfg_if;
use num_bigint::BigInt;

use crate::bignum;
use crate::descriptor::TypeDescriptor;
use crate::error::{CodecError, CodecResult};
use crate::native::check_int_range;
use crate::parse::ByteReader;
use crate::target::Target;
use crate::value::Value;

/// Whether a value occupies a whole standalone argument buffer or is
/// embedded inside a parent value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    TopLevel,
    Nested,
}

/// Appends the encoding of `value` against `ty` to `buf`, returning the
/// number of bytes written.
pub fn write_value<U: Target>(
    ty: &TypeDescriptor,
    value: &Value,
    ctx: Context,
    buf: &mut U,
) -> CodecResult<usize> {
    match (ty, value) {
        (TypeDescriptor::Unsigned(width), Value::Int(magnitude)) => {
            let bytes = bignum::int_to_fixed_be(magnitude, false, width.bytes()).ok_or_else(
                || CodecError::IntOutOfRange {
                    type_name: ty.to_string(),
                    value: magnitude.clone(),
                },
            )?;
            Ok(buf.push_all(&bytes))
        }
        (TypeDescriptor::Signed(width), Value::Int(magnitude)) => {
            let bytes = bignum::int_to_fixed_be(magnitude, true, width.bytes()).ok_or_else(
                || CodecError::IntOutOfRange {
                    type_name: ty.to_string(),
                    value: magnitude.clone(),
                },
            )?;
            Ok(buf.push_all(&bytes))
        }
        (TypeDescriptor::BigUnsigned, Value::Int(magnitude)) => {
            check_int_range(ty, magnitude)?;
            write_variable(&bignum::biguint_to_min_be(magnitude.magnitude()), ctx, buf)
        }
        (TypeDescriptor::BigSigned, Value::Int(magnitude)) => {
            write_variable(&bignum::bigint_to_min_be(magnitude), ctx, buf)
        }
        (TypeDescriptor::Bool, Value::Bool(flag)) => {
            Ok(buf.push_one(if *flag { 0x01 } else { 0x00 }))
        }
        (TypeDescriptor::Bytes, Value::Bytes(raw)) => write_variable(raw, ctx, buf),
        (TypeDescriptor::Str, Value::Str(text)) => write_variable(text.as_bytes(), ctx, buf),
        (TypeDescriptor::Address, Value::Address(raw)) => Ok(buf.push_many(*raw)),
        (TypeDescriptor::Struct(def), Value::Struct(fields)) => {
            if fields.len() != def.fields.len() {
                return Err(CodecError::ArityMismatch {
                    expected: def.fields.len(),
                    actual: fields.len(),
                });
            }
            let mut written = 0;
            for (field, value) in def.fields.iter().zip(fields) {
                written += write_value(&field.ty, value, Context::Nested, buf)?;
            }
            Ok(written)
        }
        (
            TypeDescriptor::Enum(def),
            Value::Enum {
                discriminant,
                fields,
            },
        ) => {
            let variant = def.variant_by_discriminant(*discriminant).ok_or_else(|| {
                CodecError::UnknownVariant {
                    type_name: def.name.clone(),
                    discriminant: *discriminant,
                }
            })?;
            if fields.len() != variant.fields.len() {
                return Err(CodecError::ArityMismatch {
                    expected: variant.fields.len(),
                    actual: fields.len(),
                });
            }
            let mut written = buf.push_one(*discriminant);
            for (field_ty, value) in variant.fields.iter().zip(fields) {
                written += write_value(field_ty, value, Context::Nested, buf)?;
            }
            Ok(written)
        }
        (TypeDescriptor::List(item), Value::List(items)) => match ctx {
            Context::TopLevel => {
                let mut written = 0;
                for element in items {
                    written += write_value(item, element, Context::Nested, buf)?;
                }
                Ok(written)
            }
            Context::Nested => {
                // The whole list is one length-prefixed unit when embedded.
                let mut payload: Vec<u8> = Vec::new();
                for element in items {
                    write_value(item, element, Context::Nested, &mut payload)?;
                }
                write_variable(&payload, Context::Nested, buf)
            }
        },
        (TypeDescriptor::Optional(inner), Value::Option(payload)) => match payload {
            None => Ok(buf.push_one(0x00)),
            Some(value) => {
                Ok(buf.push_one(0x01) + write_value(inner, value, Context::Nested, buf)?)
            }
        },
        (TypeDescriptor::Multi(subs), Value::Tuple(members)) if ctx == Context::Nested => {
            if members.len() != subs.len() {
                return Err(CodecError::ArityMismatch {
                    expected: subs.len(),
                    actual: members.len(),
                });
            }
            let mut written = 0;
            for (sub, member) in subs.iter().zip(members) {
                written += write_value(sub, member, Context::Nested, buf)?;
            }
            Ok(written)
        }
        (TypeDescriptor::Multi(_), _) | (TypeDescriptor::Variadic { .. }, _) => {
            Err(CodecError::InvalidSingleValue {
                type_name: ty.to_string(),
            })
        }
        (ty, value) => Err(CodecError::TypeMismatch {
            expected: ty.to_string(),
            found: value.kind_name(),
        }),
    }
}

/// Encodes `value` against `ty` into a fresh buffer.
pub fn encode_value(ty: &TypeDescriptor, value: &Value, ctx: Context) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_value(ty, value, ctx, &mut buf)?;
    Ok(buf)
}

/// Writes a variable-length payload: raw at the top level, length-prefixed
/// when nested.
fn write_variable<U: Target>(payload: &[u8], ctx: Context, buf: &mut U) -> CodecResult<usize> {
    match ctx {
        Context::TopLevel => Ok(buf.push_all(payload)),
        Context::Nested => {
            let declared = u32::try_from(payload.len())
                .map_err(|_| CodecError::OversizedPayload { len: payload.len() })?;
            Ok(buf.push_many(declared.to_be_bytes()) + buf.push_all(payload))
        }
    }
}

/// Consumes and decodes one value of type `ty` from `reader`.
///
/// At the top level the caller owns the exhaustion check (see
/// [`decode_value`]); in nested context the value delimits itself and the
/// remainder belongs to the parent.
pub fn read_value(
    ty: &TypeDescriptor,
    ctx: Context,
    reader: &mut ByteReader<'_>,
) -> CodecResult<Value> {
    match ty {
        TypeDescriptor::Unsigned(width) => {
            let bytes = reader.take(width.bytes())?;
            Ok(Value::Int(bignum::int_from_fixed_be(bytes, false)))
        }
        TypeDescriptor::Signed(width) => {
            let bytes = reader.take(width.bytes())?;
            Ok(Value::Int(bignum::int_from_fixed_be(bytes, true)))
        }
        TypeDescriptor::BigUnsigned => {
            let bytes = read_variable(ctx, reader)?;
            Ok(Value::Int(BigInt::from(bignum::biguint_from_min_be(bytes))))
        }
        TypeDescriptor::BigSigned => {
            let bytes = read_variable(ctx, reader)?;
            Ok(Value::Int(bignum::bigint_from_min_be(bytes)))
        }
        TypeDescriptor::Bool => match reader.take_one()? {
            0x00 => Ok(Value::Bool(false)),
            0x01 => Ok(Value::Bool(true)),
            byte => Err(CodecError::InvalidBoolean(byte)),
        },
        TypeDescriptor::Bytes => Ok(Value::Bytes(read_variable(ctx, reader)?.to_vec())),
        TypeDescriptor::Str => {
            let bytes = read_variable(ctx, reader)?.to_vec();
            Ok(Value::Str(String::from_utf8(bytes)?))
        }
        TypeDescriptor::Address => {
            if ctx == Context::TopLevel && reader.remainder() != 32 {
                return Err(CodecError::InvalidAddressLength {
                    actual: reader.remainder(),
                });
            }
            let bytes = reader.take(32)?;
            let mut raw = [0u8; 32];
            raw.copy_from_slice(bytes);
            Ok(Value::Address(raw))
        }
        TypeDescriptor::Struct(def) => {
            let mut fields = Vec::with_capacity(def.fields.len());
            for field in &def.fields {
                let value =
                    read_value(&field.ty, Context::Nested, reader).map_err(|err| match err {
                        CodecError::UnexpectedEnd { .. } => CodecError::IncompleteStruct {
                            type_name: def.name.clone(),
                            field: field.name.clone(),
                        },
                        other => other,
                    })?;
                fields.push(value);
            }
            Ok(Value::Struct(fields))
        }
        TypeDescriptor::Enum(def) => {
            let discriminant = reader.take_one()?;
            let variant = def.variant_by_discriminant(discriminant).ok_or_else(|| {
                CodecError::UnknownVariant {
                    type_name: def.name.clone(),
                    discriminant,
                }
            })?;
            let mut fields = Vec::with_capacity(variant.fields.len());
            for field_ty in &variant.fields {
                fields.push(read_value(field_ty, Context::Nested, reader)?);
            }
            Ok(Value::Enum {
                discriminant,
                fields,
            })
        }
        TypeDescriptor::List(item) => match ctx {
            Context::TopLevel => read_list_elements(item, reader),
            Context::Nested => {
                let payload = reader.take_length_prefixed()?;
                let mut inner = ByteReader::new(payload);
                read_list_elements(item, &mut inner)
            }
        },
        TypeDescriptor::Optional(inner) => match reader.take_one()? {
            0x00 => Ok(Value::Option(None)),
            0x01 => Ok(Value::some(read_value(inner, Context::Nested, reader)?)),
            byte => Err(CodecError::InvalidBoolean(byte)),
        },
        TypeDescriptor::Multi(subs) if ctx == Context::Nested => {
            let mut members = Vec::with_capacity(subs.len());
            for sub in subs {
                members.push(read_value(sub, Context::Nested, reader)?);
            }
            Ok(Value::Tuple(members))
        }
        TypeDescriptor::Multi(_) | TypeDescriptor::Variadic { .. } => {
            Err(CodecError::InvalidSingleValue {
                type_name: ty.to_string(),
            })
        }
    }
}

/// Decodes one standalone value from `input`, requiring the entire buffer
/// to be consumed.
///
/// An incompletely consumed buffer fails with [`CodecError::TrailingBytes`].
/// Under the `relaxed_absent_option` feature, trailing bytes after an
/// absent top-level option are tolerated instead.
pub fn decode_value(ty: &TypeDescriptor, ctx: Context, input: &[u8]) -> CodecResult<Value> {
    let mut reader = ByteReader::new(input);
    let value = read_value(ty, ctx, &mut reader)?;
    if !reader.is_exhausted() && !remainder_tolerated(ctx, &value) {
        return Err(CodecError::TrailingBytes {
            remaining: reader.remainder(),
        });
    }
    Ok(value)
}

cfg_if! {
    if #[cfg(feature = "relaxed_absent_option")] {
        fn remainder_tolerated(ctx: Context, value: &Value) -> bool {
            ctx == Context::TopLevel && matches!(value, Value::Option(None))
        }
    } else {
        fn remainder_tolerated(_ctx: Context, _value: &Value) -> bool {
            false
        }
    }
}

/// Decodes nested-encoded list elements until `reader` is exhausted.
///
/// A partial trailing element fails with [`CodecError::TrailingBytes`]: the
/// element boundary cannot be recovered once a read runs out of input.
fn read_list_elements(item: &TypeDescriptor, reader: &mut ByteReader<'_>) -> CodecResult<Value> {
    let mut items = Vec::new();
    while !reader.is_exhausted() {
        let before = reader.remainder();
        match read_value(item, Context::Nested, reader) {
            Ok(value) => items.push(value),
            Err(CodecError::UnexpectedEnd { .. }) => {
                return Err(CodecError::TrailingBytes { remaining: before })
            }
            Err(other) => return Err(other),
        }
    }
    Ok(Value::List(items))
}

/// Reads a variable-length payload: the whole remainder at the top level,
/// one length-prefixed run when nested.
fn read_variable<'a>(ctx: Context, reader: &mut ByteReader<'a>) -> CodecResult<&'a [u8]> {
    match ctx {
        Context::TopLevel => Ok(reader.take_all()),
        Context::Nested => reader.take_length_prefixed(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::descriptor::{
        EnumDescriptor, FieldDescriptor, IntWidth, StructDescriptor, VariantDescriptor,
    };
    use std::sync::Arc;

    fn pair_struct() -> TypeDescriptor {
        TypeDescriptor::Struct(Arc::new(StructDescriptor {
            name: "Pair".to_owned(),
            fields: vec![
                FieldDescriptor {
                    name: "a".to_owned(),
                    ty: Arc::new(TypeDescriptor::Unsigned(IntWidth::W8)),
                },
                FieldDescriptor {
                    name: "b".to_owned(),
                    ty: Arc::new(TypeDescriptor::Str),
                },
            ],
        }))
    }

    fn mode_enum() -> TypeDescriptor {
        TypeDescriptor::Enum(Arc::new(EnumDescriptor {
            name: "Mode".to_owned(),
            variants: vec![
                VariantDescriptor {
                    discriminant: 0,
                    name: "Off".to_owned(),
                    fields: vec![],
                },
                VariantDescriptor {
                    discriminant: 2,
                    name: "Forced".to_owned(),
                    fields: vec![Arc::new(TypeDescriptor::Bool)],
                },
            ],
        }))
    }

    fn pair(a: u8, b: &str) -> Value {
        Value::Struct(vec![Value::from(a), Value::from(b)])
    }

    fn roundtrip(ty: &TypeDescriptor, value: &Value) {
        for ctx in [Context::TopLevel, Context::Nested] {
            let encoded = encode_value(ty, value, ctx).unwrap();
            assert_eq!(
                decode_value(ty, ctx, &encoded).as_ref(),
                Ok(value),
                "roundtrip failed for `{}` in {:?} context",
                ty,
                ctx
            );
        }
    }

    #[test]
    fn fixed_integers_are_full_width() {
        let ty = TypeDescriptor::Unsigned(IntWidth::W32);
        let encoded = encode_value(&ty, &Value::from(5u32), Context::TopLevel).unwrap();
        assert_eq!(encoded, vec![0, 0, 0, 5]);
        // Same bytes in nested context: fixed-width values carry no prefix.
        assert_eq!(
            encode_value(&ty, &Value::from(5u32), Context::Nested).unwrap(),
            encoded
        );
        assert_eq!(
            encode_value(
                &TypeDescriptor::Signed(IntWidth::W16),
                &Value::from(-2i16),
                Context::Nested
            )
            .unwrap(),
            vec![0xff, 0xfe]
        );
    }

    #[test]
    fn unbounded_zero_is_empty_top_level() {
        let encoded =
            encode_value(&TypeDescriptor::BigUnsigned, &Value::from(0u8), Context::TopLevel)
                .unwrap();
        assert_eq!(encoded, Vec::<u8>::new());
        assert_eq!(
            decode_value(&TypeDescriptor::BigUnsigned, Context::TopLevel, &[]).unwrap(),
            Value::from(0u8)
        );
    }

    #[test]
    fn unbounded_nested_is_prefixed() {
        let encoded =
            encode_value(&TypeDescriptor::BigUnsigned, &Value::from(256u16), Context::Nested)
                .unwrap();
        assert_eq!(encoded, vec![0, 0, 0, 2, 0x01, 0x00]);
        roundtrip(&TypeDescriptor::BigSigned, &Value::from(-129i16));
    }

    #[test]
    fn negative_rejected_for_unsigned() {
        assert!(matches!(
            encode_value(&TypeDescriptor::BigUnsigned, &Value::from(-1i8), Context::TopLevel),
            Err(CodecError::IntOutOfRange { .. })
        ));
        assert!(matches!(
            encode_value(
                &TypeDescriptor::Unsigned(IntWidth::W8),
                &Value::from(256u16),
                Context::TopLevel
            ),
            Err(CodecError::IntOutOfRange { .. })
        ));
    }

    #[test]
    fn bool_bytes() {
        let encoded = encode_value(&TypeDescriptor::Bool, &Value::from(true), Context::Nested)
            .unwrap();
        assert_eq!(encoded, vec![0x01]);
        assert_eq!(
            decode_value(&TypeDescriptor::Bool, Context::TopLevel, &[0x02]),
            Err(CodecError::InvalidBoolean(0x02))
        );
    }

    #[test]
    fn str_rejects_malformed_utf8() {
        assert!(matches!(
            decode_value(&TypeDescriptor::Str, Context::TopLevel, &[0xff, 0xfe]),
            Err(CodecError::InvalidUtf8(_))
        ));
        roundtrip(&TypeDescriptor::Str, &Value::from("héllo"));
    }

    #[test]
    fn address_is_exactly_32_bytes() {
        let value = Value::Address([7u8; 32]);
        roundtrip(&TypeDescriptor::Address, &value);
        assert_eq!(
            decode_value(&TypeDescriptor::Address, Context::TopLevel, &[7u8; 31]),
            Err(CodecError::InvalidAddressLength { actual: 31 })
        );
    }

    #[test]
    fn struct_nested_in_list_layout() {
        // Each element is one 1-byte field plus a length-prefixed string,
        // concatenated with no separator.
        let list = TypeDescriptor::List(Arc::new(pair_struct()));
        let value = Value::List(vec![pair(5, "hi"), pair(9, "ok")]);
        let encoded = encode_value(&list, &value, Context::TopLevel).unwrap();
        assert_eq!(
            encoded,
            vec![
                0x05, 0x00, 0x00, 0x00, 0x02, 0x68, 0x69, //
                0x09, 0x00, 0x00, 0x00, 0x02, 0x6f, 0x6b,
            ]
        );
        assert_eq!(decode_value(&list, Context::TopLevel, &encoded).unwrap(), value);
    }

    #[test]
    fn struct_incomplete_input() {
        let encoded = &[0x05, 0x00, 0x00];
        assert_eq!(
            decode_value(&pair_struct(), Context::TopLevel, encoded),
            Err(CodecError::IncompleteStruct {
                type_name: "Pair".to_owned(),
                field: "b".to_owned(),
            })
        );
    }

    #[test]
    fn list_must_exhaust_top_level_buffer() {
        let ty = TypeDescriptor::List(Arc::new(TypeDescriptor::Unsigned(IntWidth::W16)));
        // Five bytes: two whole u16 elements plus one partial byte.
        assert_eq!(
            decode_value(&ty, Context::TopLevel, &[0, 1, 0, 2, 0]),
            Err(CodecError::TrailingBytes { remaining: 1 })
        );
    }

    #[test]
    fn nested_list_is_one_prefixed_unit() {
        let ty = TypeDescriptor::List(Arc::new(TypeDescriptor::Unsigned(IntWidth::W8)));
        let value = Value::List(vec![Value::from(1u8), Value::from(2u8)]);
        assert_eq!(
            encode_value(&ty, &value, Context::Nested).unwrap(),
            vec![0, 0, 0, 2, 1, 2]
        );
        roundtrip(&ty, &value);

        assert_eq!(
            decode_value(&ty, Context::Nested, &[0, 0, 0, 9, 1, 2]),
            Err(CodecError::LengthPrefixOverrun {
                declared: 9,
                available: 2
            })
        );
    }

    #[test]
    fn option_layout() {
        let ty = TypeDescriptor::Optional(Arc::new(TypeDescriptor::Unsigned(IntWidth::W16)));
        assert_eq!(
            encode_value(&ty, &Value::none(), Context::Nested).unwrap(),
            vec![0x00]
        );
        assert_eq!(
            encode_value(&ty, &Value::some(Value::from(7u16)), Context::Nested).unwrap(),
            vec![0x01, 0x00, 0x07]
        );
        roundtrip(&ty, &Value::some(Value::from(7u16)));
        roundtrip(&ty, &Value::none());
    }

    #[cfg(not(feature = "relaxed_absent_option"))]
    #[test]
    fn absent_option_with_trailing_bytes_rejected() {
        let ty = TypeDescriptor::Optional(Arc::new(TypeDescriptor::Unsigned(IntWidth::W16)));
        assert_eq!(
            decode_value(&ty, Context::TopLevel, &[0x00, 0xaa]),
            Err(CodecError::TrailingBytes { remaining: 1 })
        );
    }

    #[cfg(feature = "relaxed_absent_option")]
    #[test]
    fn absent_option_trailing_bytes_tolerated_top_level_only() {
        let ty = TypeDescriptor::Optional(Arc::new(TypeDescriptor::Unsigned(IntWidth::W16)));
        assert_eq!(
            decode_value(&ty, Context::TopLevel, &[0x00, 0xaa]),
            Ok(Value::none())
        );
        assert_eq!(
            decode_value(&ty, Context::Nested, &[0x00, 0xaa]),
            Err(CodecError::TrailingBytes { remaining: 1 })
        );
    }

    #[test]
    fn enum_layout() {
        let ty = mode_enum();
        let value = Value::Enum {
            discriminant: 2,
            fields: vec![Value::from(true)],
        };
        assert_eq!(
            encode_value(&ty, &value, Context::TopLevel).unwrap(),
            vec![0x02, 0x01]
        );
        roundtrip(&ty, &value);
        assert_eq!(
            decode_value(&ty, Context::TopLevel, &[0x09]),
            Err(CodecError::UnknownVariant {
                type_name: "Mode".to_owned(),
                discriminant: 9
            })
        );
    }

    #[test]
    fn multi_only_nested() {
        let ty = TypeDescriptor::Multi(vec![
            Arc::new(TypeDescriptor::Unsigned(IntWidth::W8)),
            Arc::new(TypeDescriptor::Bool),
        ]);
        let value = Value::Tuple(vec![Value::from(3u8), Value::from(true)]);
        assert_eq!(
            encode_value(&ty, &value, Context::Nested).unwrap(),
            vec![0x03, 0x01]
        );
        assert!(matches!(
            encode_value(&ty, &value, Context::TopLevel),
            Err(CodecError::InvalidSingleValue { .. })
        ));
    }

    #[test]
    fn shape_mismatch_rejected() {
        assert!(matches!(
            encode_value(&TypeDescriptor::Bool, &Value::from(3u8), Context::TopLevel),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn composite_roundtrips() {
        let ty = TypeDescriptor::List(Arc::new(TypeDescriptor::Optional(Arc::new(
            pair_struct(),
        ))));
        let value = Value::List(vec![
            Value::some(pair(1, "x")),
            Value::none(),
            Value::some(pair(255, "")),
        ]);
        roundtrip(&ty, &value);
    }
}
