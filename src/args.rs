//! Top-level argument sequencing
//!
//! A contract call carries an ordered sequence of standalone byte buffers.
//! This module maps between a parameter list of [`TypeDescriptor`]s plus
//! matching [`Value`]s and that buffer sequence:
//!
//! * a plain parameter occupies exactly one buffer, top-level encoded;
//! * a multi-value parameter of `N` members occupies `N` consecutive
//!   buffers, one per member;
//! * an uncounted variadic parameter (always last) consumes every
//!   remaining buffer, one item group at a time;
//! * a counted variadic parameter is a leading count buffer (a fixed
//!   4-byte unsigned big-endian integer) followed by exactly that many
//!   item groups.
//!
//! Decoding is strict on both ends: running out of buffers mid-parameter
//! fails with [`CodecError::InsufficientArguments`], and buffers left over
//! after the last parameter fail with [`CodecError::ArityMismatch`].

use std::sync::Arc;

use crate::codec::{decode_value, encode_value, Context};
use crate::descriptor::{IntWidth, TypeDescriptor};
use crate::error::{CodecError, CodecResult};
use crate::native::FromValue;
use crate::value::Value;

/// Encodes one value per parameter into the call's buffer sequence.
pub fn encode_arguments(
    types: &[Arc<TypeDescriptor>],
    values: &[Value],
) -> CodecResult<Vec<Vec<u8>>> {
    if values.len() != types.len() {
        return Err(CodecError::ArityMismatch {
            expected: types.len(),
            actual: values.len(),
        });
    }
    let mut buffers = Vec::new();
    for (ty, value) in types.iter().zip(values) {
        match (ty.as_ref(), value) {
            (TypeDescriptor::Variadic { item, counted }, Value::Variadic(items)) => {
                if *counted {
                    let count = u32::try_from(items.len())
                        .map_err(|_| CodecError::OversizedPayload { len: items.len() })?;
                    buffers.push(count.to_be_bytes().to_vec());
                }
                for item_value in items {
                    encode_item(item, item_value, &mut buffers)?;
                }
            }
            (TypeDescriptor::Variadic { .. }, other) => {
                return Err(CodecError::TypeMismatch {
                    expected: ty.to_string(),
                    found: other.kind_name(),
                })
            }
            _ => encode_item(ty, value, &mut buffers)?,
        }
    }
    Ok(buffers)
}

/// Decodes the call's buffer sequence back into one value per parameter.
pub fn decode_arguments(
    types: &[Arc<TypeDescriptor>],
    buffers: &[Vec<u8>],
) -> CodecResult<Vec<Value>> {
    let mut cursor = BufferCursor::new(buffers);
    let mut values = Vec::with_capacity(types.len());
    for ty in types {
        let value = match ty.as_ref() {
            TypeDescriptor::Variadic { item, counted } => {
                let mut items = Vec::new();
                if *counted {
                    let count_ty = TypeDescriptor::Unsigned(IntWidth::W32);
                    let count_value = decode_value(&count_ty, Context::TopLevel, cursor.next()?)?;
                    let count = u32::from_value(&count_value)?;
                    for _ in 0..count {
                        items.push(decode_item(item, &mut cursor)?);
                    }
                } else {
                    while !cursor.is_exhausted() {
                        items.push(decode_item(item, &mut cursor)?);
                    }
                }
                Value::Variadic(items)
            }
            _ => decode_item(ty, &mut cursor)?,
        };
        values.push(value);
    }
    if !cursor.is_exhausted() {
        return Err(CodecError::ArityMismatch {
            expected: cursor.consumed(),
            actual: buffers.len(),
        });
    }
    Ok(values)
}

/// Emits the buffers of one item group: `N` for a multi-value of `N`
/// members, one otherwise.
fn encode_item(
    ty: &TypeDescriptor,
    value: &Value,
    buffers: &mut Vec<Vec<u8>>,
) -> CodecResult<()> {
    match (ty, value) {
        (TypeDescriptor::Multi(subs), Value::Tuple(members)) => {
            if members.len() != subs.len() {
                return Err(CodecError::ArityMismatch {
                    expected: subs.len(),
                    actual: members.len(),
                });
            }
            for (sub, member) in subs.iter().zip(members) {
                encode_item(sub, member, buffers)?;
            }
            Ok(())
        }
        (TypeDescriptor::Multi(_), other) => Err(CodecError::TypeMismatch {
            expected: ty.to_string(),
            found: other.kind_name(),
        }),
        _ => {
            buffers.push(encode_value(ty, value, Context::TopLevel)?);
            Ok(())
        }
    }
}

/// Consumes the buffers of one item group.
fn decode_item(ty: &TypeDescriptor, cursor: &mut BufferCursor<'_>) -> CodecResult<Value> {
    match ty {
        TypeDescriptor::Multi(subs) => {
            let mut members = Vec::with_capacity(subs.len());
            for sub in subs {
                members.push(decode_item(sub, cursor)?);
            }
            Ok(Value::Tuple(members))
        }
        _ => decode_value(ty, Context::TopLevel, cursor.next()?),
    }
}

/// Forward-only cursor over the call's buffer sequence
struct BufferCursor<'a> {
    buffers: &'a [Vec<u8>],
    offset: usize,
}

impl<'a> BufferCursor<'a> {
    fn new(buffers: &'a [Vec<u8>]) -> Self {
        Self { buffers, offset: 0 }
    }

    fn is_exhausted(&self) -> bool {
        self.offset == self.buffers.len()
    }

    fn consumed(&self) -> usize {
        self.offset
    }

    fn next(&mut self) -> CodecResult<&'a [u8]> {
        let buffer = self
            .buffers
            .get(self.offset)
            .ok_or(CodecError::InsufficientArguments {
                expected: self.offset + 1,
                actual: self.buffers.len(),
            })?;
        self.offset += 1;
        Ok(buffer)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use num_bigint::BigInt;

    fn arc(ty: TypeDescriptor) -> Arc<TypeDescriptor> {
        Arc::new(ty)
    }

    fn u32_ty() -> Arc<TypeDescriptor> {
        arc(TypeDescriptor::Unsigned(IntWidth::W32))
    }

    #[test]
    fn plain_parameters_one_buffer_each() {
        let types = vec![u32_ty(), arc(TypeDescriptor::BigUnsigned)];
        let values = vec![Value::from(7u32), Value::Int(BigInt::from(0))];
        let buffers = encode_arguments(&types, &values).unwrap();
        // The unbounded zero is an empty buffer, not a missing one.
        assert_eq!(buffers, vec![vec![0, 0, 0, 7], vec![]]);
        assert_eq!(decode_arguments(&types, &buffers).unwrap(), values);
    }

    #[test]
    fn counted_variadic_carries_count_buffer() {
        let types = vec![arc(TypeDescriptor::Variadic {
            item: u32_ty(),
            counted: true,
        })];
        let values = vec![Value::Variadic(vec![
            Value::from(1u32),
            Value::from(2u32),
            Value::from(3u32),
        ])];
        let buffers = encode_arguments(&types, &values).unwrap();
        assert_eq!(
            buffers,
            vec![
                vec![0, 0, 0, 3],
                vec![0, 0, 0, 1],
                vec![0, 0, 0, 2],
                vec![0, 0, 0, 3],
            ]
        );
        assert_eq!(decode_arguments(&types, &buffers).unwrap(), values);
    }

    #[test]
    fn counted_variadic_short_of_items() {
        let types = vec![arc(TypeDescriptor::Variadic {
            item: u32_ty(),
            counted: true,
        })];
        let buffers = vec![vec![0, 0, 0, 2], vec![0, 0, 0, 1]];
        assert_eq!(
            decode_arguments(&types, &buffers),
            Err(CodecError::InsufficientArguments {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn uncounted_variadic_consumes_the_rest() {
        let types = vec![
            arc(TypeDescriptor::Bool),
            arc(TypeDescriptor::Variadic {
                item: arc(TypeDescriptor::Bytes),
                counted: false,
            }),
        ];
        let values = vec![
            Value::from(true),
            Value::Variadic(vec![
                Value::Bytes(vec![0xaa]),
                Value::Bytes(vec![]),
                Value::Bytes(vec![0xbb, 0xcc]),
            ]),
        ];
        let buffers = encode_arguments(&types, &values).unwrap();
        assert_eq!(
            buffers,
            vec![vec![0x01], vec![0xaa], vec![], vec![0xbb, 0xcc]]
        );
        assert_eq!(decode_arguments(&types, &buffers).unwrap(), values);

        // Zero items is a valid variadic tail.
        let empty = vec![Value::from(true), Value::Variadic(vec![])];
        let buffers = encode_arguments(&types, &empty).unwrap();
        assert_eq!(buffers, vec![vec![0x01]]);
        assert_eq!(decode_arguments(&types, &buffers).unwrap(), empty);
    }

    #[test]
    fn multi_spans_one_buffer_per_member() {
        let types = vec![arc(TypeDescriptor::Multi(vec![
            u32_ty(),
            arc(TypeDescriptor::Bytes),
        ]))];
        let values = vec![Value::Tuple(vec![
            Value::from(9u32),
            Value::Bytes(vec![0x61, 0x62]),
        ])];
        let buffers = encode_arguments(&types, &values).unwrap();
        assert_eq!(buffers, vec![vec![0, 0, 0, 9], vec![0x61, 0x62]]);
        assert_eq!(decode_arguments(&types, &buffers).unwrap(), values);
    }

    #[test]
    fn variadic_of_multi_groups_buffers() {
        let types = vec![arc(TypeDescriptor::Variadic {
            item: arc(TypeDescriptor::Multi(vec![
                arc(TypeDescriptor::Unsigned(IntWidth::W8)),
                arc(TypeDescriptor::Bool),
            ])),
            counted: false,
        })];
        let values = vec![Value::Variadic(vec![
            Value::Tuple(vec![Value::from(1u8), Value::from(true)]),
            Value::Tuple(vec![Value::from(2u8), Value::from(false)]),
        ])];
        let buffers = encode_arguments(&types, &values).unwrap();
        assert_eq!(
            buffers,
            vec![vec![0x01], vec![0x01], vec![0x02], vec![0x00]]
        );
        assert_eq!(decode_arguments(&types, &buffers).unwrap(), values);

        // An odd buffer count cannot form whole item groups.
        let truncated = &buffers[..3];
        assert_eq!(
            decode_arguments(&types, truncated),
            Err(CodecError::InsufficientArguments {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn buffer_count_must_match_exactly() {
        let types = vec![u32_ty(), arc(TypeDescriptor::Bool)];
        assert_eq!(
            decode_arguments(&types, &[vec![0, 0, 0, 1]]),
            Err(CodecError::InsufficientArguments {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            decode_arguments(&types, &[vec![0, 0, 0, 1], vec![0x01], vec![0x00]]),
            Err(CodecError::ArityMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn encode_requires_one_value_per_parameter() {
        let types = vec![u32_ty(), arc(TypeDescriptor::Bool)];
        assert_eq!(
            encode_arguments(&types, &[Value::from(1u32)]),
            Err(CodecError::ArityMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            encode_arguments(
                &[arc(TypeDescriptor::Variadic {
                    item: u32_ty(),
                    counted: false
                })],
                &[Value::from(1u32)]
            ),
            Err(CodecError::TypeMismatch { .. })
        ));
    }
}
