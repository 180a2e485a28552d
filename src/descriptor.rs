//! Resolved type descriptors
//!
//! A [`TypeDescriptor`] is the closed, fully-resolved description of one ABI
//! type: every name reference has been replaced by the definition it points
//! to, so the codec never consults the schema again. Descriptors are built
//! once per ABI load by the [`registry`](crate::registry) and shared
//! read-only behind [`Arc`], which makes them safe to use from any number of
//! concurrent encode/decode calls without synchronization.
//!
//! [`Display`] reproduces the formatted type name, which is what error
//! values and diagnostics print.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Bit-width of a bounded integer type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    /// Number of bytes a value of this width always occupies on the wire.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            IntWidth::W8 => 1,
            IntWidth::W16 => 2,
            IntWidth::W32 => 4,
            IntWidth::W64 => 8,
        }
    }
}

/// A resolved struct: ordered named fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

/// One resolved struct field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: Arc<TypeDescriptor>,
}

/// A resolved enum: ordered discriminated variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: String,
    pub variants: Vec<VariantDescriptor>,
}

impl EnumDescriptor {
    /// Looks up the variant carrying the given wire discriminant.
    #[must_use]
    pub fn variant_by_discriminant(&self, discriminant: u8) -> Option<&VariantDescriptor> {
        self.variants
            .iter()
            .find(|v| v.discriminant == discriminant)
    }
}

/// One resolved enum variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub discriminant: u8,
    pub name: String,
    pub fields: Vec<Arc<TypeDescriptor>>,
}

/// Closed descriptor for every type the codec can transcode
///
/// Exhaustive matching over this enum is how the codec guarantees that every
/// type kind is handled at every call site; adding a variant is a breaking
/// change by design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// Unsigned integer of a declared bit-width (`u8`/`u16`/`u32`/`u64`).
    Unsigned(IntWidth),
    /// Signed two's-complement integer of a declared bit-width.
    Signed(IntWidth),
    /// Unbounded unsigned integer (`BigUint`).
    BigUnsigned,
    /// Unbounded signed integer (`BigInt`).
    BigSigned,
    Bool,
    /// Opaque variable-length byte buffer.
    Bytes,
    /// UTF-8 string.
    Str,
    /// 32 raw address bytes.
    Address,
    Struct(Arc<StructDescriptor>),
    Enum(Arc<EnumDescriptor>),
    List(Arc<TypeDescriptor>),
    Optional(Arc<TypeDescriptor>),
    /// Fixed-arity tuple whose members each occupy their own argument buffer
    /// at the top level.
    Multi(Vec<Arc<TypeDescriptor>>),
    /// Trailing parameter consuming a variable number of argument buffers,
    /// preceded by an explicit item count when `counted`.
    Variadic {
        item: Arc<TypeDescriptor>,
        counted: bool,
    },
}

impl TypeDescriptor {
    /// Returns the number of argument buffers one value of this type occupies
    /// at the top level, or `None` for variadic types, whose buffer count
    /// depends on the value.
    #[must_use]
    pub fn buffer_arity(&self) -> Option<usize> {
        match self {
            TypeDescriptor::Multi(items) => Some(items.len()),
            TypeDescriptor::Variadic { .. } => None,
            _ => Some(1),
        }
    }

    /// Returns `true` for types realized as multiple top-level argument
    /// buffers rather than a single one.
    #[must_use]
    pub fn is_multi_shaped(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Multi(_) | TypeDescriptor::Variadic { .. }
        )
    }

    /// Returns the constant wire width in bytes, or `None` for
    /// variable-length types.
    ///
    /// Fixed-width values never carry a length prefix in nested context;
    /// everything this method returns `None` for either carries one
    /// (integers, buffers, strings, lists) or delimits itself structurally
    /// (structs, enums, options).
    #[must_use]
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            TypeDescriptor::Unsigned(w) | TypeDescriptor::Signed(w) => Some(w.bytes()),
            TypeDescriptor::Bool => Some(1),
            TypeDescriptor::Address => Some(32),
            _ => None,
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Unsigned(IntWidth::W8) => f.write_str("u8"),
            TypeDescriptor::Unsigned(IntWidth::W16) => f.write_str("u16"),
            TypeDescriptor::Unsigned(IntWidth::W32) => f.write_str("u32"),
            TypeDescriptor::Unsigned(IntWidth::W64) => f.write_str("u64"),
            TypeDescriptor::Signed(IntWidth::W8) => f.write_str("i8"),
            TypeDescriptor::Signed(IntWidth::W16) => f.write_str("i16"),
            TypeDescriptor::Signed(IntWidth::W32) => f.write_str("i32"),
            TypeDescriptor::Signed(IntWidth::W64) => f.write_str("i64"),
            TypeDescriptor::BigUnsigned => f.write_str("BigUint"),
            TypeDescriptor::BigSigned => f.write_str("BigInt"),
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::Bytes => f.write_str("bytes"),
            TypeDescriptor::Str => f.write_str("utf-8 string"),
            TypeDescriptor::Address => f.write_str("Address"),
            TypeDescriptor::Struct(def) => f.write_str(&def.name),
            TypeDescriptor::Enum(def) => f.write_str(&def.name),
            TypeDescriptor::List(item) => write!(f, "List<{}>", item),
            TypeDescriptor::Optional(inner) => write!(f, "Option<{}>", inner),
            TypeDescriptor::Multi(items) => {
                f.write_str("multi<")?;
                if let Some((last, init)) = items.split_last() {
                    for item in init {
                        write!(f, "{},", item)?;
                    }
                    write!(f, "{}", last)?;
                }
                f.write_str(">")
            }
            TypeDescriptor::Variadic { item, counted } => {
                if *counted {
                    write!(f, "counted-variadic<{}>", item)
                } else {
                    write!(f, "variadic<{}>", item)
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fixed_widths() {
        assert_eq!(TypeDescriptor::Unsigned(IntWidth::W32).fixed_width(), Some(4));
        assert_eq!(TypeDescriptor::Address.fixed_width(), Some(32));
        assert_eq!(TypeDescriptor::Bool.fixed_width(), Some(1));
        assert_eq!(TypeDescriptor::Bytes.fixed_width(), None);
        assert_eq!(TypeDescriptor::BigUnsigned.fixed_width(), None);
        assert_eq!(
            TypeDescriptor::List(Arc::new(TypeDescriptor::Bool)).fixed_width(),
            None
        );
    }

    #[test]
    fn formatted_names() {
        let multi = TypeDescriptor::Multi(vec![
            Arc::new(TypeDescriptor::Unsigned(IntWidth::W32)),
            Arc::new(TypeDescriptor::Bytes),
        ]);
        assert_eq!(multi.to_string(), "multi<u32,bytes>");
        let variadic = TypeDescriptor::Variadic {
            item: Arc::new(multi),
            counted: false,
        };
        assert_eq!(variadic.to_string(), "variadic<multi<u32,bytes>>");
        assert_eq!(variadic.buffer_arity(), None);
    }
}
