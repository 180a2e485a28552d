//! Resolution of type expressions into shared descriptors
//!
//! The [`TypeRegistry`] is the only component that reads the schema. It
//! turns [`TypeExpr`] references into [`TypeDescriptor`] trees, memoizing
//! each named struct/enum so that repeated references share one `Arc`'d
//! descriptor, and it is where every placement invariant is enforced:
//!
//! * a variadic constructor may appear only as the last element of a
//!   parameter list;
//! * a multi constructor may appear only as a parameter, a list element, or
//!   a variadic item — never directly inside another multi or variadic;
//! * named definitions may not refer back to themselves.
//!
//! Per-call encode/decode paths never re-check any of this: once an endpoint
//! resolves, its descriptors are immutable shared data.

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::descriptor::{
    EnumDescriptor, FieldDescriptor, IntWidth, StructDescriptor, TypeDescriptor,
    VariantDescriptor,
};
use crate::error::{ResolveError, ResolveResult};
use crate::schema::{Schema, TypeDef, TypeExpr};

lazy_static! {
    /// Non-parameterized builtin type names.
    static ref PRIMITIVES: HashMap<&'static str, TypeDescriptor> = {
        let mut table = HashMap::new();
        table.insert("u8", TypeDescriptor::Unsigned(IntWidth::W8));
        table.insert("u16", TypeDescriptor::Unsigned(IntWidth::W16));
        table.insert("u32", TypeDescriptor::Unsigned(IntWidth::W32));
        table.insert("u64", TypeDescriptor::Unsigned(IntWidth::W64));
        table.insert("i8", TypeDescriptor::Signed(IntWidth::W8));
        table.insert("i16", TypeDescriptor::Signed(IntWidth::W16));
        table.insert("i32", TypeDescriptor::Signed(IntWidth::W32));
        table.insert("i64", TypeDescriptor::Signed(IntWidth::W64));
        table.insert("BigUint", TypeDescriptor::BigUnsigned);
        table.insert("BigInt", TypeDescriptor::BigSigned);
        table.insert("bool", TypeDescriptor::Bool);
        table.insert("bytes", TypeDescriptor::Bytes);
        table.insert("utf-8 string", TypeDescriptor::Str);
        table.insert("string", TypeDescriptor::Str);
        table.insert("Address", TypeDescriptor::Address);
        table
    };
}

/// Where a type expression occurs, which decides what constructors are legal
/// at that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Element of an endpoint parameter or return list.
    Parameter { last: bool },
    /// Element type of a `List`.
    ListElement,
    /// Item type of a variadic group.
    VariadicItem,
    /// Any other embedded position: struct field, enum variant field,
    /// option payload, multi member.
    Inner,
}

impl Slot {
    fn admits_multi(self) -> bool {
        matches!(
            self,
            Slot::Parameter { .. } | Slot::ListElement | Slot::VariadicItem
        )
    }
}

/// A fully resolved endpoint: ordered input and output descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: String,
    pub inputs: Vec<Arc<TypeDescriptor>>,
    pub outputs: Vec<Arc<TypeDescriptor>>,
}

/// Resolver and memo cache over one schema
///
/// The registry is used single-threaded at schema-load time; the
/// descriptors it produces are immutable and freely shared afterwards.
#[derive(Debug)]
pub struct TypeRegistry<'s> {
    schema: &'s Schema,
    cache: HashMap<String, Arc<TypeDescriptor>>,
    /// Names currently being resolved, for cycle detection.
    resolving: Vec<String>,
}

impl<'s> TypeRegistry<'s> {
    /// Constructs a registry over a schema with an empty memo cache.
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            cache: HashMap::new(),
            resolving: Vec::new(),
        }
    }

    /// Resolves one standalone type expression.
    ///
    /// The expression is treated as occupying the final position of a
    /// parameter list, so multi and variadic constructors are legal at the
    /// top of the expression.
    pub fn resolve(&mut self, expr: &TypeExpr) -> ResolveResult<Arc<TypeDescriptor>> {
        self.resolve_in(expr, Slot::Parameter { last: true })
    }

    /// Resolves an ordered parameter (or return) list, enforcing that at most
    /// one variadic constructor appears and only in last position.
    pub fn resolve_parameters(
        &mut self,
        exprs: &[TypeExpr],
    ) -> ResolveResult<Vec<Arc<TypeDescriptor>>> {
        let count = exprs.len();
        exprs
            .iter()
            .enumerate()
            .map(|(ix, expr)| {
                self.resolve_in(
                    expr,
                    Slot::Parameter {
                        last: ix + 1 == count,
                    },
                )
            })
            .collect()
    }

    /// Resolves a named endpoint's input and output lists.
    pub fn resolve_endpoint(&mut self, name: &str) -> ResolveResult<EndpointDescriptor> {
        let def = self
            .schema
            .endpoint(name)
            .ok_or_else(|| ResolveError::UnknownEndpoint {
                name: name.to_owned(),
            })?
            .clone();
        Ok(EndpointDescriptor {
            name: def.name,
            inputs: self.resolve_parameters(&def.inputs)?,
            outputs: self.resolve_parameters(&def.outputs)?,
        })
    }

    fn resolve_in(&mut self, expr: &TypeExpr, slot: Slot) -> ResolveResult<Arc<TypeDescriptor>> {
        let name = expr.name();
        if let Some(prim) = PRIMITIVES.get(name) {
            self.expect_arity(expr, 0)?;
            return Ok(Arc::new(prim.clone()));
        }
        match name {
            "List" => {
                self.expect_arity(expr, 1)?;
                let item = self.resolve_in(&expr.args()[0], Slot::ListElement)?;
                Ok(Arc::new(TypeDescriptor::List(item)))
            }
            "Option" => {
                self.expect_arity(expr, 1)?;
                let inner = self.resolve_in(&expr.args()[0], Slot::Inner)?;
                Ok(Arc::new(TypeDescriptor::Optional(inner)))
            }
            "multi" | "tuple" => {
                if !slot.admits_multi() {
                    return Err(ResolveError::MisplacedMulti {
                        name: expr.to_string(),
                    });
                }
                let items = expr
                    .args()
                    .iter()
                    .map(|arg| self.resolve_in(arg, Slot::Inner))
                    .collect::<ResolveResult<Vec<_>>>()?;
                Ok(Arc::new(TypeDescriptor::Multi(items)))
            }
            "variadic" | "counted-variadic" => {
                if slot != (Slot::Parameter { last: true }) {
                    return Err(ResolveError::MisplacedVariadic {
                        name: expr.to_string(),
                    });
                }
                self.expect_arity(expr, 1)?;
                let item = self.resolve_in(&expr.args()[0], Slot::VariadicItem)?;
                Ok(Arc::new(TypeDescriptor::Variadic {
                    item,
                    counted: name == "counted-variadic",
                }))
            }
            _ => {
                self.expect_arity(expr, 0)?;
                self.resolve_named(name)
            }
        }
    }

    /// Resolves a named struct/enum definition, memoized per name.
    fn resolve_named(&mut self, name: &str) -> ResolveResult<Arc<TypeDescriptor>> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(Arc::clone(cached));
        }
        if self.resolving.iter().any(|n| n == name) {
            return Err(ResolveError::CyclicType {
                name: name.to_owned(),
            });
        }
        let def = self
            .schema
            .type_def(name)
            .ok_or_else(|| ResolveError::UnknownType {
                name: name.to_owned(),
            })?
            .clone();

        self.resolving.push(name.to_owned());
        let resolved = self.resolve_definition(&def);
        self.resolving.pop();

        let descriptor = Arc::new(resolved?);
        self.cache.insert(name.to_owned(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    fn resolve_definition(&mut self, def: &TypeDef) -> ResolveResult<TypeDescriptor> {
        match def {
            TypeDef::Struct(def) => {
                let fields = def
                    .fields
                    .iter()
                    .map(|field| {
                        Ok(FieldDescriptor {
                            name: field.name.clone(),
                            ty: self.resolve_in(&field.ty, Slot::Inner)?,
                        })
                    })
                    .collect::<ResolveResult<Vec<_>>>()?;
                Ok(TypeDescriptor::Struct(Arc::new(StructDescriptor {
                    name: def.name.clone(),
                    fields,
                })))
            }
            TypeDef::Enum(def) => {
                let variants = def
                    .variants
                    .iter()
                    .map(|variant| {
                        Ok(VariantDescriptor {
                            discriminant: variant.discriminant,
                            name: variant.name.clone(),
                            fields: variant
                                .fields
                                .iter()
                                .map(|ty| self.resolve_in(ty, Slot::Inner))
                                .collect::<ResolveResult<Vec<_>>>()?,
                        })
                    })
                    .collect::<ResolveResult<Vec<_>>>()?;
                Ok(TypeDescriptor::Enum(Arc::new(EnumDescriptor {
                    name: def.name.clone(),
                    variants,
                })))
            }
        }
    }

    fn expect_arity(&self, expr: &TypeExpr, expected: usize) -> ResolveResult<()> {
        if expr.args().len() == expected {
            Ok(())
        } else {
            Err(ResolveError::WrongArity {
                name: expr.name().to_owned(),
                expected,
                actual: expr.args().len(),
            })
        }
    }
}
