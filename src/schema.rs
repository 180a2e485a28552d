//! In-memory ABI schema and formatted type expressions
//!
//! An ABI description names the callable endpoints of a contract and the
//! user-defined struct/enum types their parameters refer to. Loading that
//! description from JSON is external plumbing; this module models the
//! already-parsed result:
//!
//! * [`TypeExpr`] — one parameterized type reference, e.g. `List<u32>` or
//!   `variadic<multi<u32,bytes>>`, as a small name/argument tree, together
//!   with the hand-rolled parser for the formatted names ABI descriptions
//!   use.
//! * [`Schema`] — the name-keyed collection of [`StructDef`]/[`EnumDef`]
//!   type definitions and [`EndpointDef`] parameter/return lists.
//!
//! Nothing here is resolved: field and parameter types are stored as
//! expressions, and the [`registry`](crate::registry) turns them into shared
//! immutable descriptors.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use crate::error::{ResolveError, ResolveResult};

/// One parameterized type reference: a constructor name applied to zero or
/// more argument expressions
///
/// Equality is structural; [`Display`] reproduces the formatted name the
/// expression was parsed from, modulo whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeExpr {
    name: String,
    args: Vec<TypeExpr>,
}

impl TypeExpr {
    /// Constructs a non-parameterized type expression from a bare name.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Constructs a parameterized type expression.
    pub fn applied(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Parses a formatted type name such as `"List<u32>"` or
    /// `"variadic<multi<u32,bytes>>"` into a [`TypeExpr`].
    ///
    /// Constructor names may contain any characters other than the angle
    /// brackets and commas that structure the expression; surrounding
    /// whitespace is ignored, so `"utf-8 string"` is a single valid name and
    /// `"multi<u32, bytes>"` parses the same as `"multi<u32,bytes>"`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MalformedType`] on unbalanced brackets, empty
    /// names, or stray characters after a closing bracket.
    pub fn parse(src: &str) -> ResolveResult<Self> {
        let malformed = || ResolveError::MalformedType {
            input: src.to_owned(),
        };
        let text = src.trim();
        let Some(open) = text.find('<') else {
            if text.is_empty() || text.contains('>') || text.contains(',') {
                return Err(malformed());
            }
            return Ok(Self::plain(text));
        };
        let name = text[..open].trim();
        if name.is_empty() || !text.ends_with('>') {
            return Err(malformed());
        }
        let body = &text[open + 1..text.len() - 1];

        // Split the argument body at depth-zero commas only.
        let mut args = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (ix, ch) in body.char_indices() {
            match ch {
                '<' => depth += 1,
                '>' => depth = depth.checked_sub(1).ok_or_else(malformed)?,
                ',' if depth == 0 => {
                    args.push(Self::parse(&body[start..ix])?);
                    start = ix + 1;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(malformed());
        }
        args.push(Self::parse(&body[start..])?);
        Ok(Self::applied(name, args))
    }

    /// Returns the constructor name of this expression.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the argument expressions this constructor is applied to.
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[TypeExpr] {
        &self.args
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some((last, init)) = self.args.split_last() {
            f.write_str("<")?;
            for arg in init {
                write!(f, "{},", arg)?;
            }
            write!(f, "{}>", last)?;
        }
        Ok(())
    }
}

/// One named field of a struct definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeExpr,
}

impl FieldDef {
    /// Constructs a field definition, parsing `ty_src` as a formatted type name.
    pub fn new(name: impl Into<String>, ty_src: &str) -> ResolveResult<Self> {
        Ok(Self {
            name: name.into(),
            ty: TypeExpr::parse(ty_src)?,
        })
    }
}

/// A user-defined struct: an ordered list of named fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// One variant of an enum definition, with its wire discriminant and any
/// associated field types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDef {
    pub discriminant: u8,
    pub name: String,
    pub fields: Vec<TypeExpr>,
}

impl VariantDef {
    /// Constructs a variant definition, parsing each associated field type.
    pub fn new(
        discriminant: u8,
        name: impl Into<String>,
        field_srcs: &[&str],
    ) -> ResolveResult<Self> {
        let fields = field_srcs
            .iter()
            .map(|src| TypeExpr::parse(src))
            .collect::<ResolveResult<Vec<_>>>()?;
        Ok(Self {
            discriminant,
            name: name.into(),
            fields,
        })
    }
}

/// A user-defined enum: an ordered list of discriminated variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<VariantDef>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>, variants: Vec<VariantDef>) -> Self {
        Self {
            name: name.into(),
            variants,
        }
    }
}

/// A named struct or enum definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Struct(StructDef),
    Enum(EnumDef),
}

impl TypeDef {
    /// Returns the defined type's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Struct(def) => &def.name,
            TypeDef::Enum(def) => &def.name,
        }
    }
}

/// One callable endpoint: ordered parameter and return type lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDef {
    pub name: String,
    pub inputs: Vec<TypeExpr>,
    pub outputs: Vec<TypeExpr>,
}

impl EndpointDef {
    /// Constructs an endpoint definition, parsing each formatted type name.
    pub fn new(name: impl Into<String>, inputs: &[&str], outputs: &[&str]) -> ResolveResult<Self> {
        let parse_all = |srcs: &[&str]| {
            srcs.iter()
                .map(|src| TypeExpr::parse(src))
                .collect::<ResolveResult<Vec<_>>>()
        };
        Ok(Self {
            name: name.into(),
            inputs: parse_all(inputs)?,
            outputs: parse_all(outputs)?,
        })
    }
}

/// The already-parsed ABI description of one contract
///
/// Holds the named type definitions and endpoints; resolution into
/// descriptors is the registry's job.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: HashMap<String, TypeDef>,
    endpoints: HashMap<String, EndpointDef>,
}

impl Schema {
    /// Constructs an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a struct definition, replacing any previous definition of the
    /// same name.
    pub fn define_struct(&mut self, def: StructDef) {
        self.types.insert(def.name.clone(), TypeDef::Struct(def));
    }

    /// Adds an enum definition, replacing any previous definition of the
    /// same name.
    pub fn define_enum(&mut self, def: EnumDef) {
        self.types.insert(def.name.clone(), TypeDef::Enum(def));
    }

    /// Adds an endpoint definition, replacing any previous definition of the
    /// same name.
    pub fn define_endpoint(&mut self, def: EndpointDef) {
        self.endpoints.insert(def.name.clone(), def);
    }

    /// Looks up a named struct/enum definition.
    #[must_use]
    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Looks up a named endpoint definition.
    #[must_use]
    pub fn endpoint(&self, name: &str) -> Option<&EndpointDef> {
        self.endpoints.get(name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_plain() {
        assert_eq!(TypeExpr::parse("u32").unwrap(), TypeExpr::plain("u32"));
        assert_eq!(
            TypeExpr::parse(" utf-8 string ").unwrap(),
            TypeExpr::plain("utf-8 string")
        );
    }

    #[test]
    fn parse_nested() {
        let expr = TypeExpr::parse("variadic<multi<u32, bytes>>").unwrap();
        assert_eq!(
            expr,
            TypeExpr::applied(
                "variadic",
                vec![TypeExpr::applied(
                    "multi",
                    vec![TypeExpr::plain("u32"), TypeExpr::plain("bytes")]
                )]
            )
        );
    }

    #[test]
    fn display_roundtrip() {
        for src in [
            "u64",
            "List<u32>",
            "Option<List<BigUint>>",
            "multi<u32,bytes,Address>",
            "counted-variadic<u32>",
        ] {
            let expr = TypeExpr::parse(src).unwrap();
            assert_eq!(expr.to_string(), *src);
            assert_eq!(TypeExpr::parse(&expr.to_string()).unwrap(), expr);
        }
    }

    #[test]
    fn parse_malformed() {
        for src in ["", "List<", "List<u32", "<u32>", "List<u32>>", "a,b"] {
            assert!(
                matches!(
                    TypeExpr::parse(src),
                    Err(ResolveError::MalformedType { .. })
                ),
                "`{}` should not parse",
                src
            );
        }
    }

    #[test]
    fn schema_lookup() {
        let mut schema = Schema::new();
        schema.define_struct(StructDef::new(
            "Pair",
            vec![
                FieldDef::new("a", "u8").unwrap(),
                FieldDef::new("b", "utf-8 string").unwrap(),
            ],
        ));
        assert_eq!(schema.type_def("Pair").map(TypeDef::name), Some("Pair"));
        assert!(schema.type_def("Missing").is_none());
    }
}
