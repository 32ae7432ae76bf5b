use std::fmt;

use super::node::Node;

/// Built-in scalar types of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Void,
    Int,
    I8,
    I16,
    I32,
    I64,
    Any,
}

impl Primitive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Int => "int",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::Any => "any",
        }
    }

    /// Size in bytes of a value of this type, `None` for `void`.
    pub fn size(&self) -> Option<usize> {
        match self {
            Primitive::Void => None,
            Primitive::I8 => Some(1),
            Primitive::I16 => Some(2),
            Primitive::I32 => Some(4),
            Primitive::Int | Primitive::I64 | Primitive::Any => Some(8),
        }
    }
}

/// Flat tag of a type, mirroring the kinds a type descriptor can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Void,
    Int,
    I8,
    I16,
    I32,
    I64,
    Any,
    Unresolved,
    Union,
    Struct,
}

/// A named struct or union together with its members in layout order.
///
/// Every field is a `Member` node carrying its own name and type.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub name: String,
    pub fields: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BaseType {
    Primitive(Primitive),
    /// Placeholder left by the parser, replaced before code generation.
    Unresolved(String),
    Struct(Aggregate),
    Union(Aggregate),
}

/// Type descriptor attached to every node and declared entity.
///
/// `indirection` counts pointer levels: `int**` is `Int` with an indirection of 2.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub base: BaseType,
    pub indirection: u32,
}

impl Default for Type {
    fn default() -> Self {
        Type::primitive(Primitive::Void)
    }
}

impl Type {
    pub fn primitive(primitive: Primitive) -> Self {
        Self {
            base: BaseType::Primitive(primitive),
            indirection: 0,
        }
    }

    pub fn void() -> Self {
        Type::primitive(Primitive::Void)
    }

    pub fn int() -> Self {
        Type::primitive(Primitive::Int)
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            base: BaseType::Unresolved(name.into()),
            indirection: 0,
        }
    }

    pub fn structure(name: impl Into<String>, fields: Vec<Node>) -> Self {
        Self {
            base: BaseType::Struct(Aggregate {
                name: name.into(),
                fields,
            }),
            indirection: 0,
        }
    }

    pub fn union(name: impl Into<String>, fields: Vec<Node>) -> Self {
        Self {
            base: BaseType::Union(Aggregate {
                name: name.into(),
                fields,
            }),
            indirection: 0,
        }
    }

    /// The same type with one more level of pointer indirection.
    pub fn pointer_to(mut self) -> Self {
        self.indirection += 1;
        self
    }

    pub fn with_indirection(mut self, indirection: u32) -> Self {
        self.indirection = indirection;
        self
    }

    pub fn data_type(&self) -> DataType {
        match &self.base {
            BaseType::Primitive(p) => match p {
                Primitive::Void => DataType::Void,
                Primitive::Int => DataType::Int,
                Primitive::I8 => DataType::I8,
                Primitive::I16 => DataType::I16,
                Primitive::I32 => DataType::I32,
                Primitive::I64 => DataType::I64,
                Primitive::Any => DataType::Any,
            },
            BaseType::Unresolved(_) => DataType::Unresolved,
            BaseType::Struct(_) => DataType::Struct,
            BaseType::Union(_) => DataType::Union,
        }
    }

    /// Source name of an aggregate or unresolved type.
    pub fn name(&self) -> Option<&str> {
        match &self.base {
            BaseType::Primitive(_) => None,
            BaseType::Unresolved(name) => Some(name),
            BaseType::Struct(agg) | BaseType::Union(agg) => Some(&agg.name),
        }
    }

    pub fn fields(&self) -> &[Node] {
        match &self.base {
            BaseType::Struct(agg) | BaseType::Union(agg) => &agg.fields,
            _ => &[],
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.indirection > 0
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self.base, BaseType::Unresolved(_))
    }

    /// Width in bytes of a scalar value of this type.
    ///
    /// Pointers are always 8 bytes. Aggregates, `void` and unresolved types
    /// have no scalar width.
    pub fn scalar_size(&self) -> Option<usize> {
        if self.is_pointer() {
            return Some(8);
        }
        match &self.base {
            BaseType::Primitive(p) => p.size(),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            BaseType::Primitive(p) => f.write_str(p.as_str())?,
            BaseType::Unresolved(name) => f.write_str(name)?,
            BaseType::Struct(agg) | BaseType::Union(agg) => f.write_str(&agg.name)?,
        }
        for _ in 0..self.indirection {
            f.write_str("*")?;
        }
        Ok(())
    }
}

/// Canonical rendering of a type, used by diagnostics and the tree printer.
pub fn type_to_string(ty: &Type) -> String {
    ty.to_string()
}
