//! The structured output of the generator.
//!
//! Nothing in here knows about source text: a renderer walks these values and
//! decides how each one is spelled in the target language.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::naming::{Name, Qualified};
use crate::schema::{Kind, Package, TypeRef};

/// The type of a value accepted by a setter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ValueType {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Bytes,
    Enum(Qualified),
    Message(Qualified),
    /// Untyped fallback for kinds the generator does not understand.
    Opaque,
}

impl ValueType {
    pub(crate) fn of(kind: &Kind, from: &Package) -> Self {
        use crate::naming::NameResolver;

        match kind {
            Kind::Bool => ValueType::Bool,
            Kind::Int32 => ValueType::Int32,
            Kind::Int64 => ValueType::Int64,
            Kind::Uint32 => ValueType::Uint32,
            Kind::Uint64 => ValueType::Uint64,
            Kind::Float32 => ValueType::Float32,
            Kind::Float64 => ValueType::Float64,
            Kind::String => ValueType::String,
            Kind::Bytes => ValueType::Bytes,
            Kind::Enum(ty) => ValueType::Enum(NameResolver::qualify(from, ty)),
            Kind::Message(ty) => ValueType::Message(NameResolver::qualify(from, ty)),
            Kind::Opaque => ValueType::Opaque,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, ValueType::Opaque)
    }

    fn qualified(&self) -> Option<&Qualified> {
        match self {
            ValueType::Enum(q) | ValueType::Message(q) => Some(q),
            _ => None,
        }
    }
}

/// What a setter accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Param {
    /// A single value.
    Value(ValueType),
    /// Any number of elements, forming the whole new list.
    Variadic(ValueType),
    /// Key/value entries, forming the whole new map.
    Map { key: ValueType, value: ValueType },
    /// The option functions of a nested message.
    Options { option_type: Name, message: Qualified },
    /// Nothing at all.
    None,
}

/// Where a setter stores its value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Target {
    /// The field itself.
    Field,
    /// The oneof slot, as the variant named after the field.
    Variant { oneof: String },
}

/// How the stored value is derived from the parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Assign {
    /// Stored as given.
    Value,
    /// Wrapped in the target language's optional convention.
    Optional,
    /// The raw enum value, never wrapped.
    Enum,
    /// A prebuilt nested message, held by reference.
    Reference,
    /// A nested message built in place.
    Construct(Construction),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Construction {
    /// Call the nested message's constructor with the options, if any.
    Constructor { name: Name, message: Qualified },
    /// Start from a zero value and apply the options, if any, one by one.
    Zero { message: Qualified },
}

impl Construction {
    pub fn message(&self) -> &Qualified {
        match self {
            Construction::Constructor { message, .. } | Construction::Zero { message } => message,
        }
    }
}

/// One generated option function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Setter {
    pub name: Name,
    /// The message the option mutates.
    pub message: TypeRef,
    pub option_type: Name,
    /// The schema name of the field being set.
    pub field: String,
    /// The field tracks explicit presence.
    pub nullable: bool,
    pub param: Param,
    pub target: Target,
    pub assign: Assign,
}

impl Setter {
    /// Every qualified type this setter mentions.
    pub fn types(&self) -> Vec<&Qualified> {
        let mut out = Vec::new();
        match &self.param {
            Param::Value(v) | Param::Variadic(v) => out.extend(v.qualified()),
            Param::Map { key, value } => {
                out.extend(key.qualified());
                out.extend(value.qualified());
            }
            Param::Options { message, .. } => out.push(message),
            Param::None => {}
        }
        if let Assign::Construct(c) = &self.assign {
            out.push(c.message());
        }
        out
    }

    pub fn is_opaque(&self) -> bool {
        match &self.param {
            Param::Value(v) | Param::Variadic(v) => v.is_opaque(),
            Param::Map { key, value } => key.is_opaque() || value.is_opaque(),
            Param::Options { .. } | Param::None => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Declaration {
    /// Builds a zero-valued message and applies options in order.
    Constructor {
        name: Name,
        message: TypeRef,
        option_type: Name,
    },
    /// Applies options in order to an existing message.
    BulkApply {
        name: Name,
        message: TypeRef,
        option_type: Name,
    },
    /// A procedure mutating the message; the currency of every other declaration.
    OptionType { name: Name, message: TypeRef },
    Setter(Setter),
}

impl Declaration {
    pub fn name(&self) -> &Name {
        match self {
            Declaration::Constructor { name, .. }
            | Declaration::BulkApply { name, .. }
            | Declaration::OptionType { name, .. } => name,
            Declaration::Setter(s) => &s.name,
        }
    }

    pub fn message(&self) -> &TypeRef {
        match self {
            Declaration::Constructor { message, .. }
            | Declaration::BulkApply { message, .. }
            | Declaration::OptionType { message, .. } => message,
            Declaration::Setter(s) => &s.message,
        }
    }

    pub fn as_setter(&self) -> Option<&Setter> {
        match self {
            Declaration::Setter(s) => Some(s),
            _ => None,
        }
    }
}

/// The declarations generated for one schema file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileDeclarations {
    pub file: String,
    pub package: Package,
    pub declarations: Vec<Declaration>,
}

impl FileDeclarations {
    /// Foreign packages mentioned by the declarations, sorted.
    pub fn references(&self) -> BTreeSet<&Package> {
        self.setters()
            .flat_map(Setter::types)
            .filter(|q| q.is_foreign())
            .map(|q| &q.ty.package)
            .collect()
    }

    pub fn setters(&self) -> impl Iterator<Item = &Setter> {
        self.declarations.iter().filter_map(Declaration::as_setter)
    }

    /// Looks a declaration up by its canonical name.
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }
}
