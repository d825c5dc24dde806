use std::fmt;

use heck::{ToSnakeCase, ToUpperCamelCase};
use serde::Serialize;

use crate::collision::CollisionMap;
use crate::schema::{Field, Message, Package, TypeRef};

/// The canonical UpperCamel spelling of a schema identifier.
pub(crate) fn canonical(ident: &str) -> String {
    ident.to_upper_camel_case()
}

/// A generated identifier in canonical UpperCamel form, e.g. `WithAgeForBasic`.
///
/// Renderers pick their own case from it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    fn from_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> Self {
        Self(parts.into_iter().map(canonical).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `WithAgeForBasic` becomes `with_age_for_basic`.
    pub fn to_snake_case(&self) -> String {
        self.0.to_snake_case()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A type reference as seen from a particular package.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Qualified {
    pub ty: TypeRef,
    /// Short name of the owning package, present only for foreign types.
    pub qualifier: Option<String>,
}

impl Qualified {
    pub fn is_foreign(&self) -> bool {
        self.qualifier.is_some()
    }
}

impl fmt::Display for Qualified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(q) = &self.qualifier {
            write!(f, "{}.", q)?;
        }
        f.write_str(&self.ty.flat_name())
    }
}

/// Decides every externally visible name the generator produces.
#[derive(Clone, Copy, Debug)]
pub struct NameResolver<'a> {
    collisions: &'a CollisionMap,
}

impl<'a> NameResolver<'a> {
    pub fn new(collisions: &'a CollisionMap) -> Self {
        Self { collisions }
    }

    /// `With<Field>`, or `With<Field>For<Message>` when the field name is
    /// declared by more than one message.
    pub fn setter(&self, message: &Message, field: &Field) -> Name {
        self.field_option("With", message, field)
    }

    /// `WithNew<Field>[For<Message>]`: builds the nested value in place.
    pub fn nested_constructor(&self, message: &Message, field: &Field) -> Name {
        self.field_option("WithNew", message, field)
    }

    fn field_option(&self, prefix: &str, message: &Message, field: &Field) -> Name {
        if self.collisions.is_ambiguous(&field.name) {
            let owner = message.ident.flat_name();
            Name::from_parts([prefix, field.name.as_str(), "For", owner.as_str()])
        } else {
            Name::from_parts([prefix, field.name.as_str()])
        }
    }

    pub fn constructor(ty: &TypeRef) -> Name {
        Name::from_parts(["New", ty.flat_name().as_str()])
    }

    pub fn bulk_apply(ty: &TypeRef) -> Name {
        Name::from_parts(["Apply", ty.flat_name().as_str(), "Options"])
    }

    pub fn option_type(ty: &TypeRef) -> Name {
        Name::from_parts([ty.flat_name().as_str(), "Option"])
    }

    /// Qualifies `ty` for use in code generated into package `from`.
    ///
    /// The unnamed root package has nothing to qualify with, so its types are
    /// never qualified.
    pub fn qualify(from: &Package, ty: &TypeRef) -> Qualified {
        let qualifier = if from.same_as(&ty.package) || ty.package.name.is_empty() {
            None
        } else {
            Some(ty.package.name.clone())
        };
        Qualified {
            ty: ty.clone(),
            qualifier,
        }
    }
}
