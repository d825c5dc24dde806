use std::collections::{HashMap, HashSet};

use crate::collision::CollisionMap;
use crate::config::Config;
use crate::decl::*;
use crate::naming::{Name, NameResolver};
use crate::schema::{Cardinality, Field, File, Kind, Message, SchemaSet, TypeRef};
use crate::strategy::Strategy;

macro_rules! decision {
    ($self:ident, $($arg:tt)+) => {
        if $self.config.trace {
            log::debug!($($arg)+);
        }
    };
}

/// Walks messages and produces their declarations.
///
/// Holds nothing mutable: emitting one message never influences another, so a
/// single emitter can be shared across threads.
pub struct OptionEmitter<'a> {
    config: &'a Config,
    names: NameResolver<'a>,
    /// Messages that get an option surface of their own.
    generated: HashMap<&'a TypeRef, &'a Message>,
}

impl<'a> OptionEmitter<'a> {
    pub fn new(set: &'a SchemaSet, collisions: &'a CollisionMap, config: &'a Config) -> Self {
        Self {
            config,
            names: NameResolver::new(collisions),
            generated: set.generated_messages().map(|m| (&m.ident, m)).collect(),
        }
    }

    pub fn emit_file(&self, file: &File) -> FileDeclarations {
        let mut declarations = Vec::new();
        for message in &file.messages {
            declarations.extend(self.emit_message(message));
        }
        log::info!(
            "{}: {} declarations for {} messages",
            file.name,
            declarations.len(),
            file.messages.len()
        );
        FileDeclarations {
            file: file.name.clone(),
            package: file.package.clone(),
            declarations,
        }
    }

    pub fn emit_message(&self, message: &Message) -> Vec<Declaration> {
        let ty = &message.ident;
        let option_type = NameResolver::option_type(ty);
        let mut out = Vec::with_capacity(3 + message.fields.len());

        if message.flags.skip_init {
            decision!(self, "{}: constructor skipped", ty.full_name());
        } else {
            out.push(Declaration::Constructor {
                name: NameResolver::constructor(ty),
                message: ty.clone(),
                option_type: option_type.clone(),
            });
        }

        if message.flags.optionless {
            decision!(self, "{}: bulk apply skipped", ty.full_name());
        } else {
            out.push(Declaration::BulkApply {
                name: NameResolver::bulk_apply(ty),
                message: ty.clone(),
                option_type: option_type.clone(),
            });
        }

        out.push(Declaration::OptionType {
            name: option_type.clone(),
            message: ty.clone(),
        });

        // Names taken by the direct setters; a `WithNew...` setter never shadows one.
        let direct: HashSet<Name> = message
            .fields
            .iter()
            .map(|f| self.names.setter(message, f))
            .collect();

        for field in &message.fields {
            let strategy = Strategy::classify(message, field);
            decision!(
                self,
                "{}.{}: {:?} -> {}",
                ty.full_name(),
                field.name,
                strategy,
                self.names.setter(message, field)
            );
            let site = FieldSite {
                message,
                field,
                option_type: &option_type,
                direct: &direct,
            };
            self.emit_field(&site, strategy, &mut out);
        }
        out
    }

    fn emit_field(&self, site: &FieldSite<'_>, strategy: Strategy, out: &mut Vec<Declaration>) {
        let FieldSite { message, field, .. } = *site;
        let from = &message.ident.package;
        let name = self.names.setter(message, field);

        match strategy {
            Strategy::Scalar => {
                let value = ValueType::of(&field.kind, from);
                if value.is_opaque() {
                    log::warn!(
                        "{}.{}: unsupported field kind, falling back to an opaque value",
                        message.ident.full_name(),
                        field.name
                    );
                }
                let assign = if field.nullable && wraps_optional(&field.kind) {
                    Assign::Optional
                } else {
                    Assign::Value
                };
                out.push(Declaration::Setter(site.setter(
                    name,
                    Param::Value(value),
                    Target::Field,
                    assign,
                )));
            }
            Strategy::Enum => {
                let value = ValueType::of(&field.kind, from);
                out.push(Declaration::Setter(site.setter(
                    name,
                    Param::Value(value),
                    Target::Field,
                    Assign::Enum,
                )));
            }
            Strategy::Repeated => {
                let value = ValueType::of(&field.kind, from);
                out.push(Declaration::Setter(site.setter(
                    name,
                    Param::Variadic(value),
                    Target::Field,
                    Assign::Value,
                )));
            }
            Strategy::Map => {
                let param = map_param(field, message);
                out.push(Declaration::Setter(site.setter(
                    name,
                    param,
                    Target::Field,
                    Assign::Value,
                )));
            }
            Strategy::Message => {
                let value = ValueType::of(&field.kind, from);
                out.push(Declaration::Setter(site.setter(
                    name,
                    Param::Value(value),
                    Target::Field,
                    Assign::Reference,
                )));
                out.extend(self.nested(site, Target::Field).map(Declaration::Setter));
            }
            Strategy::OneofMember => {
                let oneof = message
                    .oneof_of(field)
                    .map(|o| o.name.clone())
                    .unwrap_or_default();
                let target = Target::Variant { oneof };
                let value = ValueType::of(&field.kind, from);
                let assign = match &field.kind {
                    Kind::Message(_) => Assign::Reference,
                    Kind::Enum(_) => Assign::Enum,
                    _ => Assign::Value,
                };
                let param = match &field.cardinality {
                    Cardinality::Singular => Param::Value(value),
                    Cardinality::Repeated => Param::Variadic(value),
                    Cardinality::Map { .. } => map_param(field, message),
                };
                let singular = field.cardinality == Cardinality::Singular;
                out.push(Declaration::Setter(site.setter(
                    name,
                    param,
                    target.clone(),
                    assign,
                )));
                if singular {
                    out.extend(self.nested(site, target).map(Declaration::Setter));
                }
            }
        }
    }

    /// The `WithNew...` option building a nested message in place.
    fn nested(&self, site: &FieldSite<'_>, target: Target) -> Option<Setter> {
        let FieldSite { message, field, .. } = *site;
        let Kind::Message(ty) = &field.kind else {
            return None;
        };
        let Some(nested) = self.generated.get(ty) else {
            decision!(
                self,
                "{}.{}: {} has no options, only the direct setter is generated",
                message.ident.full_name(),
                field.name,
                ty.full_name()
            );
            return None;
        };

        let qualified = NameResolver::qualify(&message.ident.package, ty);
        let param = if nested.flags.optionless {
            Param::None
        } else {
            Param::Options {
                option_type: NameResolver::option_type(ty),
                message: qualified.clone(),
            }
        };
        let construction = if nested.flags.skip_init {
            Construction::Zero { message: qualified }
        } else {
            Construction::Constructor {
                name: NameResolver::constructor(ty),
                message: qualified,
            }
        };
        let name = self.names.nested_constructor(message, field);
        if site.direct.contains(&name) {
            log::warn!(
                "{}.{}: `{}` is taken by a direct setter, in-place setter left out",
                message.ident.full_name(),
                field.name,
                name
            );
            return None;
        }
        Some(site.setter(name, param, target, Assign::Construct(construction)))
    }
}

/// The message and field an option is being generated for.
#[derive(Clone, Copy)]
struct FieldSite<'a> {
    message: &'a Message,
    field: &'a Field,
    option_type: &'a Name,
    direct: &'a HashSet<Name>,
}

impl FieldSite<'_> {
    fn setter(&self, name: Name, param: Param, target: Target, assign: Assign) -> Setter {
        Setter {
            name,
            message: self.message.ident.clone(),
            option_type: self.option_type.clone(),
            field: self.field.name.clone(),
            nullable: self.field.nullable,
            param,
            target,
            assign,
        }
    }
}

/// Numeric, boolean and string scalars use the optional convention when nullable.
fn wraps_optional(kind: &Kind) -> bool {
    kind.is_numeric() || matches!(kind, Kind::Bool | Kind::String)
}

fn map_param(field: &Field, message: &Message) -> Param {
    let from = &message.ident.package;
    match &field.cardinality {
        Cardinality::Map { key, value } => Param::Map {
            key: ValueType::of(key, from),
            value: ValueType::of(value, from),
        },
        _ => Param::Map {
            key: ValueType::Opaque,
            value: ValueType::Opaque,
        },
    }
}
