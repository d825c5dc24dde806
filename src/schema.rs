//! The in-memory schema model the generator walks.
//!
//! Everything here is built once (usually by `optgen-build`'s descriptor loader)
//! and only read afterwards. The constructors at the bottom of each type are
//! builder-style so that schemas can also be assembled by hand.

use heck::ToUpperCamelCase;
use serde::Serialize;

/// Identity of a schema package.
///
/// The `key` is opaque and only ever compared for equality; `name` is the short
/// name used when a reference has to be qualified.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Package {
    pub key: String,
    pub name: String,
}

impl Package {
    /// A package whose short name is the last dot-separated segment of `key`.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let name = key.rsplit('.').next().unwrap_or_default().to_owned();
        Self { key, name }
    }

    pub fn with_name(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }

    pub fn same_as(&self, other: &Package) -> bool {
        self.key == other.key
    }
}

/// Identity of a message or enum type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeRef {
    pub package: Package,
    /// Enclosing messages, outermost first.
    pub scope: Vec<String>,
    pub name: String,
}

impl TypeRef {
    pub fn new(package: Package, name: impl Into<String>) -> Self {
        Self {
            package,
            scope: Vec::new(),
            name: name.into(),
        }
    }

    pub fn nested(package: Package, scope: Vec<String>, name: impl Into<String>) -> Self {
        Self {
            package,
            scope,
            name: name.into(),
        }
    }

    /// `Outer.Inner` becomes `OuterInner`.
    pub fn flat_name(&self) -> String {
        self.scope
            .iter()
            .chain(std::iter::once(&self.name))
            .map(|s| s.to_upper_camel_case())
            .collect()
    }

    /// The dotted name relative to the package, e.g. `Outer.Inner`.
    pub fn dotted_name(&self) -> String {
        let mut out = String::new();
        for s in &self.scope {
            out.push_str(s);
            out.push('.');
        }
        out.push_str(&self.name);
        out
    }

    /// The fully qualified dotted name, e.g. `acme.v1.Outer.Inner`.
    pub fn full_name(&self) -> String {
        if self.package.key.is_empty() {
            self.dotted_name()
        } else {
            format!("{}.{}", self.package.key, self.dotted_name())
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Kind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Bytes,
    Enum(TypeRef),
    Message(TypeRef),
    /// A kind the loader did not recognize.
    Opaque,
}

impl Kind {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Kind::Int32 | Kind::Int64 | Kind::Uint32 | Kind::Uint64 | Kind::Float32 | Kind::Float64
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Cardinality {
    Singular,
    Repeated,
    Map { key: Kind, value: Kind },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub kind: Kind,
    pub cardinality: Cardinality,
    /// Index into the owning message's `oneofs`.
    pub oneof: Option<usize>,
    /// The field tracks explicit presence.
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            cardinality: Cardinality::Singular,
            oneof: None,
            nullable: false,
        }
    }

    pub fn map(name: impl Into<String>, key: Kind, value: Kind) -> Self {
        let value_kind = value.clone();
        Self {
            cardinality: Cardinality::Map { key, value },
            ..Self::new(name, value_kind)
        }
    }

    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Oneof {
    pub name: String,
    /// Indices into the owning message's `fields`, in declaration order.
    pub members: Vec<usize>,
    /// Generated by the schema compiler to model an optional scalar.
    pub synthetic: bool,
}

/// Per-message generation toggles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Flags {
    /// Do not generate the bulk-apply operation.
    pub optionless: bool,
    /// Do not generate the constructor.
    pub skip_init: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Message {
    pub ident: TypeRef,
    pub fields: Vec<Field>,
    pub oneofs: Vec<Oneof>,
    pub flags: Flags,
}

impl Message {
    pub fn new(ident: TypeRef) -> Self {
        Self {
            ident,
            fields: Vec::new(),
            oneofs: Vec::new(),
            flags: Flags::default(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a oneof whose members are appended to the field list.
    pub fn oneof(mut self, name: impl Into<String>, members: Vec<Field>) -> Self {
        self.push_oneof(name, members, false);
        self
    }

    /// Adds a compiler-generated oneof wrapping one optional field.
    pub fn synthetic_oneof(mut self, name: impl Into<String>, member: Field) -> Self {
        self.push_oneof(name, vec![member.nullable()], true);
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    fn push_oneof(&mut self, name: impl Into<String>, members: Vec<Field>, synthetic: bool) {
        let index = self.oneofs.len();
        let mut indices = Vec::with_capacity(members.len());
        for mut member in members {
            member.oneof = Some(index);
            indices.push(self.fields.len());
            self.fields.push(member);
        }
        self.oneofs.push(Oneof {
            name: name.into(),
            members: indices,
            synthetic,
        });
    }

    /// The oneof `field` belongs to, if any.
    pub fn oneof_of(&self, field: &Field) -> Option<&Oneof> {
        field.oneof.and_then(|i| self.oneofs.get(i))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct File {
    pub name: String,
    pub package: Package,
    /// Whether declarations should be produced for this file.
    pub generate: bool,
    pub messages: Vec<Message>,
}

impl File {
    pub fn new(name: impl Into<String>, package: Package) -> Self {
        Self {
            name: name.into(),
            package,
            generate: true,
            messages: Vec::new(),
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Marks the file as a dependency only.
    pub fn dependency(mut self) -> Self {
        self.generate = false;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SchemaSet {
    pub files: Vec<File>,
}

impl SchemaSet {
    pub fn new(files: Vec<File>) -> Self {
        Self { files }
    }

    pub fn generated_files(&self) -> impl Iterator<Item = &File> {
        self.files.iter().filter(|f| f.generate)
    }

    pub fn generated_messages(&self) -> impl Iterator<Item = &Message> {
        self.generated_files().flat_map(|f| f.messages.iter())
    }

    /// Looks up a message among the generated files.
    pub fn generated_message(&self, ty: &TypeRef) -> Option<&Message> {
        self.generated_messages().find(|m| &m.ident == ty)
    }
}
