//! Turns protobuf descriptors into the generator's schema model.
//!
//! This is where malformed input is rejected: the generator itself assumes a
//! well-formed schema.

use std::collections::HashMap;

use optgen::schema::{
    Cardinality, Field, File, Flags, Kind, Message, Oneof, Package, SchemaSet, TypeRef,
};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto};
use thiserror::Error;

/// `FileDescriptorProto.message_type`
const MESSAGE_TYPE: i32 = 4;
/// `DescriptorProto.nested_type`
const NESTED_TYPE: i32 = 3;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{file}: a message has no name")]
    UnnamedMessage { file: String },
    #[error("{message}: field #{number} has no name")]
    UnnamedField { message: String, number: i32 },
    #[error("{field}: type `{type_name}` is not declared in any file")]
    UnresolvedType { field: String, type_name: String },
    #[error("{field}: type `{type_name}` is a {found}, expected a {expected}")]
    WrongTypeKind {
        field: String,
        type_name: String,
        found: &'static str,
        expected: &'static str,
    },
    #[error("{field}: map entry `{entry}` must declare exactly two fields, found {count}")]
    MalformedMapEntry {
        field: String,
        entry: String,
        count: usize,
    },
    #[error("{field}: oneof index {index} is out of range")]
    OneofOutOfRange { field: String, index: i32 },
    #[error("`{0}` was requested for generation but is not in the descriptor set")]
    MissingFile(String),
    #[error("`{first}` and `{second}` both flatten to `{flat}` in package `{package}`")]
    FlatNameClash {
        package: String,
        flat: String,
        first: String,
        second: String,
    },
}

/// Every problem found while loading, in discovery order.
#[derive(Debug, Error)]
#[error("{}", join(.0))]
pub struct LoadErrors(pub Vec<LoadError>);

fn join(errors: &[LoadError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoadErrors {
    pub fn combine(&mut self, other: LoadErrors) {
        self.0.extend(other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadError> {
        self.0.iter()
    }
}

impl From<LoadError> for LoadErrors {
    fn from(e: LoadError) -> Self {
        Self(vec![e])
    }
}

/// Collects an iterator of results, keeping every error instead of the first.
pub struct Collected<T>(Result<T, LoadErrors>);

impl<C: FromIterator<T>, T, E: Into<LoadErrors>> FromIterator<Result<T, E>> for Collected<C> {
    fn from_iter<I: IntoIterator<Item = Result<T, E>>>(iter: I) -> Self {
        let mut err: Option<LoadErrors> = None;
        let it = iter.into_iter().filter_map(|r| match r {
            Ok(t) => Some(t),
            Err(error) => {
                match &mut err {
                    Some(errors) => errors.combine(error.into()),
                    None => err = Some(error.into()),
                }
                None
            }
        });
        let res = C::from_iter(it);
        Self(match err {
            Some(e) => Err(e),
            None => Ok(res),
        })
    }
}

impl<T> Collected<T> {
    pub fn inner(self) -> Result<T, LoadErrors> {
        self.0
    }
}

/// Leading-comment markers that set per-message flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    pub optionless: String,
    pub skip_init: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            optionless: "@optionless".into(),
            skip_init: "@skip_init".into(),
        }
    }
}

impl Markers {
    pub fn flags(&self, comment: &str) -> Flags {
        Flags {
            optionless: !self.optionless.is_empty() && comment.contains(&self.optionless),
            skip_init: !self.skip_init.is_empty() && comment.contains(&self.skip_init),
        }
    }
}

/// Programmatic flag overrides keyed by fully qualified message name.
pub type FlagOverride<'a> = &'a dyn Fn(&str) -> Option<Flags>;

/// Loads `files` into a [`SchemaSet`], marking the ones named in `generate`
/// (every file, when `generate` is empty).
pub fn load_descriptor_set(
    files: &[FileDescriptorProto],
    generate: &[String],
    markers: &Markers,
) -> Result<SchemaSet, LoadErrors> {
    Loader::new(markers).load(files, generate)
}

pub struct Loader<'a> {
    markers: &'a Markers,
    overrides: Option<FlagOverride<'a>>,
}

impl<'a> Loader<'a> {
    pub fn new(markers: &'a Markers) -> Self {
        Self {
            markers,
            overrides: None,
        }
    }

    pub fn overrides(mut self, f: FlagOverride<'a>) -> Self {
        self.overrides = Some(f);
        self
    }

    pub fn load(
        &self,
        files: &[FileDescriptorProto],
        generate: &[String],
    ) -> Result<SchemaSet, LoadErrors> {
        let index = TypeIndex::build(files);

        let missing: Vec<Result<File, LoadErrors>> = generate
            .iter()
            .filter(|name| !files.iter().any(|f| f.name() == name.as_str()))
            .map(|name| Err(LoadError::MissingFile(name.clone()).into()))
            .collect();
        let files = files.iter().map(|file| {
            let wanted = generate.is_empty() || generate.iter().any(|g| g == file.name());
            FileLoader {
                loader: self,
                index: &index,
                file,
                package: package_of(file),
                comments: leading_comments(file),
            }
            .load(wanted)
        });

        let files = missing
            .into_iter()
            .chain(files)
            .collect::<Collected<Vec<_>>>()
            .inner()?;
        let set = SchemaSet::new(files);
        flat_name_clashes(&set)?;
        Ok(set)
    }
}

/// Generated messages of one package must have distinct flat names.
fn flat_name_clashes(set: &SchemaSet) -> Result<(), LoadErrors> {
    let mut seen: HashMap<(&str, String), &TypeRef> = HashMap::new();
    let clashes = set
        .generated_messages()
        .filter_map(|m| {
            let key = (m.ident.package.key.as_str(), m.ident.flat_name());
            match seen.get(&key) {
                Some(first) => Some(LoadError::FlatNameClash {
                    package: m.ident.package.key.clone(),
                    flat: key.1.clone(),
                    first: first.full_name(),
                    second: m.ident.full_name(),
                }),
                None => {
                    seen.insert(key, &m.ident);
                    None
                }
            }
        })
        .map(Err);
    clashes.collect::<Collected<Vec<()>>>().inner().map(drop)
}

fn package_of(file: &FileDescriptorProto) -> Package {
    Package::new(file.package())
}

/// Leading comments keyed by source location path.
fn leading_comments(file: &FileDescriptorProto) -> HashMap<&[i32], &str> {
    file.source_code_info
        .iter()
        .flat_map(|info| info.location.iter())
        .filter_map(|loc| Some((loc.path.as_slice(), loc.leading_comments.as_deref()?)))
        .collect()
}

fn is_map_entry(desc: &DescriptorProto) -> bool {
    desc.options.as_ref().map_or(false, |o| o.map_entry())
}

enum Declared<'a> {
    Message {
        ty: TypeRef,
        /// Set for synthesized map entry types.
        entry: Option<&'a DescriptorProto>,
    },
    Enum(TypeRef),
}

/// Every message and enum across all files, by fully qualified name
/// (`.pkg.Outer.Inner`).
struct TypeIndex<'a> {
    types: HashMap<String, Declared<'a>>,
}

impl<'a> TypeIndex<'a> {
    fn build(files: &'a [FileDescriptorProto]) -> Self {
        let mut types = HashMap::new();
        for file in files {
            let package = package_of(file);
            let prefix = if package.key.is_empty() {
                String::new()
            } else {
                format!(".{}", package.key)
            };
            for e in &file.enum_type {
                let ty = TypeRef::new(package.clone(), e.name());
                types.insert(format!("{}.{}", prefix, e.name()), Declared::Enum(ty));
            }
            Self::messages(&mut types, &package, &prefix, &[], &file.message_type);
        }
        Self { types }
    }

    fn messages(
        types: &mut HashMap<String, Declared<'a>>,
        package: &Package,
        prefix: &str,
        scope: &[String],
        descs: &'a [DescriptorProto],
    ) {
        for desc in descs {
            let full = format!("{}.{}", prefix, desc.name());
            let ty = TypeRef::nested(package.clone(), scope.to_vec(), desc.name());
            let entry = is_map_entry(desc).then_some(desc);

            let mut inner_scope = scope.to_vec();
            inner_scope.push(desc.name().to_owned());
            for e in &desc.enum_type {
                let ty = TypeRef::nested(package.clone(), inner_scope.clone(), e.name());
                types.insert(format!("{}.{}", full, e.name()), Declared::Enum(ty));
            }
            Self::messages(types, package, &full, &inner_scope, &desc.nested_type);

            types.insert(full, Declared::Message { ty, entry });
        }
    }

    fn get(&self, type_name: &str) -> Option<&Declared<'a>> {
        if type_name.starts_with('.') {
            self.types.get(type_name)
        } else {
            self.types.get(&format!(".{}", type_name))
        }
    }
}

struct FileLoader<'l, 'a> {
    loader: &'l Loader<'l>,
    index: &'l TypeIndex<'a>,
    file: &'a FileDescriptorProto,
    package: Package,
    comments: HashMap<&'a [i32], &'a str>,
}

impl FileLoader<'_, '_> {
    fn load(&self, generate: bool) -> Result<File, LoadErrors> {
        let mut messages = Vec::new();
        self.messages(&self.file.message_type, &[], vec![MESSAGE_TYPE], &mut messages);
        let messages = messages.into_iter().collect::<Collected<Vec<_>>>().inner()?;
        log::debug!(
            "{}: loaded {} messages (generate: {})",
            self.file.name(),
            messages.len(),
            generate
        );
        Ok(File {
            name: self.file.name().to_owned(),
            package: self.package.clone(),
            generate,
            messages,
        })
    }

    /// Flattens `descs` and their nested types in pre-order, skipping map entries.
    fn messages(
        &self,
        descs: &[DescriptorProto],
        scope: &[String],
        path: Vec<i32>,
        out: &mut Vec<Result<Message, LoadErrors>>,
    ) {
        for (i, desc) in descs.iter().enumerate() {
            if is_map_entry(desc) {
                continue;
            }
            let mut path = path.clone();
            path.push(i as i32);
            out.push(self.message(desc, scope, &path));

            let mut inner_scope = scope.to_vec();
            inner_scope.push(desc.name().to_owned());
            path.push(NESTED_TYPE);
            self.messages(&desc.nested_type, &inner_scope, path, out);
        }
    }

    fn message(
        &self,
        desc: &DescriptorProto,
        scope: &[String],
        path: &[i32],
    ) -> Result<Message, LoadErrors> {
        let name = match desc.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(LoadError::UnnamedMessage {
                    file: self.file.name().to_owned(),
                }
                .into())
            }
        };
        let ident = TypeRef::nested(self.package.clone(), scope.to_vec(), name);

        let fields = desc
            .field
            .iter()
            .map(|f| self.field(&ident, desc, f))
            .collect::<Collected<Vec<_>>>()
            .inner()?;

        let oneofs = desc
            .oneof_decl
            .iter()
            .enumerate()
            .map(|(i, decl)| {
                let members: Vec<usize> = fields
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| f.oneof == Some(i))
                    .map(|(n, _)| n)
                    .collect();
                let synthetic = !members.is_empty()
                    && members.iter().all(|&n| desc.field[n].proto3_optional());
                Oneof {
                    name: decl.name().to_owned(),
                    members,
                    synthetic,
                }
            })
            .collect();

        let mut flags = self
            .comments
            .get(path)
            .map(|comment| self.loader.markers.flags(comment))
            .unwrap_or_default();
        if let Some(f) = self.loader.overrides.and_then(|f| f(&ident.full_name())) {
            flags = f;
        }

        Ok(Message {
            ident,
            fields,
            oneofs,
            flags,
        })
    }

    fn field(
        &self,
        owner: &TypeRef,
        desc: &DescriptorProto,
        f: &FieldDescriptorProto,
    ) -> Result<Field, LoadError> {
        let name = match f.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(LoadError::UnnamedField {
                    message: owner.full_name(),
                    number: f.number(),
                })
            }
        };
        let site = format!("{}.{}", owner.full_name(), name);

        let oneof = match f.oneof_index {
            Some(i) if i < 0 || i as usize >= desc.oneof_decl.len() => {
                return Err(LoadError::OneofOutOfRange { field: site, index: i })
            }
            Some(i) => Some(i as usize),
            None => None,
        };

        let repeated = f.label() == Label::Repeated;
        let (kind, cardinality) = match self.map_entry(&site, f)? {
            Some((key, value)) => (value.clone(), Cardinality::Map { key, value }),
            None if repeated => (self.kind(&site, f)?, Cardinality::Repeated),
            None => (self.kind(&site, f)?, Cardinality::Singular),
        };

        let nullable = if self.file.syntax() == "proto3" {
            f.proto3_optional()
        } else {
            f.label() == Label::Optional
                && oneof.is_none()
                && cardinality == Cardinality::Singular
                && !matches!(kind, Kind::Message(_) | Kind::Opaque)
        };

        Ok(Field {
            name: name.to_owned(),
            kind,
            cardinality,
            oneof,
            nullable,
        })
    }

    /// The key and value kinds of a map field, `None` for any other field.
    fn map_entry(
        &self,
        site: &str,
        f: &FieldDescriptorProto,
    ) -> Result<Option<(Kind, Kind)>, LoadError> {
        if f.label() != Label::Repeated || f.r#type != Some(Type::Message as i32) {
            return Ok(None);
        }
        let entry = match self.index.get(f.type_name()) {
            Some(Declared::Message { entry: Some(entry), .. }) => *entry,
            _ => return Ok(None),
        };
        match entry.field.as_slice() {
            [key, value] => Ok(Some((self.kind(site, key)?, self.kind(site, value)?))),
            fields => Err(LoadError::MalformedMapEntry {
                field: site.to_owned(),
                entry: f.type_name().to_owned(),
                count: fields.len(),
            }),
        }
    }

    fn kind(&self, site: &str, f: &FieldDescriptorProto) -> Result<Kind, LoadError> {
        let ty = match f.r#type.map(Type::try_from) {
            Some(Ok(ty)) => ty,
            _ => {
                log::warn!("{}: unknown field type {:?}", site, f.r#type);
                return Ok(Kind::Opaque);
            }
        };
        Ok(match ty {
            Type::Bool => Kind::Bool,
            Type::Int32 | Type::Sint32 | Type::Sfixed32 => Kind::Int32,
            Type::Int64 | Type::Sint64 | Type::Sfixed64 => Kind::Int64,
            Type::Uint32 | Type::Fixed32 => Kind::Uint32,
            Type::Uint64 | Type::Fixed64 => Kind::Uint64,
            Type::Float => Kind::Float32,
            Type::Double => Kind::Float64,
            Type::String => Kind::String,
            Type::Bytes => Kind::Bytes,
            Type::Enum => Kind::Enum(self.resolve(site, f, DeclKind::Enum)?),
            Type::Message | Type::Group => Kind::Message(self.resolve(site, f, DeclKind::Message)?),
        })
    }

    fn resolve(
        &self,
        site: &str,
        f: &FieldDescriptorProto,
        expected: DeclKind,
    ) -> Result<TypeRef, LoadError> {
        let type_name = f.type_name();
        let found = match (self.index.get(type_name), expected) {
            (Some(Declared::Message { ty, .. }), DeclKind::Message)
            | (Some(Declared::Enum(ty)), DeclKind::Enum) => {
                return Ok(ty.clone())
            }
            (Some(Declared::Message { .. }), _) => DeclKind::Message,
            (Some(Declared::Enum(_)), _) => DeclKind::Enum,
            (None, _) => {
                return Err(LoadError::UnresolvedType {
                    field: site.to_owned(),
                    type_name: type_name.to_owned(),
                })
            }
        };
        Err(LoadError::WrongTypeKind {
            field: site.to_owned(),
            type_name: type_name.to_owned(),
            found: found.as_str(),
            expected: expected.as_str(),
        })
    }
}

#[derive(Clone, Copy)]
enum DeclKind {
    Message,
    Enum,
}

impl DeclKind {
    fn as_str(self) -> &'static str {
        match self {
            DeclKind::Message => "message",
            DeclKind::Enum => "enum",
        }
    }
}
