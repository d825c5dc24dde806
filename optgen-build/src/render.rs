//! Rust rendering of [`FileDeclarations`] against `prost`-generated types.
//!
//! The output is meant to be `include!`d into the module holding the messages
//! of the file's package, right next to what `prost-build` emits for it.

use optgen::decl::*;
use optgen::naming::NameResolver;
use optgen::schema::{Package, TypeRef};
use proc_macro2::TokenStream as Ts2;
use quote::quote;

use crate::idents;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{file}: generated code does not parse: {source}")]
    Syntax {
        file: String,
        #[source]
        source: syn::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Renders the option surface of one file as Rust source.
pub fn render_file(decls: &FileDeclarations) -> Result<String, RenderError> {
    let renderer = Renderer {
        from: &decls.package,
    };
    let items: Vec<Ts2> = decls
        .declarations
        .iter()
        .filter_map(|d| renderer.declaration(d))
        .collect();

    let mut out = format!(
        "// Code generated by protoc-gen-rust-options. DO NOT EDIT.\n// source: {}\n\n",
        decls.file
    );
    for item in items {
        out.push_str(&item.to_string());
        out.push_str("\n\n");
    }

    syn::parse_file(&out).map_err(|source| RenderError::Syntax {
        file: decls.file.clone(),
        source,
    })?;
    Ok(out)
}

/// Renders the declaration tree itself, for renderers living outside Rust.
pub fn render_json(decls: &FileDeclarations) -> Result<String, RenderError> {
    let mut out = serde_json::to_string_pretty(decls)?;
    out.push('\n');
    Ok(out)
}

struct Renderer<'a> {
    from: &'a Package,
}

impl Renderer<'_> {
    fn declaration(&self, decl: &Declaration) -> Option<Ts2> {
        match decl {
            Declaration::Constructor {
                name,
                message,
                option_type,
            } => {
                let name = idents::function(name);
                let option_type = idents::alias(option_type);
                let ty = idents::type_path(self.from, message);
                let doc = format!(
                    " Creates a `{}` from its zero value and applies `opts` in order.",
                    message.dotted_name()
                );
                Some(quote! {
                    #[doc = #doc]
                    pub fn #name(
                        opts: impl ::core::iter::IntoIterator<Item = #option_type>,
                    ) -> #ty {
                        let mut m = <#ty as ::core::default::Default>::default();
                        for opt in opts {
                            opt(&mut m);
                        }
                        m
                    }
                })
            }
            Declaration::BulkApply {
                name,
                message,
                option_type,
            } => {
                let name = idents::function(name);
                let option_type = idents::alias(option_type);
                let ty = idents::type_path(self.from, message);
                let doc = format!(
                    " Applies `opts` to an existing `{}` in order.",
                    message.dotted_name()
                );
                Some(quote! {
                    #[doc = #doc]
                    pub fn #name(
                        m: &mut #ty,
                        opts: impl ::core::iter::IntoIterator<Item = #option_type>,
                    ) {
                        for opt in opts {
                            opt(&mut *m);
                        }
                    }
                })
            }
            Declaration::OptionType { name, message } => {
                let name = idents::alias(name);
                let ty = idents::type_path(self.from, message);
                let doc = format!(" A deferred change to a `{}`.", message.dotted_name());
                Some(quote! {
                    #[doc = #doc]
                    pub type #name =
                        ::std::boxed::Box<dyn ::core::ops::FnOnce(&mut #ty) + ::core::marker::Send>;
                })
            }
            Declaration::Setter(setter) => self.setter(setter),
        }
    }

    fn setter(&self, setter: &Setter) -> Option<Ts2> {
        if setter.is_opaque() {
            log::warn!(
                "{}.{}: `{}` has no Rust type and is left out",
                setter.message.full_name(),
                setter.field,
                setter.name
            );
            return None;
        }

        let name = idents::function(&setter.name);
        let option_type = idents::alias(&setter.option_type);
        let ty = idents::type_path(self.from, &setter.message);
        let (params, prepare) = self.param(&setter.param);
        let build = self.construct(&setter.assign, &setter.param);
        let store = self.store(setter);
        let doc = match &setter.assign {
            Assign::Construct(_) => format!(
                " `{}` builds the `{}` field of `{}` in place.",
                name,
                setter.field,
                setter.message.dotted_name()
            ),
            _ => format!(
                " `{}` sets the `{}` field of `{}`.",
                name,
                setter.field,
                setter.message.dotted_name()
            ),
        };

        Some(quote! {
            #[doc = #doc]
            pub fn #name(#params) -> #option_type {
                #prepare
                ::std::boxed::Box::new(move |m: &mut #ty| {
                    #build
                    #store
                })
            }
        })
    }

    /// The parameter list, and the statements turning the arguments into
    /// owned values the option can capture.
    fn param(&self, param: &Param) -> (Ts2, Ts2) {
        match param {
            Param::Value(v) => {
                let accepted = self.accepted(v);
                let stored = self.stored(v);
                let convert = convert(v, quote!(value));
                (
                    quote!(value: #accepted),
                    quote!(let value: #stored = #convert;),
                )
            }
            Param::Variadic(v) => {
                let accepted = self.accepted(v);
                let stored = self.stored(v);
                let convert = convert(v, quote!(value));
                (
                    quote!(values: impl ::core::iter::IntoIterator<Item = #accepted>),
                    quote! {
                        let values: ::std::vec::Vec<#stored> =
                            values.into_iter().map(|value| #convert).collect();
                    },
                )
            }
            Param::Map { key, value } => {
                let (key_accepted, key_stored) = (self.accepted(key), self.stored(key));
                let (value_accepted, value_stored) = (self.accepted(value), self.stored(value));
                let key_convert = convert(key, quote!(key));
                let value_convert = convert(value, quote!(value));
                let entry = quote!((#key_accepted, #value_accepted));
                (
                    quote!(entries: impl ::core::iter::IntoIterator<Item = #entry>),
                    quote! {
                        let entries: ::std::vec::Vec<(#key_stored, #value_stored)> = entries
                            .into_iter()
                            .map(|(key, value)| (#key_convert, #value_convert))
                            .collect();
                    },
                )
            }
            Param::Options { option_type, message } => {
                let option_type =
                    idents::item_path(self.from, &message.ty, idents::alias(option_type));
                (
                    quote!(opts: impl ::core::iter::IntoIterator<Item = #option_type>),
                    quote! {
                        let opts: ::std::vec::Vec<#option_type> = opts.into_iter().collect();
                    },
                )
            }
            Param::None => (Ts2::new(), Ts2::new()),
        }
    }

    /// Builds a nested message in place, as `value`.
    fn construct(&self, assign: &Assign, param: &Param) -> Ts2 {
        let Assign::Construct(construction) = assign else {
            return Ts2::new();
        };
        let with_opts = matches!(param, Param::Options { .. });
        match construction {
            Construction::Constructor { name, message } => {
                let ctor = idents::item_path(self.from, &message.ty, idents::function(name));
                if with_opts {
                    quote!(let value = #ctor(opts);)
                } else {
                    let option_type = idents::item_path(
                        self.from,
                        &message.ty,
                        idents::alias(&NameResolver::option_type(&message.ty)),
                    );
                    quote!(let value = #ctor(::core::iter::empty::<#option_type>());)
                }
            }
            Construction::Zero { message } => {
                let ty = idents::type_path(self.from, &message.ty);
                if with_opts {
                    quote! {
                        let mut value = <#ty as ::core::default::Default>::default();
                        for opt in opts {
                            opt(&mut value);
                        }
                    }
                } else {
                    quote!(let value = <#ty as ::core::default::Default>::default();)
                }
            }
        }
    }

    fn store(&self, setter: &Setter) -> Ts2 {
        let value = match &setter.param {
            Param::Variadic(_) => quote!(values),
            Param::Map { .. } => quote!(entries.into_iter().collect()),
            _ => quote!(value),
        };
        // Nested messages may be boxed by prost.
        let value = match &setter.assign {
            Assign::Reference | Assign::Construct(_) => quote!(::core::convert::Into::into(#value)),
            _ => value,
        };

        match &setter.target {
            Target::Field => {
                let field = idents::snake(&setter.field);
                let wrapped = setter.nullable
                    || matches!(
                        setter.assign,
                        Assign::Optional | Assign::Reference | Assign::Construct(_)
                    );
                if wrapped {
                    quote!(m.#field = ::core::option::Option::Some(#value);)
                } else {
                    quote!(m.#field = #value;)
                }
            }
            Target::Variant { oneof } => {
                let slot = idents::snake(oneof);
                let enum_path = idents::oneof_path(self.from, &setter.message, oneof);
                let variant = idents::camel(&setter.field);
                quote!(m.#slot = ::core::option::Option::Some(#enum_path::#variant(#value));)
            }
        }
    }

    /// The type a setter accepts for one value.
    fn accepted(&self, v: &ValueType) -> Ts2 {
        match v {
            ValueType::String => quote!(impl ::core::convert::Into<::std::string::String>),
            ValueType::Bytes => quote!(impl ::core::convert::Into<::std::vec::Vec<u8>>),
            ValueType::Enum(q) | ValueType::Message(q) => self.path(&q.ty),
            _ => self.stored(v),
        }
    }

    /// The type prost stores one value as.
    fn stored(&self, v: &ValueType) -> Ts2 {
        match v {
            ValueType::Bool => quote!(bool),
            ValueType::Int32 => quote!(i32),
            ValueType::Int64 => quote!(i64),
            ValueType::Uint32 => quote!(u32),
            ValueType::Uint64 => quote!(u64),
            ValueType::Float32 => quote!(f32),
            ValueType::Float64 => quote!(f64),
            ValueType::String => quote!(::std::string::String),
            ValueType::Bytes => quote!(::std::vec::Vec<u8>),
            ValueType::Enum(_) => quote!(i32),
            ValueType::Message(q) => self.path(&q.ty),
            // filtered out in `setter`
            ValueType::Opaque => quote!(()),
        }
    }

    fn path(&self, ty: &TypeRef) -> Ts2 {
        idents::type_path(self.from, ty)
    }
}

fn convert(v: &ValueType, value: Ts2) -> Ts2 {
    match v {
        ValueType::String => quote!(::core::convert::Into::<::std::string::String>::into(#value)),
        ValueType::Bytes => quote!(::core::convert::Into::<::std::vec::Vec<u8>>::into(#value)),
        ValueType::Enum(_) => quote!(i32::from(#value)),
        _ => value,
    }
}
