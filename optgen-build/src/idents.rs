//! Rust spellings of schema names, following the conventions of `prost-build`
//! so that generated options line up with the generated message types.

use heck::{ToSnakeCase, ToUpperCamelCase};
use optgen::naming::Name;
use optgen::schema::{Package, TypeRef};
use proc_macro2::{Ident, Span, TokenStream as Ts2};
use quote::quote;

/// The package `prost-build` maps to the `prost-types` crate.
const WELL_KNOWN: &str = "google.protobuf";

fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "abstract" | "as" | "async" | "await" | "become" | "box" | "break" | "const" | "continue"
            | "do" | "dyn" | "else" | "enum" | "false" | "final" | "fn" | "for" | "gen" | "if"
            | "impl" | "in" | "let" | "loop" | "macro" | "match" | "mod" | "move" | "mut"
            | "override" | "priv" | "pub" | "ref" | "return" | "static" | "struct" | "trait"
            | "true" | "try" | "type" | "typeof" | "unsafe" | "unsized" | "use" | "virtual"
            | "where" | "while" | "yield"
    )
}

/// Identifiers that cannot even be raw get an underscore, keywords become raw.
fn sanitize(s: String) -> Ident {
    match s.as_str() {
        "self" | "super" | "extern" | "crate" | "Self" => {
            Ident::new(&format!("{}_", s), Span::call_site())
        }
        _ if is_keyword(&s) => Ident::new_raw(&s, Span::call_site()),
        _ => Ident::new(&s, Span::call_site()),
    }
}

/// A struct field or module: `snake_case`.
pub fn snake(name: &str) -> Ident {
    sanitize(name.to_snake_case())
}

/// A type or enum variant: `UpperCamelCase`.
pub fn camel(name: &str) -> Ident {
    sanitize(name.to_upper_camel_case())
}

/// A generated function.
pub fn function(name: &Name) -> Ident {
    sanitize(name.to_snake_case())
}

/// A generated type alias.
pub fn alias(name: &Name) -> Ident {
    sanitize(name.as_str().to_owned())
}

/// Path segments leading from package `from` to package `to`: `super` hops up
/// to the common ancestor, then modules down.
pub fn package_segments(from: &Package, to: &Package) -> Vec<Ts2> {
    if from.same_as(to) {
        return Vec::new();
    }
    if to.key == WELL_KNOWN {
        return vec![quote!(::prost_types)];
    }

    let from_parts: Vec<&str> = from.key.split('.').filter(|s| !s.is_empty()).collect();
    let to_parts: Vec<&str> = to.key.split('.').filter(|s| !s.is_empty()).collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let supers = (common..from_parts.len()).map(|_| quote!(super));
    let downs = to_parts[common..].iter().map(|p| {
        let m = snake(p);
        quote!(#m)
    });
    supers.chain(downs).collect()
}

fn join(segments: Vec<Ts2>) -> Ts2 {
    quote!(#(#segments)::*)
}

/// The message or enum type itself, e.g. `super::common::outer::Inner`.
pub fn type_path(from: &Package, ty: &TypeRef) -> Ts2 {
    let mut segments = package_segments(from, &ty.package);
    segments.extend(ty.scope.iter().map(|s| {
        let m = snake(s);
        quote!(#m)
    }));
    let name = camel(&ty.name);
    segments.push(quote!(#name));
    join(segments)
}

/// An item generated at the top of `ty`'s package, e.g. its constructor.
pub fn item_path(from: &Package, ty: &TypeRef, item: Ident) -> Ts2 {
    let mut segments = package_segments(from, &ty.package);
    segments.push(quote!(#item));
    join(segments)
}

/// The enum `prost` generates for oneof `oneof` of `owner`.
pub fn oneof_path(from: &Package, owner: &TypeRef, oneof: &str) -> Ts2 {
    let mut segments = package_segments(from, &owner.package);
    segments.extend(owner.scope.iter().chain(std::iter::once(&owner.name)).map(|s| {
        let m = snake(s);
        quote!(#m)
    }));
    let name = camel(oneof);
    segments.push(quote!(#name));
    join(segments)
}
