//! optgen - functional options for Protocol Buffer messages
//!
//! Given a [`SchemaSet`](schema::SchemaSet), [`generate`] produces, per schema
//! file, the declarations of a functional-option builder for every message: a
//! constructor, a bulk-apply operation, the option type and one or two setters
//! per field. The output is a declaration tree; turning it into source text is
//! the job of a renderer such as the one in `optgen-build`.

pub mod collision;
pub mod config;
pub mod decl;
pub mod emit;
pub mod naming;
pub mod schema;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use decl::{Declaration, FileDeclarations};
pub use schema::SchemaSet;

use collision::CollisionMap;
use emit::OptionEmitter;

/// Generates declarations for every file of `set` marked for generation, in
/// input order.
///
/// Field-name collisions are counted once, across all generated files, before
/// any file is emitted.
pub fn generate(set: &SchemaSet, config: &Config) -> Vec<FileDeclarations> {
    let collisions = CollisionMap::analyze(set.generated_messages());
    if config.trace {
        for name in collisions.ambiguous_names() {
            log::debug!(
                "`{}` is declared by {} messages and will be disambiguated",
                name,
                collisions.count(name)
            );
        }
    }

    let emitter = OptionEmitter::new(set, &collisions, config);
    set.generated_files().map(|f| emitter.emit_file(f)).collect()
}
