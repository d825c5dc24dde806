//! Build script library and protoc plugin for optgen.
//!
//! ```ignore
//! // build.rs
//! let set: prost_types::FileDescriptorSet = /* ... */;
//! optgen_build::Config::new()
//!     .flags(|name| {
//!         (name == "acme.v1.Audit").then(|| Flags { skip_init: true, ..Default::default() })
//!     })
//!     .compile(&set, std::env::var("OUT_DIR").unwrap())?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use optgen::schema::Flags;
use prost_types::{FileDescriptorProto, FileDescriptorSet};

pub mod idents;
pub mod load;
pub mod plugin;
pub mod render;


pub use load::{load_descriptor_set, LoadError, LoadErrors, Loader, Markers};
pub use render::{render_file, render_json, RenderError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadErrors),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What the generated files contain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// Rust functions over `prost` types.
    #[default]
    Rust,
    /// The raw declaration tree.
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Rust => "rs",
            Format::Json => "json",
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rust" => Ok(Format::Rust),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format `{}`, expected `rust` or `json`", other)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Rust => "rust",
            Format::Json => "json",
        })
    }
}

/// `foo/bar.proto` becomes `foo/bar_options.rs`.
pub fn output_name(proto: &str, format: Format) -> String {
    let stem = proto.strip_suffix(".proto").unwrap_or(proto);
    format!("{}_options.{}", stem, format.extension())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub name: String,
    pub content: String,
}

impl GeneratedFile {
    /// Writes the file below `dir`, creating parent directories as needed.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, Error> {
        let path = dir.as_ref().join(&self.name);
        let io = |source| Error::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }
        std::fs::write(&path, &self.content).map_err(io)?;
        Ok(path)
    }
}

type FlagFn = Box<dyn Fn(&str) -> Option<Flags>>;

/// Options for a generation run.
#[derive(Default)]
pub struct Config {
    markers: Markers,
    core: optgen::Config,
    format: Format,
    flags: Option<FlagFn>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Logs every generation decision at debug level.
    pub fn trace(mut self, trace: bool) -> Self {
        self.core = self.core.trace(trace);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Overrides the comment markers of the message with the given fully
    /// qualified name (no leading dot) whenever `f` returns `Some`.
    pub fn flags(mut self, f: impl Fn(&str) -> Option<Flags> + 'static) -> Self {
        self.flags = Some(Box::new(f));
        self
    }

    /// Generates output for the files named in `to_generate`, or for every
    /// file when it is empty.
    pub fn generate(
        &self,
        files: &[FileDescriptorProto],
        to_generate: &[String],
    ) -> Result<Vec<GeneratedFile>, Error> {
        let mut loader = Loader::new(&self.markers);
        if let Some(flags) = self.flags.as_deref() {
            loader = loader.overrides(flags);
        }
        let set = loader.load(files, to_generate)?;

        optgen::generate(&set, &self.core)
            .iter()
            .map(|decls| -> Result<GeneratedFile, Error> {
                let content = match self.format {
                    Format::Rust => render_file(decls)?,
                    Format::Json => render_json(decls)?,
                };
                Ok(GeneratedFile {
                    name: output_name(&decls.file, self.format),
                    content,
                })
            })
            .collect()
    }

    /// Generates output for every file of `set` and writes it below `out_dir`.
    pub fn compile(
        &self,
        set: &FileDescriptorSet,
        out_dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>, Error> {
        let out_dir = out_dir.as_ref();
        self.generate(&set.file, &[])?
            .iter()
            .map(|file| -> Result<PathBuf, Error> {
                let path = file.write_to(out_dir)?;
                log::info!("wrote {}", path.display());
                Ok(path)
            })
            .collect()
    }
}
