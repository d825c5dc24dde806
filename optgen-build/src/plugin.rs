//! The protoc plugin protocol: parameters in, one options file per proto out.

use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use thiserror::Error;

use crate::{Config, Format, Markers};

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
    #[error("parameter `{key}` needs a value")]
    MissingValue { key: String },
    #[error("{0}")]
    Format(String),
    #[error(transparent)]
    Generate(#[from] crate::Error),
}

/// The plugin's `--rust-options_opt` values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parameters {
    pub trace: bool,
    pub markers: Markers,
    pub format: Format,
}

impl Parameters {
    /// Parses `key[=value]` pairs separated by commas.
    pub fn parse(parameter: Option<&str>) -> Result<Self, PluginError> {
        let mut params = Self::default();
        let pairs = parameter
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty());

        for pair in pairs {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (pair, None),
            };
            let required = || {
                value.ok_or_else(|| PluginError::MissingValue {
                    key: key.to_owned(),
                })
            };
            match key {
                "trace" => params.trace = value.map_or(true, |v| v != "false"),
                "optionless_marker" => params.markers.optionless = required()?.to_owned(),
                "skip_init_marker" => params.markers.skip_init = required()?.to_owned(),
                "format" => params.format = required()?.parse().map_err(PluginError::Format)?,
                _ => return Err(PluginError::UnknownParameter(key.to_owned())),
            }
        }
        Ok(params)
    }

    pub fn config(&self) -> Config {
        Config::new()
            .markers(self.markers.clone())
            .trace(self.trace)
            .format(self.format)
    }
}

/// Answers a request; failures are reported in the response, as protoc expects.
pub fn run(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let mut response = try_run(request).unwrap_or_else(|e| {
        log::error!("{}", e);
        CodeGeneratorResponse {
            error: Some(e.to_string()),
            ..Default::default()
        }
    });
    response.supported_features = Some(Feature::Proto3Optional as u64);
    response
}

pub fn try_run(request: &CodeGeneratorRequest) -> Result<CodeGeneratorResponse, PluginError> {
    let params = Parameters::parse(request.parameter.as_deref())?;
    let files = params
        .config()
        .generate(&request.proto_file, &request.file_to_generate)?;

    Ok(CodeGeneratorResponse {
        file: files
            .into_iter()
            .map(|f| File {
                name: Some(f.name),
                content: Some(f.content),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    })
}
