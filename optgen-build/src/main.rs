//! protoc-gen-rust-options
//!
//! Reads a `CodeGeneratorRequest` from stdin and writes a
//! `CodeGeneratorResponse` to stdout. Logs go to stderr.

use std::io::{self, Read, Write};

use anyhow::Context;
use optgen_build::plugin::{self, Parameters};
use prost::Message;
use prost_types::compiler::CodeGeneratorRequest;

fn main() -> anyhow::Result<()> {
    let mut buf = Vec::new();
    io::stdin()
        .read_to_end(&mut buf)
        .context("reading the request from stdin")?;
    let request = CodeGeneratorRequest::decode(buf.as_slice()).context("decoding the request")?;

    // Parameter errors are reported in the response; only the log level is taken from here.
    let trace = Parameters::parse(request.parameter.as_deref()).map_or(false, |p| p.trace);
    let level = if trace { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    let response = plugin::run(&request);

    let mut out = Vec::new();
    response.encode(&mut out).context("encoding the response")?;
    io::stdout()
        .write_all(&out)
        .context("writing the response to stdout")?;
    Ok(())
}
