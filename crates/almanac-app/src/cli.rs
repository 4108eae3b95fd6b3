//! Command-line plumbing for the `almanac` binary.

use std::io::Read;

use almanac_core::config::RecurrenceConfig;
use almanac_service::materialize::Materializer;
use almanac_service::request::EventRequest;
use anyhow::{Context, Result};

/// Argument meaning "read the request from stdin".
pub const STDIN_ARG: &str = "-";

/// ## Summary
/// Reads the request document from `path`, or from stdin when `path` is
/// absent or `-`.
///
/// ## Errors
/// Returns an error if the file or stdin cannot be read.
pub fn read_request(path: Option<&str>) -> Result<String> {
    match path {
        None | Some(STDIN_ARG) => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read request from stdin")?;
            Ok(source)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request from {path}")),
    }
}

/// ## Summary
/// Materializes the JSON request in `source` and renders the result as
/// pretty-printed JSON.
///
/// ## Errors
/// Returns an error if the request is malformed, fails validation, or
/// exceeds the configured occurrence limit.
pub fn materialize_json(config: RecurrenceConfig, source: &str) -> Result<String> {
    let request = EventRequest::from_json(source)?;
    let mut materializer = Materializer::new(config)?;
    let event = materializer.materialize(&request)?;

    tracing::info!(
        event_id = %event.event_id,
        slots = event.slots.len(),
        summary = %event.summary,
        "Materialized request"
    );

    Ok(serde_json::to_string_pretty(&event)?)
}
