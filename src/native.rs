//! NAPI bridge for the host build pipeline.
//!
//! The host pipeline hands this module directory paths and raw stylesheet
//! text; everything interesting happens in the Rust core. Enabled with the
//! `napi` feature.

use napi_derive::napi;

use crate::compose::{compose_output_tree, ComposeOptions};
use crate::parse::{parse_stylesheet, serialize_stylesheet};
use crate::registry::PodRegistry;
use crate::transform::transform_stylesheet;

/// Run one full build pass from `src_dir` into `dest_dir` with the default
/// bundle paths. Returns the build summary.
#[napi]
pub fn compose_output_tree_native(
    src_dir: String,
    dest_dir: String,
) -> napi::Result<serde_json::Value> {
    let options = ComposeOptions::new(src_dir, dest_dir);
    let summary =
        compose_output_tree(&options).map_err(|e| napi::Error::from_reason(e.to_string()))?;
    serde_json::to_value(summary).map_err(|e| napi::Error::from_reason(e.to_string()))
}

/// Transform a single pod stylesheet in isolation. Returns the rewritten
/// CSS text, the stylesheet IR, and the lookup entries it produced.
#[napi]
pub fn transform_pod_stylesheet_native(
    source: String,
    pod_name: String,
    file_name: String,
) -> napi::Result<serde_json::Value> {
    let mut registry = PodRegistry::new();
    let mut stylesheet = parse_stylesheet(&source, &pod_name, &file_name)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let pod_identifier = registry.ensure_pod_identifier(&pod_name).to_string();
    transform_stylesheet(
        &mut stylesheet,
        &pod_name,
        &file_name,
        &pod_identifier,
        &mut registry,
    )
    .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let lookup = registry
        .serialize()
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let lookup: serde_json::Value =
        serde_json::from_str(&lookup).map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let ir = serde_json::to_value(&stylesheet)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    Ok(serde_json::json!({
        "css": serialize_stylesheet(&stylesheet),
        "stylesheet": ir,
        "lookup": lookup,
    }))
}

/// Validate a single selector string against the pod selector grammar.
#[napi]
pub fn is_valid_selector_native(selector: String) -> bool {
    crate::validate::is_valid_selector(&selector)
}
