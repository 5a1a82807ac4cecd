//! Output-tree composition.
//!
//! Drives one full build pass over a source tree: a validation pre-pass over
//! every pod stylesheet, selector rewriting into one concatenated buffer,
//! artifact persistence into a throwaway intermediate tree, and the merge
//! into the destination tree with the runtime fragment appended to the
//! bundles. The whole pass is synchronous; the first failure aborts it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::parse::{parse_stylesheet, serialize_stylesheet, Stylesheet};
use crate::registry::PodRegistry;
use crate::runtime::lookup_fragment;
use crate::transform::transform_stylesheet;
use crate::validate::{is_valid_selector, BuildError, CompilerError};

/// Concatenated scoped stylesheet artifact.
pub const POD_STYLES_FILE: &str = "pod-styles.css";
/// Lookup document artifact. Consumed into the runtime fragment during the
/// merge, never copied into the destination.
pub const POD_LOOKUP_FILE: &str = "pod-lookup.json";

const STYLESHEET_EXTENSION: &str = "css";

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS AND SUMMARY
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ComposeOptions {
    pub src_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Script bundle the runtime fragment is appended to, relative to the
    /// destination root.
    pub script_bundle: PathBuf,
    /// Stylesheet bundle the scoped styles are appended to, relative to the
    /// destination root.
    pub style_bundle: PathBuf,
}

impl ComposeOptions {
    pub fn new(src_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        ComposeOptions {
            src_dir: src_dir.into(),
            dest_dir: dest_dir.into(),
            script_bundle: PathBuf::from("assets/vendor.js"),
            style_bundle: PathBuf::from("assets/vendor.css"),
        }
    }

    /// A stylesheet is a pod stylesheet unless it is the destination style
    /// bundle itself, which is an append target and never a pod source.
    fn is_pod_stylesheet(&self, rel: &Path) -> bool {
        is_stylesheet(rel) && rel != self.style_bundle
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    pub stylesheets: u32,
    pub pods: u32,
    pub selectors: u32,
}

struct PodStylesheet {
    pod_name: String,
    file_name: String,
    stylesheet: Stylesheet,
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILD PASS
// ═══════════════════════════════════════════════════════════════════════════════

/// Run one build pass: validate, collect, persist, merge, finalize.
///
/// The registry is created here and dropped here, so repeated builds in one
/// process never share lookup state. The intermediate tree lives in a
/// temporary directory that is removed when this function returns.
pub fn compose_output_tree(options: &ComposeOptions) -> Result<BuildSummary, BuildError> {
    let mut sources = collect_stylesheets(options)?;
    // Dedicated validation pass: nothing is written anywhere until every
    // selector in every stylesheet has passed.
    validate_stylesheets(&sources)?;

    let mut registry = PodRegistry::new();
    let mut buffer = String::new();
    for sheet in &mut sources {
        let pod_identifier = registry.ensure_pod_identifier(&sheet.pod_name).to_string();
        transform_stylesheet(
            &mut sheet.stylesheet,
            &sheet.pod_name,
            &sheet.file_name,
            &pod_identifier,
            &mut registry,
        )?;
        buffer.push_str(&serialize_stylesheet(&sheet.stylesheet));
    }

    let intermediate = persist_artifacts(options, &buffer, &registry)?;
    let fragment = merge_into_destination(options, intermediate.path())?;
    finalize_bundles(options, &fragment, &buffer)?;

    let summary = BuildSummary {
        stylesheets: sources.len() as u32,
        pods: registry.pod_count() as u32,
        selectors: registry.selector_count() as u32,
    };
    tracing::debug!(
        stylesheets = summary.stylesheets,
        pods = summary.pods,
        selectors = summary.selectors,
        "composed scoped pod styles into destination tree"
    );
    Ok(summary)
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLECT AND VALIDATE
// ═══════════════════════════════════════════════════════════════════════════════

fn collect_stylesheets(options: &ComposeOptions) -> Result<Vec<PodStylesheet>, BuildError> {
    let mut sheets = Vec::new();
    for entry in sorted_walk(&options.src_dir) {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = match path.strip_prefix(&options.src_dir) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if !options.is_pod_stylesheet(rel) {
            continue;
        }
        let (pod_name, file_name) = split_pod_path(rel);
        let source = fs::read_to_string(path)?;
        let stylesheet = parse_stylesheet(&source, &pod_name, &file_name)?;
        tracing::debug!(pod = %pod_name, file = %file_name, "collected pod stylesheet");
        sheets.push(PodStylesheet {
            pod_name,
            file_name,
            stylesheet,
        });
    }
    Ok(sheets)
}

fn validate_stylesheets(sheets: &[PodStylesheet]) -> Result<(), CompilerError> {
    for sheet in sheets {
        for rule in &sheet.stylesheet.rules {
            for selector in &rule.selectors {
                if !is_valid_selector(selector) {
                    return Err(CompilerError::invalid_selector(
                        &sheet.pod_name,
                        &sheet.file_name,
                        selector,
                    ));
                }
            }
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// PERSIST, MERGE, FINALIZE
// ═══════════════════════════════════════════════════════════════════════════════

/// Build the intermediate tree: a pass-through view of the source tree plus
/// the two generated artifacts at its root. Pod stylesheets are consumed
/// into the concatenated buffer and do not appear individually downstream.
fn persist_artifacts(
    options: &ComposeOptions,
    buffer: &str,
    registry: &PodRegistry,
) -> Result<TempDir, BuildError> {
    let intermediate = TempDir::new()?;
    for entry in sorted_walk(&options.src_dir) {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        let rel = match path.strip_prefix(&options.src_dir) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = intermediate.path().join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if !options.is_pod_stylesheet(rel) {
            link_or_copy(path, &target)?;
        }
    }
    fs::write(intermediate.path().join(POD_STYLES_FILE), buffer)?;
    fs::write(
        intermediate.path().join(POD_LOOKUP_FILE),
        registry.serialize()?,
    )?;
    Ok(intermediate)
}

/// Mirror the intermediate tree into the destination and return the runtime
/// fragment synthesized from the lookup artifact.
fn merge_into_destination(
    options: &ComposeOptions,
    intermediate: &Path,
) -> Result<String, BuildError> {
    let mut fragment = String::new();
    fs::create_dir_all(&options.dest_dir)?;
    for entry in sorted_walk(intermediate) {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        let rel = match path.strip_prefix(intermediate) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = options.dest_dir.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if rel == Path::new(POD_LOOKUP_FILE) {
            let lookup = fs::read_to_string(path)?;
            fragment = lookup_fragment(&lookup);
            continue;
        }
        if rel == options.script_bundle || rel == options.style_bundle {
            // The finalize step appends to the bundles. Give them their own
            // storage so the append cannot write through a shared link into
            // the source tree.
            fs::copy(path, &target)?;
            continue;
        }
        link_or_copy(path, &target)?;
    }
    Ok(fragment)
}

fn finalize_bundles(
    options: &ComposeOptions,
    fragment: &str,
    styles: &str,
) -> Result<(), BuildError> {
    append_to(&options.dest_dir.join(&options.script_bundle), fragment)?;
    append_to(&options.dest_dir.join(&options.style_bundle), styles)?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILESYSTEM HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn sorted_walk(root: &Path) -> walkdir::IntoIter {
    WalkDir::new(root).sort_by_file_name().into_iter()
}

fn is_stylesheet(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => ext == STYLESHEET_EXTENSION,
        None => false,
    }
}

/// Pod name is the top-level path segment; the remainder names the file for
/// error messages. A stylesheet at the tree root falls back to its own name.
fn split_pod_path(rel: &Path) -> (String, String) {
    let rel_str: String = rel
        .iter()
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    match rel_str.split_once('/') {
        Some((pod, rest)) => (pod.to_string(), rest.to_string()),
        None => (rel_str.clone(), rel_str),
    }
}

/// Hard-link when the filesystem supports it, full copy otherwise.
fn link_or_copy(src: &Path, dest: &Path) -> io::Result<()> {
    if dest.exists() {
        fs::remove_file(dest)?;
    }
    if fs::hard_link(src, dest).is_ok() {
        return Ok(());
    }
    fs::copy(src, dest).map(|_| ())
}

fn append_to(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bundle_paths() {
        let options = ComposeOptions::new("src", "dest");
        assert_eq!(options.script_bundle, PathBuf::from("assets/vendor.js"));
        assert_eq!(options.style_bundle, PathBuf::from("assets/vendor.css"));
    }

    #[test]
    fn test_is_stylesheet_matches_suffix_only() {
        assert!(is_stylesheet(Path::new("card/styles.css")));
        assert!(!is_stylesheet(Path::new("card/styles.scss")));
        assert!(!is_stylesheet(Path::new("card/css")));
    }

    #[test]
    fn test_style_bundle_is_not_a_pod_stylesheet() {
        let options = ComposeOptions::new("src", "dest");
        assert!(options.is_pod_stylesheet(Path::new("card/styles.css")));
        assert!(!options.is_pod_stylesheet(Path::new("assets/vendor.css")));
    }

    #[test]
    fn test_split_pod_path() {
        assert_eq!(
            split_pod_path(Path::new("card/styles.css")),
            ("card".to_string(), "styles.css".to_string())
        );
        assert_eq!(
            split_pod_path(Path::new("card/ui/button.css")),
            ("card".to_string(), "ui/button.css".to_string())
        );
        assert_eq!(
            split_pod_path(Path::new("styles.css")),
            ("styles.css".to_string(), "styles.css".to_string())
        );
    }

    #[test]
    fn test_link_or_copy_replaces_existing_target() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, "fresh").unwrap();
        fs::write(&dest, "stale").unwrap();
        link_or_copy(&src, &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "fresh");
    }
}
