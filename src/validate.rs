//! Selector validation and the build error surface.
//!
//! Pod stylesheets are restricted to a deliberately small selector grammar:
//! every whitespace-separated part of a selector must be the self-reference
//! marker `&`, the child combinator `>`, or a class reference starting with
//! `.`. Anything else aborts the build before output is written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_INVALID_SELECTOR: &str = "POD-ERR-SELECTOR";
pub const ERR_MALFORMED_STYLESHEET: &str = "POD-ERR-PARSE";

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_INVALID_SELECTOR => {
            "Only class-based selectors (`.foo`), `&`, or `>` can be used inside of component styles."
        }
        ERR_MALFORMED_STYLESHEET => {
            "Every pod stylesheet parses as a flat list of `selector { property: value; }` rules."
        }
        _ => "Unknown guarantee.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// A fatal compilation failure tied to one pod stylesheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerError {
    pub code: String,
    pub message: String,
    pub guarantee: String,
    pub pod: String,
    pub file: String,
    pub context: Option<String>,
}

impl CompilerError {
    pub fn new(code: &str, message: &str, pod: &str, file: &str, context: Option<String>) -> Self {
        CompilerError {
            code: code.to_string(),
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            pod: pod.to_string(),
            file: file.to_string(),
            context,
        }
    }

    pub fn invalid_selector(pod: &str, file: &str, selector: &str) -> Self {
        Self::new(
            ERR_INVALID_SELECTOR,
            &format!("Invalid selector specified in {}/{}: {}", pod, file, selector),
            pod,
            file,
            Some(selector.to_string()),
        )
    }

    pub fn malformed_stylesheet(pod: &str, file: &str, detail: &str) -> Self {
        Self::new(
            ERR_MALFORMED_STYLESHEET,
            &format!("Malformed stylesheet in {}/{}: {}", pod, file, detail),
            pod,
            file,
            Some(detail.to_string()),
        )
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.message, self.guarantee)
    }
}

impl std::error::Error for CompilerError {}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILD ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Failure surface of one build pass. All variants are fail-fast: there is no
/// partial-success mode, and filesystem errors are passed through unmodified.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{0}")]
    Invalid(#[from] CompilerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to serialize pod lookup: {0}")]
    Lookup(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════════════════════════════════════════
// SELECTOR VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// A selector is valid iff every whitespace-separated part is exactly `&`,
/// exactly `>`, or begins with `.`. There is no partial validity: one bad
/// part invalidates the whole selector.
pub fn is_valid_selector(selector: &str) -> bool {
    if selector.trim().is_empty() {
        return false;
    }
    selector
        .split_whitespace()
        .all(|part| part == "&" || part == ">" || part.starts_with('.'))
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
