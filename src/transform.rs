//! Selector rewriting for pod stylesheets.
//!
//! Rewrites every selector of a parsed stylesheet in place. Class parts are
//! replaced with generated globally-unique classes registered in the
//! [`PodRegistry`]; the self-reference marker `&` substitutes to the pod's
//! own identifier. Declarations are never inspected or altered.

use lazy_static::lazy_static;
use regex::{NoExpand, Regex};

use crate::guid;
use crate::parse::Stylesheet;
use crate::registry::PodRegistry;
use crate::validate::{is_valid_selector, CompilerError};

lazy_static! {
    static ref AMPERSAND: Regex = Regex::new("&").unwrap();
}

/// Rewrite all selectors of `stylesheet` for the given pod, registering the
/// generated class names as a side effect. The first invalid selector aborts
/// with an error naming the pod, file, and literal selector text.
pub fn transform_stylesheet(
    stylesheet: &mut Stylesheet,
    pod_name: &str,
    file_name: &str,
    pod_identifier: &str,
    registry: &mut PodRegistry,
) -> Result<(), CompilerError> {
    for rule in &mut stylesheet.rules {
        for selector in &mut rule.selectors {
            if !is_valid_selector(selector) {
                return Err(CompilerError::invalid_selector(
                    pod_name, file_name, selector,
                ));
            }
            *selector = rewrite_selector(selector, pod_name, pod_identifier, registry);
        }
    }
    Ok(())
}

fn rewrite_selector(
    selector: &str,
    pod_name: &str,
    pod_identifier: &str,
    registry: &mut PodRegistry,
) -> String {
    if AMPERSAND.is_match(selector) {
        // Self-reference: only the first marker is substituted, the rest of
        // the selector text passes through untouched. No selector-level
        // lookup entry is recorded for these rules.
        let replacement = format!(".{}", pod_identifier);
        return AMPERSAND
            .replace(selector, NoExpand(&replacement))
            .into_owned();
    }

    // Pure class/descendant selector: each class part is renamed through the
    // registry, child combinators keep their position.
    let parts: Vec<String> = selector
        .split_whitespace()
        .map(|part| {
            if part == ">" {
                part.to_string()
            } else {
                format!(".{}", scoped_class(pod_name, part, registry))
            }
        })
        .collect();
    parts.join(" ")
}

/// The generated class for one authored class part, created on first use of
/// the `pod + selector` key and reused for every later occurrence within the
/// build.
fn scoped_class(pod_name: &str, selector_part: &str, registry: &mut PodRegistry) -> String {
    if let Some(existing) = registry.selector_mapping(pod_name, selector_part) {
        return existing.to_string();
    }
    let cleaned = selector_part.strip_prefix('.').unwrap_or(selector_part);
    let class_name = format!("{}-{}-{}", pod_name, cleaned, guid::token());
    registry.record_selector_mapping(pod_name, selector_part, &class_name);
    class_name
}
