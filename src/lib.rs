//! # Pod CSS Compiler Core
//!
//! Native scoping engine for component ("pod") stylesheets. Every class
//! declared inside a pod's stylesheet is rewritten to a globally-unique
//! generated class, and a lookup table mapping pods and authored selectors
//! to generated names is injected into the output bundle as a runtime
//! fragment, so identically-named classes in different pods can never
//! collide.
//!
//! ## Scoping Invariants
//!
//! 1. **Restricted grammar**: a selector part is `&`, `>`, or a `.class`
//!    reference. Anything else aborts the build before output is written.
//! 2. **Single pod identifier**: a pod gets at most one generated identifier
//!    per build pass, and `&` always substitutes to `.` plus that
//!    identifier.
//! 3. **Stable keys, fresh tokens**: lookup keys (bare pod name, pod name +
//!    authored selector) are stable across builds of an unchanged tree;
//!    the generated values they map to are random per run. Uniqueness of
//!    tokens is statistical, never checked.
//! 4. **Deterministic order**: trees are walked in sorted order, so
//!    stylesheet concatenation and lookup population order are reproducible
//!    for a fixed input tree.
//! 5. **Per-build registry**: the lookup accumulator is created fresh for
//!    every compose call and never shared across builds.
//! 6. **Hooked resolution, not patched**: the runtime fragment registers a
//!    post-resolution callback in a global hook list; it never redefines a
//!    framework method.

mod compose;
mod guid;
mod parse;
mod registry;
mod runtime;
mod transform;
mod validate;

#[cfg(feature = "napi")]
mod native;


pub use compose::{
    compose_output_tree, BuildSummary, ComposeOptions, POD_LOOKUP_FILE, POD_STYLES_FILE,
};
pub use guid::{pod_identifier, token};
pub use parse::{parse_stylesheet, serialize_stylesheet, Declaration, StyleRule, Stylesheet};
pub use registry::PodRegistry;
pub use runtime::{lookup_fragment, HOOKS_GLOBAL, LOOKUP_GLOBAL};
pub use transform::transform_stylesheet;
pub use validate::{
    is_valid_selector, BuildError, CompilerError, ERR_INVALID_SELECTOR, ERR_MALFORMED_STYLESHEET,
};

#[cfg(feature = "napi")]
pub use native::*;
