//! Runtime-fragment codegen.
//!
//! One self-contained script fragment is appended to the destination script
//! bundle per build. It installs the pod lookup document under a well-known
//! global and registers a component-resolution hook: the host framework runs
//! every registered hook after resolving a component by name, and this hook
//! appends the pod's generated class, if any, to the instance's class list.
//! Hooks are plain callbacks in a global list, so no framework prototype is
//! redefined.

/// Global holding the flat pod lookup document.
pub const LOOKUP_GLOBAL: &str = "POD_CSS_LOOKUP";

/// Global list of `(name, component)` callbacks the framework invokes after
/// resolving a component.
pub const HOOKS_GLOBAL: &str = "COMPONENT_RESOLUTION_HOOKS";

/// Build the injectable script fragment around a serialized lookup document.
pub fn lookup_fragment(lookup_json: &str) -> String {
    format!(
        "\n\n;(function(global) {{\n  \
         var lookup = global.{lookup} = {json};\n  \
         var hooks = global.{hooks} = global.{hooks} || [];\n  \
         hooks.push(function(name, component) {{\n    \
         var scoped = lookup[name];\n    \
         if (!scoped) {{ return; }}\n    \
         component.classNames = (component.classNames || []).concat(scoped);\n  \
         }});\n\
         }})(typeof globalThis !== 'undefined' ? globalThis : window);\n",
        lookup = LOOKUP_GLOBAL,
        hooks = HOOKS_GLOBAL,
        json = lookup_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_installs_lookup_under_global() {
        let fragment = lookup_fragment(r#"{"card":"card-1111"}"#);
        assert!(fragment.contains(r#"global.POD_CSS_LOOKUP = {"card":"card-1111"};"#));
    }

    #[test]
    fn test_fragment_registers_resolution_hook() {
        let fragment = lookup_fragment("{}");
        assert!(fragment.contains("global.COMPONENT_RESOLUTION_HOOKS = global.COMPONENT_RESOLUTION_HOOKS || []"));
        assert!(fragment.contains("hooks.push(function(name, component)"));
        assert!(fragment.contains("(component.classNames || []).concat(scoped)"));
    }

    #[test]
    fn test_fragment_is_append_safe() {
        // Appended after arbitrary bundle text, so it must open on its own
        // statement boundary.
        let fragment = lookup_fragment("{}");
        assert!(fragment.starts_with("\n\n;(function(global)"));
        assert!(fragment.ends_with(");\n"));
    }
}
