//! Class audits: utilities the current config does not generate (unknown),
//! utilities naming theme entries that do not exist (unregistered), and
//! utilities the installed major version has deprecated or renamed.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::FrameworkContext;
use crate::dissect::{build_class, dissect_class, ClassSyntax};
use crate::registry;

/// Classes that are syntactically well-formed but not generated by the
/// current config. Includes type errors (`mt-red-500`); custom component
/// classes from the entry point are not unknown.
pub fn unknown_classes(
    context: &FrameworkContext,
    syntax: ClassSyntax,
    classes: &[String],
) -> Vec<String> {
    classes
        .iter()
        .filter(|class| {
            let parts = dissect_class(context, syntax, class);
            if context.component_classes.contains(&parts.base) {
                return false;
            }
            registry::resolve_base(context, &parts.base, context.major).is_none()
        })
        .cloned()
        .collect()
}

/// Classes whose value token is absent from the theme entirely; distinct
/// from unknown, which also covers strings no utility accepts at all.
pub fn unregistered_classes(
    context: &FrameworkContext,
    syntax: ClassSyntax,
    classes: &[String],
) -> Vec<String> {
    classes
        .iter()
        .filter(|class| {
            let parts = dissect_class(context, syntax, class);
            matches!(
                registry::resolve_base(context, &parts.base, context.major),
                Some(resolved) if !resolved.registered
            )
        })
        .cloned()
        .collect()
}

/// A deprecated class and, when one exists, the utility replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprecatedClass {
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

struct DeprecationRule {
    pattern: &'static str,
    /// Replacement template with `$1`-style captures; `None` when the
    /// utility was removed without a direct successor.
    replacement: Option<&'static str>,
}

/// Utilities deprecated while v3 was current.
const LEGACY_DEPRECATIONS: &[DeprecationRule] = &[
    DeprecationRule { pattern: r"^flex-grow(-(.+))?$", replacement: Some("grow$1") },
    DeprecationRule { pattern: r"^flex-shrink(-(.+))?$", replacement: Some("shrink$1") },
    DeprecationRule { pattern: r"^overflow-ellipsis$", replacement: Some("text-ellipsis") },
    DeprecationRule { pattern: r"^decoration-slice$", replacement: Some("box-decoration-slice") },
    DeprecationRule { pattern: r"^decoration-clone$", replacement: Some("box-decoration-clone") },
];

/// Utilities removed or renamed by v4, including the v3 leftovers.
const MODERN_DEPRECATIONS: &[DeprecationRule] = &[
    DeprecationRule { pattern: r"^flex-grow(-(.+))?$", replacement: Some("grow$1") },
    DeprecationRule { pattern: r"^flex-shrink(-(.+))?$", replacement: Some("shrink$1") },
    DeprecationRule { pattern: r"^overflow-ellipsis$", replacement: Some("text-ellipsis") },
    DeprecationRule { pattern: r"^decoration-slice$", replacement: Some("box-decoration-slice") },
    DeprecationRule { pattern: r"^decoration-clone$", replacement: Some("box-decoration-clone") },
    DeprecationRule { pattern: r"^bg-opacity-\d+$", replacement: None },
    DeprecationRule { pattern: r"^text-opacity-\d+$", replacement: None },
    DeprecationRule { pattern: r"^border-opacity-\d+$", replacement: None },
    DeprecationRule { pattern: r"^divide-opacity-\d+$", replacement: None },
    DeprecationRule { pattern: r"^placeholder-opacity-\d+$", replacement: None },
    DeprecationRule { pattern: r"^shadow-sm$", replacement: Some("shadow-xs") },
    DeprecationRule { pattern: r"^blur-sm$", replacement: Some("blur-xs") },
    DeprecationRule { pattern: r"^rounded-sm$", replacement: Some("rounded-xs") },
    DeprecationRule { pattern: r"^outline-none$", replacement: Some("outline-hidden") },
    DeprecationRule { pattern: r"^ring$", replacement: Some("ring-3") },
];

fn compiled_rules(major: u64) -> &'static [(Regex, Option<&'static str>)] {
    static LEGACY: OnceLock<Vec<(Regex, Option<&'static str>)>> = OnceLock::new();
    static MODERN: OnceLock<Vec<(Regex, Option<&'static str>)>> = OnceLock::new();

    let compile = |rules: &'static [DeprecationRule]| {
        rules
            .iter()
            .filter_map(|rule| {
                Regex::new(rule.pattern)
                    .ok()
                    .map(|regex| (regex, rule.replacement))
            })
            .collect()
    };

    if major >= 4 {
        MODERN.get_or_init(|| compile(MODERN_DEPRECATIONS))
    } else {
        LEGACY.get_or_init(|| compile(LEGACY_DEPRECATIONS))
    }
}

/// Classes whose base matches the version's deprecation table. Replacements
/// keep the original variant chain and flags.
pub fn deprecated_classes(
    context: &FrameworkContext,
    syntax: ClassSyntax,
    classes: &[String],
) -> Vec<DeprecatedClass> {
    let rules = compiled_rules(context.major);

    classes
        .iter()
        .filter_map(|class| {
            let parts = dissect_class(context, syntax, class);
            for (regex, replacement) in rules {
                if !regex.is_match(&parts.base) {
                    continue;
                }
                let replacement = replacement.map(|template| {
                    let mut rebuilt = parts.clone();
                    rebuilt.base = regex.replace(&parts.base, template).into_owned();
                    build_class(syntax, &rebuilt)
                });
                return Some(DeprecatedClass {
                    class_name: class.clone(),
                    replacement,
                });
            }
            None
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(major: u64) -> FrameworkContext {
        FrameworkContext::with_defaults(major)
    }

    fn strings(classes: &[&str]) -> Vec<String> {
        classes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_unknown_classes() {
        let unknown = unknown_classes(
            &ctx(4),
            ClassSyntax::Modern,
            &strings(&["flex", "mt-red-500", "definitely-made-up", "bg-primary"]),
        );
        // bg-primary is color-shaped, so it is unregistered rather than unknown.
        assert_eq!(unknown, vec!["mt-red-500", "definitely-made-up"]);
    }

    #[test]
    fn test_component_classes_are_not_unknown() {
        let mut context = ctx(4);
        context.component_classes.push("card".to_string());
        let unknown = unknown_classes(&context, ClassSyntax::Modern, &strings(&["card", "chip"]));
        assert_eq!(unknown, vec!["chip"]);
    }

    #[test]
    fn test_unregistered_classes() {
        let unregistered = unregistered_classes(
            &ctx(4),
            ClassSyntax::Modern,
            &strings(&["bg-primary", "bg-red-500", "mt-2"]),
        );
        assert_eq!(unregistered, vec!["bg-primary"]);

        // The legacy spacing scale is a fixed list; step 33 is not on it.
        let unregistered = unregistered_classes(
            &ctx(3),
            ClassSyntax::Legacy,
            &strings(&["mt-33", "mt-8"]),
        );
        assert_eq!(unregistered, vec!["mt-33"]);
    }

    #[test]
    fn test_theme_extension_registers_token() {
        let mut context = ctx(4);
        context.colors.insert("primary".to_string(), "#1a73e8".to_string());
        let unregistered =
            unregistered_classes(&context, ClassSyntax::Modern, &strings(&["bg-primary"]));
        assert!(unregistered.is_empty());
    }

    #[test]
    fn test_deprecated_with_replacement() {
        let deprecated = deprecated_classes(
            &ctx(4),
            ClassSyntax::Modern,
            &strings(&["shadow-sm", "flex-grow-0", "flex"]),
        );
        assert_eq!(deprecated.len(), 2);
        assert_eq!(deprecated[0].class_name, "shadow-sm");
        assert_eq!(deprecated[0].replacement.as_deref(), Some("shadow-xs"));
        assert_eq!(deprecated[1].replacement.as_deref(), Some("grow-0"));
    }

    #[test]
    fn test_deprecated_without_replacement() {
        let deprecated =
            deprecated_classes(&ctx(4), ClassSyntax::Modern, &strings(&["bg-opacity-50"]));
        assert_eq!(deprecated.len(), 1);
        assert_eq!(deprecated[0].replacement, None);
    }

    #[test]
    fn test_deprecated_keeps_variants() {
        let deprecated = deprecated_classes(
            &ctx(4),
            ClassSyntax::Modern,
            &strings(&["hover:shadow-sm"]),
        );
        assert_eq!(deprecated[0].replacement.as_deref(), Some("hover:shadow-xs"));
    }

    #[test]
    fn test_legacy_table_is_narrower() {
        let deprecated = deprecated_classes(
            &ctx(3),
            ClassSyntax::Legacy,
            &strings(&["bg-opacity-50", "overflow-ellipsis"]),
        );
        // bg-opacity-* is still legal on v3.
        assert_eq!(deprecated.len(), 1);
        assert_eq!(deprecated[0].class_name, "overflow-ellipsis");
    }
}
