//! Class order and same-property conflict resolution, computed against the
//! utility registry and the active framework context.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::context::FrameworkContext;
use crate::dissect::{dissect_class, ClassSyntax};
use crate::registry;

/// One `(class, order)` pair; serialized as a two-element array. `None`
/// means the framework does not recognize the class; consumers must sort
/// those after all known classes, preserving their relative input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassOrderEntry(pub String, pub Option<u64>);

/// One side of a same-property collision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// The other class setting the same property.
    pub class_name: String,
    pub css_property_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_property_value: Option<String>,
    pub important: bool,
}

pub type ConflictingClasses = IndexMap<String, Vec<Conflict>>;

/// Total order keys for a batch of classes. Every input gets an entry;
/// order keys are spaced out so callers can interleave derived keys.
pub fn class_order(
    context: &FrameworkContext,
    syntax: ClassSyntax,
    classes: &[String],
) -> Vec<ClassOrderEntry> {
    classes
        .iter()
        .map(|class| {
            let parts = dissect_class(context, syntax, class);
            let order = registry::resolve_base(context, &parts.base, context.major)
                .filter(|resolved| resolved.registered)
                .map(|resolved| {
                    // Variant-carrying classes sort after their bare utility.
                    (resolved.order + 1) * 100 + (parts.variants.len() as u64).min(99)
                });
            ClassOrderEntry(class.clone(), order)
        })
        .collect()
}

/// Classes that resolve CSS setting the same property, grouped per input
/// class. Both directions are populated whenever both classes appear in
/// the request, so the relation is discoverable from either side.
pub fn conflicting_classes(
    context: &FrameworkContext,
    syntax: ClassSyntax,
    classes: &[String],
) -> ConflictingClasses {
    struct Candidate {
        class: String,
        scope: (String, Vec<String>),
        properties: &'static [&'static str],
        value: Option<String>,
        important: bool,
    }

    let candidates: Vec<Candidate> = classes
        .iter()
        .filter_map(|class| {
            let parts = dissect_class(context, syntax, class);
            let resolved = registry::resolve_base(context, &parts.base, context.major)?;
            if !resolved.registered {
                return None;
            }
            Some(Candidate {
                class: class.clone(),
                // Conflicts only arise inside the same variant chain.
                scope: (parts.prefix.clone(), parts.variants.clone()),
                properties: resolved.properties,
                value: resolved.value,
                important: parts.important.0 || parts.important.1,
            })
        })
        .collect();

    let mut conflicts: ConflictingClasses = IndexMap::new();
    for (i, a) in candidates.iter().enumerate() {
        for b in candidates.iter().skip(i + 1) {
            if a.class == b.class || a.scope != b.scope {
                continue;
            }
            for property in a.properties {
                if !b.properties.contains(property) {
                    continue;
                }
                conflicts.entry(a.class.clone()).or_default().push(Conflict {
                    class_name: b.class.clone(),
                    css_property_name: property.to_string(),
                    css_property_value: b.value.clone(),
                    important: b.important,
                });
                conflicts.entry(b.class.clone()).or_default().push(Conflict {
                    class_name: a.class.clone(),
                    css_property_name: property.to_string(),
                    css_property_value: a.value.clone(),
                    important: a.important,
                });
            }
        }
    }

    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FrameworkContext {
        FrameworkContext::with_defaults(4)
    }

    fn strings(classes: &[&str]) -> Vec<String> {
        classes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_order_totality() {
        let entries = class_order(
            &ctx(),
            ClassSyntax::Modern,
            &strings(&["flex", "hidden", "unknown-class-xyz"]),
        );

        assert_eq!(entries.len(), 3);
        let flex = entries[0].1.unwrap();
        let hidden = entries[1].1.unwrap();
        assert!(flex < hidden, "flex must precede hidden in utility order");
        assert_eq!(entries[2].1, None);
    }

    #[test]
    fn test_variants_sort_after_bare_utility() {
        let entries = class_order(&ctx(), ClassSyntax::Modern, &strings(&["flex", "hover:flex"]));
        assert!(entries[0].1.unwrap() < entries[1].1.unwrap());
    }

    #[test]
    fn test_unregistered_classes_have_no_order() {
        let entries = class_order(&ctx(), ClassSyntax::Modern, &strings(&["bg-primary"]));
        assert_eq!(entries[0].1, None);
    }

    #[test]
    fn test_same_property_conflict() {
        let conflicts = conflicting_classes(
            &ctx(),
            ClassSyntax::Modern,
            &strings(&["mt-2", "mt-4", "mb-1"]),
        );

        let mt2 = &conflicts["mt-2"];
        assert_eq!(mt2.len(), 1);
        assert_eq!(mt2[0].class_name, "mt-4");
        assert_eq!(mt2[0].css_property_name, "margin-top");
        assert_eq!(mt2[0].css_property_value.as_deref(), Some("1rem"));

        // Discoverable from the other side too.
        assert_eq!(conflicts["mt-4"][0].class_name, "mt-2");
        assert!(!conflicts.contains_key("mb-1"));
    }

    #[test]
    fn test_shorthand_overlap_conflicts() {
        let conflicts = conflicting_classes(
            &ctx(),
            ClassSyntax::Modern,
            &strings(&["mx-2", "ml-4"]),
        );
        assert_eq!(conflicts["mx-2"][0].css_property_name, "margin-left");
        assert_eq!(conflicts["ml-4"][0].css_property_name, "margin-left");
    }

    #[test]
    fn test_conflicts_respect_variant_scope() {
        let conflicts = conflicting_classes(
            &ctx(),
            ClassSyntax::Modern,
            &strings(&["mt-2", "hover:mt-4"]),
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_important_recorded_on_conflict() {
        let conflicts = conflicting_classes(
            &ctx(),
            ClassSyntax::Modern,
            &strings(&["mt-2", "mt-4!"]),
        );
        // The entry under mt-2 describes mt-4!, which is important.
        assert!(conflicts["mt-2"][0].important);
        assert!(!conflicts["mt-4!"][0].important);
    }

    #[test]
    fn test_display_utilities_conflict() {
        let conflicts = conflicting_classes(
            &ctx(),
            ClassSyntax::Modern,
            &strings(&["flex", "hidden"]),
        );
        assert_eq!(conflicts["flex"][0].css_property_name, "display");
    }
}
