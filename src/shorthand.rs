//! Shorthand detection: groups of classes that set complementary sides of
//! one property and share a value, collapsible into a single utility.

use serde::{Deserialize, Serialize};

use crate::context::FrameworkContext;
use crate::dissect::{build_class, dissect_class, ClassSyntax, DissectedClass};
use crate::registry;

struct ShorthandRule {
    members: &'static [&'static str],
    shorthand: &'static str,
    since_major: u64,
}

const fn rule(members: &'static [&'static str], shorthand: &'static str) -> ShorthandRule {
    ShorthandRule {
        members,
        shorthand,
        since_major: 3,
    }
}

const RULES: &[ShorthandRule] = &[
    rule(&["mt", "mb"], "my"),
    rule(&["ml", "mr"], "mx"),
    rule(&["mx", "my"], "m"),
    rule(&["pt", "pb"], "py"),
    rule(&["pl", "pr"], "px"),
    rule(&["px", "py"], "p"),
    rule(&["top", "bottom"], "inset-y"),
    rule(&["left", "right"], "inset-x"),
    rule(&["inset-x", "inset-y"], "inset"),
    rule(&["gap-x", "gap-y"], "gap"),
    rule(&["overflow-x", "overflow-y"], "overflow"),
    rule(&["scale-x", "scale-y"], "scale"),
    ShorthandRule {
        members: &["w", "h"],
        shorthand: "size",
        since_major: 4,
    },
];

/// A collapsible group: the original classes and the shorthand replacing
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShorthandGroup {
    pub classes: Vec<String>,
    pub shorthand: String,
}

/// Find groups of input classes collapsible into one shorthand. Classes
/// only group when their variant chain, value token, and flags all agree.
pub fn shorthand_classes(
    context: &FrameworkContext,
    syntax: ClassSyntax,
    classes: &[String],
) -> Vec<ShorthandGroup> {
    let dissected: Vec<DissectedClass> = classes
        .iter()
        .map(|class| dissect_class(context, syntax, class))
        .collect();

    let mut groups = Vec::new();
    for rule in RULES {
        if rule.since_major > context.major {
            continue;
        }
        // Match each member root to an input class with the same shape.
        let mut matched: Vec<&DissectedClass> = Vec::new();
        for member in rule.members {
            let found = dissected.iter().find(|parts| {
                root_token(&parts.base)
                    .is_some_and(|(root, _)| root == *member)
                    && same_shape(parts, matched.first().copied())
            });
            match found {
                Some(parts) => matched.push(parts),
                None => break,
            }
        }
        if matched.len() != rule.members.len() {
            continue;
        }

        // All members must carry the same value token.
        let tokens: Vec<Option<&str>> = matched
            .iter()
            .map(|parts| root_token(&parts.base).map(|(_, token)| token))
            .collect();
        let first_token = tokens[0];
        if !tokens.iter().all(|token| *token == first_token) {
            continue;
        }

        let mut rebuilt = matched[0].clone();
        rebuilt.base = match first_token {
            Some(token) if !token.is_empty() => format!("{}-{token}", rule.shorthand),
            _ => rule.shorthand.to_string(),
        };
        groups.push(ShorthandGroup {
            classes: matched.iter().map(|parts| parts.class_name.clone()).collect(),
            shorthand: build_class(syntax, &rebuilt),
        });
    }

    groups
}

fn root_token(base: &str) -> Option<(&'static str, &str)> {
    registry::match_base(base, u64::MAX).map(|(_, spec, token)| (spec.root, token))
}

fn same_shape(parts: &DissectedClass, reference: Option<&DissectedClass>) -> bool {
    match reference {
        None => true,
        Some(reference) => {
            parts.variants == reference.variants
                && parts.prefix == reference.prefix
                && parts.negative == reference.negative
                && parts.important == reference.important
        }
    }
}
