//! Canonicalization: collapse spellings the framework treats as equivalent
//! into one canonical output, recording every original that mapped to it.
//! Only the modern engine supports this; the legacy engine answers with
//! the identity mapping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::context::FrameworkContext;
use crate::dissect::{build_class, dissect_class, ClassSyntax};
use crate::registry::{self, Scale};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanonicalOptions {
    /// Collapse arbitrary values onto their theme step (`mt-[0.5rem]` -> `mt-2`).
    pub collapse: bool,
    /// Rewrite logical roots to their physical equivalents (`ms-2` -> `ml-2`).
    pub logical_to_physical: bool,
    /// Treat px lengths as convertible to rem when matching theme steps.
    pub rem: bool,
}

impl Default for CanonicalOptions {
    fn default() -> Self {
        Self {
            collapse: true,
            logical_to_physical: false,
            rem: false,
        }
    }
}

/// The canonical form of one original spelling, plus every original from
/// the same request that collapsed into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalGroup {
    pub input: Vec<String>,
    pub output: String,
}

pub type CanonicalClasses = IndexMap<String, CanonicalGroup>;

/// Identity mapping: each class canonicalizes to itself. The default for
/// versions without canonicalization support.
pub fn identity_canonical(classes: &[String]) -> CanonicalClasses {
    classes
        .iter()
        .map(|class| {
            (
                class.clone(),
                CanonicalGroup {
                    input: vec![class.clone()],
                    output: class.clone(),
                },
            )
        })
        .collect()
}

/// Modern canonicalization over a batch of classes.
pub fn canonical_classes(
    context: &FrameworkContext,
    syntax: ClassSyntax,
    classes: &[String],
    options: &CanonicalOptions,
) -> CanonicalClasses {
    let outputs: Vec<(String, String)> = classes
        .iter()
        .map(|class| (class.clone(), canonicalize_one(context, syntax, class, options)))
        .collect();

    let mut groups: CanonicalClasses = IndexMap::new();
    for (original, output) in &outputs {
        let input: Vec<String> = outputs
            .iter()
            .filter(|(_, other)| other == output)
            .map(|(original, _)| original.clone())
            .collect();
        groups.insert(
            original.clone(),
            CanonicalGroup {
                input,
                output: output.clone(),
            },
        );
    }
    groups
}

fn canonicalize_one(
    context: &FrameworkContext,
    syntax: ClassSyntax,
    class: &str,
    options: &CanonicalOptions,
) -> String {
    let mut parts = dissect_class(context, syntax, class);

    if options.logical_to_physical {
        parts.base = logical_to_physical(&parts.base);
    }

    if options.collapse {
        if let Some(collapsed) = collapse_arbitrary(context, &parts.base, options) {
            parts.base = collapsed;
        }
    }

    build_class(syntax, &parts)
}

const LOGICAL_ROOTS: &[(&str, &str)] = &[
    ("ms", "ml"),
    ("me", "mr"),
    ("ps", "pl"),
    ("pe", "pr"),
    ("start", "left"),
    ("end", "right"),
    ("text-start", "text-left"),
    ("text-end", "text-right"),
];

fn logical_to_physical(base: &str) -> String {
    let mut best: Option<(&str, &str)> = None;
    for (logical, physical) in LOGICAL_ROOTS {
        let matches = base == *logical
            || base
                .strip_prefix(logical)
                .is_some_and(|rest| rest.starts_with('-'));
        if matches && best.is_none_or(|(current, _)| logical.len() > current.len()) {
            best = Some((logical, physical));
        }
    }
    match best {
        Some((logical, physical)) => format!("{physical}{}", &base[logical.len()..]),
        None => base.to_string(),
    }
}

/// Collapse `root-[value]` onto `root-step` when the arbitrary value equals
/// a theme step. Returns `None` when no equivalent spelling exists.
fn collapse_arbitrary(
    context: &FrameworkContext,
    base: &str,
    options: &CanonicalOptions,
) -> Option<String> {
    let (_, spec, token) = registry::match_base(base, context.major)?;
    if !matches!(spec.scale, Scale::Spacing | Scale::Size) {
        return None;
    }
    let inner = registry::arbitrary_inner(token)?;
    let step_token = spacing_token_for(context, inner, options.rem)?;
    Some(format!("{}-{step_token}", spec.root))
}

/// The theme spacing token whose value equals this CSS length, if any.
fn spacing_token_for(context: &FrameworkContext, value: &str, rem: bool) -> Option<String> {
    // Theme extensions match on the exact value text.
    for (token, extension) in &context.spacing {
        if extension == value {
            return Some(token.clone());
        }
    }

    let (amount, unit) = parse_length(value)?;
    let rems = match unit {
        LengthUnit::Rem => amount,
        LengthUnit::Px if amount == 0.0 => 0.0,
        LengthUnit::Px if amount == 1.0 => return Some("px".to_string()),
        LengthUnit::Px => {
            if !rem {
                return None;
            }
            amount / 16.0
        }
        LengthUnit::Bare if amount == 0.0 => 0.0,
        LengthUnit::Bare => return None,
    };

    // Scale tokens are the length in quarter-rems, at quarter-step
    // granularity (`2` -> 0.5rem, `2.5` -> 0.625rem).
    let token = rems * 4.0;
    if !(0.0..=96.0).contains(&token) || (token * 4.0).fract() != 0.0 {
        return None;
    }
    if token.fract() == 0.0 {
        Some(format!("{}", token as u64))
    } else {
        Some(format!("{token}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthUnit {
    Px,
    Rem,
    Bare,
}

fn parse_length(value: &str) -> Option<(f64, LengthUnit)> {
    if let Some(number) = value.strip_suffix("rem") {
        return number.trim().parse().ok().map(|n| (n, LengthUnit::Rem));
    }
    if let Some(number) = value.strip_suffix("px") {
        return number.trim().parse().ok().map(|n| (n, LengthUnit::Px));
    }
    value.trim().parse().ok().map(|n| (n, LengthUnit::Bare))
}
