//! Class dissection: decompose a raw class string into structured parts
//! and reassemble parts back into a string. Total over all inputs: a
//! string the framework would never generate still dissects into a
//! pass-through structure instead of erroring.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::context::FrameworkContext;

/// How a version prints stacked variants.
///
/// The legacy syntax emits the split segments as encountered; the modern
/// syntax builds its variant chain innermost-first and reverses the stack
/// before emitting, so the printed order matches source order. These are
/// two deliberately separate behaviors, not one parameterized one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantPrinting {
    /// v3: segments are kept in the order they were split.
    SourceOrder,
    /// v4: the internal variant stack is reversed on emission.
    Reversed,
}

/// Where the important marker and prefix sit for a given major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassSyntax {
    /// v3: `variants:!tw--base`. Bang first, prefix glued to the base
    /// segment, important historically at the start.
    Legacy,
    /// v4: `tw:variants:base!`. Prefix is its own leading segment,
    /// important at the end.
    Modern,
}

impl ClassSyntax {
    pub fn variant_printing(self) -> VariantPrinting {
        match self {
            ClassSyntax::Legacy => VariantPrinting::SourceOrder,
            ClassSyntax::Modern => VariantPrinting::Reversed,
        }
    }
}

/// Structured decomposition of a single class string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DissectedClass {
    /// The original, undissected class string.
    pub class_name: String,
    pub prefix: String,
    pub separator: String,
    /// Variant chain in printed (source) order.
    pub variants: Vec<String>,
    pub base: String,
    pub negative: bool,
    /// `(at_start, at_end)` important-marker positions.
    pub important: (bool, bool),
}

/// Split at top-level separator occurrences. Bracketed and parenthesized
/// segments are atomic, so the `:` in `[&:hover]` is not a split point.
pub fn split_top_level<'a>(input: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return vec![input];
    }

    let bytes = input.as_bytes();
    let sep = separator.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'[' | b'(' => depth += 1,
            b']' | b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && bytes[i..].starts_with(sep) {
            segments.push(&input[start..i]);
            i += sep.len();
            start = i;
            continue;
        }
        i += 1;
    }
    segments.push(&input[start..]);
    segments
}

/// Dissect one class string against a context. Never fails.
pub fn dissect_class(context: &FrameworkContext, syntax: ClassSyntax, class: &str) -> DissectedClass {
    let separator = context.separator.as_str();
    let mut segments = split_top_level(class, separator);

    let mut prefix = String::new();
    if syntax == ClassSyntax::Modern
        && !context.prefix.is_empty()
        && segments.len() > 1
        && segments[0] == context.prefix
    {
        prefix = segments.remove(0).to_string();
    }

    // The last segment carries the base; everything before it is a variant.
    let base_segment = segments.pop().unwrap_or_default();

    let variants = match syntax.variant_printing() {
        VariantPrinting::SourceOrder => segments.iter().map(|s| s.to_string()).collect(),
        VariantPrinting::Reversed => {
            // Build the stack innermost-first, then reverse so the printed
            // order matches the source order.
            let mut stack: Vec<String> = segments.iter().rev().map(|s| s.to_string()).collect();
            stack.reverse();
            stack
        }
    };

    let mut rest = base_segment;
    let important_at_start = rest.starts_with('!');
    if important_at_start {
        rest = &rest[1..];
    }

    if syntax == ClassSyntax::Legacy && !context.prefix.is_empty() {
        if let Some(stripped) = rest.strip_prefix(context.prefix.as_str()) {
            prefix = context.prefix.clone();
            rest = stripped;
        }
    }

    let negative = rest.starts_with('-') && rest.len() > 1;
    if negative {
        rest = &rest[1..];
    }

    let important_at_end = rest.ends_with('!') && rest.len() > 1;
    if important_at_end {
        rest = &rest[..rest.len() - 1];
    }

    DissectedClass {
        class_name: class.to_string(),
        prefix,
        separator: separator.to_string(),
        variants,
        base: rest.to_string(),
        negative,
        important: (important_at_start, important_at_end),
    }
}

/// Dissect a batch, keyed by the original class strings.
pub fn dissect_classes(
    context: &FrameworkContext,
    syntax: ClassSyntax,
    classes: &[String],
) -> IndexMap<String, DissectedClass> {
    classes
        .iter()
        .map(|class| (class.clone(), dissect_class(context, syntax, class)))
        .collect()
}

/// Reassemble dissected parts into a class string; the inverse of
/// `dissect_class` for the same syntax.
pub fn build_class(syntax: ClassSyntax, parts: &DissectedClass) -> String {
    let separator = parts.separator.as_str();
    let mut segments: Vec<String> = Vec::new();

    let start = if parts.important.0 { "!" } else { "" };
    let end = if parts.important.1 { "!" } else { "" };
    let negative = if parts.negative { "-" } else { "" };

    match syntax {
        ClassSyntax::Modern => {
            if !parts.prefix.is_empty() {
                segments.push(parts.prefix.clone());
            }
            segments.extend(parts.variants.iter().cloned());
            segments.push(format!("{start}{negative}{}{end}", parts.base));
        }
        ClassSyntax::Legacy => {
            segments.extend(parts.variants.iter().cloned());
            segments.push(format!("{start}{}{negative}{}{end}", parts.prefix, parts.base));
        }
    }

    segments.retain(|segment| !segment.is_empty());
    segments.join(separator)
}
