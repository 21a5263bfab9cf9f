//! Static utility registry: the precedence table the fact engines resolve
//! classes against.
//!
//! Each entry maps a utility root to the CSS properties it sets and to its
//! position in the framework's utility order. Entries are matched
//! longest-root-first, so `inset-x-2` resolves to `inset-x` rather than
//! `inset`. Roots that accept several value kinds (`text-lg` vs
//! `text-red-500`) appear once per kind; the first entry whose scale
//! accepts the value token wins.

use crate::context::FrameworkContext;

/// How the value token of a utility is validated and resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// No value token at all (`flex`, `hidden`).
    Bare,
    /// Theme spacing steps, `px`, and arbitrary lengths (`mt-2`, `mt-[4px]`).
    Spacing,
    /// Spacing plus sizing keywords and fractions (`w-1/2`, `w-full`).
    Size,
    /// Theme palette entries and arbitrary color values.
    Color,
    /// Font size steps (`text-lg`).
    FontSize,
    /// Font weight names (`font-bold`).
    FontWeight,
    /// Plain numeric steps (`z-10`, `order-2`, `opacity-50`).
    Number,
    /// A fixed keyword list (`rounded-lg`, `shadow-md`).
    Named(&'static [&'static str]),
}

/// One row of the precedence table.
pub struct UtilitySpec {
    pub root: &'static str,
    pub scale: Scale,
    pub properties: &'static [&'static str],
    /// First major version that generates this utility.
    pub since_major: u64,
}

const fn u(root: &'static str, scale: Scale, properties: &'static [&'static str]) -> UtilitySpec {
    UtilitySpec {
        root,
        scale,
        properties,
        since_major: 3,
    }
}

const fn u4(root: &'static str, scale: Scale, properties: &'static [&'static str]) -> UtilitySpec {
    UtilitySpec {
        root,
        scale,
        properties,
        since_major: 4,
    }
}

const RADIUS: &[&str] = &["none", "sm", "md", "lg", "xl", "2xl", "3xl", "full"];
const SHADOW: &[&str] = &["none", "sm", "md", "lg", "xl", "2xl", "inner"];
const BLUR: &[&str] = &["none", "sm", "md", "lg", "xl", "2xl", "3xl"];
const OVERFLOW: &[&str] = &["auto", "hidden", "clip", "visible", "scroll"];
const LINE_HEIGHT: &[&str] = &["none", "tight", "snug", "normal", "relaxed", "loose"];
const TRACKING: &[&str] = &["tighter", "tight", "normal", "wide", "wider", "widest"];

/// The utility precedence table. Index order is the framework's declared
/// utility order; `class_order` keys derive from it.
pub static UTILITIES: &[UtilitySpec] = &[
    u("container", Scale::Bare, &["max-width"]),
    // Position
    u("static", Scale::Bare, &["position"]),
    u("fixed", Scale::Bare, &["position"]),
    u("absolute", Scale::Bare, &["position"]),
    u("relative", Scale::Bare, &["position"]),
    u("sticky", Scale::Bare, &["position"]),
    u("inset-x", Scale::Spacing, &["left", "right"]),
    u("inset-y", Scale::Spacing, &["top", "bottom"]),
    u("inset", Scale::Spacing, &["top", "right", "bottom", "left"]),
    u("top", Scale::Spacing, &["top"]),
    u("right", Scale::Spacing, &["right"]),
    u("bottom", Scale::Spacing, &["bottom"]),
    u("left", Scale::Spacing, &["left"]),
    u("z", Scale::Number, &["z-index"]),
    // Layout
    u("order", Scale::Number, &["order"]),
    u("col-span", Scale::Number, &["grid-column"]),
    u("col-start", Scale::Number, &["grid-column-start"]),
    u("col-end", Scale::Number, &["grid-column-end"]),
    u("row-span", Scale::Number, &["grid-row"]),
    u("row-start", Scale::Number, &["grid-row-start"]),
    u("row-end", Scale::Number, &["grid-row-end"]),
    u("float", Scale::Named(&["left", "right", "none", "start", "end"]), &["float"]),
    u("clear", Scale::Named(&["left", "right", "both", "none", "start", "end"]), &["clear"]),
    // Margin before display, as the framework sorts box-model utilities first
    u("m", Scale::Spacing, &["margin"]),
    u("mx", Scale::Spacing, &["margin-left", "margin-right"]),
    u("my", Scale::Spacing, &["margin-top", "margin-bottom"]),
    u4("ms", Scale::Spacing, &["margin-inline-start"]),
    u4("me", Scale::Spacing, &["margin-inline-end"]),
    u("mt", Scale::Spacing, &["margin-top"]),
    u("mr", Scale::Spacing, &["margin-right"]),
    u("mb", Scale::Spacing, &["margin-bottom"]),
    u("ml", Scale::Spacing, &["margin-left"]),
    // Display
    u("block", Scale::Bare, &["display"]),
    u("inline-block", Scale::Bare, &["display"]),
    u("inline-flex", Scale::Bare, &["display"]),
    u("inline-grid", Scale::Bare, &["display"]),
    u("inline", Scale::Bare, &["display"]),
    u("flex", Scale::Bare, &["display"]),
    u("grid", Scale::Bare, &["display"]),
    u("contents", Scale::Bare, &["display"]),
    u("table", Scale::Bare, &["display"]),
    u("hidden", Scale::Bare, &["display"]),
    u("visible", Scale::Bare, &["visibility"]),
    u("invisible", Scale::Bare, &["visibility"]),
    u("collapse", Scale::Bare, &["visibility"]),
    // Sizing
    u("aspect", Scale::Named(&["auto", "square", "video"]), &["aspect-ratio"]),
    u4("size", Scale::Size, &["width", "height"]),
    u("w", Scale::Size, &["width"]),
    u("min-w", Scale::Size, &["min-width"]),
    u("max-w", Scale::Size, &["max-width"]),
    u("h", Scale::Size, &["height"]),
    u("min-h", Scale::Size, &["min-height"]),
    u("max-h", Scale::Size, &["max-height"]),
    // Flexbox and grid
    u("basis", Scale::Size, &["flex-basis"]),
    u("flex-row-reverse", Scale::Bare, &["flex-direction"]),
    u("flex-row", Scale::Bare, &["flex-direction"]),
    u("flex-col-reverse", Scale::Bare, &["flex-direction"]),
    u("flex-col", Scale::Bare, &["flex-direction"]),
    u("flex-wrap-reverse", Scale::Bare, &["flex-wrap"]),
    u("flex-wrap", Scale::Bare, &["flex-wrap"]),
    u("flex-nowrap", Scale::Bare, &["flex-wrap"]),
    u("flex", Scale::Named(&["1", "auto", "initial", "none"]), &["flex"]),
    u("grow", Scale::Number, &["flex-grow"]),
    u("grow", Scale::Bare, &["flex-grow"]),
    u("shrink", Scale::Number, &["flex-shrink"]),
    u("shrink", Scale::Bare, &["flex-shrink"]),
    u("grid-cols", Scale::Number, &["grid-template-columns"]),
    u("grid-rows", Scale::Number, &["grid-template-rows"]),
    u("gap-x", Scale::Spacing, &["column-gap"]),
    u("gap-y", Scale::Spacing, &["row-gap"]),
    u("gap", Scale::Spacing, &["gap"]),
    u(
        "justify",
        Scale::Named(&["start", "end", "center", "between", "around", "evenly", "stretch", "normal"]),
        &["justify-content"],
    ),
    u(
        "items",
        Scale::Named(&["start", "end", "center", "baseline", "stretch"]),
        &["align-items"],
    ),
    u(
        "content",
        Scale::Named(&["start", "end", "center", "between", "around", "evenly", "stretch", "normal", "none"]),
        &["align-content"],
    ),
    u(
        "self",
        Scale::Named(&["auto", "start", "end", "center", "stretch", "baseline"]),
        &["align-self"],
    ),
    u("space-x", Scale::Spacing, &["--tw-space-x"]),
    u("space-y", Scale::Spacing, &["--tw-space-y"]),
    // Overflow
    u("overflow-x", Scale::Named(OVERFLOW), &["overflow-x"]),
    u("overflow-y", Scale::Named(OVERFLOW), &["overflow-y"]),
    u("overflow", Scale::Named(OVERFLOW), &["overflow"]),
    u("truncate", Scale::Bare, &["overflow", "text-overflow", "white-space"]),
    u("text-ellipsis", Scale::Bare, &["text-overflow"]),
    u("text-clip", Scale::Bare, &["text-overflow"]),
    // Borders
    u("rounded-t", Scale::Named(RADIUS), &["border-top-left-radius", "border-top-right-radius"]),
    u("rounded-b", Scale::Named(RADIUS), &["border-bottom-left-radius", "border-bottom-right-radius"]),
    u("rounded-l", Scale::Named(RADIUS), &["border-top-left-radius", "border-bottom-left-radius"]),
    u("rounded-r", Scale::Named(RADIUS), &["border-top-right-radius", "border-bottom-right-radius"]),
    u("rounded", Scale::Named(RADIUS), &["border-radius"]),
    u("rounded", Scale::Bare, &["border-radius"]),
    u4("rounded", Scale::Named(&["xs"]), &["border-radius"]),
    u("border-x", Scale::Number, &["border-left-width", "border-right-width"]),
    u("border-y", Scale::Number, &["border-top-width", "border-bottom-width"]),
    u("border-t", Scale::Number, &["border-top-width"]),
    u("border-r", Scale::Number, &["border-right-width"]),
    u("border-b", Scale::Number, &["border-bottom-width"]),
    u("border-l", Scale::Number, &["border-left-width"]),
    u("border", Scale::Color, &["border-color"]),
    u("border", Scale::Number, &["border-width"]),
    u("border", Scale::Bare, &["border-width"]),
    u("divide-x", Scale::Number, &["--tw-divide-x-width"]),
    u("divide-y", Scale::Number, &["--tw-divide-y-width"]),
    u("divide", Scale::Color, &["--tw-divide-color"]),
    u("ring-offset", Scale::Number, &["--tw-ring-offset-width"]),
    u("ring", Scale::Color, &["--tw-ring-color"]),
    u("ring", Scale::Number, &["--tw-ring-width"]),
    u("ring", Scale::Bare, &["--tw-ring-width"]),
    u("outline-offset", Scale::Number, &["outline-offset"]),
    u("outline", Scale::Color, &["outline-color"]),
    u("outline", Scale::Number, &["outline-width"]),
    u("outline", Scale::Bare, &["outline-style"]),
    u("outline-none", Scale::Bare, &["outline"]),
    u4("outline-hidden", Scale::Bare, &["outline"]),
    // Backgrounds
    u(
        "bg-gradient-to",
        Scale::Named(&["t", "tr", "r", "br", "b", "bl", "l", "tl"]),
        &["background-image"],
    ),
    u("bg", Scale::Color, &["background-color"]),
    u(
        "bg",
        Scale::Named(&["auto", "cover", "contain", "fixed", "local", "scroll", "center", "top", "bottom", "left", "right", "repeat", "no-repeat"]),
        &["background-position"],
    ),
    u("from", Scale::Color, &["--tw-gradient-from"]),
    u("via", Scale::Color, &["--tw-gradient-via"]),
    u("to", Scale::Color, &["--tw-gradient-to"]),
    // Padding
    u("p", Scale::Spacing, &["padding"]),
    u("px", Scale::Spacing, &["padding-left", "padding-right"]),
    u("py", Scale::Spacing, &["padding-top", "padding-bottom"]),
    u4("ps", Scale::Spacing, &["padding-inline-start"]),
    u4("pe", Scale::Spacing, &["padding-inline-end"]),
    u("pt", Scale::Spacing, &["padding-top"]),
    u("pr", Scale::Spacing, &["padding-right"]),
    u("pb", Scale::Spacing, &["padding-bottom"]),
    u("pl", Scale::Spacing, &["padding-left"]),
    // Typography
    u("text-left", Scale::Bare, &["text-align"]),
    u("text-center", Scale::Bare, &["text-align"]),
    u("text-right", Scale::Bare, &["text-align"]),
    u("text-justify", Scale::Bare, &["text-align"]),
    u("text", Scale::FontSize, &["font-size"]),
    u("text", Scale::Color, &["color"]),
    u("font", Scale::FontWeight, &["font-weight"]),
    u("font", Scale::Named(&["sans", "serif", "mono"]), &["font-family"]),
    u("italic", Scale::Bare, &["font-style"]),
    u("not-italic", Scale::Bare, &["font-style"]),
    u("leading", Scale::Named(LINE_HEIGHT), &["line-height"]),
    u("leading", Scale::Number, &["line-height"]),
    u("tracking", Scale::Named(TRACKING), &["letter-spacing"]),
    u("underline", Scale::Bare, &["text-decoration-line"]),
    u("overline", Scale::Bare, &["text-decoration-line"]),
    u("line-through", Scale::Bare, &["text-decoration-line"]),
    u("no-underline", Scale::Bare, &["text-decoration-line"]),
    u("decoration", Scale::Color, &["text-decoration-color"]),
    u("uppercase", Scale::Bare, &["text-transform"]),
    u("lowercase", Scale::Bare, &["text-transform"]),
    u("capitalize", Scale::Bare, &["text-transform"]),
    u("normal-case", Scale::Bare, &["text-transform"]),
    u(
        "whitespace",
        Scale::Named(&["normal", "nowrap", "pre", "pre-line", "pre-wrap", "break-spaces"]),
        &["white-space"],
    ),
    u("break-words", Scale::Bare, &["overflow-wrap"]),
    u("break-all", Scale::Bare, &["word-break"]),
    u("break-normal", Scale::Bare, &["overflow-wrap", "word-break"]),
    u("placeholder", Scale::Color, &["--tw-placeholder-color"]),
    // Effects
    u("shadow", Scale::Named(SHADOW), &["box-shadow"]),
    u("shadow", Scale::Color, &["--tw-shadow-color"]),
    u("shadow", Scale::Bare, &["box-shadow"]),
    u4("shadow", Scale::Named(&["xs"]), &["box-shadow"]),
    u("opacity", Scale::Number, &["opacity"]),
    u(
        "mix-blend",
        Scale::Named(&["normal", "multiply", "screen", "overlay", "darken", "lighten"]),
        &["mix-blend-mode"],
    ),
    // Filters
    u("blur", Scale::Named(BLUR), &["--tw-blur"]),
    u("blur", Scale::Bare, &["--tw-blur"]),
    u4("blur", Scale::Named(&["xs"]), &["--tw-blur"]),
    u("brightness", Scale::Number, &["--tw-brightness"]),
    u("contrast", Scale::Number, &["--tw-contrast"]),
    u("grayscale", Scale::Bare, &["--tw-grayscale"]),
    u("saturate", Scale::Number, &["--tw-saturate"]),
    // Tables
    u("border-collapse", Scale::Bare, &["border-collapse"]),
    u("border-separate", Scale::Bare, &["border-collapse"]),
    // Transitions and animation
    u(
        "transition",
        Scale::Named(&["none", "all", "colors", "opacity", "shadow", "transform"]),
        &["transition-property"],
    ),
    u("transition", Scale::Bare, &["transition-property"]),
    u("duration", Scale::Number, &["transition-duration"]),
    u("delay", Scale::Number, &["transition-delay"]),
    u("ease", Scale::Named(&["linear", "in", "out", "in-out"]), &["transition-timing-function"]),
    u("animate", Scale::Named(&["none", "spin", "ping", "pulse", "bounce"]), &["animation"]),
    // Transforms
    u("scale-x", Scale::Number, &["--tw-scale-x"]),
    u("scale-y", Scale::Number, &["--tw-scale-y"]),
    u("scale", Scale::Number, &["--tw-scale-x", "--tw-scale-y"]),
    u("rotate", Scale::Number, &["--tw-rotate"]),
    u("translate-x", Scale::Spacing, &["--tw-translate-x"]),
    u("translate-y", Scale::Spacing, &["--tw-translate-y"]),
    u("skew-x", Scale::Number, &["--tw-skew-x"]),
    u("skew-y", Scale::Number, &["--tw-skew-y"]),
    // Interactivity
    u(
        "cursor",
        Scale::Named(&["auto", "default", "pointer", "wait", "text", "move", "help", "not-allowed", "grab", "grabbing"]),
        &["cursor"],
    ),
    u("select", Scale::Named(&["none", "text", "all", "auto"]), &["user-select"]),
    u("pointer-events", Scale::Named(&["none", "auto"]), &["pointer-events"]),
    u("resize", Scale::Named(&["none", "x", "y"]), &["resize"]),
    u("resize", Scale::Bare, &["resize"]),
    u("appearance", Scale::Named(&["none", "auto"]), &["appearance"]),
    u("scroll", Scale::Named(&["auto", "smooth"]), &["scroll-behavior"]),
    u("accent", Scale::Color, &["accent-color"]),
    u("caret", Scale::Color, &["caret-color"]),
    u("will-change", Scale::Named(&["auto", "scroll", "contents", "transform"]), &["will-change"]),
    // SVG
    u("fill", Scale::Color, &["fill"]),
    u("stroke", Scale::Color, &["stroke"]),
    u("stroke", Scale::Number, &["stroke-width"]),
];

/// A class base resolved against the registry and the active theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUtility {
    /// Position of the matched entry in the utility order.
    pub order: u64,
    pub properties: &'static [&'static str],
    /// Whether the value token is actually present in the theme. A class
    /// that is shaped right but names a missing theme entry resolves with
    /// `registered: false`.
    pub registered: bool,
    /// Statically-known CSS value, when the theme can supply one.
    pub value: Option<String>,
}

/// Resolve a bare class base (no variants, prefix, or flags) against the
/// registry. Returns `None` when no entry accepts the string at all, the
/// "unknown to the framework" case.
pub fn resolve_base(context: &FrameworkContext, base: &str, major: u64) -> Option<ResolvedUtility> {
    if base.is_empty() {
        return None;
    }

    // Arbitrary properties (`[color:red]`) set exactly the property they name.
    if let Some(inner) = arbitrary_inner(base) {
        if let Some((property, value)) = inner.split_once(':') {
            if !property.is_empty() && !property.contains(' ') {
                return Some(ResolvedUtility {
                    order: UTILITIES.len() as u64,
                    properties: &[],
                    registered: true,
                    value: Some(format!("{property}:{value}")),
                });
            }
        }
        return None;
    }

    match_base(base, major).map(|(index, spec, token)| {
        let (registered, value) = registration(context, spec.scale, token);
        ResolvedUtility {
            order: index as u64,
            properties: spec.properties,
            registered,
            value,
        }
    })
}

/// Find the registry entry a base matches, along with its table index and
/// value token. Longest root wins; table order breaks ties between
/// polymorphic entries sharing a root.
pub fn match_base(base: &str, major: u64) -> Option<(usize, &'static UtilitySpec, &str)> {
    let mut best: Option<(usize, &'static UtilitySpec, &str)> = None;
    for (index, spec) in UTILITIES.iter().enumerate() {
        if spec.since_major > major {
            continue;
        }
        let token = match spec.scale {
            Scale::Bare => {
                if base == spec.root {
                    ""
                } else {
                    continue;
                }
            }
            _ => match base.strip_prefix(spec.root).and_then(|rest| rest.strip_prefix('-')) {
                Some(token) if !token.is_empty() => token,
                _ => continue,
            },
        };
        if !shape_accepts(spec.scale, token) {
            continue;
        }
        let better = match &best {
            None => true,
            Some((_, current, _)) => spec.root.len() > current.root.len(),
        };
        if better {
            best = Some((index, spec, token));
        }
    }
    best
}

/// Total count of registry entries; unknown-class orders sort past this.
pub fn utility_count() -> u64 {
    UTILITIES.len() as u64
}

pub(crate) fn arbitrary_inner(token: &str) -> Option<&str> {
    token.strip_prefix('[').and_then(|rest| rest.strip_suffix(']'))
}

/// Strip a trailing `/modifier` (opacity, line-height) that sits outside
/// any bracketed segment.
fn strip_modifier(token: &str) -> &str {
    let mut depth = 0usize;
    for (position, ch) in token.char_indices() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => return &token[..position],
            _ => {}
        }
    }
    token
}

fn looks_like_length(value: &str) -> bool {
    value.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == '-')
        || value.starts_with("var(")
        || value.starts_with("calc(")
}

fn looks_like_color(value: &str) -> bool {
    value.starts_with('#')
        || value.starts_with("rgb")
        || value.starts_with("hsl")
        || value.starts_with("oklch")
        || value.starts_with("color:")
        || value.starts_with("var(")
}

fn is_color_shaped(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Syntactic acceptance only; registration against the theme is separate.
fn shape_accepts(scale: Scale, token: &str) -> bool {
    match scale {
        Scale::Bare => token.is_empty(),
        Scale::Spacing => {
            if let Some(inner) = arbitrary_inner(token) {
                return looks_like_length(inner);
            }
            token == "px" || token == "auto" || parse_step(token).is_some()
        }
        Scale::Size => {
            if let Some(inner) = arbitrary_inner(token) {
                return looks_like_length(inner) || inner.ends_with('%');
            }
            matches!(token, "px" | "auto" | "full" | "screen" | "min" | "max" | "fit" | "none")
                || parse_step(token).is_some()
                || is_fraction(token)
        }
        Scale::Color => {
            // Colors take a `/opacity` modifier.
            let token = strip_modifier(token);
            if let Some(inner) = arbitrary_inner(token) {
                return looks_like_color(inner);
            }
            matches!(token, "inherit" | "current" | "transparent" | "black" | "white")
                || is_color_shaped(token)
        }
        Scale::FontSize => {
            // Font sizes take a `/line-height` modifier.
            let token = strip_modifier(token);
            if let Some(inner) = arbitrary_inner(token) {
                return looks_like_length(inner);
            }
            FONT_SIZES.contains(&token)
        }
        Scale::FontWeight => FONT_WEIGHTS.contains(&token),
        Scale::Number => {
            if let Some(inner) = arbitrary_inner(token) {
                return looks_like_length(inner);
            }
            !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
        }
        Scale::Named(values) => values.contains(&token),
    }
}

fn registration(context: &FrameworkContext, scale: Scale, token: &str) -> (bool, Option<String>) {
    match scale {
        Scale::Spacing | Scale::Size => {
            if let Some(inner) = arbitrary_inner(token) {
                return (true, Some(inner.to_string()));
            }
            if let Some(value) = context.spacing_value(token) {
                return (true, Some(value));
            }
            if matches!(token, "auto" | "full" | "screen" | "min" | "max" | "fit" | "none")
                || is_fraction(token)
            {
                return (true, None);
            }
            (false, None)
        }
        Scale::Color => {
            let token = strip_modifier(token);
            if let Some(inner) = arbitrary_inner(token) {
                return (true, Some(inner.to_string()));
            }
            match context.color_value(token) {
                Some(value) => (true, value),
                None => (false, None),
            }
        }
        _ => {
            if let Some(inner) = arbitrary_inner(token) {
                (true, Some(inner.to_string()))
            } else {
                (true, None)
            }
        }
    }
}

fn is_fraction(token: &str) -> bool {
    match token.split_once('/') {
        Some((numerator, denominator)) => {
            !numerator.is_empty()
                && !denominator.is_empty()
                && numerator.chars().all(|c| c.is_ascii_digit())
                && denominator.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Parse a spacing-scale step (`2`, `2.5`, `0.5`), quarter-rem granularity.
pub fn parse_step(token: &str) -> Option<f64> {
    let step: f64 = token.parse().ok()?;
    if step < 0.0 || step > 96.0 {
        return None;
    }
    if (step * 4.0).fract() != 0.0 {
        return None;
    }
    Some(step)
}

pub const FONT_SIZES: &[&str] = &[
    "xs", "sm", "base", "lg", "xl", "2xl", "3xl", "4xl", "5xl", "6xl", "7xl", "8xl", "9xl",
];

pub const FONT_WEIGHTS: &[&str] = &[
    "thin", "extralight", "light", "normal", "medium", "semibold", "bold", "extrabold", "black",
];
