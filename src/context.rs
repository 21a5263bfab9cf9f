//! Framework context: the resolved, in-memory representation of a
//! project's configuration/theme used to answer semantic questions about
//! classes. Built once per (config path, mtime) pair by the context cache
//! and never mutated, only rebuilt.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::components;
use crate::protocol::Warning;

/// Default palette color names (each with the standard numeric steps).
const DEFAULT_COLOR_NAMES: &[&str] = &[
    "slate", "gray", "zinc", "neutral", "stone", "red", "orange", "amber", "yellow", "lime",
    "green", "emerald", "teal", "cyan", "sky", "blue", "indigo", "violet", "purple", "fuchsia",
    "pink", "rose",
];

const DEFAULT_COLOR_STEPS: &[&str] = &[
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950",
];

/// The fixed legacy spacing scale. The modern engine derives spacing from a
/// single `--spacing` token instead, so any quarter step is generated.
const LEGACY_SPACING_STEPS: &[&str] = &[
    "0", "0.5", "1", "1.5", "2", "2.5", "3", "3.5", "4", "5", "6", "7", "8", "9", "10", "11",
    "12", "14", "16", "20", "24", "28", "32", "36", "40", "44", "48", "52", "56", "60", "64",
    "72", "80", "96",
];

/// Version-specific handle produced from a resolved config path. Owned by
/// the context cache; one live instance per (config path, mtime) pair.
#[derive(Debug, Clone)]
pub struct FrameworkContext {
    pub major: u64,
    /// Project namespace token. Bare (`tw`) for the modern syntax, with its
    /// trailing dash (`tw-`) for the legacy syntax.
    pub prefix: String,
    pub separator: String,
    /// Colors added on top of the default palette, token -> CSS value.
    pub colors: IndexMap<String, String>,
    /// Spacing steps added on top of the default scale, token -> CSS value.
    pub spacing: IndexMap<String, String>,
    /// Class names declared in the entry point's `@layer components`.
    pub component_classes: Vec<String>,
    /// Configuration problems encountered while building; attached to every
    /// response computed against this context.
    pub warnings: Vec<Warning>,
}

impl FrameworkContext {
    /// The default theme with no project configuration applied.
    pub fn with_defaults(major: u64) -> Self {
        Self {
            major,
            prefix: String::new(),
            separator: ":".to_string(),
            colors: IndexMap::new(),
            spacing: IndexMap::new(),
            component_classes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// CSS value for a spacing token: theme extensions first, then the
    /// default scale (fixed steps on v3, any quarter step on v4).
    pub fn spacing_value(&self, token: &str) -> Option<String> {
        if let Some(value) = self.spacing.get(token) {
            return Some(value.clone());
        }
        if token == "px" {
            return Some("1px".to_string());
        }
        if self.major < 4 && !LEGACY_SPACING_STEPS.contains(&token) {
            return None;
        }
        let step = crate::registry::parse_step(token)?;
        let rem = step * 0.25;
        if rem == 0.0 {
            return Some("0px".to_string());
        }
        // Trim the trailing zeros a plain float format would print.
        let formatted = format!("{rem}");
        Some(format!("{formatted}rem"))
    }

    /// Whether a color token is registered, and its CSS value when the
    /// theme supplies one. Default-palette entries are registered but have
    /// no statically-known value.
    pub fn color_value(&self, token: &str) -> Option<Option<String>> {
        if let Some(value) = self.colors.get(token) {
            return Some(Some(value.clone()));
        }
        if matches!(token, "inherit" | "current" | "transparent" | "black" | "white") {
            return Some(None);
        }
        if let Some((name, step)) = token.rsplit_once('-') {
            if DEFAULT_COLOR_NAMES.contains(&name) && DEFAULT_COLOR_STEPS.contains(&step) {
                return Some(None);
            }
        }
        None
    }
}

/// Legacy (v3) configuration file shape, JSON.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LegacyConfig {
    pub prefix: String,
    pub separator: Option<String>,
    pub theme: LegacyTheme,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LegacyTheme {
    pub extend: LegacyThemeExtend,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LegacyThemeExtend {
    pub colors: IndexMap<String, String>,
    pub spacing: IndexMap<String, String>,
}

fn config_warning(option: &str, title: String) -> Warning {
    Warning {
        option: option.to_string(),
        title,
        url: None,
    }
}

/// Build a context for the given major version from a config path. Never
/// fails: a missing or unreadable config degrades to the default theme
/// with a warning attached.
pub fn resolve_context(major: u64, config_path: Option<&Path>, cwd: &Path) -> FrameworkContext {
    let option = if major >= 4 { "entryPoint" } else { "tailwindConfig" };

    let Some(config_path) = config_path else {
        let mut context = FrameworkContext::with_defaults(major);
        context.warnings.push(config_warning(
            option,
            format!(
                "No {} configured, resolving against the default theme",
                if major >= 4 { "CSS entry point" } else { "Tailwind config" }
            ),
        ));
        return context;
    };

    let resolved: PathBuf = if config_path.is_absolute() {
        config_path.to_path_buf()
    } else {
        cwd.join(config_path)
    };

    let content = match std::fs::read_to_string(&resolved) {
        Ok(content) => content,
        Err(e) => {
            let mut context = FrameworkContext::with_defaults(major);
            context.warnings.push(config_warning(
                option,
                format!("Failed to read {}: {e}; resolving against the default theme", resolved.display()),
            ));
            return context;
        }
    };

    if major >= 4 {
        context_from_entry_point(major, &content)
    } else {
        context_from_legacy_config(major, &content, &resolved)
    }
}

/// Modern (v4) context: scan the CSS entry point for the prefix, `@theme`
/// tables, and `@layer components` class names.
fn context_from_entry_point(major: u64, css: &str) -> FrameworkContext {
    let mut context = FrameworkContext::with_defaults(major);

    if let Some(prefix) = components::declared_prefix(css) {
        context.prefix = prefix;
    }

    for (property, value) in components::theme_declarations(css) {
        if let Some(token) = property.strip_prefix("--color-") {
            context.colors.insert(token.to_string(), value);
        } else if let Some(token) = property.strip_prefix("--spacing-") {
            context.spacing.insert(token.to_string(), value);
        }
    }

    context.component_classes = components::component_class_names(css);
    context
}

/// Legacy (v3) context: JSON config mirroring the framework's own
/// `tailwind.config` shape (prefix, separator, theme.extend).
fn context_from_legacy_config(major: u64, content: &str, path: &Path) -> FrameworkContext {
    let mut context = FrameworkContext::with_defaults(major);

    let config: LegacyConfig = match serde_json::from_str(content) {
        Ok(config) => config,
        Err(e) => {
            context.warnings.push(config_warning(
                "tailwindConfig",
                format!("Failed to parse {}: {e}; resolving against the default theme", path.display()),
            ));
            return context;
        }
    };

    context.prefix = config.prefix;
    if let Some(separator) = config.separator {
        if !separator.is_empty() {
            context.separator = separator;
        }
    }
    context.colors = config.theme.extend.colors;
    context.spacing = config.theme.extend.spacing;
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_context() {
        let context = FrameworkContext::with_defaults(4);
        assert_eq!(context.separator, ":");
        assert!(context.prefix.is_empty());
        assert!(context.warnings.is_empty());
    }

    #[test]
    fn test_spacing_values() {
        let context = FrameworkContext::with_defaults(4);
        assert_eq!(context.spacing_value("0").as_deref(), Some("0px"));
        assert_eq!(context.spacing_value("1").as_deref(), Some("0.25rem"));
        assert_eq!(context.spacing_value("2").as_deref(), Some("0.5rem"));
        assert_eq!(context.spacing_value("2.5").as_deref(), Some("0.625rem"));
        assert_eq!(context.spacing_value("px").as_deref(), Some("1px"));
        assert_eq!(context.spacing_value("7.3"), None);
        assert_eq!(context.spacing_value("red-500"), None);
    }

    #[test]
    fn test_color_lookup() {
        let mut context = FrameworkContext::with_defaults(4);
        context.colors.insert("primary".to_string(), "#1a73e8".to_string());

        assert_eq!(context.color_value("primary"), Some(Some("#1a73e8".to_string())));
        assert_eq!(context.color_value("red-500"), Some(None));
        assert_eq!(context.color_value("white"), Some(None));
        assert_eq!(context.color_value("notacolor-123"), None);
    }

    #[test]
    fn test_missing_config_degrades_with_warning() {
        let context = resolve_context(4, None, Path::new("."));
        assert_eq!(context.warnings.len(), 1);
        assert_eq!(context.warnings[0].option, "entryPoint");

        let context = resolve_context(3, None, Path::new("."));
        assert_eq!(context.warnings[0].option, "tailwindConfig");
    }

    #[test]
    fn test_unreadable_config_degrades_with_warning() {
        let context = resolve_context(4, Some(Path::new("does/not/exist.css")), Path::new("."));
        assert_eq!(context.warnings.len(), 1);
        assert!(context.warnings[0].title.contains("does/not/exist.css"));
    }

    #[test]
    fn test_entry_point_context() {
        let mut file = tempfile::NamedTempFile::with_suffix(".css").unwrap();
        file.write_all(
            br#"
            @import "tailwindcss" prefix(tw);
            @theme {
                --color-primary: #1a73e8;
                --spacing-gutter: 1.25rem;
            }
            @layer components {
                .card {}
            }
            "#,
        )
        .unwrap();

        let context = resolve_context(4, Some(file.path()), Path::new("."));
        assert_eq!(context.prefix, "tw");
        assert_eq!(context.colors.get("primary").map(String::as_str), Some("#1a73e8"));
        assert_eq!(context.spacing.get("gutter").map(String::as_str), Some("1.25rem"));
        assert_eq!(context.component_classes, vec!["card"]);
        assert!(context.warnings.is_empty());
    }

    #[test]
    fn test_legacy_config_context() {
        let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(
            br##"{
                "prefix": "tw-",
                "separator": "_",
                "theme": {"extend": {"colors": {"brand": "#0066cc"}, "spacing": {"gutter": "18px"}}}
            }"##,
        )
        .unwrap();

        let context = resolve_context(3, Some(file.path()), Path::new("."));
        assert_eq!(context.prefix, "tw-");
        assert_eq!(context.separator, "_");
        assert_eq!(context.colors.get("brand").map(String::as_str), Some("#0066cc"));
        assert_eq!(context.spacing_value("gutter").as_deref(), Some("18px"));
    }

    #[test]
    fn test_malformed_legacy_config_warns() {
        let mut file = tempfile::NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(b"not json at all").unwrap();

        let context = resolve_context(3, Some(file.path()), Path::new("."));
        assert_eq!(context.warnings.len(), 1);
        assert_eq!(context.warnings[0].option, "tailwindConfig");
        assert!(context.prefix.is_empty());
    }
}
