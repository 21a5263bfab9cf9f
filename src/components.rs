//! CSS entry-point scanning: custom component classes from
//! `@layer components` blocks, `@theme` declarations, and the configured
//! prefix. Works on the stylesheet text directly, tracking comments,
//! strings, and brace depth, so it never depends on the framework API.

/// Remove `/* ... */` comments, leaving string literals intact.
pub fn strip_comments(css: &str) -> String {
    let mut result = String::with_capacity(css.len());
    let chars: Vec<char> = css.chars().collect();
    let mut i = 0;
    let mut in_string: Option<char> = None;

    while i < chars.len() {
        let ch = chars[i];
        match in_string {
            Some(quote) => {
                result.push(ch);
                if ch == '\\' && i + 1 < chars.len() {
                    result.push(chars[i + 1]);
                    i += 2;
                    continue;
                }
                if ch == quote {
                    in_string = None;
                }
            }
            None => {
                if ch == '/' && i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 2;
                    while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                        i += 1;
                    }
                    i += 2;
                    continue;
                }
                if ch == '"' || ch == '\'' {
                    in_string = Some(ch);
                }
                result.push(ch);
            }
        }
        i += 1;
    }

    result
}

/// Contents of every top-level `@<name> ...;`-less block whose prelude
/// starts with `name` (e.g. `theme`, `layer components`).
pub fn at_rule_blocks(css: &str, name: &str) -> Vec<String> {
    let css = strip_comments(css);
    let mut blocks = Vec::new();
    let bytes = css.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'@' {
            i += 1;
            continue;
        }
        let rest = &css[i + 1..];
        let prelude_end = rest.find(['{', ';']).map(|p| i + 1 + p).unwrap_or(css.len());
        let prelude = css[i + 1..prelude_end].trim();
        if prelude_end >= css.len() || bytes[prelude_end] == b';' {
            i = prelude_end + 1;
            continue;
        }
        if prelude == name || prelude.starts_with(&format!("{name} ")) || prelude.starts_with(&format!("{name}(")) {
            let (content, end) = read_block(&css, prelude_end);
            blocks.push(content);
            i = end;
        } else {
            i = prelude_end + 1;
        }
    }

    blocks
}

/// Read a `{ ... }` block whose opening brace sits at byte `open`; returns
/// the inner content and the byte index just past the closing brace.
fn read_block(css: &str, open: usize) -> (String, usize) {
    let bytes = css.as_bytes();
    let mut depth = 0usize;
    let mut content_start = open + 1;
    let mut i = open;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                depth += 1;
                if depth == 1 {
                    content_start = i + 1;
                }
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return (css[content_start..i].to_string(), i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }

    // Unterminated block: take everything after the brace.
    (css[content_start.min(bytes.len())..].to_string(), bytes.len())
}

/// Class names defined by the project's `@layer components` blocks, in
/// source order, deduplicated.
pub fn component_class_names(css: &str) -> Vec<String> {
    let mut names = Vec::new();
    for block in at_rule_blocks(css, "layer components") {
        collect_rule_classes(&block, &mut names);
    }
    names
}

fn collect_rule_classes(block: &str, names: &mut Vec<String>) {
    let bytes = block.as_bytes();
    let mut selector_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                let selector = block[selector_start..i].trim().to_string();
                let (content, end) = read_block(block, i);
                if selector.starts_with('@') {
                    // Nested at-rule (`@media`, nested `@layer`): recurse.
                    collect_rule_classes(&content, names);
                } else {
                    extract_selector_classes(&selector, names);
                }
                selector_start = end;
                i = end;
                continue;
            }
            b';' => selector_start = i + 1,
            _ => {}
        }
        i += 1;
    }
}

fn extract_selector_classes(selector: &str, names: &mut Vec<String>) {
    let chars: Vec<char> = selector.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '.' {
            i += 1;
            continue;
        }
        let mut name = String::new();
        i += 1;
        while i < chars.len() {
            let ch = chars[i];
            if ch == '\\' && i + 1 < chars.len() {
                name.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                name.push(ch);
                i += 1;
            } else {
                break;
            }
        }
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
}

/// `--custom-property: value;` declarations across all `@theme` blocks.
pub fn theme_declarations(css: &str) -> Vec<(String, String)> {
    let mut declarations = Vec::new();
    for block in at_rule_blocks(css, "theme") {
        for declaration in block.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                let property = property.trim();
                let value = value.trim();
                if property.starts_with("--") && !value.is_empty() {
                    declarations.push((property.to_string(), value.to_string()));
                }
            }
        }
    }
    declarations
}

/// The utility prefix declared via `prefix(...)` on the `@import` or
/// `@theme` line, if any.
pub fn declared_prefix(css: &str) -> Option<String> {
    let css = strip_comments(css);
    let start = css.find("prefix(")? + "prefix(".len();
    let end = css[start..].find(')')? + start;
    let prefix = css[start..end].trim();
    if prefix.is_empty() {
        None
    } else {
        Some(prefix.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = r#"
        @import "tailwindcss" prefix(tw);

        /* design tokens */
        @theme {
            --color-primary: #1a73e8;
            --spacing-gutter: 1.25rem;
        }

        @layer components {
            .card {
                border-radius: 0.5rem;
            }
            .btn, .btn-primary:hover {
                padding: 0.5rem;
            }
            @media (min-width: 640px) {
                .card-wide { width: 100%; }
            }
        }
    "#;

    #[test]
    fn test_component_class_names() {
        let names = component_class_names(ENTRY);
        assert_eq!(names, vec!["card", "btn", "btn-primary", "card-wide"]);
    }

    #[test]
    fn test_theme_declarations() {
        let declarations = theme_declarations(ENTRY);
        assert_eq!(
            declarations,
            vec![
                ("--color-primary".to_string(), "#1a73e8".to_string()),
                ("--spacing-gutter".to_string(), "1.25rem".to_string()),
            ]
        );
    }

    #[test]
    fn test_declared_prefix() {
        assert_eq!(declared_prefix(ENTRY).as_deref(), Some("tw"));
        assert_eq!(declared_prefix(".card {}"), None);
    }

    #[test]
    fn test_comments_do_not_leak_classes() {
        let css = "@layer components { /* .ghost {} */ .real {} }";
        assert_eq!(component_class_names(css), vec!["real"]);
    }

    #[test]
    fn test_classes_outside_components_layer_ignored() {
        let css = "@layer base { .reset {} } .loose {} @layer components { .kept {} }";
        assert_eq!(component_class_names(css), vec!["kept"]);
    }

    #[test]
    fn test_strings_survive_comment_stripping() {
        let css = r#".a { content: "/* not a comment */"; }"#;
        let stripped = strip_comments(css);
        assert!(stripped.contains("not a comment"));
    }
}
