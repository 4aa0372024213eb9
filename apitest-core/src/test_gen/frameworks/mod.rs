//! Source emitters for generated test packages

pub mod rust;

/// Helper functions for code generation
pub mod codegen {
    use regex_utils::identifier;

    const STRICT_KEYWORDS: &[&str] = &[
        "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
        "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe",
        "use", "where", "while", "abstract", "become", "box", "do", "final", "macro", "override",
        "priv", "try", "typeof", "unsized", "virtual", "yield",
    ];

    /// Keywords that cannot be written as raw identifiers
    const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

    /// Indent a block of code
    pub fn indent(code: &str, spaces: usize) -> String {
        let indent_str = " ".repeat(spaces);
        code.lines()
            .map(|line| if line.is_empty() { line.to_string() } else { format!("{}{}", indent_str, line) })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert snake_case (or any sanitized text) to PascalCase
    pub fn to_pascal_case(s: &str) -> String {
        let mut result = String::new();
        let mut capitalize_next = true;

        for c in s.chars() {
            if !c.is_ascii_alphanumeric() {
                capitalize_next = true;
            } else if capitalize_next {
                result.push(c.to_ascii_uppercase());
                capitalize_next = false;
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Convert camelCase or any wire name to snake_case
    pub fn to_snake_case(s: &str) -> String {
        let mut result = String::new();
        let mut prev_lower = false;

        for c in s.chars() {
            if c.is_ascii_uppercase() {
                if prev_lower {
                    result.push('_');
                }
                result.push(c.to_ascii_lowercase());
                prev_lower = false;
            } else {
                result.push(c);
                prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            }
        }

        identifier::sanitize(&result).unwrap_or_default().to_ascii_lowercase()
    }

    /// A valid Rust identifier for `name`; keywords become raw identifiers
    pub fn ident(name: &str) -> String {
        let name = if name.starts_with(|c: char| c.is_ascii_digit()) {
            format!("n{}", name)
        } else {
            name.to_string()
        };

        if RESERVED.contains(&name.as_str()) {
            format!("{}_", name)
        } else if STRICT_KEYWORDS.contains(&name.as_str()) {
            format!("r#{}", name)
        } else {
            name
        }
    }

    /// Identifier for a struct field holding the wire member `wire`
    pub fn field_ident(wire: &str, position: usize) -> String {
        let snake = to_snake_case(wire);
        if snake.is_empty() { format!("field_{}", position) } else { ident(&snake) }
    }

    /// Pascal-case type name; falls back to `fallback` when nothing usable is left
    pub fn type_name(raw: &str, fallback: &str) -> String {
        let pascal = to_pascal_case(raw);
        if pascal.is_empty() {
            fallback.to_string()
        } else if pascal.starts_with(|c: char| c.is_ascii_digit()) {
            format!("{}{}", fallback, pascal)
        } else {
            pascal
        }
    }

    /// Escape string for inclusion in code
    pub fn escape_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    /// `SCREAMING_SNAKE` constant name from sanitized parts
    pub fn const_name(parts: &[&str]) -> String {
        let joined = parts.join("_");
        identifier::sanitize(&joined).unwrap_or_else(|| "VALUE".to_string()).to_ascii_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::codegen::*;

    #[test]
    fn test_codegen_helpers() {
        let code = "line1\n\nline3";
        assert_eq!(indent(code, 4), "    line1\n\n    line3");

        assert_eq!(to_pascal_case("hello_world"), "HelloWorld");
        assert_eq!(to_pascal_case("first-name"), "FirstName");
        assert_eq!(to_snake_case("firstName"), "first_name");
        assert_eq!(to_snake_case("HTTPStatus"), "httpstatus");
        assert_eq!(to_snake_case("created-at"), "created_at");

        assert_eq!(escape_string("say \"hi\"\n"), "say \\\"hi\\\"\\n");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(ident("type"), "r#type");
        assert_eq!(ident("self"), "self_");
        assert_eq!(ident("2fa"), "n2fa");
        assert_eq!(field_ident("$$$", 3), "field_3");
        assert_eq!(field_ident("ownerId", 0), "owner_id");
        assert_eq!(type_name("404", "Status"), "Status404");
        assert_eq!(const_name(&["response", "200", "basic example"]), "RESPONSE_200_BASIC_EXAMPLE");
    }
}
