//! Identifier case conversion shared by every code-emitting module.

/// `HTTPResponse` / `httpResponse` / `http_response` -> `http_response`.
/// A run of uppercase letters followed by a lowercase one is treated as
/// "last uppercase starts the next word" (`HTTPResponse` -> `http`+`response`).
pub fn snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() {
            let prev_lower_or_digit = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_is_lower = i + 1 < chars.len() && chars[i + 1].is_lowercase();
            let prev_is_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && chars[i - 1] != '_' && (prev_lower_or_digit || (prev_is_upper && next_is_lower)) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `http_response` / `httpResponse` -> `HttpResponse`. Used for Rust struct
/// and enum names, and for oneof variant names derived from field names.
pub fn pascal_case(s: &str) -> String {
    let mut out = String::new();
    let mut upper_next = true;
    for c in s.chars() {
        if c == '_' || c == '-' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `http_response` / `HttpResponse` -> `httpResponse`. Used for the JSON
/// field-name default.
pub fn camel_case(s: &str) -> String {
    let pascal = pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The RPC method-name conversion: insert an underscore before every
/// uppercase letter except the first, then lowercase the whole thing.
/// Unlike [`snake_case`] this does *not* treat a run of capitals as one
/// acronym word — `GetHTTPResponse` becomes `get_h_t_t_p_response`, not
/// `get_http_response`. Kept separate from `snake_case` because the two
/// disagree on acronym runs, and this is the convention peer protobuf RPC
/// implementations use for client/server method identifiers.
pub fn method_snake_case(s: &str) -> String {
    let mut out = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
];

/// Escapes a field/variant identifier that collides with a Rust keyword
/// using a single uniform scheme: append a trailing underscore.
pub fn escape_ident(name: &str) -> String {
    if RUST_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_keywords_with_trailing_underscore() {
        assert_eq!(escape_ident("type"), "type_");
        assert_eq!(escape_ident("match"), "match_");
        assert_eq!(escape_ident("value"), "value");
    }

    #[test]
    fn method_snake_case_splits_every_capital() {
        assert_eq!(method_snake_case("GetHTTPResponse"), "get_h_t_t_p_response");
        assert_eq!(method_snake_case("ping"), "ping");
        assert_eq!(method_snake_case("Lookup"), "lookup");
    }

    #[test]
    fn snake_case_splits_acronym_runs() {
        assert_eq!(snake_case("HTTPResponse"), "http_response");
        assert_eq!(snake_case("simpleField"), "simple_field");
        assert_eq!(snake_case("already_snake"), "already_snake");
        assert_eq!(snake_case("ID"), "id");
    }

    #[test]
    fn pascal_case_joins_words() {
        assert_eq!(pascal_case("http_response"), "HttpResponse");
        assert_eq!(pascal_case("simple_field"), "SimpleField");
        assert_eq!(pascal_case("Already"), "Already");
    }

    #[test]
    fn camel_case_lowercases_first_letter() {
        assert_eq!(camel_case("http_response"), "httpResponse");
        assert_eq!(camel_case("SomeName"), "someName");
    }
}
