//! Front matter at the top of a post.
//!
//! Two forms are accepted:
//!
//! ```text
//! ---                         +++
//! title: "Mobile learning"    title = "Mobile learning"
//! isFeatured: true            isFeatured = true
//! ---                         +++
//! ```
//!
//! The `---` form is a flat subset of YAML: one `key: value` per line, with
//! quoted or bare strings and `true`/`false`. Nested structures are rejected.

use toml::{Table, Value};

use super::BlogError;

const YAML_FENCE: &str = "---";
const TOML_FENCE: &str = "+++";

/// Splits `source` into its metadata table and the markdown body.
pub fn split(source: &str) -> Result<(Table, &str), BlogError> {
    let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);

    let mut lines = source.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok((Table::new(), source));
    };

    let fence = match first.trim_end() {
        YAML_FENCE => YAML_FENCE,
        TOML_FENCE => TOML_FENCE,
        _ => return Ok((Table::new(), source)),
    };

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == fence || (fence == YAML_FENCE && trimmed == "...") {
            let header = &source[header_start..offset];
            let body = &source[offset + line.len()..];
            let table = if fence == TOML_FENCE {
                parse_toml(header)?
            } else {
                parse_flat_yaml(header)?
            };
            return Ok((table, body));
        }
        offset += line.len();
    }

    Err(BlogError::FrontMatter(format!(
        "missing closing `{fence}` fence"
    )))
}

fn parse_toml(header: &str) -> Result<Table, BlogError> {
    let mut table: Table = toml::from_str(header)?;
    for (_, value) in table.iter_mut() {
        if let Value::Datetime(dt) = value {
            *value = Value::String(dt.to_string());
        }
    }
    Ok(table)
}

fn parse_flat_yaml(header: &str) -> Result<Table, BlogError> {
    let mut table = Table::new();

    for (idx, raw) in header.lines().enumerate() {
        let line_no = idx + 2;
        let line = raw.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        if line.starts_with(char::is_whitespace) || line.starts_with("- ") {
            return Err(BlogError::FrontMatter(format!(
                "line {line_no}: nested values are not supported"
            )));
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(BlogError::FrontMatter(format!(
                "line {line_no}: expected `key: value`"
            )));
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(BlogError::FrontMatter(format!("line {line_no}: empty key")));
        }
        table.insert(key.to_string(), scalar(value.trim()));
    }

    Ok(table)
}

fn scalar(raw: &str) -> Value {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            let inner = &raw[1..raw.len() - 1];
            let inner = if quote == '"' {
                inner.replace("\\\"", "\"").replace("\\\\", "\\")
            } else {
                inner.replace("''", "'")
            };
            return Value::String(inner);
        }
    }

    let bare = raw.split_once(" #").map_or(raw, |(v, _)| v).trim();
    match bare {
        "true" | "True" | "TRUE" => Value::Boolean(true),
        "false" | "False" | "FALSE" => Value::Boolean(false),
        _ => Value::String(bare.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_front_matter() {
        let source = "---\ntitle: \"The Rise of Mobile Learning\"\ncategory: Technology\nisFeatured: true\ndate: March 8, 2024\n---\n# Heading\n";
        let (meta, body) = split(source).unwrap();

        assert_eq!(meta["title"].as_str(), Some("The Rise of Mobile Learning"));
        assert_eq!(meta["category"].as_str(), Some("Technology"));
        assert_eq!(meta["isFeatured"].as_bool(), Some(true));
        assert_eq!(meta["date"].as_str(), Some("March 8, 2024"));
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn toml_front_matter_with_native_date() {
        let source = "+++\ntitle = \"Designing Interfaces\"\ndate = 2024-03-10\n+++\nBody text";
        let (meta, body) = split(source).unwrap();

        assert_eq!(meta["title"].as_str(), Some("Designing Interfaces"));
        assert_eq!(meta["date"].as_str(), Some("2024-03-10"));
        assert_eq!(body, "Body text");
    }

    #[test]
    fn no_front_matter() {
        let (meta, body) = split("# Just markdown\n").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "# Just markdown\n");
    }

    #[test]
    fn crlf_and_bom_are_tolerated() {
        let source = "\u{FEFF}---\r\ntitle: Windows\r\n---\r\nbody";
        let (meta, body) = split(source).unwrap();
        assert_eq!(meta["title"].as_str(), Some("Windows"));
        assert_eq!(body, "body");
    }

    #[test]
    fn unterminated_front_matter_is_an_error() {
        let err = split("---\ntitle: Oops\n# no fence").unwrap_err();
        assert!(matches!(err, BlogError::FrontMatter(msg) if msg.contains("closing")));
    }

    #[test]
    fn nested_yaml_is_rejected() {
        let err = split("---\ntags:\n  - a\n---\n").unwrap_err();
        assert!(matches!(err, BlogError::FrontMatter(msg) if msg.contains("line 3")));
    }

    #[test]
    fn scalars() {
        assert_eq!(scalar("'it''s'"), Value::String("it's".into()));
        assert_eq!(scalar("\"say \\\"hi\\\"\""), Value::String("say \"hi\"".into()));
        assert_eq!(scalar("false"), Value::Boolean(false));
        assert_eq!(scalar("8 min read # approx"), Value::String("8 min read".into()));
        assert_eq!(scalar(""), Value::String(String::new()));
    }
}
