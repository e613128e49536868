//! Tolerant extraction of a JSON object from free text
//!
//! Generators wrap JSON in prose and code fences, leave trailing commas and
//! embed raw newlines inside string values. Extraction first tries the span
//! between the first `{` and the last `}` verbatim, then again after repair.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in response")]
    NoObject,

    #[error("JSON object is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Whether repair was needed to parse the object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    None,
    Applied,
}

/// Span between the first `{` and the last `}`
pub fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Escapes control characters inside strings and drops them elsewhere
fn strip_control_characters(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in json.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => {}
                c => out.push(c),
            }
        } else {
            match c {
                '"' => {
                    in_string = true;
                    out.push(c);
                }
                '\n' | '\r' | '\t' | ' ' => out.push(c),
                c if c.is_control() => {}
                c => out.push(c),
            }
        }
    }
    out
}

/// Removes commas that directly precede a closing bracket
fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
            out.push(c);
            continue;
        }
        if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Applies every repair step
pub fn repair(json: &str) -> String {
    strip_trailing_commas(&strip_control_characters(json))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extracts the embedded JSON object, repairing it when needed
pub fn extract_object(text: &str) -> Result<(serde_json::Map<String, Value>, Repair), ParseError> {
    let span = object_span(text).ok_or(ParseError::NoObject)?;

    let (value, repaired) = match serde_json::from_str::<Value>(span) {
        Ok(value) => (value, Repair::None),
        Err(_) => (serde_json::from_str::<Value>(&repair(span))?, Repair::Applied),
    };

    match value {
        Value::Object(map) => Ok((map, repaired)),
        other => Err(ParseError::NotAnObject(kind(&other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_object_in_prose() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nThanks";
        let (map, repair) = extract_object(text).unwrap();
        assert_eq!(map["a"], 1);
        assert_eq!(repair, Repair::None);
    }

    #[test]
    fn test_trailing_commas_are_equivalent() {
        let clean = extract_object(r#"{"a": [1, 2], "b": {"c": "x"}}"#).unwrap().0;
        let trailing = extract_object("{\"a\": [1, 2,], \"b\": {\"c\": \"x\",},}").unwrap();
        assert_eq!(clean, trailing.0);
        assert_eq!(trailing.1, Repair::Applied);
    }

    #[test]
    fn test_comma_inside_string_kept() {
        let (map, _) = extract_object("{\"a\": \"x,]\", \"b\": 1,}").unwrap();
        assert_eq!(map["a"], "x,]");
    }

    #[test]
    fn test_raw_newlines_in_strings() {
        let text = "{\"jenkinsfile\": \"pipeline {\n    agent any\n}\"}";
        let (map, repair) = extract_object(text).unwrap();
        assert_eq!(map["jenkinsfile"], "pipeline {\n    agent any\n}");
        assert_eq!(repair, Repair::Applied);
    }

    #[test]
    fn test_control_characters_dropped() {
        let text = "{\"a\":\u{0007} \"b\u{0001}c\"}";
        let (map, _) = extract_object(text).unwrap();
        assert_eq!(map["a"], "bc");
    }

    #[test]
    fn test_no_object() {
        assert!(matches!(extract_object("no json"), Err(ParseError::NoObject)));
        assert!(matches!(extract_object("} {"), Err(ParseError::NoObject)));
    }

    #[test]
    fn test_unrepairable() {
        assert!(matches!(
            extract_object("{\"a\": }"),
            Err(ParseError::Malformed(_))
        ));
    }
}
