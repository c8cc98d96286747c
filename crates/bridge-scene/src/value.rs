//! Best-effort decoding of scene field values
//!
//! Scene documents are YAML-shaped but not parsed as YAML. Each value is
//! decoded from the text after `key:` on a single line:
//! - Flow maps (`{x: 0, y: 1, z: 0}`, `{fileID: 42}`)
//! - Booleans, numbers and plain or quoted text
//! - Empty values, which may open a group of sub-lines

use indexmap::IndexMap;
use serde::Serialize;

/// A decoded field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Key present with nothing after it
    Empty,
    /// `true` / `false`
    Bool(bool),
    /// Any numeric literal, with the token as written
    Number {
        /// Parsed value
        value: f64,
        /// Source text; handles and names need it verbatim
        raw: String,
    },
    /// Plain or quoted text
    Text(String),
    /// Vector components, possibly incomplete
    Vector(VectorParts),
    /// Object reference (`{fileID: N, guid: G, type: T}`)
    Reference(ObjectRef),
    /// Any other flow map or nested group
    Map(IndexMap<String, FieldValue>),
    /// Block or flow sequence
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Interpret as a boolean; the format stores most flags as `0` / `1`
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number { value, .. } => Some(*value != 0.0),
            Self::Text(s) => match s.as_str() {
                "true" | "True" => Some(true),
                "false" | "False" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Interpret as a number
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number { value, .. } => Some(*value),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Interpret as an exact integer
    ///
    /// Parsed from the source token, so 64-bit ids above 2^53 survive.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number { raw, .. } => raw.parse().ok(),
            _ => None,
        }
    }

    /// Interpret as text; numbers keep their source spelling
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number { raw, .. } => Some(raw.clone()),
            Self::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Resolve a non-null object reference to a handle
    ///
    /// `fileID: 0` is the format's null reference.
    #[must_use]
    pub fn as_handle(&self) -> Option<i64> {
        match self {
            Self::Reference(r) if r.file_id != 0 => Some(r.file_id),
            _ => None,
        }
    }

    /// Vector components, if this value carries any
    #[must_use]
    pub fn as_vector(&self) -> Option<&VectorParts> {
        match self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }
}

/// Vector components as they appeared in the document
///
/// Components are optional so callers can fill gaps with their own defaults
/// (a missing scale component is `1`, a missing position component is `0`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VectorParts {
    /// `x` component
    pub x: Option<f64>,
    /// `y` component
    pub y: Option<f64>,
    /// `z` component
    pub z: Option<f64>,
    /// `w` component (rotations only)
    pub w: Option<f64>,
}

impl VectorParts {
    /// Set a component by its key; returns false for non-component keys
    pub fn set(&mut self, component: &str, value: f64) -> bool {
        let slot = match component {
            "x" => &mut self.x,
            "y" => &mut self.y,
            "z" => &mut self.z,
            "w" => &mut self.w,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// True if no component has been seen
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none() && self.w.is_none()
    }
}

/// Reference to another block or an external asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    /// Local handle, or the asset-local id when `guid` is set
    pub file_id: i64,
    /// Asset GUID for references outside the document
    pub guid: Option<String>,
}

/// True for the keys that make up a vector group
#[inline]
#[must_use]
pub fn is_component_key(key: &str) -> bool {
    matches!(key, "x" | "y" | "z" | "w")
}

/// Decode the text following `key:` on a line
#[must_use]
pub fn decode(raw: &str) -> FieldValue {
    let raw = raw.trim();
    if raw.is_empty() {
        return FieldValue::Empty;
    }
    if let Some(inner) = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        return decode_flow_map(inner);
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return FieldValue::List(
            split_flow(inner)
                .into_iter()
                .filter(|item| !item.is_empty())
                .map(decode)
                .collect(),
        );
    }
    match raw {
        "true" => return FieldValue::Bool(true),
        "false" => return FieldValue::Bool(false),
        _ => {}
    }
    if let Some(value) = parse_number(raw) {
        return FieldValue::Number {
            value,
            raw: raw.to_string(),
        };
    }
    FieldValue::Text(unquote(raw).to_string())
}

fn decode_flow_map(inner: &str) -> FieldValue {
    let mut entries: IndexMap<String, FieldValue> = IndexMap::new();
    for entry in split_flow(inner) {
        if let Some((key, value)) = entry.split_once(':') {
            entries.insert(key.trim().to_string(), decode(value));
        }
    }

    if let Some(file_id) = entries.get("fileID").and_then(FieldValue::as_i64) {
        let guid = entries.get("guid").and_then(FieldValue::as_text);
        return FieldValue::Reference(ObjectRef { file_id, guid });
    }

    if !entries.is_empty() && entries.keys().all(|k| is_component_key(k)) {
        let mut parts = VectorParts::default();
        for (key, value) in &entries {
            if let Some(n) = value.as_f64() {
                parts.set(key, n);
            }
        }
        return FieldValue::Vector(parts);
    }

    FieldValue::Map(entries)
}

/// Split flow content on top-level commas
fn split_flow(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(inner[start..].trim());
    parts
}

fn parse_number(raw: &str) -> Option<f64> {
    let first = raw.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '-' | '+' | '.')) {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn unquote(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(raw: &str) -> FieldValue {
        FieldValue::Number {
            value: raw.parse().unwrap(),
            raw: raw.to_string(),
        }
    }

    #[test]
    fn decode_scalars() {
        assert_eq!(decode(""), FieldValue::Empty);
        assert_eq!(decode("  "), FieldValue::Empty);
        assert_eq!(decode("1"), num("1"));
        assert_eq!(decode("-0.5"), num("-0.5"));
        assert_eq!(decode("true"), FieldValue::Bool(true));
        assert_eq!(decode("Main Camera"), FieldValue::Text("Main Camera".into()));
        assert_eq!(decode("\"quoted\""), FieldValue::Text("quoted".into()));
    }

    #[test]
    fn decode_does_not_treat_words_as_numbers() {
        assert_eq!(decode("NaN"), FieldValue::Text("NaN".into()));
        assert_eq!(decode("inf"), FieldValue::Text("inf".into()));
    }

    #[test]
    fn decode_inline_vector() {
        let value = decode("{x: 0, y: 1.5, z: -10}");
        let parts = value.as_vector().unwrap();
        assert_eq!(parts.x, Some(0.0));
        assert_eq!(parts.y, Some(1.5));
        assert_eq!(parts.z, Some(-10.0));
        assert_eq!(parts.w, None);
    }

    #[test]
    fn decode_reference() {
        assert_eq!(decode("{fileID: 1234}").as_handle(), Some(1234));
        assert_eq!(decode("{fileID: 0}").as_handle(), None);

        match decode("{fileID: 11500000, guid: abc123, type: 3}") {
            FieldValue::Reference(r) => {
                assert_eq!(r.file_id, 11_500_000);
                assert_eq!(r.guid.as_deref(), Some("abc123"));
            }
            other => panic!("expected reference, got {other:?}"),
        }
    }

    #[test]
    fn decode_reference_keeps_64_bit_ids() {
        assert_eq!(
            decode("{fileID: 8926484042661614082}").as_handle(),
            Some(8_926_484_042_661_614_082)
        );
        assert_eq!(
            decode("{fileID: -4216859302048453862}").as_handle(),
            Some(-4_216_859_302_048_453_862)
        );
    }

    #[test]
    fn decode_flow_list() {
        assert_eq!(decode("[]"), FieldValue::List(vec![]));
        let list = decode("[{fileID: 1}, {fileID: 2}]");
        match list {
            FieldValue::List(items) => {
                let handles: Vec<_> = items.iter().filter_map(FieldValue::as_handle).collect();
                assert_eq!(handles, vec![1, 2]);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn decode_other_flow_map() {
        match decode("{r: 1, g: 0.5, b: 0, a: 1}") {
            FieldValue::Map(m) => assert_eq!(m.get("g"), Some(&num("0.5"))),
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn bool_from_flag() {
        assert_eq!(num("0").as_bool(), Some(false));
        assert_eq!(num("1").as_bool(), Some(true));
        assert_eq!(FieldValue::Empty.as_bool(), None);
    }

    #[test]
    fn text_keeps_number_spelling() {
        for token in ["42", "007", "1.10", "1e3", "+5"] {
            assert_eq!(decode(token).as_text().as_deref(), Some(token));
        }
        assert_eq!(decode("1.10").as_f64(), Some(1.1));
    }
}
