use serde::Serialize;

/// A clinician-entered value: a number when it parses, otherwise the text as typed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Text(String),
}

impl FormValue {
    /// Single parse rule shared by every numeric form field.
    ///
    /// Returns `None` for null, empty or whitespace-only input so that the
    /// caller omits the field entirely.
    pub fn parse(raw: &serde_json::Value) -> Option<Self> {
        match raw {
            serde_json::Value::Null => None,
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(v) if v.is_finite() => Some(Self::Number(v)),
                _ => Some(Self::Text(n.to_string())),
            },
            serde_json::Value::String(s) => Self::parse_str(s),
            other => Some(Self::Text(other.to_string())),
        }
    }

    pub fn parse_str(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match parse_decimal(trimmed) {
            Some(v) => Self::Number(v),
            None => Self::Text(trimmed.to_string()),
        })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl std::fmt::Display for FormValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Parse a trimmed decimal, accepting a comma as the decimal separator.
/// Non-finite results are rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: f64 = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replacen(',', ".", 1).parse().ok()?
    } else {
        trimmed.parse().ok()?
    };
    value.is_finite().then_some(value)
}

/// Interpret an arbitrary JSON value as a finite number.
pub fn json_number(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_parse() {
        assert_eq!(FormValue::parse(&json!(72)), Some(FormValue::Number(72.0)));
        assert_eq!(FormValue::parse(&json!(" 98.5 ")), Some(FormValue::Number(98.5)));
        assert_eq!(FormValue::parse(&json!("36,8")), Some(FormValue::Number(36.8)));
    }

    #[test]
    fn empty_values_are_omitted() {
        assert_eq!(FormValue::parse(&json!(null)), None);
        assert_eq!(FormValue::parse(&json!("")), None);
        assert_eq!(FormValue::parse(&json!("   ")), None);
    }

    #[test]
    fn non_numeric_text_is_preserved() {
        assert_eq!(
            FormValue::parse(&json!("about 120")),
            Some(FormValue::Text("about 120".into()))
        );
    }

    #[test]
    fn non_finite_strings_fall_back_to_text() {
        let parsed = FormValue::parse(&json!("inf")).unwrap();
        assert!(parsed.is_text());
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn zero_is_a_number() {
        assert_eq!(FormValue::parse(&json!("0")), Some(FormValue::Number(0.0)));
    }

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_string(&FormValue::Number(80.0)).unwrap(), "80.0");
        assert_eq!(
            serde_json::to_string(&FormValue::Text("n/a".into())).unwrap(),
            "\"n/a\""
        );
    }

    #[test]
    fn json_number_accepts_strings_and_rejects_garbage() {
        assert_eq!(json_number(&json!("7.31")), Some(7.31));
        assert_eq!(json_number(&json!(4)), Some(4.0));
        assert_eq!(json_number(&json!("abc")), None);
        assert_eq!(json_number(&json!(true)), None);
        assert_eq!(json_number(&json!(null)), None);
    }
}
