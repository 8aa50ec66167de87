use serde::{Deserialize, Serialize};

/// A single cell value as supplied by the host.
///
/// Dates and date-times travel as text; the column type decides how they are
/// parsed for filtering, sorting and display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Convert a JSON value. Arrays and objects are kept as their JSON text.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, or text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Canonical stringification used by text operators and global search.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }

    /// Numeric view: numbers as-is, text parsed after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Truth view: booleans, 1/0, and the usual yes/no spellings.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Number(n) if *n == 1.0 => Some(true),
            Value::Number(n) if *n == 0.0 => Some(false),
            Value::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" | "y" | "on" => Some(true),
                "false" | "no" | "0" | "n" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Integers print without a fraction; everything else uses the shortest form.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Number(42.0).to_text(), "42");
        assert_eq!(Value::Number(2.5).to_text(), "2.5");
        assert_eq!(Value::Bool(true).to_text(), "true");
        assert_eq!(Value::from("abc").to_text(), "abc");
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::from(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(Value::from("twelve").as_number(), None);
        assert_eq!(Value::Number(f64::NAN).as_number(), None);
        assert_eq!(Value::Bool(true).as_number(), None);
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(Value::from("Yes").as_bool(), Some(true));
        assert_eq!(Value::from("off").as_bool(), Some(false));
        assert_eq!(Value::Number(1.0).as_bool(), Some(true));
        assert_eq!(Value::from("maybe").as_bool(), None);
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 3, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![Value::Null, Value::Bool(true), Value::Number(3.0), Value::from("x")]
        );
    }

    #[test]
    fn test_from_json_nested() {
        let json = serde_json::json!({"a": 1});
        assert_eq!(Value::from_json(&json), Value::from(r#"{"a":1}"#));
    }
}
