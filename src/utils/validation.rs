use serde::de::{Deserialize, Deserializer, Error};
use serde_json::Value;
use validator::ValidationErrors;

/// Accepts a JSON string, number or boolean and yields its text form.
/// `null` yields an empty string so the field fails the required check
/// instead of the whole body failing to parse.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string value, found {}",
            kind_of(&other)
        ))),
    }
}

/// Like [`lenient_string`], but an empty result becomes `None`.
pub fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer).map(|s| if s.is_empty() { None } else { Some(s) })
}

/// Flattens validator output into a sorted list of offending wire field names.
///
/// Each rule's `message` carries the field's wire name (`fileUrl`, `BMPReff`);
/// rules without one fall back to the Rust field key.
pub fn collect_fields(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| field.to_string())
            })
        })
        .collect();
    fields.sort();
    fields.dedup();
    fields
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
        _ => "a scalar",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Lenient {
        #[serde(default, deserialize_with = "lenient_string")]
        value: String,
        #[serde(default, deserialize_with = "lenient_optional_string")]
        name: Option<String>,
    }

    #[test]
    fn test_lenient_string_accepts_scalars() {
        let p: Lenient = serde_json::from_str(r#"{"value": 42}"#).unwrap();
        assert_eq!(p.value, "42");
        let p: Lenient = serde_json::from_str(r#"{"value": true}"#).unwrap();
        assert_eq!(p.value, "true");
        let p: Lenient = serde_json::from_str(r#"{"value": "abc"}"#).unwrap();
        assert_eq!(p.value, "abc");
    }

    #[test]
    fn test_lenient_string_null_and_missing_are_empty() {
        let p: Lenient = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(p.value, "");
        let p: Lenient = serde_json::from_str("{}").unwrap();
        assert_eq!(p.value, "");
        assert!(p.name.is_none());
    }

    #[test]
    fn test_lenient_string_rejects_objects() {
        let res: Result<Lenient, _> = serde_json::from_str(r#"{"value": {"a": 1}}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_optional_empty_is_none() {
        let p: Lenient = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(p.name.is_none());
        let p: Lenient = serde_json::from_str(r#"{"name": "a.pdf"}"#).unwrap();
        assert_eq!(p.name.as_deref(), Some("a.pdf"));
    }
}
