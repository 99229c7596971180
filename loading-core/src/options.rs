use serde::{de::Unexpected, Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Options used when constructing a [`Loading`](crate::Loading)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Initial state. Active when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Options {
    pub fn new(active: bool) -> Self {
        Self {
            active: Some(active),
        }
    }

    /// Reads options from a host supplied value.
    ///
    /// `null` is treated as no options. Unknown keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => match map.get("active") {
                None | Some(Value::Bool(_)) | Some(Value::Null) => {
                    Ok(serde_json::from_value(value.clone())?)
                }
                Some(other) => Err(Error::InvalidStateArgument {
                    found: type_name(other),
                }),
            },
            other => Err(Error::Options(serde::de::Error::invalid_type(
                unexpected(other),
                &"an options object or null",
            ))),
        }
    }

    pub(crate) fn resolve_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(v) => Unexpected::Bool(*v),
        Value::Number(_) => Unexpected::Other("a number"),
        Value::String(v) => Unexpected::Str(v),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// Name of the JSON type of `value`, for error messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_to_active() {
        assert!(Options::default().resolve_active());
        assert!(Options::from_value(&Value::Null).unwrap().resolve_active());
        assert!(Options::from_value(&json!({})).unwrap().resolve_active());
        assert!(!Options::new(false).resolve_active());
    }

    #[test]
    fn from_value() {
        let options = Options::from_value(&json!({ "active": false, "delay": 100 })).unwrap();
        assert_eq!(options, Options::new(false));

        assert!(matches!(
            Options::from_value(&json!({ "active": "false" })),
            Err(Error::InvalidStateArgument { found: "a string" })
        ));
        assert!(matches!(
            Options::from_value(&json!(false)),
            Err(Error::Options(_))
        ));
        assert!(matches!(
            Options::from_value(&json!([false])),
            Err(Error::Options(_))
        ));
        assert!(matches!(
            Options::from_value(&json!([])),
            Err(Error::Options(_))
        ));
        assert!(matches!(
            Options::from_value(&json!("active")),
            Err(Error::Options(_))
        ));
    }
}
