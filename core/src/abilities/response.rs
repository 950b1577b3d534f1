/// Uniform ability response envelope
///
/// Every native ability resolves to this shape; expected failures are
/// carried in `error` rather than raised past the execute boundary.
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AbilityFault>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityFault {
    pub code: String,
    pub message: String,
}

impl AbilityResponse {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn success_with_message(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(AbilityFault {
                code: code.into(),
                message: message.into(),
            }),
        }
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(&self).unwrap_or_else(|_| Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_omits_error() {
        let value = AbilityResponse::success(json!({"id": 1})).into_value();
        assert_eq!(value["success"], json!(true));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn error_envelope_carries_code_and_message() {
        let value = AbilityResponse::error("board_create_failed", "boom").into_value();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"]["code"], json!("board_create_failed"));
        assert_eq!(value["error"]["message"], json!("boom"));
    }
}
