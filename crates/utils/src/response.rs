use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Uniform JSON envelope returned by every API handler.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ApiResponse<T, E = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_data: Option<E>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T, E> ApiResponse<T, E> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error_data: None,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error_data: None,
            message: Some(message.into()),
        }
    }

    pub fn error_with_data(message: impl Into<String>, error_data: E) -> Self {
        Self {
            success: false,
            data: None,
            error_data: Some(error_data),
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_error_fields() {
        let json =
            serde_json::to_value(ApiResponse::<_, ()>::success(vec![1, 2, 3])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][0], 1);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn error_envelope_carries_message_and_data() {
        let json = serde_json::to_value(ApiResponse::<(), _>::error_with_data(
            "validation failed",
            vec!["q1"],
        ))
        .unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "validation failed");
        assert_eq!(json["error_data"][0], "q1");
    }
}
