use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// 远端写操作统一回执 `{status, message?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub const SUCCESS: &'static str = "success";

    pub fn success() -> Self {
        Self {
            status: Self::SUCCESS.to_string(),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: "failure".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }

    /// 非 success 一律视为业务失败，优先带上服务端消息
    pub fn into_result(self) -> Result<(), RemoteError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(RemoteError::rejected(self.message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_keeps_server_message() {
        let err = Envelope::failure("event locked").into_result().unwrap_err();
        assert_eq!(err, RemoteError::Rejected { message: "event locked".to_string() });
    }

    #[test]
    fn missing_message_falls_back() {
        let envelope: Envelope = serde_json::from_str(r#"{"status":"error"}"#).unwrap();
        let err = envelope.into_result().unwrap_err();
        assert_eq!(err.to_string(), "request failed");
    }

    #[test]
    fn only_exact_success_passes() {
        let envelope: Envelope = serde_json::from_str(r#"{"status":"Success"}"#).unwrap();
        assert!(!envelope.is_success());
        assert!(Envelope::success().into_result().is_ok());
    }
}
