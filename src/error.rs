use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// 远端调用失败时的通用提示
pub const GENERIC_FAILURE: &str = "request failed";

/// 远端服务调用错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// 请求未完成 (连接失败、超时)
    #[error("transport failure: {0}")]
    Transport(String),
    /// 非 2xx 响应
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },
    /// 响应 status 不是 "success"
    #[error("{message}")]
    Rejected { message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn rejected(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        RemoteError::Rejected { message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("item index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// 账单编辑会话错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("bill is not in edit mode")]
    NotEditing,
    #[error("bill is already in edit mode")]
    AlreadyEditing,
    /// 响应属于已被替换的会话代次
    #[error("response belongs to a superseded session")]
    Stale,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to save bill: {0}")]
    Remote(#[from] RemoteError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no items selected")]
    EmptySelection,
    #[error("unknown group: {0}")]
    UnknownGroup(usize),
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("item index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("Failed to create long bill: {0}")]
    Remote(#[from] RemoteError),
}

/// API 层错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("session {0} not found")]
    SessionNotFound(String),
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

fn remote_status(err: &RemoteError) -> StatusCode {
    match err {
        RemoteError::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidUpload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Session(SessionError::Remote(e)) => remote_status(e),
            AppError::Session(SessionError::Store(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Session(SessionError::Stale) => StatusCode::GONE,
            AppError::Session(_) => StatusCode::CONFLICT,
            AppError::Selection(SelectionError::Remote(e)) => remote_status(e),
            AppError::Selection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Remote(e) => remote_status(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::warn!("request rejected: {}", self);
        }
        let body = ErrorResponse {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
