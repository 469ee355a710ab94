use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// 错误响应体: `{ "error": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

/// 应用统一错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 输入校验失败, 消息直接展示给用户
    #[error("{0}")]
    Validation(String),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    /// 远端返回的 `{error}` 原文
    #[error("{0}")]
    Remote(String),

    #[error("operation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("no document loaded")]
    NoDocument,

    #[error("a save is already in progress")]
    SubmitInFlight,
}

impl AppError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Remote(_) | AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::SubmitInFlight => StatusCode::CONFLICT,
            AppError::NoDocument => StatusCode::BAD_REQUEST,
            AppError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Csv(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 面向用户的消息; 内部错误只给出通用提示
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Csv(_) | AppError::Io(_) => {
                "An unexpected error occurred".to_string()
            }
            AppError::Http(_) => "Unable to reach the server".to_string(),
            other => other.to_string(),
        }
    }

    fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!("request failed: {:?}", self);
        } else {
            tracing::warn!("request rejected: {}", self);
        }
        let body = ErrorBody {
            error: self.user_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
