//! 规则 API 错误类型定义

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rule_engine::{EvalError, ParseError, RuleError};
use serde_json::json;

/// 规则 API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("{0}")]
    Rule(#[from] RuleError),

    #[error("规则不存在: {0}")]
    RuleNotFound(i64),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Rule(_) => StatusCode::BAD_REQUEST,
            Self::RuleNotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Rule(e) => e.code(),
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Database operation failed");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        Self::Rule(RuleError::Parse(err))
    }
}

impl From<EvalError> for ApiError {
    fn from(err: EvalError) -> Self {
        Self::Rule(RuleError::Eval(err))
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
