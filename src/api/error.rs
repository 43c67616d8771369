// ==========================================
// IT 资产台账系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Import / Repository 错误为用户可读的错误消息
// 输出: 统一响应信封 { success: false, data, message } + HTTP 状态码
// ==========================================

use crate::api::response::ApiResponse;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误 (4xx)
    // ==========================================
    #[error("{0}")]
    InvalidInput(String),

    /// 输入被拒绝，同时返回诊断数据
    #[error("{message}")]
    Rejected { message: String, data: Value },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // ==========================================
    // 数据访问错误 (5xx)
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::Rejected { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),

            // 约束错误
            RepositoryError::UniqueConstraintViolation(_) => {
                ApiError::Conflict("Asset with this serial number already exists".to_string())
            }
            RepositoryError::CheckConstraintViolation(msg)
            | RepositoryError::NotNullViolation(msg) => {
                ApiError::InvalidInput(format!("字段值违反约束: {}", msg))
            }
            RepositoryError::FieldValueError { message, .. } => ApiError::InvalidInput(message),

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if let ImportError::AllRowsEmpty {
            total_rows,
            skipped,
        } = &err
        {
            return ApiError::Rejected {
                message: err.to_string(),
                data: json!({
                    "totalRows": total_rows,
                    "skippedEmptyRows": skipped,
                    "created": 0,
                }),
            };
        }

        match err {
            e if e.is_input_rejection() => ApiError::InvalidInput(e.to_string()),
            ImportError::Repository(e) => ApiError::from(e),
            ImportError::Other(e) => ApiError::Other(e),
            e => ApiError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "请求处理失败");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "请求被拒绝");
        }

        let message = self.to_string();
        let data = match self {
            ApiError::Rejected { data, .. } => Some(data),
            _ => None,
        };

        (status, Json(ApiResponse::<Value>::failure(data, message))).into_response()
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
