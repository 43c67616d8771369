// ==========================================
// IT 资产台账系统 - 统一响应信封
// ==========================================
// 格式: { success: bool, data: T | null, message: string }
// ==========================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }

    pub fn failure(data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            message: message.into(),
        }
    }
}

/// 成功响应（指定状态码）
pub fn respond<T: Serialize>(status: StatusCode, data: T, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::success(data, message))).into_response()
}

/// 200 OK
pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    respond(StatusCode::OK, data, message)
}

/// 201 Created
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    respond(StatusCode::CREATED, data, message)
}
