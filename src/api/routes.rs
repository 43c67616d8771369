// ==========================================
// IT 资产台账系统 - HTTP 路由
// ==========================================
// 职责: axum 路由注册 + 请求提取，业务逻辑委托给 AssetApi / ImportApi
// 响应: 统一信封 { success, data, message }
// ==========================================

use crate::api::asset_api::CreateAssetRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::import_api::BulkCreateRequest;
use crate::api::response;
use crate::app::AppState;
use crate::config::ImportConfigReader;
use crate::domain::asset::{AssetInput, AssetQuery};
use crate::importer::ImportError;
use axum::{
    extract::{
        multipart::Field,
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    http::{header, Method},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// createdBy 表单字段上限
const MAX_TEXT_FIELD_BYTES: usize = 4 * 1024;

/// 构建完整路由
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(health_check))
        .route("/assets", post(create_asset).get(list_assets))
        .route("/assets/bulk", post(bulk_create))
        .route(
            "/assets/upload-excel",
            // 上传大小由处理函数按当前配置逐块限制
            post(upload_excel).layer(DefaultBodyLimit::disable()),
        )
        .route("/assets/stats", get(asset_stats))
        .route(
            "/assets/:id",
            get(get_asset).put(update_asset).delete(delete_asset),
        )
        .route("/assets/:id/restore", post(restore_asset))
        .route("/assets/:id/permanent", delete(permanent_delete_asset))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::InvalidInput(e.body_text()))
}

// ==========================================
// 健康检查
// ==========================================
async fn health_check() -> Response {
    response::ok(
        json!({ "status": "ok", "version": crate::VERSION }),
        "Service is healthy",
    )
}

// ==========================================
// 批量导入
// ==========================================

/// POST /assets/bulk
async fn bulk_create(
    State(state): State<AppState>,
    payload: Result<Json<BulkCreateRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let request = json_body(payload)?;
    let result = state.import_api.bulk_create(request).await?;
    let message = format!(
        "{} assets created, {} failed",
        result.created, result.failed
    );
    Ok(response::created(result, message))
}

/// 分块读取 multipart 字段；累计超过 max 时停止读取，返回 Err(已读字节数)
async fn read_field_capped(
    field: &mut Field<'_>,
    max: usize,
) -> ApiResult<Result<Vec<u8>, usize>> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::InvalidInput(e.body_text()))?
    {
        if data.len() + chunk.len() > max {
            return Ok(Err(data.len() + chunk.len()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(Ok(data))
}

/// POST /assets/upload-excel（multipart: file + createdBy）
async fn upload_excel(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    // 每次请求读取当前上限，与导入器使用同一配置项
    let max_upload_bytes = state.config.get_max_upload_bytes().await?;

    let mut file: Option<(Option<String>, Vec<u8>)> = None;
    let mut created_by: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let data = read_field_capped(&mut field, max_upload_bytes)
                    .await?
                    .map_err(|size| ImportError::FileTooLarge {
                        size,
                        max: max_upload_bytes,
                    })?;
                file = Some((file_name, data));
            }
            Some("createdBy") => {
                let data = read_field_capped(&mut field, MAX_TEXT_FIELD_BYTES)
                    .await?
                    .map_err(|_| ApiError::InvalidInput("createdBy is too long".to_string()))?;
                created_by = Some(String::from_utf8_lossy(&data).into_owned());
            }
            _ => {}
        }
    }

    let report = state
        .import_api
        .upload_spreadsheet(file, created_by)
        .await?;
    let message = format!(
        "Imported {} of {} rows ({} failed, {} empty rows skipped)",
        report.created, report.total_rows, report.failed, report.skipped_empty_rows
    );
    Ok(response::created(report, message))
}

// ==========================================
// 资产管理
// ==========================================

/// POST /assets
async fn create_asset(
    State(state): State<AppState>,
    payload: Result<Json<CreateAssetRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let request = json_body(payload)?;
    let asset = state.asset_api.create_asset(request).await?;
    Ok(response::created(asset, "Asset created"))
}

/// GET /assets
async fn list_assets(
    State(state): State<AppState>,
    query: Result<Query<AssetQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    let page = state.asset_api.list_assets(&query).await?;
    Ok(response::ok(page, "Assets retrieved"))
}

/// GET /assets/stats
async fn asset_stats(State(state): State<AppState>) -> ApiResult<Response> {
    let stats = state.asset_api.asset_stats().await?;
    Ok(response::ok(stats, "Statistics retrieved"))
}

/// GET /assets/:id
async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let asset = state.asset_api.get_asset(&id).await?;
    Ok(response::ok(asset, "Asset retrieved"))
}

/// PUT /assets/:id
async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AssetInput>, JsonRejection>,
) -> ApiResult<Response> {
    let input = json_body(payload)?;
    let asset = state.asset_api.update_asset(&id, input).await?;
    Ok(response::ok(asset, "Asset updated"))
}

/// DELETE /assets/:id（软删除）
async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let asset = state.asset_api.delete_asset(&id).await?;
    Ok(response::ok(asset, "Asset deleted"))
}

/// POST /assets/:id/restore
async fn restore_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let asset = state.asset_api.restore_asset(&id).await?;
    Ok(response::ok(asset, "Asset restored"))
}

/// DELETE /assets/:id/permanent
async fn permanent_delete_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    state.asset_api.permanent_delete_asset(&id).await?;
    Ok(response::ok(json!({ "id": id }), "Asset permanently deleted"))
}
