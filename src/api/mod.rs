// ==========================================
// IT 资产台账系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口与 HTTP 路由
// ==========================================

pub mod asset_api;
pub mod error;
pub mod import_api;
pub mod response;
pub mod routes;

// 重导出核心类型
pub use asset_api::{AssetApi, CreateAssetRequest};
pub use error::{ApiError, ApiResult};
pub use import_api::{BulkCreateRequest, ImportApi};
pub use response::ApiResponse;
pub use routes::build_router;
