// ==========================================
// IT 资产台账系统 - 应用层
// ==========================================
// 职责: 组装各层实例，为 HTTP 路由提供共享状态
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
