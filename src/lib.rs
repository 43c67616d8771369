// ==========================================
// IT 资产台账系统 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 核心流程: 表格 → 规范化记录 → 分批无序写入 + 单行失败报告
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 批量导入管道
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口与 HTTP 路由
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AssetStatus, DeviceCategory};

// 领域实体
pub use domain::{
    Asset, AssetInput, AssetPage, AssetPatch, AssetQuery, AssetStats, BulkImportResult,
    ImportReport, InsertError, NewAsset,
};

// 导入器
pub use importer::{AssetImporter, AssetImporterImpl};

// API
pub use api::{build_router, AssetApi, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "IT 资产台账系统";
