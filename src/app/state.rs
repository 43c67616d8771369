// ==========================================
// IT 资产台账系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 共享资源: 单个 Arc<Mutex<Connection>>（仓储与配置共用）
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{AssetApi, ImportApi};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::importer::AssetImporterImpl;
use crate::repository::AssetRepositoryImpl;

/// 应用状态
///
/// 包含所有API实例和共享资源，作为 axum 路由状态
#[derive(Clone)]
pub struct AppState {
    /// 资产管理API
    pub asset_api: Arc<AssetApi>,

    /// 资产导入API
    pub import_api: Arc<ImportApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn =
            open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        Self::from_connection(conn).await
    }

    /// 基于已打开的连接创建AppState（建表 + 组装各层）
    pub async fn from_connection(conn: Connection) -> Result<Self, String> {
        ensure_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层与配置
        // ==========================================
        let asset_repo = Arc::new(
            AssetRepositoryImpl::from_connection(conn.clone())
                .map_err(|e| format!("初始化AssetRepository失败: {}", e))?,
        );
        let config = Arc::new(ConfigManager::from_connection(conn));

        let limits = config
            .load_import_limits()
            .await
            .map_err(|e| format!("读取导入配置失败: {}", e))?;

        // ==========================================
        // 初始化API层
        // ==========================================
        let importer = AssetImporterImpl::new(asset_repo.clone(), config.clone());
        let import_api = Arc::new(ImportApi::new(Arc::new(importer)));
        let asset_api = Arc::new(AssetApi::new(asset_repo));

        tracing::info!(
            max_upload_bytes = limits.max_upload_bytes,
            max_spreadsheet_rows = limits.max_spreadsheet_rows,
            batch_size = limits.batch_size,
            "AppState初始化完成"
        );

        Ok(Self {
            asset_api,
            import_api,
            config,
        })
    }
}

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 IT_ASSET_DB_PATH（非空时）
/// - 否则: 用户数据目录/it-asset-tracker/it_assets.db
/// - 无法获取数据目录时: ./it_assets.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("IT_ASSET_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./it_assets.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("it-asset-tracker");
        // 确保目录存在；失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("it_assets.db");
        }
    }

    path.to_string_lossy().to_string()
}
