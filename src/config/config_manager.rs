// ==========================================
// IT 资产台账系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (scope_id='global')
// ==========================================

use crate::config::import_config_trait::{
    ImportConfigReader, DEFAULT_BATCH_SIZE, DEFAULT_MAX_BULK_ASSETS, DEFAULT_MAX_ERROR_DETAILS,
    DEFAULT_MAX_SPREADSHEET_ROWS, DEFAULT_MAX_UPLOAD_BYTES,
};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })?;
        ensure_schema(&conn).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager（共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", e),
        })?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// 写入配置值（global scope，存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", e),
        })?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// 读取正整数配置；缺失或格式错误时回退默认值
    fn get_positive_usize(&self, key: &str, default: usize) -> ImportResult<usize> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const IMPORT_BATCH_SIZE: &str = "import/batch_size";
    pub const IMPORT_MAX_SPREADSHEET_ROWS: &str = "import/max_spreadsheet_rows";
    pub const IMPORT_MAX_BULK_ASSETS: &str = "import/max_bulk_assets";
    pub const IMPORT_MAX_ERROR_DETAILS: &str = "import/max_error_details";
    pub const IMPORT_MAX_UPLOAD_BYTES: &str = "import/max_upload_bytes";
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_batch_size(&self) -> ImportResult<usize> {
        self.get_positive_usize(config_keys::IMPORT_BATCH_SIZE, DEFAULT_BATCH_SIZE)
    }

    async fn get_max_spreadsheet_rows(&self) -> ImportResult<usize> {
        self.get_positive_usize(
            config_keys::IMPORT_MAX_SPREADSHEET_ROWS,
            DEFAULT_MAX_SPREADSHEET_ROWS,
        )
    }

    async fn get_max_bulk_assets(&self) -> ImportResult<usize> {
        self.get_positive_usize(config_keys::IMPORT_MAX_BULK_ASSETS, DEFAULT_MAX_BULK_ASSETS)
    }

    async fn get_max_error_details(&self) -> ImportResult<usize> {
        self.get_positive_usize(
            config_keys::IMPORT_MAX_ERROR_DETAILS,
            DEFAULT_MAX_ERROR_DETAILS,
        )
    }

    async fn get_max_upload_bytes(&self) -> ImportResult<usize> {
        self.get_positive_usize(config_keys::IMPORT_MAX_UPLOAD_BYTES, DEFAULT_MAX_UPLOAD_BYTES)
    }
}
