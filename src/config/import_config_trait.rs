// ==========================================
// IT 资产台账系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ===== 默认值 =====

/// 每批插入行数
pub const DEFAULT_BATCH_SIZE: usize = 500;
/// 单个表格最大数据行数
pub const DEFAULT_MAX_SPREADSHEET_ROWS: usize = 5_000;
/// JSON 批量创建最大元素数
pub const DEFAULT_MAX_BULK_ASSETS: usize = 1_000;
/// 导入报告中保留的失败明细条数
pub const DEFAULT_MAX_ERROR_DETAILS: usize = 50;
/// 上传文件大小上限（字节）
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// ==========================================
// ImportLimits - 单次请求使用的配置快照
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLimits {
    pub batch_size: usize,
    pub max_spreadsheet_rows: usize,
    pub max_bulk_assets: usize,
    pub max_error_details: usize,
    pub max_upload_bytes: usize,
}

impl Default for ImportLimits {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_spreadsheet_rows: DEFAULT_MAX_SPREADSHEET_ROWS,
            max_bulk_assets: DEFAULT_MAX_BULK_ASSETS,
            max_error_details: DEFAULT_MAX_ERROR_DETAILS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 每批插入行数
    ///
    /// # 默认值
    /// - 500
    async fn get_batch_size(&self) -> ImportResult<usize>;

    /// 单个表格最大数据行数（超过则整单拒绝）
    ///
    /// # 默认值
    /// - 5000
    async fn get_max_spreadsheet_rows(&self) -> ImportResult<usize>;

    /// JSON 批量创建最大元素数
    ///
    /// # 默认值
    /// - 1000
    async fn get_max_bulk_assets(&self) -> ImportResult<usize>;

    /// 导入报告中保留的失败明细条数
    ///
    /// # 默认值
    /// - 50
    async fn get_max_error_details(&self) -> ImportResult<usize>;

    /// 上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 10 MB
    async fn get_max_upload_bytes(&self) -> ImportResult<usize>;

    /// 一次性读取全部导入限制
    async fn load_import_limits(&self) -> ImportResult<ImportLimits> {
        Ok(ImportLimits {
            batch_size: self.get_batch_size().await?,
            max_spreadsheet_rows: self.get_max_spreadsheet_rows().await?,
            max_bulk_assets: self.get_max_bulk_assets().await?,
            max_error_details: self.get_max_error_details().await?,
            max_upload_bytes: self.get_max_upload_bytes().await?,
        })
    }
}

/// 固定配置（测试 / 无数据库场景）
#[async_trait]
impl ImportConfigReader for ImportLimits {
    async fn get_batch_size(&self) -> ImportResult<usize> {
        Ok(self.batch_size)
    }

    async fn get_max_spreadsheet_rows(&self) -> ImportResult<usize> {
        Ok(self.max_spreadsheet_rows)
    }

    async fn get_max_bulk_assets(&self) -> ImportResult<usize> {
        Ok(self.max_bulk_assets)
    }

    async fn get_max_error_details(&self) -> ImportResult<usize> {
        Ok(self.max_error_details)
    }

    async fn get_max_upload_bytes(&self) -> ImportResult<usize> {
        Ok(self.max_upload_bytes)
    }
}
