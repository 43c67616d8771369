// ==========================================
// IT 资产台账系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 单行插入失败不是错误，记录在导入报告中
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 请求校验错误（整单拒绝，不处理任何行）=====
    #[error("createdBy is required")]
    MissingCreator,

    #[error("No file uploaded")]
    MissingFile,

    #[error("assets must be a non-empty array")]
    EmptyAssetList,

    #[error("Too many assets: {actual} (max {max} per request)")]
    TooManyAssets { actual: usize, max: usize },

    #[error("File too large: {size} bytes (max {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("The spreadsheet contains no data rows")]
    EmptySheet,

    #[error("Too many rows: {actual} (max {max} rows per file)")]
    TooManyRows { actual: usize, max: usize },

    #[error("All {total_rows} rows are empty; nothing to import")]
    AllRowsEmpty { total_rows: usize, skipped: usize },

    // ===== 文件相关错误 =====
    #[error("Unsupported file format: {0} (expected .xlsx/.xls/.ods/.csv)")]
    UnsupportedFormat(String),

    #[error("The file is password protected. Remove the password and upload again")]
    PasswordProtected,

    #[error("Unable to read spreadsheet: {0}")]
    ExcelParseError(String),

    #[error("Unable to read CSV: {0}")]
    CsvParseError(String),

    // ===== 存储 / 配置错误（整单失败）=====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 输入拒绝类错误（HTTP 400）
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            ImportError::MissingCreator
                | ImportError::MissingFile
                | ImportError::EmptyAssetList
                | ImportError::TooManyAssets { .. }
                | ImportError::FileTooLarge { .. }
                | ImportError::EmptySheet
                | ImportError::TooManyRows { .. }
                | ImportError::AllRowsEmpty { .. }
                | ImportError::UnsupportedFormat(_)
                | ImportError::PasswordProtected
                | ImportError::ExcelParseError(_)
                | ImportError::CsvParseError(_)
        )
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        let message = err.to_string();
        if message.to_lowercase().contains("password") {
            ImportError::PasswordProtected
        } else {
            ImportError::ExcelParseError(message)
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_rejection_classification() {
        assert!(ImportError::MissingCreator.is_input_rejection());
        assert!(ImportError::PasswordProtected.is_input_rejection());
        assert!(ImportError::AllRowsEmpty {
            total_rows: 3,
            skipped: 3
        }
        .is_input_rejection());
        assert!(!ImportError::InternalError("x".to_string()).is_input_rejection());
        assert!(!ImportError::Repository(RepositoryError::LockError("x".to_string()))
            .is_input_rejection());
    }

    #[test]
    fn test_too_many_rows_message() {
        let err = ImportError::TooManyRows {
            actual: 5001,
            max: 5000,
        };
        assert_eq!(err.to_string(), "Too many rows: 5001 (max 5000 rows per file)");
    }
}
