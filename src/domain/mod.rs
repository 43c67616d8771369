// ==========================================
// IT 资产台账系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod asset;
pub mod import;
pub mod types;

// 重导出核心类型
pub use asset::{
    Asset, AssetInput, AssetPage, AssetPatch, AssetQuery, AssetStats, CountBucket, NewAsset,
    REMARK_MAX_LEN,
};
pub use import::{
    BatchInsertResult, BulkError, BulkImportResult, CanonicalField, CellValue, ImportReport,
    InsertError, InsertManyOutcome, MappedRow, NormalizedRow, RawImportRow, WriteError,
    WriteErrorKind, PLACEHOLDER,
};
pub use types::{AssetStatus, DeviceCategory};
