// ==========================================
// IT 资产台账系统 - 导入层
// ==========================================
// 职责: 表格 / JSON 批量导入，生成资产记录
// 支持: Excel (.xlsx/.xls/.ods), CSV, 结构化 JSON
// ==========================================

// 模块声明
pub mod asset_importer_impl;
pub mod asset_importer_trait;
pub mod batch_inserter;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod report_builder;
pub mod row_filter;

// 重导出核心类型
pub use asset_importer_impl::AssetImporterImpl;
pub use batch_inserter::{BatchInserter, PendingInsert, DUPLICATE_SERIAL_MESSAGE};
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use report_builder::ReportBuilder;
pub use row_filter::RowFilter as RowFilterImpl;

// 重导出 Trait 接口
pub use asset_importer_trait::{AssetImporter, DataCleaner, FieldMapper, FileParser, RowFilter};
