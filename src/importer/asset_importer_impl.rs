// ==========================================
// IT 资产台账系统 - 资产导入器实现
// ==========================================
// 职责: 串联导入管道，从上传内容到落库报告
// 流程: 解析 → 行数检查 → 映射 → 规范化 → 空行过滤 → 分批落库 → 报告
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::asset::AssetInput;
use crate::domain::import::{BulkImportResult, ImportReport};
use crate::importer::asset_importer_trait::{
    AssetImporter, DataCleaner, FieldMapper, FileParser, RowFilter,
};
use crate::importer::batch_inserter::{BatchInserter, PendingInsert};
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::report_builder::ReportBuilder;
use crate::importer::row_filter::RowFilter as RowFilterImpl;
use crate::repository::asset_repo::AssetRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// AssetImporterImpl - 资产导入器实现
// ==========================================
pub struct AssetImporterImpl<R, C>
where
    R: AssetRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    repo: Arc<R>,

    // 配置读取器
    config: Arc<C>,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    data_cleaner: Box<dyn DataCleaner>,
    row_filter: Box<dyn RowFilter>,
}

impl<R, C> AssetImporterImpl<R, C>
where
    R: AssetRepository,
    C: ImportConfigReader,
{
    /// 使用默认组件创建导入器
    pub fn new(repo: Arc<R>, config: Arc<C>) -> Self {
        Self::with_components(
            repo,
            config,
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl),
            Box::new(DataCleanerImpl),
            Box::new(RowFilterImpl),
        )
    }

    /// 指定各阶段组件创建导入器
    pub fn with_components(
        repo: Arc<R>,
        config: Arc<C>,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        data_cleaner: Box<dyn DataCleaner>,
        row_filter: Box<dyn RowFilter>,
    ) -> Self {
        Self {
            repo,
            config,
            file_parser,
            field_mapper,
            data_cleaner,
            row_filter,
        }
    }

    fn require_creator(created_by: &str) -> ImportResult<&str> {
        let trimmed = created_by.trim();
        if trimmed.is_empty() {
            return Err(ImportError::MissingCreator);
        }
        Ok(trimmed)
    }
}

#[async_trait]
impl<R, C> AssetImporter for AssetImporterImpl<R, C>
where
    R: AssetRepository,
    C: ImportConfigReader,
{
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn import_spreadsheet(
        &self,
        bytes: &[u8],
        file_name: Option<&str>,
        created_by: &str,
    ) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let created_by = Self::require_creator(created_by)?;
        let limits = self.config.load_import_limits().await?;

        if bytes.is_empty() {
            return Err(ImportError::EmptySheet);
        }
        if bytes.len() > limits.max_upload_bytes {
            return Err(ImportError::FileTooLarge {
                size: bytes.len(),
                max: limits.max_upload_bytes,
            });
        }

        // === 步骤 1: 解析文件（行数上限在转换单元格之前检查）===
        debug!("步骤 1: 解析文件");
        let raw_rows = self
            .file_parser
            .parse_bytes(bytes, file_name, limits.max_spreadsheet_rows)
            .map_err(|e| {
                warn!(error = %e, "文件解析失败");
                e
            })?;

        // === 步骤 2: 空表检查 ===
        let total_rows = raw_rows.len();
        if total_rows == 0 {
            return Err(ImportError::EmptySheet);
        }
        info!(total_rows = total_rows, "文件解析完成");

        if let Some(first) = raw_rows.first() {
            let headers: Vec<String> = first.cells.iter().map(|(h, _)| h.clone()).collect();
            let matched = self.field_mapper.matched_headers(&headers);
            debug!(
                headers = headers.len(),
                matched = matched.len(),
                "表头识别: {:?}",
                matched
            );
        }

        // === 步骤 3: 映射 + 规范化 ===
        debug!("步骤 3: 列映射与行规范化");
        let now = Utc::now();
        let normalized: Vec<_> = raw_rows
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let mapped = self.field_mapper.map_row(raw);
                self.data_cleaner
                    .normalize_row(&mapped, idx + 1, created_by, now)
            })
            .collect();

        // === 步骤 4: 空行过滤 ===
        let (kept, skipped_empty_rows) = self.row_filter.retain_meaningful(normalized);
        if kept.is_empty() {
            warn!(
                total_rows = total_rows,
                skipped_empty_rows = skipped_empty_rows,
                "全部为空行"
            );
            return Err(ImportError::AllRowsEmpty {
                total_rows,
                skipped: skipped_empty_rows,
            });
        }
        info!(
            kept_rows = kept.len(),
            skipped_empty_rows = skipped_empty_rows,
            "空行过滤完成"
        );

        // === 步骤 5: 分批落库 ===
        let pending = kept
            .into_iter()
            .map(|row| PendingInsert {
                source_row: Some(row.source_row),
                record: row.record,
            })
            .collect();
        let inserter = BatchInserter::new(limits.batch_size);
        let result = inserter
            .insert_all(self.repo.as_ref(), pending)
            .await
            .map_err(|e| {
                error!(error = %e, "批量写入中止");
                e
            })?;

        // === 步骤 6: 报告 ===
        let report =
            ReportBuilder::new(limits.max_error_details).build(total_rows, skipped_empty_rows, &result);

        info!(
            total_rows = report.total_rows,
            created = report.created,
            failed = report.failed,
            skipped_empty_rows = report.skipped_empty_rows,
            batches = result.batches,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "表格导入完成"
        );

        Ok(report)
    }

    #[instrument(skip(self, assets), fields(count = assets.len()))]
    async fn import_json_assets(
        &self,
        assets: Vec<AssetInput>,
        created_by: &str,
    ) -> ImportResult<BulkImportResult> {
        let start_time = Instant::now();
        let created_by = Self::require_creator(created_by)?;

        if assets.is_empty() {
            return Err(ImportError::EmptyAssetList);
        }
        let limits = self.config.load_import_limits().await?;
        if assets.len() > limits.max_bulk_assets {
            return Err(ImportError::TooManyAssets {
                actual: assets.len(),
                max: limits.max_bulk_assets,
            });
        }

        let pending = assets
            .into_iter()
            .map(|input| PendingInsert {
                source_row: None,
                record: self.data_cleaner.clean_input(input, created_by),
            })
            .collect();

        let inserter = BatchInserter::new(limits.batch_size);
        let result = inserter.insert_all(self.repo.as_ref(), pending).await?;
        let bulk = ReportBuilder::new(limits.max_error_details).build_bulk(result);

        info!(
            created = bulk.created,
            failed = bulk.failed,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "JSON 批量创建完成"
        );

        Ok(bulk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportLimits;
    use crate::repository::asset_repo_impl::AssetRepositoryImpl;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn importer(limits: ImportLimits) -> AssetImporterImpl<AssetRepositoryImpl, ImportLimits> {
        let conn = Connection::open_in_memory().unwrap();
        let repo = AssetRepositoryImpl::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        AssetImporterImpl::new(Arc::new(repo), Arc::new(limits))
    }

    fn input(serial: &str) -> AssetInput {
        AssetInput {
            serial_number: Some(serial.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_spreadsheet_requires_creator() {
        let importer = importer(ImportLimits::default());
        let err = importer
            .import_spreadsheet(b"Company\nAcme\n", Some("a.csv"), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingCreator));
    }

    #[tokio::test]
    async fn test_spreadsheet_header_only_is_empty_sheet() {
        let importer = importer(ImportLimits::default());
        let err = importer
            .import_spreadsheet(b"Company,Dept\n", Some("a.csv"), "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::EmptySheet));
    }

    #[tokio::test]
    async fn test_spreadsheet_size_limit() {
        let limits = ImportLimits {
            max_upload_bytes: 8,
            ..Default::default()
        };
        let err = importer(limits)
            .import_spreadsheet(b"Company\nAcme\n", Some("a.csv"), "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::FileTooLarge { max: 8, .. }));
    }

    #[tokio::test]
    async fn test_spreadsheet_small_batches() {
        let limits = ImportLimits {
            batch_size: 2,
            ..Default::default()
        };
        let importer = importer(limits);
        let csv = "Serial Number,Company\nA1,Acme\nA2,Acme\nA1,Acme\n,\nA4,Acme\n";
        let report = importer
            .import_spreadsheet(csv.as_bytes(), Some("a.csv"), "u1")
            .await
            .unwrap();

        assert_eq!(report.total_rows, 5);
        assert_eq!(report.created, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped_empty_rows, 1);
        let err = &report.insert_errors[0];
        assert_eq!(err.row, Some(4));
        assert_eq!(err.batch, 1);
        assert_eq!(err.index, 0);
        assert_eq!(err.message, "Duplicate serial number");
    }

    #[tokio::test]
    async fn test_json_limits() {
        let limits = ImportLimits {
            max_bulk_assets: 2,
            ..Default::default()
        };
        let importer = importer(limits);

        let err = importer.import_json_assets(vec![], "u1").await.unwrap_err();
        assert!(matches!(err, ImportError::EmptyAssetList));

        let err = importer
            .import_json_assets(vec![input("A"), input("B"), input("C")], "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::TooManyAssets { actual: 3, max: 2 }));

        let err = importer
            .import_json_assets(vec![input("A")], "")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingCreator));
    }

    #[tokio::test]
    async fn test_json_missing_serial_is_row_failure() {
        let importer = importer(ImportLimits::default());
        let result = importer
            .import_json_assets(vec![input("J1"), AssetInput::default()], "u1")
            .await
            .unwrap();

        assert_eq!(result.created, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors[0].index, 1);
        assert_eq!(result.errors[0].message, "serialNumber is required");
        assert_eq!(result.assets[0].created_by, "u1");
    }
}
