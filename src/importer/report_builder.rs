// ==========================================
// IT 资产台账系统 - 导入报告汇总
// ==========================================
// 纯聚合: 计数 + 截断失败明细（无副作用）
// ==========================================

use crate::domain::import::{BatchInsertResult, BulkError, BulkImportResult, ImportReport};

pub struct ReportBuilder {
    max_error_details: usize,
}

impl ReportBuilder {
    pub fn new(max_error_details: usize) -> Self {
        Self { max_error_details }
    }

    /// 表格导入报告
    ///
    /// # 参数
    /// - total_rows: 解析出的数据行数（含空行）
    /// - skipped_empty_rows: 被空行过滤丢弃的行数
    /// - result: 分批写入累计结果
    pub fn build(
        &self,
        total_rows: usize,
        skipped_empty_rows: usize,
        result: &BatchInsertResult,
    ) -> ImportReport {
        ImportReport {
            total_rows,
            created: result.inserted.len(),
            failed: result.errors.len(),
            skipped_empty_rows,
            insert_errors: result
                .errors
                .iter()
                .take(self.max_error_details)
                .cloned()
                .collect(),
        }
    }

    /// JSON 批量创建结果（index 为请求数组中的位置）
    pub fn build_bulk(&self, result: BatchInsertResult) -> BulkImportResult {
        let failed = result.errors.len();
        let errors = result
            .errors
            .into_iter()
            .take(self.max_error_details)
            .map(|e| BulkError {
                index: e.position,
                message: e.message,
            })
            .collect();

        BulkImportResult {
            created: result.inserted.len(),
            failed,
            assets: result.inserted,
            errors,
        }
    }
}
