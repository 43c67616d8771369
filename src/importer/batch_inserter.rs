// ==========================================
// IT 资产台账系统 - 分批写入器
// ==========================================
// 职责: 按 batch_size 切分，逐批调用 insert_many（严格串行）
// 规则: 单行失败记录后继续；已提交批次不回滚；整体失败立即终止
// ==========================================

use crate::domain::asset::NewAsset;
use crate::domain::import::{BatchInsertResult, InsertError, WriteErrorKind};
use crate::importer::error::ImportResult;
use crate::repository::asset_repo::AssetRepository;
use tracing::{debug, warn};

/// 重复序列号的统一提示
pub const DUPLICATE_SERIAL_MESSAGE: &str = "Duplicate serial number";

/// 待写入记录（source_row 仅用于诊断）
#[derive(Debug, Clone)]
pub struct PendingInsert {
    pub source_row: Option<usize>,
    pub record: NewAsset,
}

pub struct BatchInserter {
    batch_size: usize,
}

impl BatchInserter {
    /// batch_size 为 0 时按 1 处理
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// 逐批写入全部记录
    ///
    /// # 返回
    /// - Ok(BatchInsertResult): 累计成功记录 + 单行失败（position 为全局位置）
    /// - Err: 某一批整体失败（此前批次已提交，不回滚）
    pub async fn insert_all<R>(
        &self,
        repo: &R,
        rows: Vec<PendingInsert>,
    ) -> ImportResult<BatchInsertResult>
    where
        R: AssetRepository + ?Sized,
    {
        let mut result = BatchInsertResult::default();
        let mut pending = rows.into_iter().peekable();
        let mut offset = 0usize;

        while pending.peek().is_some() {
            let chunk: Vec<PendingInsert> = pending.by_ref().take(self.batch_size).collect();
            let batch = result.batches;
            let chunk_len = chunk.len();

            let (meta, records): (Vec<_>, Vec<_>) = chunk
                .into_iter()
                .map(|p| {
                    let serial = p.record.serial_number.clone();
                    ((p.source_row, serial), p.record)
                })
                .unzip();

            let outcome = repo.insert_many(records).await?;

            for write_error in outcome.write_errors {
                let (row, serial_number) = meta
                    .get(write_error.index)
                    .cloned()
                    .unwrap_or((None, None));
                let message = match write_error.kind {
                    WriteErrorKind::DuplicateKey => DUPLICATE_SERIAL_MESSAGE.to_string(),
                    _ => write_error.errmsg,
                };
                result.errors.push(InsertError {
                    batch,
                    index: write_error.index,
                    position: offset + write_error.index,
                    row,
                    serial_number,
                    message,
                });
            }

            let inserted = outcome.inserted.len();
            result.inserted.extend(outcome.inserted);

            if inserted < chunk_len {
                warn!(
                    batch = batch,
                    batch_rows = chunk_len,
                    inserted = inserted,
                    "批次存在写入失败的行"
                );
            } else {
                debug!(batch = batch, batch_rows = chunk_len, "批次写入完成");
            }

            offset += chunk_len;
            result.batches += 1;
        }

        Ok(result)
    }
}
