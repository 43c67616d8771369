// ==========================================
// IT 资产台账系统 - 资产导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 文件解析 → 列映射 → 行规范化 → 空行过滤 → 分批落库 → 报告
// ==========================================

use crate::domain::asset::{AssetInput, NewAsset};
use crate::domain::import::{
    BulkImportResult, CanonicalField, ImportReport, MappedRow, NormalizedRow, RawImportRow,
};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// ==========================================
// AssetImporter Trait
// ==========================================
// 用途: 资产导入主接口
// 实现者: AssetImporterImpl
#[async_trait]
pub trait AssetImporter: Send + Sync {
    /// 从上传的表格文件导入资产
    ///
    /// # 参数
    /// - bytes: 文件内容（xlsx / xls / ods / csv）
    /// - file_name: 原始文件名（用于辅助判断格式，可缺省）
    /// - created_by: 创建人引用（必填）
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入报告（单行失败记录在报告中）
    /// - Err: 输入被拒绝（缺创建人 / 文件无法读取 / 加密 / 空表 / 超行数 / 全部空行）或存储层故障
    ///
    /// # 导入流程
    /// 1. 文件解析（表头为第 1 行）
    /// 2. 行数上限检查（规范化之前）
    /// 3. 列映射 + 行规范化
    /// 4. 空行过滤
    /// 5. 分批落库（无序写入，单行失败不影响其他行）
    /// 6. 报告汇总
    async fn import_spreadsheet(
        &self,
        bytes: &[u8],
        file_name: Option<&str>,
        created_by: &str,
    ) -> ImportResult<ImportReport>;

    /// 从结构化 JSON 数组批量创建资产
    ///
    /// # 说明
    /// - 不经过列映射 / 规范化默认值 / 空行过滤
    /// - 存储层默认值仍然生效（序列号大写、device=Other、status=Active）
    async fn import_json_assets(
        &self,
        assets: Vec<AssetInput>,
        created_by: &str,
    ) -> ImportResult<BulkImportResult>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件内容为原始行（表头为第 1 行，数据行号从 2 开始）
    ///
    /// # 参数
    /// - max_rows: 数据行上限；在转换任何单元格之前检查
    ///
    /// # 返回
    /// - Ok(Vec<RawImportRow>): 数据行（可能为空，空白行保留）
    /// - Err: 格式不支持 / 加密 / 解析失败 / 超过行数上限
    fn parse_bytes(
        &self,
        bytes: &[u8],
        file_name: Option<&str>,
        max_rows: usize,
    ) -> ImportResult<Vec<RawImportRow>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 列映射接口
// 实现者: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 返回能识别的表头及其规范字段（保持输入顺序）
    fn matched_headers(&self, headers: &[String]) -> Vec<(String, CanonicalField)>;

    /// 原始行 → 映射行（未识别列丢弃；同字段多列时第一个非空值生效）
    fn map_row(&self, row: &RawImportRow) -> MappedRow;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 行规范化接口（全函数，从不失败）
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 映射行 → 规范化行
    ///
    /// # 参数
    /// - row: 映射行
    /// - row_index: 1-based 行序号（用于合成序列号）
    /// - created_by: 创建人引用
    /// - now: 本次请求的统一时间基准
    fn normalize_row(
        &self,
        row: &MappedRow,
        row_index: usize,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> NormalizedRow;

    /// 结构化请求元素 → 写入模型（JSON 导入 / 单条创建，不套用规范化默认值）
    fn clean_input(&self, input: AssetInput, created_by: &str) -> NewAsset;
}

// ==========================================
// RowFilter Trait
// ==========================================
// 用途: 空行判定接口
// 实现者: RowFilter
pub trait RowFilter: Send + Sync {
    /// 行是否携带有效数据
    fn has_meaningful_data(&self, row: &NormalizedRow) -> bool;

    /// 过滤空行，返回 (保留行, 跳过行数)
    fn retain_meaningful(&self, rows: Vec<NormalizedRow>) -> (Vec<NormalizedRow>, usize) {
        let before = rows.len();
        let kept: Vec<NormalizedRow> = rows
            .into_iter()
            .filter(|r| self.has_meaningful_data(r))
            .collect();
        let skipped = before - kept.len();
        (kept, skipped)
    }
}
