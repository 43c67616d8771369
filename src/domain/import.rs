// ==========================================
// IT 资产台账系统 - 批量导入领域模型
// ==========================================
// 职责: 原始行 / 映射行 / 规范化行 / 插入失败明细 / 导入报告
// 生命周期: 全部为单次请求内的临时对象，不落库
// ==========================================

use crate::domain::asset::{Asset, NewAsset};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 空值占位符
pub const PLACEHOLDER: &str = "NA";

// ==========================================
// CanonicalField - 规范字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    SerialNumber,
    CompanyName,
    Branch,
    Department,
    UserName,
    Brand,
    Device,
    DeviceSerialNo,
    OperatingSystem,
    DateOfPurchase,
    Remark,
    Status,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 12] = [
        CanonicalField::SerialNumber,
        CanonicalField::CompanyName,
        CanonicalField::Branch,
        CanonicalField::Department,
        CanonicalField::UserName,
        CanonicalField::Brand,
        CanonicalField::Device,
        CanonicalField::DeviceSerialNo,
        CanonicalField::OperatingSystem,
        CanonicalField::DateOfPurchase,
        CanonicalField::Remark,
        CanonicalField::Status,
    ];

    /// 缺省时填充占位符的文本字段
    pub const PLACEHOLDER_TEXT: [CanonicalField; 9] = [
        CanonicalField::CompanyName,
        CanonicalField::Branch,
        CanonicalField::Department,
        CanonicalField::UserName,
        CanonicalField::Brand,
        CanonicalField::Device,
        CanonicalField::DeviceSerialNo,
        CanonicalField::OperatingSystem,
        CanonicalField::Remark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::SerialNumber => "serialNumber",
            CanonicalField::CompanyName => "companyName",
            CanonicalField::Branch => "branch",
            CanonicalField::Department => "department",
            CanonicalField::UserName => "userName",
            CanonicalField::Brand => "brand",
            CanonicalField::Device => "device",
            CanonicalField::DeviceSerialNo => "deviceSerialNo",
            CanonicalField::OperatingSystem => "operatingSystem",
            CanonicalField::DateOfPurchase => "dateOfPurchase",
            CanonicalField::Remark => "remark",
            CanonicalField::Status => "status",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    /// 空白判定（Empty 或 去空白后为空的文本）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 转为去空白文本；空白返回 None
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            CellValue::Empty => return None,
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                // 整数值不带小数点（序列号列常被 Excel 识别为数字）
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(dt) => dt.format("%Y-%m-%d").to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ==========================================
// RawImportRow - 原始导入行
// ==========================================
// 保持表头顺序；row_number 为表格中的行号（表头为第 1 行）
#[derive(Debug, Clone, PartialEq)]
pub struct RawImportRow {
    pub row_number: usize,
    pub cells: Vec<(String, CellValue)>,
}

// ==========================================
// MappedRow - 列映射后的行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub row_number: usize,
    pub fields: Vec<(CanonicalField, CellValue)>,
}

impl MappedRow {
    pub fn get(&self, field: CanonicalField) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v)
    }
}

// ==========================================
// NormalizedRow - 规范化行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    /// 源表格行号（仅用于诊断）
    pub source_row: usize,
    pub record: NewAsset,
    /// 源设备列的去空白文本（缺省为占位符），用于空行判定
    pub source_device: String,
}

// ==========================================
// 批量插入结果
// ==========================================

/// 存储层单行写入失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteErrorKind {
    DuplicateKey,
    ConstraintViolation,
    Other,
}

/// 存储层单行写入失败（index 为批内位置）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteError {
    pub index: usize,
    pub kind: WriteErrorKind,
    pub errmsg: String,
}

/// insert_many 返回值: 成功记录 + 单行失败，二者并存
#[derive(Debug, Clone, Default)]
pub struct InsertManyOutcome {
    pub inserted: Vec<Asset>,
    pub write_errors: Vec<WriteError>,
}

/// 导入管道中的单行插入失败
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertError {
    /// 批次序号（从 0 开始）
    pub batch: usize,
    /// 批内位置（从 0 开始）
    pub index: usize,
    /// 全部待插入行中的位置（从 0 开始）
    pub position: usize,
    /// 源表格行号（JSON 导入时为 None）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub message: String,
}

/// 批量插入累计结果
#[derive(Debug, Clone, Default)]
pub struct BatchInsertResult {
    pub inserted: Vec<Asset>,
    pub errors: Vec<InsertError>,
    pub batches: usize,
}

// ==========================================
// ImportReport - 表格导入报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total_rows: usize,
    pub created: usize,
    pub failed: usize,
    pub skipped_empty_rows: usize,
    pub insert_errors: Vec<InsertError>,
}

// ==========================================
// BulkImportResult - JSON 批量创建结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkImportResult {
    pub created: usize,
    pub failed: usize,
    pub assets: Vec<Asset>,
    pub errors: Vec<BulkError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkError {
    /// 请求数组中的位置（从 0 开始）
    pub index: usize,
    pub message: String,
}
