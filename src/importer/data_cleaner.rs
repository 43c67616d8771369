// ==========================================
// IT 资产台账系统 - 行规范化器实现
// ==========================================
// 职责: 日期解析 / 文本占位 / 枚举归一 / 序列号合成
// 规则: 全函数，任何输入都产出一条完整的 NewAsset
// ==========================================

use crate::domain::asset::{AssetInput, NewAsset};
use crate::domain::import::{CanonicalField, CellValue, MappedRow, NormalizedRow, PLACEHOLDER};
use crate::domain::types::{AssetStatus, DeviceCategory};
use crate::importer::asset_importer_trait::DataCleaner as DataCleanerTrait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Excel 序列日期上限（9999-12-31）
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0;

/// 带时间的文本格式
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// 纯日期文本格式（按顺序尝试，DD/MM 优先于 MM/DD）
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%Y%m%d",
];

/// Excel 序列日期 → 时间（1900 日期系统，基准 1899-12-30）
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > EXCEL_SERIAL_MAX {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// 文本日期解析；无法识别返回 None
pub fn parse_date_text(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(ndt.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
        }
    }

    // 文本形式的序列日期（CSV 导出的 Excel 数值）
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(excel_serial_to_datetime)
        .map(|ndt| ndt.and_utc())
}

/// 合成序列号: IT-<YYYYMMDD>-<HHMMSS>-<NNNN>
pub fn synthesize_serial(now: DateTime<Utc>, row_index: usize) -> String {
    format!("IT-{}-{:04}", now.format("%Y%m%d-%H%M%S"), row_index)
}

fn trimmed_non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub struct DataCleaner;

impl DataCleaner {
    /// 日期单元格 → 时间
    ///
    /// # 规则
    /// - 缺省 / 空白: now
    /// - 日期单元格: 原值
    /// - 数值: Excel 序列日期
    /// - 文本: 按格式表解析，失败为 None
    pub fn clean_date(&self, cell: Option<&CellValue>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let cell = match cell {
            Some(c) if !c.is_blank() => c,
            _ => return Some(now),
        };

        match cell {
            CellValue::Date(ndt) => Some(ndt.and_utc()),
            CellValue::Number(n) => excel_serial_to_datetime(*n).map(|ndt| ndt.and_utc()),
            CellValue::Text(s) => parse_date_text(s),
            CellValue::Bool(_) | CellValue::Empty => None,
        }
    }

    /// 文本单元格 → 去空白文本，缺省为占位符
    pub fn clean_text(&self, cell: Option<&CellValue>) -> String {
        cell.and_then(CellValue::as_text)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// 状态: 缺省为 Active；可识别值归一大小写；其余原样交给存储层校验
    pub fn clean_status(&self, value: Option<String>) -> String {
        match trimmed_non_empty(value) {
            None => AssetStatus::default().as_str().to_string(),
            Some(v) => AssetStatus::parse(&v)
                .map(|s| s.as_str().to_string())
                .unwrap_or(v),
        }
    }

    /// 序列号: 缺省 / 空白 / 占位符 → 合成；否则去空白并大写
    pub fn clean_serial(
        &self,
        cell: Option<&CellValue>,
        row_index: usize,
        now: DateTime<Utc>,
    ) -> String {
        match cell.and_then(CellValue::as_text) {
            Some(v) if !v.eq_ignore_ascii_case(PLACEHOLDER) => v.to_uppercase(),
            _ => synthesize_serial(now, row_index),
        }
    }

    /// 结构化请求元素 → 写入模型（不套用规范化默认值）
    ///
    /// # 说明
    /// - 文本去空白，空串视为缺省
    /// - device / status 可识别时归一，否则原样保留（由存储层 CHECK 拒绝）
    /// - 日期无法解析时为 None
    pub fn from_input(&self, input: AssetInput, created_by: &str) -> NewAsset {
        let device = trimmed_non_empty(input.device).map(|v| {
            DeviceCategory::parse(&v)
                .map(|c| c.as_str().to_string())
                .unwrap_or(v)
        });
        let status = trimmed_non_empty(input.status).map(|v| {
            AssetStatus::parse(&v)
                .map(|s| s.as_str().to_string())
                .unwrap_or(v)
        });

        NewAsset {
            serial_number: trimmed_non_empty(input.serial_number),
            company_name: trimmed_non_empty(input.company_name),
            branch: trimmed_non_empty(input.branch),
            department: trimmed_non_empty(input.department),
            user_name: trimmed_non_empty(input.user_name),
            brand: trimmed_non_empty(input.brand),
            device,
            device_serial_no: trimmed_non_empty(input.device_serial_no),
            operating_system: trimmed_non_empty(input.operating_system),
            date_of_purchase: input.date_of_purchase.as_deref().and_then(parse_date_text),
            remark: trimmed_non_empty(input.remark),
            status,
            created_by: created_by.trim().to_string(),
        }
    }
}

impl DataCleanerTrait for DataCleaner {
    fn normalize_row(
        &self,
        row: &MappedRow,
        row_index: usize,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> NormalizedRow {
        use CanonicalField::*;

        // 占位符文本字段统一清洗（缺省 → NA）
        let mut texts =
            CanonicalField::PLACEHOLDER_TEXT.map(|field| (field, self.clean_text(row.get(field))));
        let mut take = |field: CanonicalField| {
            texts
                .iter_mut()
                .find(|(f, _)| *f == field)
                .map(|(_, value)| std::mem::take(value))
        };
        let source_device = take(Device).unwrap_or_default();

        let record = NewAsset {
            serial_number: Some(self.clean_serial(row.get(SerialNumber), row_index, now)),
            company_name: take(CompanyName),
            branch: take(Branch),
            department: take(Department),
            user_name: take(UserName),
            brand: take(Brand),
            device: Some(DeviceCategory::from_loose(&source_device).as_str().to_string()),
            device_serial_no: take(DeviceSerialNo),
            operating_system: take(OperatingSystem),
            date_of_purchase: self.clean_date(row.get(DateOfPurchase), now),
            remark: take(Remark),
            status: Some(self.clean_status(row.get(Status).and_then(CellValue::as_text))),
            created_by: created_by.to_string(),
        };

        NormalizedRow {
            source_row: row.row_number,
            record,
            source_device,
        }
    }

    fn clean_input(&self, input: AssetInput, created_by: &str) -> NewAsset {
        self.from_input(input, created_by)
    }
}
