// ==========================================
// IT 资产台账系统 - 列映射器实现
// ==========================================
// 职责: 任意表头 → 规范字段（静态别名表）
// 规则: 去首尾空白 + 大小写不敏感的精确匹配；未识别表头静默丢弃
// ==========================================

use crate::domain::import::{CanonicalField, CellValue, MappedRow, RawImportRow};
use crate::importer::asset_importer_trait::FieldMapper as FieldMapperTrait;

use CanonicalField::*;

/// 表头别名表（别名一律小写）
pub const COLUMN_ALIASES: &[(&str, CanonicalField)] = &[
    // ===== 序列号（资产唯一标识）=====
    ("serial number", SerialNumber),
    ("serialnumber", SerialNumber),
    ("serial_number", SerialNumber),
    ("serial no", SerialNumber),
    ("serial no.", SerialNumber),
    ("serial", SerialNumber),
    ("asset tag", SerialNumber),
    ("asset id", SerialNumber),
    ("asset no", SerialNumber),
    ("asset number", SerialNumber),
    ("asset code", SerialNumber),
    ("tag no", SerialNumber),
    // ===== 公司 =====
    ("company", CompanyName),
    ("company name", CompanyName),
    ("companyname", CompanyName),
    ("company_name", CompanyName),
    ("organization", CompanyName),
    ("organisation", CompanyName),
    ("firm", CompanyName),
    // ===== 分支机构 =====
    ("branch", Branch),
    ("branch name", Branch),
    ("location", Branch),
    ("office", Branch),
    ("site", Branch),
    // ===== 部门 =====
    ("department", Department),
    ("department name", Department),
    ("dept", Department),
    ("dept.", Department),
    ("division", Department),
    ("team", Department),
    // ===== 使用人 =====
    ("user", UserName),
    ("user name", UserName),
    ("username", UserName),
    ("user_name", UserName),
    ("employee", UserName),
    ("employee name", UserName),
    ("assigned to", UserName),
    ("owner", UserName),
    ("custodian", UserName),
    // ===== 品牌 =====
    ("brand", Brand),
    ("brand name", Brand),
    ("make", Brand),
    ("manufacturer", Brand),
    ("oem", Brand),
    ("vendor", Brand),
    // ===== 设备类别 =====
    ("device", Device),
    ("device type", Device),
    ("devicetype", Device),
    ("device category", Device),
    ("category", Device),
    ("asset type", Device),
    ("type", Device),
    ("equipment", Device),
    // ===== 设备序列号（厂商序列号）=====
    ("device serial no", DeviceSerialNo),
    ("device serial no.", DeviceSerialNo),
    ("device serial number", DeviceSerialNo),
    ("deviceserialno", DeviceSerialNo),
    ("device_serial_no", DeviceSerialNo),
    ("device sn", DeviceSerialNo),
    ("hardware serial", DeviceSerialNo),
    ("service tag", DeviceSerialNo),
    // ===== 操作系统 =====
    ("operating system", OperatingSystem),
    ("operatingsystem", OperatingSystem),
    ("operating_system", OperatingSystem),
    ("os", OperatingSystem),
    ("o.s.", OperatingSystem),
    ("os version", OperatingSystem),
    // ===== 购置日期 =====
    ("date of purchase", DateOfPurchase),
    ("dateofpurchase", DateOfPurchase),
    ("date_of_purchase", DateOfPurchase),
    ("purchase date", DateOfPurchase),
    ("purchased on", DateOfPurchase),
    ("invoice date", DateOfPurchase),
    ("dop", DateOfPurchase),
    // ===== 备注 =====
    ("remark", Remark),
    ("remarks", Remark),
    ("note", Remark),
    ("notes", Remark),
    ("comment", Remark),
    ("comments", Remark),
    ("description", Remark),
    // ===== 状态 =====
    ("status", Status),
    ("asset status", Status),
    ("condition", Status),
    ("state", Status),
];

/// 查询表头对应的规范字段
pub fn resolve_header(header: &str) -> Option<CanonicalField> {
    let key = header.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, field)| *field)
}

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn matched_headers(&self, headers: &[String]) -> Vec<(String, CanonicalField)> {
        headers
            .iter()
            .filter_map(|h| resolve_header(h).map(|field| (h.clone(), field)))
            .collect()
    }

    fn map_row(&self, row: &RawImportRow) -> MappedRow {
        let mut fields: Vec<(CanonicalField, CellValue)> = Vec::new();

        for (header, value) in &row.cells {
            let Some(field) = resolve_header(header) else {
                continue;
            };

            match fields.iter_mut().find(|(f, _)| *f == field) {
                // 同一规范字段出现多列: 第一个非空值生效
                Some((_, existing)) => {
                    if existing.is_blank() && !value.is_blank() {
                        *existing = value.clone();
                    }
                }
                None => fields.push((field, value.clone())),
            }
        }

        MappedRow {
            row_number: row.row_number,
            fields,
        }
    }
}
