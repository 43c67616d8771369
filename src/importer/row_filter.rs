// ==========================================
// IT 资产台账系统 - 空行过滤器实现
// ==========================================
// 规则: 以下任一字段持有非空且非占位符的值 → 保留
//       companyName / branch / department / userName / brand / device / deviceSerialNo
// 说明: device 规范化后恒为枚举值，因此以源单元格文本判定
// ==========================================

use crate::domain::import::{NormalizedRow, PLACEHOLDER};
use crate::importer::asset_importer_trait::RowFilter as RowFilterTrait;

fn is_meaningful(value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let trimmed = v.trim();
            !trimmed.is_empty() && trimmed != PLACEHOLDER
        }
        None => false,
    }
}

pub struct RowFilter;

impl RowFilterTrait for RowFilter {
    fn has_meaningful_data(&self, row: &NormalizedRow) -> bool {
        let r = &row.record;
        [
            r.company_name.as_deref(),
            r.branch.as_deref(),
            r.department.as_deref(),
            r.user_name.as_deref(),
            r.brand.as_deref(),
            Some(row.source_device.as_str()),
            r.device_serial_no.as_deref(),
        ]
        .into_iter()
        .any(is_meaningful)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::NewAsset;

    fn row(company: &str, source_device: &str) -> NormalizedRow {
        NormalizedRow {
            source_row: 2,
            record: NewAsset {
                serial_number: Some("IT-20240101-000000-0001".to_string()),
                company_name: Some(company.to_string()),
                branch: Some(PLACEHOLDER.to_string()),
                department: Some(PLACEHOLDER.to_string()),
                user_name: Some(PLACEHOLDER.to_string()),
                brand: Some(PLACEHOLDER.to_string()),
                device: Some("Other".to_string()),
                device_serial_no: Some(PLACEHOLDER.to_string()),
                operating_system: Some("Windows 11".to_string()),
                remark: Some("spare".to_string()),
                status: Some("Active".to_string()),
                created_by: "u1".to_string(),
                ..Default::default()
            },
            source_device: source_device.to_string(),
        }
    }

    #[test]
    fn test_defaulted_device_does_not_count() {
        let filter = RowFilter;
        assert!(!filter.has_meaningful_data(&row(PLACEHOLDER, PLACEHOLDER)));
        assert!(filter.has_meaningful_data(&row(PLACEHOLDER, "Toaster")));
        assert!(filter.has_meaningful_data(&row("Acme", PLACEHOLDER)));
    }

    #[test]
    fn test_operating_system_and_remark_are_ignored() {
        // 仅 OS / 备注有值的行视为空行
        let filter = RowFilter;
        assert!(!filter.has_meaningful_data(&row("", PLACEHOLDER)));
    }

    #[test]
    fn test_retain_is_idempotent() {
        let filter = RowFilter;
        let rows = vec![
            row("Acme", PLACEHOLDER),
            row(PLACEHOLDER, PLACEHOLDER),
            row(PLACEHOLDER, "Laptop"),
        ];

        let (kept, skipped) = filter.retain_meaningful(rows);
        assert_eq!(kept.len(), 2);
        assert_eq!(skipped, 1);

        let (again, skipped_again) = filter.retain_meaningful(kept.clone());
        assert_eq!(again, kept);
        assert_eq!(skipped_again, 0);
    }
}
