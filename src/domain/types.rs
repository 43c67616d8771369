// ==========================================
// IT 资产台账系统 - 领域类型定义
// ==========================================
// 职责: 设备类别 / 生命周期状态枚举 + 宽松解析
// 序列化格式: 与数据库及前端展示一致（"Network Device" 等原文）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 设备类别 (Device Category)
// ==========================================
// 导入时大小写不敏感匹配，未识别一律归入 Other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceCategory {
    Laptop,
    Desktop,
    Monitor,
    Printer,
    Scanner,
    Server,
    #[serde(rename = "Network Device")]
    NetworkDevice,
    Mobile,
    Tablet,
    Projector,
    #[serde(rename = "UPS")]
    Ups,
    #[default]
    Other,
}

impl DeviceCategory {
    /// 全部类别（顺序即展示顺序）
    pub const ALL: [DeviceCategory; 12] = [
        DeviceCategory::Laptop,
        DeviceCategory::Desktop,
        DeviceCategory::Monitor,
        DeviceCategory::Printer,
        DeviceCategory::Scanner,
        DeviceCategory::Server,
        DeviceCategory::NetworkDevice,
        DeviceCategory::Mobile,
        DeviceCategory::Tablet,
        DeviceCategory::Projector,
        DeviceCategory::Ups,
        DeviceCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCategory::Laptop => "Laptop",
            DeviceCategory::Desktop => "Desktop",
            DeviceCategory::Monitor => "Monitor",
            DeviceCategory::Printer => "Printer",
            DeviceCategory::Scanner => "Scanner",
            DeviceCategory::Server => "Server",
            DeviceCategory::NetworkDevice => "Network Device",
            DeviceCategory::Mobile => "Mobile",
            DeviceCategory::Tablet => "Tablet",
            DeviceCategory::Projector => "Projector",
            DeviceCategory::Ups => "UPS",
            DeviceCategory::Other => "Other",
        }
    }

    /// 大小写不敏感的精确匹配（去除首尾空白）
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
    }

    /// 全函数: 任意输入 → 匹配类别或 Other
    pub fn from_loose(value: &str) -> Self {
        Self::parse(value).unwrap_or(DeviceCategory::Other)
    }

    /// 供 CHECK 约束使用
    pub fn sql_in_list() -> String {
        Self::ALL
            .iter()
            .map(|c| format!("'{}'", c.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 资产生命周期状态 (Asset Status)
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStatus {
    #[default]
    Active,
    Inactive,
    #[serde(rename = "In Repair")]
    InRepair,
    Retired,
    Disposed,
    Lost,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 6] = [
        AssetStatus::Active,
        AssetStatus::Inactive,
        AssetStatus::InRepair,
        AssetStatus::Retired,
        AssetStatus::Disposed,
        AssetStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "Active",
            AssetStatus::Inactive => "Inactive",
            AssetStatus::InRepair => "In Repair",
            AssetStatus::Retired => "Retired",
            AssetStatus::Disposed => "Disposed",
            AssetStatus::Lost => "Lost",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(trimmed))
    }

    /// 供 CHECK 约束使用: 'Active','Inactive',...
    pub fn sql_in_list() -> String {
        Self::ALL
            .iter()
            .map(|s| format!("'{}'", s.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_category_case_insensitive() {
        assert_eq!(DeviceCategory::parse("laptop"), Some(DeviceCategory::Laptop));
        assert_eq!(DeviceCategory::parse("  LAPTOP "), Some(DeviceCategory::Laptop));
        assert_eq!(
            DeviceCategory::parse("network device"),
            Some(DeviceCategory::NetworkDevice)
        );
        assert_eq!(DeviceCategory::parse("ups"), Some(DeviceCategory::Ups));
    }

    #[test]
    fn test_device_category_is_total() {
        for input in ["", "NA", "toaster", "Lap top", "笔记本"] {
            assert_eq!(DeviceCategory::from_loose(input), DeviceCategory::Other);
        }
    }

    #[test]
    fn test_device_category_serde_names() {
        let json = serde_json::to_string(&DeviceCategory::NetworkDevice).unwrap();
        assert_eq!(json, "\"Network Device\"");
    }

    #[test]
    fn test_asset_status_parse() {
        assert_eq!(AssetStatus::parse("in repair"), Some(AssetStatus::InRepair));
        assert_eq!(AssetStatus::parse("ACTIVE"), Some(AssetStatus::Active));
        assert_eq!(AssetStatus::parse("broken"), None);
    }

    #[test]
    fn test_asset_status_sql_in_list() {
        let list = AssetStatus::sql_in_list();
        assert!(list.starts_with("'Active'"));
        assert!(list.contains("'In Repair'"));
    }
}
