// ==========================================
// IT 资产台账系统 - 资产领域模型
// ==========================================
// 职责: 资产实体 / 写入模型 / 查询条件 / 统计结果
// 约束: serial_number 全局唯一（含已软删除记录），由存储层唯一索引保证
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 备注最大长度（字符数），由存储层 CHECK 约束执行
pub const REMARK_MAX_LEN: usize = 500;

/// 列表默认每页条数
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// 列表每页条数上限
pub const MAX_PAGE_SIZE: u32 = 100;

// ==========================================
// Asset - 资产记录（已落库）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub serial_number: String, // 大写规范化

    // ===== 归属信息 =====
    pub company_name: Option<String>,
    pub branch: Option<String>,
    pub department: Option<String>,
    pub user_name: Option<String>,

    // ===== 设备信息 =====
    pub brand: Option<String>,
    pub device: String, // DeviceCategory 原文
    pub device_serial_no: Option<String>,
    pub operating_system: Option<String>,
    pub date_of_purchase: Option<DateTime<Utc>>,
    pub remark: Option<String>,

    // ===== 生命周期 =====
    pub status: String, // AssetStatus 原文
    pub is_deleted: bool,

    // ===== 审计字段 =====
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// NewAsset - 资产写入模型
// ==========================================
// 用途: 导入管道 / 单条创建 共用的落库输入
// 说明: None 字段由存储层套用 schema 默认值（device=Other, status=Active）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub serial_number: Option<String>,
    pub company_name: Option<String>,
    pub branch: Option<String>,
    pub department: Option<String>,
    pub user_name: Option<String>,
    pub brand: Option<String>,
    pub device: Option<String>,
    pub device_serial_no: Option<String>,
    pub operating_system: Option<String>,
    pub date_of_purchase: Option<DateTime<Utc>>,
    pub remark: Option<String>,
    pub status: Option<String>,
    pub created_by: String,
}

// ==========================================
// AssetInput - 结构化请求体中的单个资产
// ==========================================
// 用途: POST /assets 与 POST /assets/bulk 的元素
// 说明: 字段名即规范字段名，不经过列映射
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInput {
    pub serial_number: Option<String>,
    pub company_name: Option<String>,
    pub branch: Option<String>,
    pub department: Option<String>,
    pub user_name: Option<String>,
    pub brand: Option<String>,
    pub device: Option<String>,
    pub device_serial_no: Option<String>,
    pub operating_system: Option<String>,
    pub date_of_purchase: Option<String>,
    pub remark: Option<String>,
    pub status: Option<String>,
}

// ==========================================
// AssetPatch - 部分更新
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPatch {
    pub serial_number: Option<String>,
    pub company_name: Option<String>,
    pub branch: Option<String>,
    pub department: Option<String>,
    pub user_name: Option<String>,
    pub brand: Option<String>,
    pub device: Option<String>,
    pub device_serial_no: Option<String>,
    pub operating_system: Option<String>,
    pub date_of_purchase: Option<DateTime<Utc>>,
    pub remark: Option<String>,
    pub status: Option<String>,
}

impl AssetPatch {
    pub fn is_empty(&self) -> bool {
        self.serial_number.is_none()
            && self.company_name.is_none()
            && self.branch.is_none()
            && self.department.is_none()
            && self.user_name.is_none()
            && self.brand.is_none()
            && self.device.is_none()
            && self.device_serial_no.is_none()
            && self.operating_system.is_none()
            && self.date_of_purchase.is_none()
            && self.remark.is_none()
            && self.status.is_none()
    }
}

// ==========================================
// AssetQuery - 列表查询条件（搜索 / 过滤 / 分页）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetQuery {
    /// 模糊搜索（序列号 / 公司 / 使用人 / 部门 / 设备序列号 / 品牌）
    pub search: Option<String>,
    pub status: Option<String>,
    pub device: Option<String>,
    pub department: Option<String>,
    pub company_name: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl AssetQuery {
    /// 页码（从 1 开始）
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// 每页条数，限制在 [1, MAX_PAGE_SIZE]
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPage {
    pub items: Vec<Asset>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

// ==========================================
// 统计结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBucket {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStats {
    pub total: i64,
    pub deleted: i64,
    pub by_status: Vec<CountBucket>,
    pub by_device: Vec<CountBucket>,
    /// 仅前 10 个部门
    pub by_department: Vec<CountBucket>,
}
