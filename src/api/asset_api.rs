// ==========================================
// 资产管理API
// ==========================================
// 职责: 单条创建 / 查询 / 列表 / 更新 / 软删除 / 恢复 / 物理删除 / 统计
// 说明: 已软删除的资产对单条查询与更新不可见
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::asset::{Asset, AssetInput, AssetPage, AssetPatch, AssetQuery, AssetStats};
use crate::domain::types::{AssetStatus, DeviceCategory};
use crate::importer::data_cleaner::parse_date_text;
use crate::importer::{DataCleaner, DataCleanerImpl};
use crate::repository::AssetRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

const ASSET_NOT_FOUND: &str = "Asset not found";
const SERIAL_TAKEN: &str = "Asset with this serial number already exists";

/// POST /assets 请求体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    #[serde(flatten)]
    pub asset: AssetInput,
    #[serde(default)]
    pub created_by: Option<String>,
}

/// 资产管理API
pub struct AssetApi {
    repo: Arc<dyn AssetRepository>,
    data_cleaner: DataCleanerImpl,
}

impl AssetApi {
    /// 创建新的AssetApi实例
    pub fn new(repo: Arc<dyn AssetRepository>) -> Self {
        Self {
            repo,
            data_cleaner: DataCleanerImpl,
        }
    }

    /// 查询未删除的资产，不存在或已删除返回 NotFound
    async fn require_active(&self, id: &str) -> ApiResult<Asset> {
        match self.repo.find_by_id(id).await? {
            Some(asset) if !asset.is_deleted => Ok(asset),
            _ => Err(ApiError::NotFound(ASSET_NOT_FOUND.to_string())),
        }
    }

    /// 请求体 → 部分更新（无法识别的 device / status 原样交给存储层校验）
    fn build_patch(input: AssetInput) -> ApiResult<AssetPatch> {
        let date_of_purchase = match input.date_of_purchase.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_date_text(raw).ok_or_else(|| {
                ApiError::InvalidInput(format!("Invalid dateOfPurchase: {}", raw))
            })?),
        };

        Ok(AssetPatch {
            serial_number: input.serial_number,
            company_name: input.company_name,
            branch: input.branch,
            department: input.department,
            user_name: input.user_name,
            brand: input.brand,
            device: input.device.map(|v| {
                DeviceCategory::parse(&v)
                    .map(|c| c.as_str().to_string())
                    .unwrap_or(v)
            }),
            device_serial_no: input.device_serial_no,
            operating_system: input.operating_system,
            date_of_purchase,
            remark: input.remark,
            status: input.status.map(|v| {
                AssetStatus::parse(&v)
                    .map(|s| s.as_str().to_string())
                    .unwrap_or(v)
            }),
        })
    }

    /// 创建单条资产
    ///
    /// # 返回
    /// - Ok(Asset): 新资产
    /// - Err(InvalidInput): 缺少 serialNumber / createdBy，或字段违反约束
    /// - Err(Conflict): 序列号已存在（含已软删除记录）
    pub async fn create_asset(&self, request: CreateAssetRequest) -> ApiResult<Asset> {
        let created_by = request.created_by.unwrap_or_default();
        if created_by.trim().is_empty() {
            return Err(ApiError::InvalidInput("createdBy is required".to_string()));
        }

        let record = self.data_cleaner.clean_input(request.asset, &created_by);
        let Some(serial) = record.serial_number.as_deref() else {
            return Err(ApiError::InvalidInput("serialNumber is required".to_string()));
        };

        if self.repo.exists_by_serial(serial).await? {
            return Err(ApiError::Conflict(SERIAL_TAKEN.to_string()));
        }

        let asset = self.repo.insert_one(record).await?;
        info!(asset_id = %asset.id, serial_number = %asset.serial_number, "资产已创建");
        Ok(asset)
    }

    /// 查询单条资产
    pub async fn get_asset(&self, id: &str) -> ApiResult<Asset> {
        self.require_active(id).await
    }

    /// 列表（搜索 / 过滤 / 分页）
    pub async fn list_assets(&self, query: &AssetQuery) -> ApiResult<AssetPage> {
        Ok(self.repo.list(query).await?)
    }

    /// 部分更新
    ///
    /// # 说明
    /// - 至少包含一个字段
    /// - 修改序列号时须保持唯一
    pub async fn update_asset(&self, id: &str, input: AssetInput) -> ApiResult<Asset> {
        let patch = Self::build_patch(input)?;
        if patch.is_empty() {
            return Err(ApiError::InvalidInput("No fields to update".to_string()));
        }

        let current = self.require_active(id).await?;

        if let Some(serial) = patch.serial_number.as_deref() {
            let serial = serial.trim().to_uppercase();
            if serial != current.serial_number && self.repo.exists_by_serial(&serial).await? {
                return Err(ApiError::Conflict(SERIAL_TAKEN.to_string()));
            }
        }

        let asset = self.repo.update(id, patch).await?;
        info!(asset_id = %asset.id, "资产已更新");
        Ok(asset)
    }

    /// 软删除
    pub async fn delete_asset(&self, id: &str) -> ApiResult<Asset> {
        self.require_active(id).await?;
        let asset = self.repo.set_deleted(id, true).await?;
        info!(asset_id = %asset.id, "资产已软删除");
        Ok(asset)
    }

    /// 恢复软删除
    pub async fn restore_asset(&self, id: &str) -> ApiResult<Asset> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound(ASSET_NOT_FOUND.to_string()));
        }
        let asset = self.repo.set_deleted(id, false).await?;
        info!(asset_id = %asset.id, "资产已恢复");
        Ok(asset)
    }

    /// 物理删除
    pub async fn permanent_delete_asset(&self, id: &str) -> ApiResult<()> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound(ASSET_NOT_FOUND.to_string()));
        }
        self.repo.delete_permanently(id).await?;
        info!(asset_id = %id, "资产已物理删除");
        Ok(())
    }

    /// 统计
    pub async fn asset_stats(&self) -> ApiResult<AssetStats> {
        Ok(self.repo.stats().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::AssetRepositoryImpl;
    use axum::http::StatusCode;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn api() -> AssetApi {
        let conn = Connection::open_in_memory().unwrap();
        let repo = AssetRepositoryImpl::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        AssetApi::new(Arc::new(repo))
    }

    fn create_request(serial: &str) -> CreateAssetRequest {
        CreateAssetRequest {
            asset: AssetInput {
                serial_number: Some(serial.to_string()),
                device: Some("laptop".to_string()),
                ..Default::default()
            },
            created_by: Some("u1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_conflict() {
        let api = api();
        let asset = api.create_asset(create_request("lap-1")).await.unwrap();
        assert_eq!(asset.serial_number, "LAP-1");
        assert_eq!(asset.device, "Laptop");
        assert_eq!(asset.status, "Active");

        let err = api.create_asset(create_request("LAP-1")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let api = api();
        let mut request = create_request("X");
        request.created_by = None;
        let err = api.create_asset(request).await.unwrap_err();
        assert_eq!(err.to_string(), "createdBy is required");

        let mut request = create_request("X");
        request.asset.serial_number = Some("  ".to_string());
        let err = api.create_asset(request).await.unwrap_err();
        assert_eq!(err.to_string(), "serialNumber is required");

        let mut request = create_request("X");
        request.asset.status = Some("Borrowed".to_string());
        let err = api.create_asset(request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_and_restore_shows() {
        let api = api();
        let asset = api.create_asset(create_request("D-1")).await.unwrap();

        let deleted = api.delete_asset(&asset.id).await.unwrap();
        assert!(deleted.is_deleted);
        assert_eq!(
            api.get_asset(&asset.id).await.unwrap_err().status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            api.delete_asset(&asset.id).await.unwrap_err().status_code(),
            StatusCode::NOT_FOUND
        );

        let restored = api.restore_asset(&asset.id).await.unwrap();
        assert!(!restored.is_deleted);
        assert_eq!(api.get_asset(&asset.id).await.unwrap().id, asset.id);

        api.permanent_delete_asset(&asset.id).await.unwrap();
        assert_eq!(
            api.restore_asset(&asset.id).await.unwrap_err().status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_update_rules() {
        let api = api();
        let a = api.create_asset(create_request("U-1")).await.unwrap();
        api.create_asset(create_request("U-2")).await.unwrap();

        let err = api
            .update_asset(&a.id, AssetInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = api
            .update_asset(
                &a.id,
                AssetInput {
                    serial_number: Some("u-2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let updated = api
            .update_asset(
                &a.id,
                AssetInput {
                    serial_number: Some("u-1".to_string()),
                    status: Some("retired".to_string()),
                    date_of_purchase: Some("15/03/2023".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, "Retired");
        assert!(updated.date_of_purchase.is_some());

        let err = api
            .update_asset(
                &a.id,
                AssetInput {
                    date_of_purchase: Some("someday".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats_and_list() {
        let api = api();
        api.create_asset(create_request("S-1")).await.unwrap();
        let s2 = api.create_asset(create_request("S-2")).await.unwrap();
        api.delete_asset(&s2.id).await.unwrap();

        let stats = api.asset_stats().await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.deleted, 1);

        let page = api.list_assets(&AssetQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].serial_number, "S-1");
    }
}
