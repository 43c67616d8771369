// ==========================================
// 资产导入API
// ==========================================
// 职责: 封装批量导入（JSON 数组 / 表格上传），做请求层校验后交给导入器
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::asset::AssetInput;
use crate::domain::import::{BulkImportResult, ImportReport};
use crate::importer::{AssetImporter, ImportError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// POST /assets/bulk 请求体
///
/// assets 保留为原始 JSON，以便对"缺失 / 非数组"给出统一的 400
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    #[serde(default)]
    pub assets: Option<Value>,
    #[serde(default)]
    pub created_by: Option<String>,
}

/// 导入API
pub struct ImportApi {
    importer: Arc<dyn AssetImporter>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(importer: Arc<dyn AssetImporter>) -> Self {
        Self { importer }
    }

    /// JSON 批量创建
    ///
    /// # 返回
    /// - Ok(BulkImportResult): 成功 / 失败计数 + 已创建资产 + 单行失败
    /// - Err(ApiError::InvalidInput): assets 缺失 / 非数组 / 为空 / 超上限，或缺少 createdBy
    pub async fn bulk_create(&self, request: BulkCreateRequest) -> ApiResult<BulkImportResult> {
        let created_by = request.created_by.unwrap_or_default();
        if created_by.trim().is_empty() {
            return Err(ImportError::MissingCreator.into());
        }

        let items = match request.assets {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => return Err(ImportError::EmptyAssetList.into()),
        };

        let assets: Vec<AssetInput> = serde_json::from_value(Value::Array(items))
            .map_err(|e| ApiError::InvalidInput(format!("Invalid asset entry: {}", e)))?;

        Ok(self.importer.import_json_assets(assets, &created_by).await?)
    }

    /// 表格上传导入
    ///
    /// # 参数
    /// - file: (文件名, 内容)；None 表示请求中没有 file 字段
    /// - created_by: 表单字段 createdBy
    pub async fn upload_spreadsheet(
        &self,
        file: Option<(Option<String>, Vec<u8>)>,
        created_by: Option<String>,
    ) -> ApiResult<ImportReport> {
        let Some((file_name, bytes)) = file else {
            return Err(ImportError::MissingFile.into());
        };
        let created_by = created_by.unwrap_or_default();

        Ok(self
            .importer
            .import_spreadsheet(&bytes, file_name.as_deref(), &created_by)
            .await?)
    }
}
