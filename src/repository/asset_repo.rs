// ==========================================
// IT 资产台账系统 - 资产 Repository Trait
// ==========================================
// 职责: 定义资产数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 唯一性: 由存储层唯一索引保证，不做"先查后写"
// ==========================================

use crate::domain::asset::{Asset, AssetPage, AssetPatch, AssetQuery, AssetStats, NewAsset};
use crate::domain::import::InsertManyOutcome;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// AssetRepository Trait
// ==========================================
// 实现者: AssetRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait AssetRepository: Send + Sync {
    // ===== 批量写入 =====

    /// 无序批量插入
    ///
    /// # 返回
    /// - Ok(InsertManyOutcome): 成功记录 + 单行失败（index 为入参中的位置）
    /// - Err: 存储不可用等整体失败（本次调用不落任何记录）
    ///
    /// # 说明
    /// - 单行失败（唯一约束 / 检查约束）不影响其余行
    /// - 单次调用相对其它调用是原子的
    async fn insert_many(&self, records: Vec<NewAsset>) -> RepositoryResult<InsertManyOutcome>;

    /// 插入单条资产
    async fn insert_one(&self, record: NewAsset) -> RepositoryResult<Asset>;

    // ===== 查询 =====

    /// 检查序列号是否已存在（含已软删除记录）
    async fn exists_by_serial(&self, serial_number: &str) -> RepositoryResult<bool>;

    /// 按 ID 查询（含已软删除记录，由调用方决定是否可见）
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Asset>>;

    /// 搜索 / 过滤 / 分页
    async fn list(&self, query: &AssetQuery) -> RepositoryResult<AssetPage>;

    /// 统计（不含已软删除记录）
    async fn stats(&self) -> RepositoryResult<AssetStats>;

    /// 记录总数
    async fn count(&self, include_deleted: bool) -> RepositoryResult<i64>;

    // ===== 更新 / 删除 =====

    /// 部分更新
    async fn update(&self, id: &str, patch: AssetPatch) -> RepositoryResult<Asset>;

    /// 设置软删除标记
    async fn set_deleted(&self, id: &str, deleted: bool) -> RepositoryResult<Asset>;

    /// 物理删除
    async fn delete_permanently(&self, id: &str) -> RepositoryResult<()>;
}
