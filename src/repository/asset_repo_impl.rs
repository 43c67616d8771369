// ==========================================
// IT 资产台账系统 - 资产 Repository 实现
// ==========================================
// 职责: 实现资产数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD + schema 级默认值
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::asset::{
    Asset, AssetPage, AssetPatch, AssetQuery, AssetStats, CountBucket, NewAsset,
};
use crate::domain::import::{InsertManyOutcome, WriteError, WriteErrorKind};
use crate::domain::types::{AssetStatus, DeviceCategory};
use crate::repository::asset_repo::AssetRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    id, serial_number, company_name, branch, department, user_name, brand,
    device, device_serial_no, operating_system, date_of_purchase, remark,
    status, is_deleted, created_by, created_at, updated_at
"#;

/// 部门统计只取前 N 个
const TOP_DEPARTMENTS: i64 = 10;

fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// 去空白；空串视为 None
fn normalize_null(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// 序列号规范化: TRIM + UPPER
fn normalize_serial(value: &str) -> String {
    value.trim().to_uppercase()
}

/// LIKE 模式转义（ESCAPE '\'）
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("%{}%", escaped)
}

/// 取底层 SQLite 原始错误文本
fn sqlite_message(err: &rusqlite::Error) -> String {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(msg)) => msg.clone(),
        other => other.to_string(),
    }
}

// ==========================================
// AssetRepositoryImpl
// ==========================================
pub struct AssetRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl AssetRepositoryImpl {
    /// 创建新的 Repository 实例（打开连接并确保建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            ensure_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Asset> {
        let date_of_purchase: Option<String> = row.get(10)?;
        let created_at: String = row.get(15)?;
        let updated_at: String = row.get(16)?;

        Ok(Asset {
            id: row.get(0)?,
            serial_number: row.get(1)?,
            company_name: row.get(2)?,
            branch: row.get(3)?,
            department: row.get(4)?,
            user_name: row.get(5)?,
            brand: row.get(6)?,
            device: row.get(7)?,
            device_serial_no: row.get(8)?,
            operating_system: row.get(9)?,
            date_of_purchase: date_of_purchase
                .as_deref()
                .map(|raw| parse_ts(raw, 10))
                .transpose()?,
            remark: row.get(11)?,
            status: row.get(12)?,
            is_deleted: row.get::<_, i64>(13)? != 0,
            created_by: row.get(14)?,
            created_at: parse_ts(&created_at, 15)?,
            updated_at: parse_ts(&updated_at, 16)?,
        })
    }

    /// 套用 schema 级规则，生成待落库记录
    ///
    /// # 返回
    /// - Err((kind, message)): 必填字段缺失（单行失败）
    fn prepare_record(
        record: NewAsset,
        now: DateTime<Utc>,
    ) -> Result<Asset, (WriteErrorKind, String)> {
        let serial_number = record
            .serial_number
            .as_deref()
            .map(normalize_serial)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                (
                    WriteErrorKind::ConstraintViolation,
                    "serialNumber is required".to_string(),
                )
            })?;

        let created_by = record.created_by.trim().to_string();
        if created_by.is_empty() {
            return Err((
                WriteErrorKind::ConstraintViolation,
                "createdBy is required".to_string(),
            ));
        }

        Ok(Asset {
            id: Uuid::new_v4().to_string(),
            serial_number,
            company_name: normalize_null(record.company_name),
            branch: normalize_null(record.branch),
            department: normalize_null(record.department),
            user_name: normalize_null(record.user_name),
            brand: normalize_null(record.brand),
            device: normalize_null(record.device)
                .unwrap_or_else(|| DeviceCategory::Other.as_str().to_string()),
            device_serial_no: normalize_null(record.device_serial_no),
            operating_system: normalize_null(record.operating_system),
            date_of_purchase: record.date_of_purchase,
            remark: normalize_null(record.remark),
            status: normalize_null(record.status)
                .unwrap_or_else(|| AssetStatus::Active.as_str().to_string()),
            is_deleted: false,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    fn insert_asset_tx(tx: &Transaction<'_>, asset: &Asset) -> rusqlite::Result<usize> {
        let mut stmt = tx.prepare_cached(
            r#"
            INSERT INTO assets (
                id, serial_number, company_name, branch, department, user_name, brand,
                device, device_serial_no, operating_system, date_of_purchase, remark,
                status, is_deleted, created_by, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17
            )
            "#,
        )?;

        stmt.execute(params![
            asset.id,
            asset.serial_number,
            asset.company_name,
            asset.branch,
            asset.department,
            asset.user_name,
            asset.brand,
            asset.device,
            asset.device_serial_no,
            asset.operating_system,
            asset.date_of_purchase.as_ref().map(fmt_ts),
            asset.remark,
            asset.status,
            asset.is_deleted as i32,
            asset.created_by,
            fmt_ts(&asset.created_at),
            fmt_ts(&asset.updated_at),
        ])
    }

    fn find_by_id_conn(conn: &Connection, id: &str) -> RepositoryResult<Option<Asset>> {
        let sql = format!("SELECT {} FROM assets WHERE id = ?1", SELECT_COLUMNS);
        let asset = conn
            .query_row(&sql, params![id], Self::map_row)
            .optional()?;
        Ok(asset)
    }

    fn require_by_id(conn: &Connection, id: &str) -> RepositoryResult<Asset> {
        Self::find_by_id_conn(conn, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Asset".to_string(),
            id: id.to_string(),
        })
    }

    /// 构建列表查询的 WHERE 子句与参数
    fn build_filter(query: &AssetQuery) -> (String, Vec<Value>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            clauses.push("is_deleted = 0".to_string());
        }

        if let Some(term) = normalize_null(query.search.clone()) {
            let pattern = escape_like(&term);
            let searchable = [
                "serial_number",
                "company_name",
                "user_name",
                "department",
                "device_serial_no",
                "brand",
            ];
            let ors = searchable
                .iter()
                .map(|col| {
                    values.push(Value::from(pattern.clone()));
                    format!("{} LIKE ?{} ESCAPE '\\'", col, values.len())
                })
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({})", ors));
        }

        let exact_filters = [
            ("status", &query.status),
            ("device", &query.device),
            ("department", &query.department),
            ("company_name", &query.company_name),
        ];
        for (col, value) in exact_filters {
            if let Some(v) = normalize_null(value.clone()) {
                values.push(Value::from(v));
                clauses.push(format!("{} = ?{} COLLATE NOCASE", col, values.len()));
            }
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        (where_sql, values)
    }

    fn count_by(conn: &Connection, sql: &str) -> RepositoryResult<Vec<CountBucket>> {
        let mut stmt = conn.prepare(sql)?;
        let buckets = stmt
            .query_map([], |row| {
                Ok(CountBucket {
                    key: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(buckets)
    }
}

#[async_trait]
impl AssetRepository for AssetRepositoryImpl {
    /// 无序批量插入（单事务；逐行失败各自记录）
    async fn insert_many(&self, records: Vec<NewAsset>) -> RepositoryResult<InsertManyOutcome> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let now = Utc::now();
        let mut outcome = InsertManyOutcome::default();

        for (index, record) in records.into_iter().enumerate() {
            let asset = match Self::prepare_record(record, now) {
                Ok(asset) => asset,
                Err((kind, errmsg)) => {
                    outcome.write_errors.push(WriteError {
                        index,
                        kind,
                        errmsg,
                    });
                    continue;
                }
            };

            match Self::insert_asset_tx(&tx, &asset) {
                Ok(_) => outcome.inserted.push(asset),
                Err(err) => {
                    let errmsg = sqlite_message(&err);
                    let kind = match RepositoryError::from(err) {
                        RepositoryError::UniqueConstraintViolation(_) => {
                            WriteErrorKind::DuplicateKey
                        }
                        e if e.is_row_level() => WriteErrorKind::ConstraintViolation,
                        // 非单行错误: 放弃本次调用（事务随 tx 释放回滚）
                        e => return Err(e),
                    };
                    outcome.write_errors.push(WriteError {
                        index,
                        kind,
                        errmsg,
                    });
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(outcome)
    }

    async fn insert_one(&self, record: NewAsset) -> RepositoryResult<Asset> {
        let asset = Self::prepare_record(record, Utc::now()).map_err(|(_, message)| {
            RepositoryError::FieldValueError {
                field: "asset".to_string(),
                message,
            }
        })?;

        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Self::insert_asset_tx(&tx, &asset)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(asset)
    }

    async fn exists_by_serial(&self, serial_number: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM assets WHERE serial_number = ?1)",
            params![normalize_serial(serial_number)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Asset>> {
        let conn = self.get_conn()?;
        Self::find_by_id_conn(&conn, id)
    }

    async fn list(&self, query: &AssetQuery) -> RepositoryResult<AssetPage> {
        let conn = self.get_conn()?;
        let (where_sql, mut values) = Self::build_filter(query);

        let count_sql = format!("SELECT COUNT(*) FROM assets{}", where_sql);
        let total: i64 = conn.query_row(&count_sql, params_from_iter(values.iter()), |row| {
            row.get(0)
        })?;

        let page = query.page();
        let limit = query.limit();
        let mut sql = format!(
            "SELECT {} FROM assets{} ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS, where_sql
        );
        values.push(Value::from(i64::from(limit)));
        sql.push_str(&format!(" LIMIT ?{}", values.len()));
        values.push(Value::from(query.offset() as i64));
        sql.push_str(&format!(" OFFSET ?{}", values.len()));

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values.iter()), Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let total_pages = ((total.max(0) as u64 + u64::from(limit) - 1) / u64::from(limit)) as u32;

        Ok(AssetPage {
            items,
            total,
            page,
            limit,
            total_pages,
        })
    }

    async fn stats(&self) -> RepositoryResult<AssetStats> {
        let conn = self.get_conn()?;

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM assets WHERE is_deleted = 0",
            [],
            |row| row.get(0),
        )?;
        let deleted: i64 = conn.query_row(
            "SELECT COUNT(*) FROM assets WHERE is_deleted = 1",
            [],
            |row| row.get(0),
        )?;

        let by_status = Self::count_by(
            &conn,
            "SELECT status, COUNT(*) AS n FROM assets WHERE is_deleted = 0
             GROUP BY status ORDER BY n DESC, status",
        )?;
        let by_device = Self::count_by(
            &conn,
            "SELECT device, COUNT(*) AS n FROM assets WHERE is_deleted = 0
             GROUP BY device ORDER BY n DESC, device",
        )?;
        let by_department = Self::count_by(
            &conn,
            &format!(
                "SELECT COALESCE(department, 'NA') AS dept, COUNT(*) AS n FROM assets
                 WHERE is_deleted = 0 GROUP BY dept ORDER BY n DESC, dept LIMIT {}",
                TOP_DEPARTMENTS
            ),
        )?;

        Ok(AssetStats {
            total,
            deleted,
            by_status,
            by_device,
            by_department,
        })
    }

    async fn count(&self, include_deleted: bool) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let sql = if include_deleted {
            "SELECT COUNT(*) FROM assets"
        } else {
            "SELECT COUNT(*) FROM assets WHERE is_deleted = 0"
        };
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n)
    }

    async fn update(&self, id: &str, patch: AssetPatch) -> RepositoryResult<Asset> {
        let conn = self.get_conn()?;
        let mut asset = Self::require_by_id(&conn, id)?;

        if let Some(serial) = patch.serial_number {
            let serial = normalize_serial(&serial);
            if serial.is_empty() {
                return Err(RepositoryError::FieldValueError {
                    field: "serialNumber".to_string(),
                    message: "serialNumber cannot be empty".to_string(),
                });
            }
            asset.serial_number = serial;
        }
        if patch.company_name.is_some() {
            asset.company_name = normalize_null(patch.company_name);
        }
        if patch.branch.is_some() {
            asset.branch = normalize_null(patch.branch);
        }
        if patch.department.is_some() {
            asset.department = normalize_null(patch.department);
        }
        if patch.user_name.is_some() {
            asset.user_name = normalize_null(patch.user_name);
        }
        if patch.brand.is_some() {
            asset.brand = normalize_null(patch.brand);
        }
        if let Some(device) = normalize_null(patch.device) {
            asset.device = device;
        }
        if patch.device_serial_no.is_some() {
            asset.device_serial_no = normalize_null(patch.device_serial_no);
        }
        if patch.operating_system.is_some() {
            asset.operating_system = normalize_null(patch.operating_system);
        }
        if patch.date_of_purchase.is_some() {
            asset.date_of_purchase = patch.date_of_purchase;
        }
        if patch.remark.is_some() {
            asset.remark = normalize_null(patch.remark);
        }
        if let Some(status) = normalize_null(patch.status) {
            asset.status = status;
        }
        asset.updated_at = Utc::now();

        conn.execute(
            r#"
            UPDATE assets SET
                serial_number = ?2, company_name = ?3, branch = ?4, department = ?5,
                user_name = ?6, brand = ?7, device = ?8, device_serial_no = ?9,
                operating_system = ?10, date_of_purchase = ?11, remark = ?12,
                status = ?13, updated_at = ?14
            WHERE id = ?1
            "#,
            params![
                asset.id,
                asset.serial_number,
                asset.company_name,
                asset.branch,
                asset.department,
                asset.user_name,
                asset.brand,
                asset.device,
                asset.device_serial_no,
                asset.operating_system,
                asset.date_of_purchase.as_ref().map(fmt_ts),
                asset.remark,
                asset.status,
                fmt_ts(&asset.updated_at),
            ],
        )?;

        Ok(asset)
    }

    async fn set_deleted(&self, id: &str, deleted: bool) -> RepositoryResult<Asset> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE assets SET is_deleted = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, deleted as i32, fmt_ts(&Utc::now())],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Asset".to_string(),
                id: id.to_string(),
            });
        }
        Self::require_by_id(&conn, id)
    }

    async fn delete_permanently(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute("DELETE FROM assets WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Asset".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
