// ==========================================
// 资产可靠性系统 - 资产数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 指标写入单资产单事务
// ==========================================

use crate::db::{format_datetime, get_datetime, open_sqlite_connection};
use crate::domain::asset::{Asset, NewAsset};
use crate::domain::types::{AssetId, MetricField};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str =
    "SELECT asset_id, name, periodicity_days, mtbf, mttr, created_at FROM asset";

fn map_asset(row: &rusqlite::Row<'_>) -> SqliteResult<Asset> {
    Ok(Asset {
        asset_id: row.get(0)?,
        name: row.get(1)?,
        periodicity_days: row.get(2)?,
        mtbf: row.get(3)?,
        mttr: row.get(4)?,
        created_at: get_datetime(row, 5)?,
    })
}

// ==========================================
// AssetRepository - 资产仓储
// ==========================================
pub struct AssetRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AssetRepository {
    /// 创建新的 AssetRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建资产
    ///
    /// # 返回
    /// - Ok(asset_id): 自增主键
    pub fn create(&self, asset: &NewAsset, created_at: NaiveDateTime) -> RepositoryResult<AssetId> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO asset (name, periodicity_days, mtbf, mttr, created_at) VALUES (?1, ?2, 0, 0, ?3)",
            params![asset.name, asset.periodicity_days, format_datetime(&created_at)],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按主键查询
    pub fn find_by_id(&self, asset_id: AssetId) -> RepositoryResult<Option<Asset>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE asset_id = ?1", SELECT_COLUMNS);
        let asset = conn
            .query_row(&sql, params![asset_id], map_asset)
            .optional()?;
        Ok(asset)
    }

    /// 查询资产列表
    ///
    /// # 参数
    /// - `filter`: 指定时只返回该资产 (不存在则为空列表)
    pub fn list(&self, filter: Option<AssetId>) -> RepositoryResult<Vec<Asset>> {
        let conn = self.get_conn()?;
        let assets = match filter {
            Some(asset_id) => {
                let sql = format!("{} WHERE asset_id = ?1", SELECT_COLUMNS);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![asset_id], map_asset)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                rows
            }
            None => {
                let sql = format!("{} ORDER BY asset_id ASC", SELECT_COLUMNS);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], map_asset)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                rows
            }
        };
        Ok(assets)
    }

    /// 更新单个可靠性指标 (单事务)
    pub fn update_metric(
        &self,
        asset_id: AssetId,
        field: MetricField,
        value: i64,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 列名来自封闭枚举，不接受外部输入
        let sql = format!(
            "UPDATE asset SET {} = ?1 WHERE asset_id = ?2",
            field.column_name()
        );
        let affected = tx.execute(&sql, params![value, asset_id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Asset".to_string(),
                id: asset_id.to_string(),
            });
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 删除资产 (工单的 asset_id 由外键置空)
    pub fn delete(&self, asset_id: AssetId) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM asset WHERE asset_id = ?1", params![asset_id])?;
        Ok(affected)
    }
}
