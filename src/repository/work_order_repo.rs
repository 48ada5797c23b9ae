// ==========================================
// 资产可靠性系统 - 工单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: kind / status 在此处一次性归一化为枚举，
//       未知标签归入 Other 并记录告警
// ==========================================

use crate::db::{format_datetime, get_datetime, get_opt_datetime, open_sqlite_connection};
use crate::domain::types::{AssetId, WorkOrderId, WorkOrderKind, WorkOrderStatus};
use crate::domain::work_order::{MaintenanceRecord, NewWorkOrder, WorkOrder};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};
use tracing::warn;

const SELECT_COLUMNS: &str = r#"
    SELECT work_order_id, title, description, kind, status,
           created_at, scheduled_at, asset_id, requester_id
    FROM work_order
"#;

/// 数据库原始行 (kind/status 未归一化)
struct WorkOrderRow {
    work_order_id: WorkOrderId,
    title: String,
    description: Option<String>,
    kind: String,
    status: String,
    created_at: NaiveDateTime,
    scheduled_at: Option<NaiveDateTime>,
    asset_id: Option<AssetId>,
    requester_id: Option<i64>,
}

impl WorkOrderRow {
    fn from_row(row: &rusqlite::Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            work_order_id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            kind: row.get(3)?,
            status: row.get(4)?,
            created_at: get_datetime(row, 5)?,
            scheduled_at: get_opt_datetime(row, 6)?,
            asset_id: row.get(7)?,
            requester_id: row.get(8)?,
        })
    }

    fn into_work_order(self) -> WorkOrder {
        let kind = WorkOrderKind::from_db_label(&self.kind);
        if kind == WorkOrderKind::Other {
            warn!(work_order_id = self.work_order_id, label = %self.kind, "未知工单类型，归入 OTHER");
        }
        let status = WorkOrderStatus::from_db_label(&self.status);
        if status == WorkOrderStatus::Other {
            warn!(work_order_id = self.work_order_id, label = %self.status, "未知工单状态，归入 OTHER");
        }

        WorkOrder {
            work_order_id: self.work_order_id,
            title: self.title,
            description: self.description,
            kind,
            status,
            created_at: self.created_at,
            scheduled_at: self.scheduled_at,
            asset_id: self.asset_id,
            requester_id: self.requester_id,
        }
    }
}

// ==========================================
// WorkOrderRepository - 工单仓储
// ==========================================
pub struct WorkOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkOrderRepository {
    /// 创建新的 WorkOrderRepository 实例
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

    /// 新建工单 (单事务)
    ///
    /// # 返回
    /// - Ok(work_order_id): 自增主键
    pub fn create(&self, order: &NewWorkOrder) -> RepositoryResult<WorkOrderId> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO work_order (
                title, description, kind, status,
                created_at, scheduled_at, asset_id, requester_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                order.title,
                order.description,
                order.kind.to_db_str(),
                order.status.to_db_str(),
                format_datetime(&order.created_at),
                order.scheduled_at.as_ref().map(format_datetime),
                order.asset_id,
                order.requester_id,
            ],
        )?;
        let work_order_id = tx.last_insert_rowid();

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(work_order_id)
    }

    /// 按主键查询
    pub fn find_by_id(&self, work_order_id: WorkOrderId) -> RepositoryResult<Option<WorkOrder>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE work_order_id = ?1", SELECT_COLUMNS);
        let row = conn
            .query_row(&sql, params![work_order_id], WorkOrderRow::from_row)
            .optional()?;
        Ok(row.map(WorkOrderRow::into_work_order))
    }

    /// 查询资产的工单
    ///
    /// 排序: created_at ASC, work_order_id ASC
    /// 过滤在归一化之后进行，兼容历史大小写/葡语标签
    pub fn list_by_asset(
        &self,
        asset_id: AssetId,
        kind: Option<WorkOrderKind>,
        status: Option<WorkOrderStatus>,
    ) -> RepositoryResult<Vec<WorkOrder>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE asset_id = ?1 ORDER BY created_at ASC, work_order_id ASC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![asset_id], WorkOrderRow::from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let order = row.into_work_order();
            if kind.map_or(true, |k| order.kind == k) && status.map_or(true, |s| order.status == s) {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    /// 完成工单: 写入维修记录 + 状态置为 COMPLETED (同一事务)
    ///
    /// 只在工单仍为待处理时生效，否则整体回滚并返回 InvalidStateTransition
    pub fn complete_with_record(&self, record: &MaintenanceRecord) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let current_status: Option<String> = tx
            .query_row(
                "SELECT status FROM work_order WHERE work_order_id = ?1",
                params![record.work_order_id],
                |row| row.get(0),
            )
            .optional()?;

        let current_status = current_status.ok_or_else(|| RepositoryError::NotFound {
            entity: "WorkOrder".to_string(),
            id: record.work_order_id.to_string(),
        })?;
        if WorkOrderStatus::parse(&current_status) != Some(WorkOrderStatus::Pending) {
            return Err(RepositoryError::InvalidStateTransition {
                from: current_status,
                to: WorkOrderStatus::Completed.to_db_str().to_string(),
            });
        }

        tx.execute(
            r#"
            INSERT INTO maintenance_record (
                work_order_id, executor_id, execution_start, execution_end,
                time_spent_secs, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.work_order_id,
                record.executor_id,
                format_datetime(&record.execution_start),
                format_datetime(&record.execution_end),
                record.time_spent_secs,
                record.notes,
            ],
        )?;
        tx.execute(
            "UPDATE work_order SET status = ?1 WHERE work_order_id = ?2",
            params![WorkOrderStatus::Completed.to_db_str(), record.work_order_id],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}
