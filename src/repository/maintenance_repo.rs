// ==========================================
// 资产可靠性系统 - 维修记录数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 写入路径见 WorkOrderRepository::complete_with_record (与状态切换同事务)
// ==========================================

use crate::db::{get_datetime, open_sqlite_connection};
use crate::domain::types::WorkOrderId;
use crate::domain::work_order::MaintenanceRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT work_order_id, executor_id, execution_start, execution_end,
           time_spent_secs, notes
    FROM maintenance_record
"#;

/// 单次 IN 查询的最大参数个数 (低于 SQLite 默认上限)
const MAX_IN_PARAMS: usize = 500;

fn map_record(row: &rusqlite::Row<'_>) -> SqliteResult<MaintenanceRecord> {
    Ok(MaintenanceRecord {
        work_order_id: row.get(0)?,
        executor_id: row.get(1)?,
        execution_start: get_datetime(row, 2)?,
        execution_end: get_datetime(row, 3)?,
        time_spent_secs: row.get(4)?,
        notes: row.get(5)?,
    })
}

// ==========================================
// MaintenanceRecordRepository - 维修记录仓储
// ==========================================
pub struct MaintenanceRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaintenanceRecordRepository {
    /// 创建新的 MaintenanceRecordRepository 实例
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

    /// 按工单ID查询维修记录
    pub fn find_by_work_order_id(
        &self,
        work_order_id: WorkOrderId,
    ) -> RepositoryResult<Option<MaintenanceRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE work_order_id = ?1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![work_order_id], map_record)
            .optional()?;
        Ok(record)
    }

    /// 批量查询维修记录
    ///
    /// # 返回
    /// - work_order_id -> MaintenanceRecord (无记录的工单不出现在结果中)
    pub fn find_by_work_order_ids(
        &self,
        work_order_ids: &[WorkOrderId],
    ) -> RepositoryResult<HashMap<WorkOrderId, MaintenanceRecord>> {
        let mut result = HashMap::with_capacity(work_order_ids.len());
        if work_order_ids.is_empty() {
            return Ok(result);
        }

        let conn = self.get_conn()?;
        for chunk in work_order_ids.chunks(MAX_IN_PARAMS) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("{} WHERE work_order_id IN ({})", SELECT_COLUMNS, placeholders);
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map(params_from_iter(chunk.iter()), map_record)?
                .collect::<SqliteResult<Vec<_>>>()?;
            for record in records {
                result.insert(record.work_order_id, record);
            }
        }
        Ok(result)
    }
}
