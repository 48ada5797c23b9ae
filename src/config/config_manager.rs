// ==========================================
// 资产可靠性系统 - 配置管理器
// ==========================================
// 职责: 批处理默认过滤值、自动工单模板的读取与覆写
// 存储: config_kv 表 (scope_id='global')
// 优先级: 命令行参数 > config_kv > 内置默认值
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::{WorkOrderKind, WorkOrderStatus};
use crate::engine::preventive::PreventiveTemplate;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    // ===== 批处理过滤值 =====

    /// MTBF 统计的故障工单类型
    pub fn mtbf_kind_filter(&self) -> RepositoryResult<WorkOrderKind> {
        self.parse_kind(config_keys::MTBF_KIND_FILTER, defaults::MTBF_KIND_FILTER)
    }

    /// MTTR 统计的工单状态
    pub fn mttr_status_filter(&self) -> RepositoryResult<WorkOrderStatus> {
        let raw = self.get_config_or_default(
            config_keys::MTTR_STATUS_FILTER,
            defaults::MTTR_STATUS_FILTER,
        )?;
        WorkOrderStatus::parse(&raw).ok_or_else(|| RepositoryError::FieldValueError {
            field: config_keys::MTTR_STATUS_FILTER.to_string(),
            message: format!("未知工单状态 '{}'", raw),
        })
    }

    /// 预防性排程的工单类型
    pub fn preventive_kind_filter(&self) -> RepositoryResult<WorkOrderKind> {
        self.parse_kind(
            config_keys::PREVENTIVE_KIND_FILTER,
            defaults::PREVENTIVE_KIND_FILTER,
        )
    }

    /// 自动预防性工单模板
    pub fn preventive_template(&self) -> RepositoryResult<PreventiveTemplate> {
        let default = PreventiveTemplate::default();
        Ok(PreventiveTemplate {
            title: self.get_config_or_default(config_keys::PREVENTIVE_TITLE, &default.title)?,
            description: self.get_config_or_default(
                config_keys::PREVENTIVE_DESCRIPTION,
                &default.description,
            )?,
        })
    }

    fn parse_kind(&self, key: &str, default: &str) -> RepositoryResult<WorkOrderKind> {
        let raw = self.get_config_or_default(key, default)?;
        WorkOrderKind::parse(&raw).ok_or_else(|| RepositoryError::FieldValueError {
            field: key.to_string(),
            message: format!("未知工单类型 '{}'", raw),
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const MTBF_KIND_FILTER: &str = "mtbf.kind_filter";
    pub const MTTR_STATUS_FILTER: &str = "mttr.status_filter";
    pub const PREVENTIVE_KIND_FILTER: &str = "preventive.kind_filter";
    pub const PREVENTIVE_TITLE: &str = "preventive.title";
    pub const PREVENTIVE_DESCRIPTION: &str = "preventive.description";
}

mod defaults {
    pub const MTBF_KIND_FILTER: &str = "corrective";
    pub const MTTR_STATUS_FILTER: &str = "completed";
    pub const PREVENTIVE_KIND_FILTER: &str = "preventive";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_config_missing() {
        let config = manager();
        assert_eq!(config.mtbf_kind_filter().unwrap(), WorkOrderKind::Corrective);
        assert_eq!(config.mttr_status_filter().unwrap(), WorkOrderStatus::Completed);
        assert_eq!(config.preventive_kind_filter().unwrap(), WorkOrderKind::Preventive);
        assert_eq!(config.preventive_template().unwrap(), PreventiveTemplate::default());
    }

    #[test]
    fn test_overrides_from_config_kv() {
        let config = manager();
        config
            .set_global_config_value(config_keys::MTBF_KIND_FILTER, "Preditiva")
            .unwrap();
        config
            .set_global_config_value(config_keys::PREVENTIVE_TITLE, "PM automática")
            .unwrap();
        config
            .set_global_config_value(config_keys::PREVENTIVE_TITLE, "PM auto")
            .unwrap();

        assert_eq!(config.mtbf_kind_filter().unwrap(), WorkOrderKind::Predictive);
        assert_eq!(config.preventive_template().unwrap().title, "PM auto");
        assert_eq!(config.get_config_snapshot().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_filter_is_field_error() {
        let config = manager();
        config
            .set_global_config_value(config_keys::MTTR_STATUS_FILTER, "archived")
            .unwrap();
        assert!(matches!(
            config.mttr_status_filter(),
            Err(RepositoryError::FieldValueError { .. })
        ));
    }
}
