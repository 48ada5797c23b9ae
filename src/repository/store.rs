// ==========================================
// 资产可靠性系统 - 批处理数据访问接口
// ==========================================
// 职责: 定义批处理引擎依赖的读写接口（不包含业务逻辑）
// 实现者: SqliteMaintenanceStore（使用 rusqlite）
// 读接口返回完全物化的数据，引擎不做隐式的逐字段查询
// ==========================================

use crate::domain::asset::Asset;
use crate::domain::snapshot::AssetSnapshot;
use crate::domain::types::{AssetId, MetricField, WorkOrderId, WorkOrderKind, WorkOrderStatus};
use crate::domain::work_order::{MaintenanceRecord, NewWorkOrder, WorkOrder};
use crate::repository::asset_repo::AssetRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::maintenance_repo::MaintenanceRecordRepository;
use crate::repository::work_order_repo::WorkOrderRepository;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// 读接口
// ==========================================

pub trait AssetReader: Send + Sync {
    /// 查询资产 (filter 指定时只返回该资产)
    fn list_assets(&self, filter: Option<AssetId>) -> RepositoryResult<Vec<Asset>>;
}

pub trait WorkOrderReader: Send + Sync {
    /// 查询资产工单，按 created_at ASC, work_order_id ASC 排序
    fn list_work_orders(
        &self,
        asset_id: AssetId,
        kind: Option<WorkOrderKind>,
        status: Option<WorkOrderStatus>,
    ) -> RepositoryResult<Vec<WorkOrder>>;
}

pub trait MaintenanceRecordReader: Send + Sync {
    /// 批量查询维修记录
    fn list_maintenance_records(
        &self,
        work_order_ids: &[WorkOrderId],
    ) -> RepositoryResult<HashMap<WorkOrderId, MaintenanceRecord>>;
}

// ==========================================
// 写接口 (每次调用单事务)
// ==========================================

pub trait MaintenanceWriter: Send + Sync {
    fn update_asset_metric(
        &self,
        asset_id: AssetId,
        field: MetricField,
        value: i64,
    ) -> RepositoryResult<()>;

    fn create_work_order(&self, order: &NewWorkOrder) -> RepositoryResult<WorkOrderId>;
}

// ==========================================
// MaintenanceStore - 批处理所需的全部数据访问
// ==========================================
pub trait MaintenanceStore:
    AssetReader + WorkOrderReader + MaintenanceRecordReader + MaintenanceWriter
{
    /// 组装单资产快照: 资产 + 全部工单 + 关联维修记录
    fn load_snapshot(&self, asset: Asset) -> RepositoryResult<AssetSnapshot> {
        let work_orders = self.list_work_orders(asset.asset_id, None, None)?;
        let ids: Vec<WorkOrderId> = work_orders.iter().map(|o| o.work_order_id).collect();
        let records = self.list_maintenance_records(&ids)?;
        Ok(AssetSnapshot::new(asset, work_orders, records))
    }
}

impl<T> MaintenanceStore for T where
    T: AssetReader + WorkOrderReader + MaintenanceRecordReader + MaintenanceWriter
{
}

// ==========================================
// SqliteMaintenanceStore - SQLite 实现
// ==========================================
// 三个仓储共享同一连接
pub struct SqliteMaintenanceStore {
    asset_repo: AssetRepository,
    work_order_repo: WorkOrderRepository,
    maintenance_repo: MaintenanceRecordRepository,
}

impl SqliteMaintenanceStore {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            asset_repo: AssetRepository::from_connection(conn.clone()),
            work_order_repo: WorkOrderRepository::from_connection(conn.clone()),
            maintenance_repo: MaintenanceRecordRepository::from_connection(conn),
        }
    }

    pub fn asset_repo(&self) -> &AssetRepository {
        &self.asset_repo
    }

    pub fn work_order_repo(&self) -> &WorkOrderRepository {
        &self.work_order_repo
    }

    pub fn maintenance_repo(&self) -> &MaintenanceRecordRepository {
        &self.maintenance_repo
    }
}

impl AssetReader for SqliteMaintenanceStore {
    fn list_assets(&self, filter: Option<AssetId>) -> RepositoryResult<Vec<Asset>> {
        self.asset_repo.list(filter)
    }
}

impl WorkOrderReader for SqliteMaintenanceStore {
    fn list_work_orders(
        &self,
        asset_id: AssetId,
        kind: Option<WorkOrderKind>,
        status: Option<WorkOrderStatus>,
    ) -> RepositoryResult<Vec<WorkOrder>> {
        self.work_order_repo.list_by_asset(asset_id, kind, status)
    }
}

impl MaintenanceRecordReader for SqliteMaintenanceStore {
    fn list_maintenance_records(
        &self,
        work_order_ids: &[WorkOrderId],
    ) -> RepositoryResult<HashMap<WorkOrderId, MaintenanceRecord>> {
        self.maintenance_repo.find_by_work_order_ids(work_order_ids)
    }
}

impl MaintenanceWriter for SqliteMaintenanceStore {
    fn update_asset_metric(
        &self,
        asset_id: AssetId,
        field: MetricField,
        value: i64,
    ) -> RepositoryResult<()> {
        self.asset_repo.update_metric(asset_id, field, value)
    }

    fn create_work_order(&self, order: &NewWorkOrder) -> RepositoryResult<WorkOrderId> {
        self.work_order_repo.create(order)
    }
}
