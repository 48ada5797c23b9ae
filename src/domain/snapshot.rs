// ==========================================
// 资产可靠性系统 - 资产快照
// ==========================================
// 引擎的唯一输入: 单个资产 + 其全部工单 + 关联维修记录
// 快照完全物化，引擎内部不访问数据库
// ==========================================

use crate::domain::asset::Asset;
use crate::domain::types::{WorkOrderId, WorkOrderKind, WorkOrderStatus};
use crate::domain::work_order::{MaintenanceRecord, WorkOrder};
use std::collections::HashMap;

// ==========================================
// AssetSnapshot - 单资产只读快照
// ==========================================
#[derive(Debug, Clone)]
pub struct AssetSnapshot {
    pub asset: Asset,
    work_orders: Vec<WorkOrder>,
    maintenance: HashMap<WorkOrderId, MaintenanceRecord>,
}

impl AssetSnapshot {
    /// 构建快照
    ///
    /// 工单按 (created_at ASC, work_order_id ASC) 重新排序，
    /// 保证区间重建的顺序稳定，与读取端的排序方式无关。
    pub fn new(
        asset: Asset,
        mut work_orders: Vec<WorkOrder>,
        maintenance: HashMap<WorkOrderId, MaintenanceRecord>,
    ) -> Self {
        work_orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.work_order_id.cmp(&b.work_order_id))
        });
        Self {
            asset,
            work_orders,
            maintenance,
        }
    }

    /// 全部工单 (已排序)
    pub fn work_orders(&self) -> &[WorkOrder] {
        &self.work_orders
    }

    /// 指定类型的工单 (保持排序)
    pub fn orders_of_kind(&self, kind: WorkOrderKind) -> Vec<&WorkOrder> {
        self.work_orders.iter().filter(|o| o.kind == kind).collect()
    }

    /// 指定状态的工单 (保持排序)
    pub fn orders_with_status(&self, status: WorkOrderStatus) -> Vec<&WorkOrder> {
        self.work_orders
            .iter()
            .filter(|o| o.status == status)
            .collect()
    }

    /// 工单关联的维修记录
    pub fn record_for(&self, work_order_id: WorkOrderId) -> Option<&MaintenanceRecord> {
        self.maintenance.get(&work_order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn order(id: WorkOrderId, created_at: NaiveDateTime) -> WorkOrder {
        WorkOrder {
            work_order_id: id,
            title: format!("WO-{}", id),
            description: None,
            kind: WorkOrderKind::Corrective,
            status: WorkOrderStatus::Pending,
            created_at,
            scheduled_at: None,
            asset_id: Some(1),
            requester_id: None,
        }
    }

    #[test]
    fn test_snapshot_orders_by_created_at_then_id() {
        let asset = Asset {
            asset_id: 1,
            name: "Compressor".to_string(),
            periodicity_days: None,
            mtbf: 0,
            mttr: 0,
            created_at: ts(1, 0),
        };
        let snapshot = AssetSnapshot::new(
            asset,
            vec![order(5, ts(3, 0)), order(9, ts(2, 0)), order(4, ts(3, 0))],
            HashMap::new(),
        );

        let ids: Vec<_> = snapshot.work_orders().iter().map(|o| o.work_order_id).collect();
        assert_eq!(ids, vec![9, 4, 5]);
    }
}
