// ==========================================
// 资产可靠性系统 - 工单与维修记录领域模型
// ==========================================
// 对齐: work_order / maintenance_record 表
// 约束: 每张工单至多一条维修记录 (以工单ID为主键)
// 约束: 资产被删除后 asset_id 置空，工单保留
// ==========================================

use crate::domain::types::{AssetId, WorkOrderId, WorkOrderKind, WorkOrderStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// WorkOrder - 工单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub work_order_id: WorkOrderId,
    pub title: String,
    pub description: Option<String>,
    pub kind: WorkOrderKind,
    pub status: WorkOrderStatus,
    pub created_at: NaiveDateTime,           // 创建时间 (不可变)
    pub scheduled_at: Option<NaiveDateTime>, // 计划执行时间
    pub asset_id: Option<AssetId>,           // 资产删除后为 None
    pub requester_id: Option<i64>,           // 申请人 (可空)
}

/// 新建工单参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkOrder {
    pub title: String,
    pub description: Option<String>,
    pub kind: WorkOrderKind,
    pub status: WorkOrderStatus,
    pub created_at: NaiveDateTime,
    pub scheduled_at: Option<NaiveDateTime>,
    pub asset_id: Option<AssetId>,
    pub requester_id: Option<i64>,
}

// ==========================================
// MaintenanceRecord - 维修记录
// ==========================================
// 在工单 PENDING -> COMPLETED 时一次性写入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub work_order_id: WorkOrderId,
    pub executor_id: Option<i64>,
    pub execution_start: NaiveDateTime,
    pub execution_end: NaiveDateTime,
    pub time_spent_secs: Option<i64>, // 耗时 (秒)，通常等于 end - start
    pub notes: Option<String>,
}
