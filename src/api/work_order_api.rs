// ==========================================
// 资产可靠性系统 - 工单完成 API
// ==========================================
// 职责: 待处理工单 → 已完成，同时写入维修记录
// 约束: 校验失败时工单不被修改；写记录与切状态在同一事务
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::types::{WorkOrderId, WorkOrderStatus};
use crate::domain::work_order::{MaintenanceRecord, WorkOrder};
use crate::repository::maintenance_repo::MaintenanceRecordRepository;
use crate::repository::work_order_repo::WorkOrderRepository;

// ==========================================
// 请求结构
// ==========================================

/// 完成工单请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteWorkOrderRequest {
    pub executor_id: Option<i64>,
    pub execution_start: NaiveDateTime,
    pub execution_end: NaiveDateTime,
    /// 不填时取 execution_end - execution_start
    pub time_spent_secs: Option<i64>,
    pub notes: Option<String>,
}

impl CompleteWorkOrderRequest {
    /// 输入校验
    fn validate(&self) -> Vec<ValidationViolation> {
        let mut violations = Vec::new();

        if self.execution_end <= self.execution_start {
            violations.push(ValidationViolation {
                field: "execution_end".to_string(),
                reason: "执行结束时间必须晚于开始时间".to_string(),
                details: Some(serde_json::json!({
                    "execution_start": self.execution_start.to_string(),
                    "execution_end": self.execution_end.to_string(),
                })),
            });
        }

        if let Some(secs) = self.time_spent_secs {
            if secs <= 0 {
                violations.push(ValidationViolation {
                    field: "time_spent_secs".to_string(),
                    reason: "耗时必须为正数".to_string(),
                    details: Some(serde_json::json!({ "time_spent_secs": secs })),
                });
            }
        }

        violations
    }
}

// ==========================================
// WorkOrderApi - 工单 API
// ==========================================
pub struct WorkOrderApi {
    work_order_repo: Arc<WorkOrderRepository>,
    maintenance_repo: Arc<MaintenanceRecordRepository>,
}

impl WorkOrderApi {
    /// 创建新的WorkOrderApi实例
    pub fn new(
        work_order_repo: Arc<WorkOrderRepository>,
        maintenance_repo: Arc<MaintenanceRecordRepository>,
    ) -> Self {
        Self {
            work_order_repo,
            maintenance_repo,
        }
    }

    /// 查询工单
    pub fn get_work_order(&self, work_order_id: WorkOrderId) -> ApiResult<WorkOrder> {
        self.work_order_repo
            .find_by_id(work_order_id)?
            .ok_or_else(|| ApiError::NotFound(format!("WorkOrder(id={})不存在", work_order_id)))
    }

    /// 查询工单的维修记录
    pub fn get_maintenance_record(
        &self,
        work_order_id: WorkOrderId,
    ) -> ApiResult<Option<MaintenanceRecord>> {
        Ok(self.maintenance_repo.find_by_work_order_id(work_order_id)?)
    }

    /// 完成工单
    ///
    /// # 返回
    /// - Ok(MaintenanceRecord): 已写入的维修记录
    /// - Err(ApiError::ValidationError): 输入校验失败（工单未修改）
    /// - Err(ApiError::NotFound): 工单不存在
    /// - Err(ApiError::InvalidStateTransition): 工单不是待处理状态
    #[instrument(skip(self, request))]
    pub fn complete_work_order(
        &self,
        work_order_id: WorkOrderId,
        request: CompleteWorkOrderRequest,
    ) -> ApiResult<MaintenanceRecord> {
        let violations = request.validate();
        if !violations.is_empty() {
            return Err(ApiError::ValidationError {
                reason: format!("工单{}完成信息校验失败", work_order_id),
                violations,
            });
        }

        let order = self.get_work_order(work_order_id)?;
        if order.status != WorkOrderStatus::Pending {
            return Err(ApiError::InvalidStateTransition {
                from: order.status.to_db_str().to_string(),
                to: WorkOrderStatus::Completed.to_db_str().to_string(),
            });
        }

        let time_spent_secs = request
            .time_spent_secs
            .unwrap_or_else(|| (request.execution_end - request.execution_start).num_seconds());

        let record = MaintenanceRecord {
            work_order_id,
            executor_id: request.executor_id,
            execution_start: request.execution_start,
            execution_end: request.execution_end,
            time_spent_secs: Some(time_spent_secs),
            notes: request.notes,
        };

        // 仓储层在事务内再次确认状态，防止并发完成
        self.work_order_repo.complete_with_record(&record)?;

        info!(
            work_order_id,
            asset_id = ?order.asset_id,
            time_spent_secs,
            "工单已完成"
        );
        Ok(record)
    }
}
