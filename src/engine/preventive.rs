// ==========================================
// 资产可靠性系统 - 预防性工单排程引擎
// ==========================================
// 决策树 (逐资产独立判定):
// 0) 周期非正或目标日期溢出 → 不处理 (配置错误)
// 1) 无任何预防性工单 → now + 周期
// 2) 存在 PENDING 预防性工单 → 不处理 (绝不重复排程)
// 3) 有预防性工单但无 COMPLETED → now + 周期
// 4) 仅有已完成 → 最晚维修结束时间 + 周期
//    (无维修记录时回退到最晚计划时间，再回退到 now)
// 5) 情形 3/4 下，同一自然日已有预防性工单 → 不处理
// ==========================================
// 红线: 纯函数，只输出决策与原因，不写库
// ==========================================

use crate::domain::snapshot::AssetSnapshot;
use crate::domain::types::{WorkOrderId, WorkOrderKind, WorkOrderStatus};
use crate::domain::work_order::NewWorkOrder;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::instrument;

// ==========================================
// 决策输出
// ==========================================

/// 目标日期的计算基准
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleBasis {
    /// 情形1: 从未有过预防性工单
    NoPreventiveHistory,
    /// 情形3: 有预防性工单但没有已完成的
    NoCompletedPreventive,
    /// 情形4: 最晚的维修结束时间
    LastExecutionEnd {
        work_order_id: WorkOrderId,
        execution_end: NaiveDateTime,
    },
    /// 情形4 回退: 已完成工单的最晚计划时间
    LastScheduledAt {
        work_order_id: WorkOrderId,
        scheduled_at: NaiveDateTime,
    },
    /// 情形4 回退: 已完成工单均无计划时间
    CompletedWithoutDates,
}

/// 不处理的原因
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoActionReason {
    /// 周期未配置、非正数，或目标日期超出可表示范围
    InvalidPeriodicity { periodicity_days: Option<i64> },
    /// 已有待处理的预防性工单
    PendingExists { work_order_id: WorkOrderId },
    /// 目标日期已有预防性工单
    DuplicateDate {
        date: NaiveDate,
        work_order_id: WorkOrderId,
    },
}

/// 排程决策
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreventiveDecision {
    NoAction { reason: NoActionReason },
    CreateWorkOrder {
        scheduled_at: NaiveDateTime,
        basis: ScheduleBasis,
    },
}

impl PreventiveDecision {
    pub fn is_create(&self) -> bool {
        matches!(self, PreventiveDecision::CreateWorkOrder { .. })
    }
}

// ==========================================
// PreventiveTemplate - 自动工单模板
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreventiveTemplate {
    pub title: String,
    pub description: String,
}

impl Default for PreventiveTemplate {
    fn default() -> Self {
        Self {
            title: "Automatic preventive maintenance".to_string(),
            description: "Preventive work order generated automatically from the asset periodicity."
                .to_string(),
        }
    }
}

// ==========================================
// PreventiveEngine - 预防性排程引擎
// ==========================================
pub struct PreventiveEngine {
    preventive_kind: WorkOrderKind,
}

impl Default for PreventiveEngine {
    fn default() -> Self {
        Self::new(WorkOrderKind::Preventive)
    }
}

impl PreventiveEngine {
    /// 创建排程引擎
    ///
    /// # 参数
    /// - `preventive_kind`: 视为"预防性"的工单类型 (默认 PREVENTIVE)
    pub fn new(preventive_kind: WorkOrderKind) -> Self {
        Self { preventive_kind }
    }

    pub fn preventive_kind(&self) -> WorkOrderKind {
        self.preventive_kind
    }

    /// 对单个资产做排程决策
    #[instrument(skip(self, snapshot), fields(asset_id = snapshot.asset.asset_id))]
    pub fn decide(&self, snapshot: &AssetSnapshot, now: NaiveDateTime) -> PreventiveDecision {
        let invalid = || PreventiveDecision::NoAction {
            reason: NoActionReason::InvalidPeriodicity {
                periodicity_days: snapshot.asset.periodicity_days,
            },
        };
        let Some(periodicity_days) = snapshot.asset.valid_periodicity_days() else {
            return invalid();
        };
        let now = now.with_nanosecond(0).unwrap_or(now);

        // 目标日期超出可表示范围同样视为周期配置错误
        let period = match Duration::try_days(periodicity_days) {
            Some(period) => period,
            None => return invalid(),
        };

        let preventive = snapshot.orders_of_kind(self.preventive_kind);

        // 情形1
        if preventive.is_empty() {
            return match now.checked_add_signed(period) {
                Some(scheduled_at) => PreventiveDecision::CreateWorkOrder {
                    scheduled_at,
                    basis: ScheduleBasis::NoPreventiveHistory,
                },
                None => invalid(),
            };
        }

        // 情形2
        if let Some(pending) = preventive
            .iter()
            .find(|o| o.status == WorkOrderStatus::Pending)
        {
            return PreventiveDecision::NoAction {
                reason: NoActionReason::PendingExists {
                    work_order_id: pending.work_order_id,
                },
            };
        }

        let completed: Vec<_> = preventive
            .iter()
            .filter(|o| o.status == WorkOrderStatus::Completed)
            .collect();

        let (base, basis) = if completed.is_empty() {
            // 情形3
            (now, ScheduleBasis::NoCompletedPreventive)
        } else {
            // 情形4
            let latest_record = completed
                .iter()
                .filter_map(|o| snapshot.record_for(o.work_order_id))
                .max_by(|a, b| {
                    a.execution_end
                        .cmp(&b.execution_end)
                        .then(a.work_order_id.cmp(&b.work_order_id))
                });

            match latest_record {
                Some(record) => (
                    record.execution_end,
                    ScheduleBasis::LastExecutionEnd {
                        work_order_id: record.work_order_id,
                        execution_end: record.execution_end,
                    },
                ),
                None => {
                    let latest_scheduled = completed
                        .iter()
                        .filter_map(|o| o.scheduled_at.map(|at| (at, o.work_order_id)))
                        .max();
                    match latest_scheduled {
                        Some((at, work_order_id)) => (
                            at,
                            ScheduleBasis::LastScheduledAt {
                                work_order_id,
                                scheduled_at: at,
                            },
                        ),
                        None => (now, ScheduleBasis::CompletedWithoutDates),
                    }
                }
            }
        };

        let scheduled_at = match base.checked_add_signed(period) {
            Some(at) => at,
            None => return invalid(),
        };

        // 步骤5: 按自然日去重
        let target_date = scheduled_at.date();
        if let Some(existing) = preventive
            .iter()
            .find(|o| o.scheduled_at.map(|at| at.date()) == Some(target_date))
        {
            return PreventiveDecision::NoAction {
                reason: NoActionReason::DuplicateDate {
                    date: target_date,
                    work_order_id: existing.work_order_id,
                },
            };
        }

        PreventiveDecision::CreateWorkOrder {
            scheduled_at,
            basis,
        }
    }

    /// 根据决策构造待写入的工单
    pub fn build_work_order(
        &self,
        snapshot: &AssetSnapshot,
        scheduled_at: NaiveDateTime,
        now: NaiveDateTime,
        template: &PreventiveTemplate,
    ) -> NewWorkOrder {
        NewWorkOrder {
            title: template.title.clone(),
            description: Some(template.description.clone()),
            kind: self.preventive_kind,
            status: WorkOrderStatus::Pending,
            created_at: now.with_nanosecond(0).unwrap_or(now),
            scheduled_at: Some(scheduled_at),
            asset_id: Some(snapshot.asset.asset_id),
            requester_id: None,
        }
    }
}
