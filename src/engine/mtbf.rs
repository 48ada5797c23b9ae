// ==========================================
// 资产可靠性系统 - MTBF 计算引擎
// ==========================================
// 区间定义: 上一张故障工单的维修结束时间 -> 下一张故障工单的创建时间
// MTBF = 可用区间总和 / 故障数 (故障工单总数，不是可用区间数)
// 单位: 分钟，四舍五入取整
// ==========================================
// 红线: 纯函数，只读快照，不写库
// 红线: 区间不可用时必须给出原因
// ==========================================

use crate::domain::snapshot::AssetSnapshot;
use crate::domain::types::{WorkOrderId, WorkOrderKind};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

// ==========================================
// 计算结果
// ==========================================

/// 可用的故障间隔
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureInterval {
    pub from_work_order_id: WorkOrderId,
    pub to_work_order_id: WorkOrderId,
    pub repair_end: NaiveDateTime,
    pub next_failure_at: NaiveDateTime,
    pub seconds: f64,
}

/// 区间不可用原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntervalSkipReason {
    /// 上一张工单没有维修记录
    MissingMaintenanceRecord,
    /// 下一张工单创建时间不晚于上一次维修结束 (时钟偏差/脏数据)
    NonPositiveInterval,
}

/// 被跳过的工单对
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedInterval {
    pub from_work_order_id: WorkOrderId,
    pub to_work_order_id: WorkOrderId,
    pub reason: IntervalSkipReason,
}

/// MTBF 计算结果 (含证据)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MtbfResult {
    pub failure_count: usize,
    pub intervals: Vec<FailureInterval>,
    pub skipped: Vec<SkippedInterval>,
    pub total_seconds: f64,
    pub mtbf_exact_minutes: f64, // 取整前的分钟数
    pub mtbf_minutes: i64,       // 存储值
}

impl MtbfResult {
    fn empty(failure_count: usize, skipped: Vec<SkippedInterval>) -> Self {
        Self {
            failure_count,
            intervals: Vec::new(),
            skipped,
            total_seconds: 0.0,
            mtbf_exact_minutes: 0.0,
            mtbf_minutes: 0,
        }
    }
}

// ==========================================
// MtbfEngine - MTBF 计算引擎
// ==========================================
pub struct MtbfEngine {
    failure_kind: WorkOrderKind,
}

impl Default for MtbfEngine {
    fn default() -> Self {
        Self::new(WorkOrderKind::Corrective)
    }
}

impl MtbfEngine {
    /// 创建 MTBF 引擎
    ///
    /// # 参数
    /// - `failure_kind`: 视为"故障"的工单类型 (默认 CORRECTIVE)
    pub fn new(failure_kind: WorkOrderKind) -> Self {
        Self { failure_kind }
    }

    pub fn failure_kind(&self) -> WorkOrderKind {
        self.failure_kind
    }

    /// 计算单个资产的 MTBF
    ///
    /// 规则:
    /// 1) 故障数 n = 目标类型工单数；n == 0 → 0
    /// 2) 相邻工单对 (i, i+1): 仅当 i 有维修记录且 created_at(i+1) > execution_end(i) 时区间可用
    /// 3) MTBF = round(sum(可用区间秒数) / n / 60)
    /// 4) 无可用区间 → 0
    #[instrument(skip(self, snapshot), fields(asset_id = snapshot.asset.asset_id))]
    pub fn compute(&self, snapshot: &AssetSnapshot) -> MtbfResult {
        let failures = snapshot.orders_of_kind(self.failure_kind);
        let failure_count = failures.len();

        if failure_count == 0 {
            return MtbfResult::empty(0, Vec::new());
        }

        let mut intervals = Vec::new();
        let mut skipped = Vec::new();

        for pair in failures.windows(2) {
            let (current, next) = (pair[0], pair[1]);

            let repair_end = match snapshot.record_for(current.work_order_id) {
                Some(record) => record.execution_end,
                None => {
                    debug!(
                        from = current.work_order_id,
                        to = next.work_order_id,
                        "上一张工单无维修记录，区间忽略"
                    );
                    skipped.push(SkippedInterval {
                        from_work_order_id: current.work_order_id,
                        to_work_order_id: next.work_order_id,
                        reason: IntervalSkipReason::MissingMaintenanceRecord,
                    });
                    continue;
                }
            };

            if next.created_at <= repair_end {
                debug!(
                    from = current.work_order_id,
                    to = next.work_order_id,
                    %repair_end,
                    next_created_at = %next.created_at,
                    "下一张工单创建时间不晚于维修结束，区间忽略"
                );
                skipped.push(SkippedInterval {
                    from_work_order_id: current.work_order_id,
                    to_work_order_id: next.work_order_id,
                    reason: IntervalSkipReason::NonPositiveInterval,
                });
                continue;
            }

            let seconds = (next.created_at - repair_end).num_milliseconds() as f64 / 1000.0;
            debug!(
                from = current.work_order_id,
                to = next.work_order_id,
                seconds,
                "故障间隔"
            );
            intervals.push(FailureInterval {
                from_work_order_id: current.work_order_id,
                to_work_order_id: next.work_order_id,
                repair_end,
                next_failure_at: next.created_at,
                seconds,
            });
        }

        if intervals.is_empty() {
            return MtbfResult::empty(failure_count, skipped);
        }

        let total_seconds: f64 = intervals.iter().map(|i| i.seconds).sum();
        // 分母是故障总数，缺失区间会拉低结果，属于保守估计
        let mtbf_exact_minutes = total_seconds / failure_count as f64 / 60.0;
        let mtbf_minutes = mtbf_exact_minutes.round() as i64;

        MtbfResult {
            failure_count,
            intervals,
            skipped,
            total_seconds,
            mtbf_exact_minutes,
            mtbf_minutes,
        }
    }
}
