// ==========================================
// 资产可靠性系统 - MTTR 计算引擎
// ==========================================
// MTTR = floor(维修耗时总和 / 维修记录数 / 60)
// 单位: 分钟，向下取整 (与 MTBF 的四舍五入不同，保持原有口径)
// ==========================================
// 红线: 纯函数，只读快照，不写库
// ==========================================

use crate::domain::snapshot::AssetSnapshot;
use crate::domain::types::{MetricField, WorkOrderStatus};
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// MTTR 计算结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MttrResult {
    pub matched_order_count: usize, // 状态匹配的工单数
    pub record_count: usize,        // 关联维修记录数 (分母)
    pub total_seconds: i64,         // 耗时总和
    pub mttr_minutes: i64,
}

// ==========================================
// MttrEngine - MTTR 计算引擎
// ==========================================
pub struct MttrEngine {
    repaired_status: WorkOrderStatus,
}

impl Default for MttrEngine {
    fn default() -> Self {
        Self::new(WorkOrderStatus::Completed)
    }
}

impl MttrEngine {
    /// 创建 MTTR 引擎
    ///
    /// # 参数
    /// - `repaired_status`: 参与统计的工单状态 (默认 COMPLETED)
    pub fn new(repaired_status: WorkOrderStatus) -> Self {
        Self { repaired_status }
    }

    pub fn repaired_status(&self) -> WorkOrderStatus {
        self.repaired_status
    }

    /// 计算单个资产的 MTTR
    ///
    /// 边界处理:
    /// - 无匹配工单 → 0
    /// - 匹配工单均无维修记录 → 0
    /// - 耗时总和为空或不大于 0 → 0
    /// - 缺失耗时的记录计入记录数，不贡献耗时
    /// - 耗时总和超出 i64 → Err(MetricOverflow)
    #[instrument(skip(self, snapshot), fields(asset_id = snapshot.asset.asset_id))]
    pub fn compute(&self, snapshot: &AssetSnapshot) -> EngineResult<MttrResult> {
        let orders = snapshot.orders_with_status(self.repaired_status);
        let matched_order_count = orders.len();

        let records: Vec<_> = orders
            .iter()
            .filter_map(|o| snapshot.record_for(o.work_order_id))
            .collect();
        let record_count = records.len();
        let total_seconds = records
            .iter()
            .filter_map(|r| r.time_spent_secs)
            .try_fold(0i64, i64::checked_add)
            .ok_or(EngineError::MetricOverflow {
                asset_id: snapshot.asset.asset_id,
                field: MetricField::Mttr,
            })?;

        let mttr_minutes = if record_count == 0 || total_seconds <= 0 {
            0
        } else {
            (total_seconds as f64 / record_count as f64 / 60.0).floor() as i64
        };

        Ok(MttrResult {
            matched_order_count,
            record_count,
            total_seconds,
            mttr_minutes,
        })
    }
}
