// ==========================================
// 批处理运行报告
// ==========================================

use crate::domain::types::AssetId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// 批处理任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchJob {
    Mtbf,
    Mttr,
    Preventive,
}

impl fmt::Display for BatchJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchJob::Mtbf => write!(f, "MTBF"),
            BatchJob::Mttr => write!(f, "MTTR"),
            BatchJob::Preventive => write!(f, "PREVENTIVE"),
        }
    }
}

/// 单资产处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Updated,   // 指标已更新 / 工单已创建 (dry-run 下为"将会")
    Unchanged, // 无变化
    Skipped,   // 配置错误跳过
    Error,     // 处理失败
}

/// 单资产处理明细
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetOutcome {
    pub asset_id: AssetId,
    pub status: OutcomeStatus,
    pub detail: JsonValue, // 计算证据 / 决策原因 / 错误信息
}

/// 批处理运行报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: String,
    pub job: BatchJob,
    pub dry_run: bool,
    pub asset_filter: Option<AssetId>,
    pub started_at: NaiveDateTime,
    pub elapsed_ms: i64,
    pub processed: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub errors: usize,
    pub outcomes: Vec<AssetOutcome>,
}

impl BatchReport {
    pub(super) fn new(
        run_id: String,
        job: BatchJob,
        dry_run: bool,
        asset_filter: Option<AssetId>,
        started_at: NaiveDateTime,
    ) -> Self {
        Self {
            run_id,
            job,
            dry_run,
            asset_filter,
            started_at,
            elapsed_ms: 0,
            processed: 0,
            updated: 0,
            unchanged: 0,
            skipped: 0,
            errors: 0,
            outcomes: Vec::new(),
        }
    }

    pub(super) fn record(&mut self, outcome: AssetOutcome) {
        self.processed += 1;
        match outcome.status {
            OutcomeStatus::Updated => self.updated += 1,
            OutcomeStatus::Unchanged => self.unchanged += 1,
            OutcomeStatus::Skipped => self.skipped += 1,
            OutcomeStatus::Error => self.errors += 1,
        }
        self.outcomes.push(outcome);
    }

    /// 单行汇总
    pub fn summary_line(&self) -> String {
        format!(
            "[{}{}] processed={} updated={} unchanged={} skipped={} errors={}",
            self.job,
            if self.dry_run { " DRY-RUN" } else { "" },
            self.processed,
            self.updated,
            self.unchanged,
            self.skipped,
            self.errors
        )
    }
}
