// ==========================================
// 批处理驱动 - 核心实现
// ==========================================

use super::report::{AssetOutcome, BatchJob, BatchReport, OutcomeStatus};
use crate::domain::snapshot::AssetSnapshot;
use crate::domain::types::{AssetId, MetricField};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::mtbf::MtbfEngine;
use crate::engine::mttr::MttrEngine;
use crate::engine::preventive::{
    NoActionReason, PreventiveDecision, PreventiveEngine, PreventiveTemplate,
};
use crate::repository::store::MaintenanceStore;
use chrono::NaiveDateTime;
use serde_json::{json, Value as JsonValue};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// BatchOptions - 批处理参数
// ==========================================
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub dry_run: bool,              // 只计算不写库
    pub asset_id: Option<AssetId>,  // 只处理指定资产
    pub now: NaiveDateTime,         // 本次运行的基准时间
}

impl BatchOptions {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            dry_run: false,
            asset_id: None,
            now,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn asset_id(mut self, asset_id: Option<AssetId>) -> Self {
        self.asset_id = asset_id;
        self
    }
}

// ==========================================
// BatchRunner - 批处理驱动
// ==========================================
pub struct BatchRunner<'a, S: MaintenanceStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: MaintenanceStore + ?Sized> BatchRunner<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// MTBF 批处理: 重算并在值变化时写回
    #[instrument(skip(self, engine, options), fields(dry_run = options.dry_run, asset_filter = ?options.asset_id))]
    pub fn run_mtbf(&self, engine: &MtbfEngine, options: &BatchOptions) -> EngineResult<BatchReport> {
        info!(kind = %engine.failure_kind(), "开始计算 MTBF");
        self.run(BatchJob::Mtbf, options, |snapshot| {
            let result = engine.compute(&snapshot);
            debug!(
                asset_id = snapshot.asset.asset_id,
                failure_count = result.failure_count,
                usable_intervals = result.intervals.len(),
                total_seconds = result.total_seconds,
                mtbf_exact_minutes = result.mtbf_exact_minutes,
                mtbf = result.mtbf_minutes,
                "MTBF 计算完成"
            );
            let evidence = serde_json::to_value(&result)?;
            self.apply_metric(&snapshot, MetricField::Mtbf, result.mtbf_minutes, evidence, options)
        })
    }

    /// MTTR 批处理: 重算并在值变化时写回
    #[instrument(skip(self, engine, options), fields(dry_run = options.dry_run, asset_filter = ?options.asset_id))]
    pub fn run_mttr(&self, engine: &MttrEngine, options: &BatchOptions) -> EngineResult<BatchReport> {
        info!(status = %engine.repaired_status(), "开始计算 MTTR");
        self.run(BatchJob::Mttr, options, |snapshot| {
            let result = engine.compute(&snapshot)?;
            debug!(
                asset_id = snapshot.asset.asset_id,
                record_count = result.record_count,
                total_seconds = result.total_seconds,
                mttr = result.mttr_minutes,
                "MTTR 计算完成"
            );
            let evidence = serde_json::to_value(&result)?;
            self.apply_metric(&snapshot, MetricField::Mttr, result.mttr_minutes, evidence, options)
        })
    }

    /// 预防性工单批处理: 逐资产决策，需要时创建待处理工单
    #[instrument(skip(self, engine, template, options), fields(dry_run = options.dry_run, asset_filter = ?options.asset_id))]
    pub fn run_preventive(
        &self,
        engine: &PreventiveEngine,
        template: &PreventiveTemplate,
        options: &BatchOptions,
    ) -> EngineResult<BatchReport> {
        info!(kind = %engine.preventive_kind(), now = %options.now, "开始生成预防性工单");
        self.run(BatchJob::Preventive, options, |snapshot| {
            let asset_id = snapshot.asset.asset_id;
            let decision = engine.decide(&snapshot, options.now);
            let mut detail = json!({ "decision": serde_json::to_value(&decision)? });

            let status = match &decision {
                PreventiveDecision::CreateWorkOrder { scheduled_at, .. } => {
                    if options.dry_run {
                        warn!(asset_id, %scheduled_at, "[DRY-RUN] 预防性工单未写入");
                    } else {
                        let order =
                            engine.build_work_order(&snapshot, *scheduled_at, options.now, template);
                        let work_order_id = self.store.create_work_order(&order)?;
                        detail["work_order_id"] = json!(work_order_id);
                        info!(asset_id, work_order_id, %scheduled_at, "预防性工单已创建");
                    }
                    OutcomeStatus::Updated
                }
                PreventiveDecision::NoAction {
                    reason: NoActionReason::InvalidPeriodicity { periodicity_days },
                } => {
                    warn!(asset_id, ?periodicity_days, "预防周期无效，跳过");
                    OutcomeStatus::Skipped
                }
                PreventiveDecision::NoAction { reason } => {
                    info!(asset_id, ?reason, "无需生成预防性工单");
                    OutcomeStatus::Unchanged
                }
            };

            Ok(AssetOutcome {
                asset_id,
                status,
                detail,
            })
        })
    }

    // ==========================================
    // 内部方法
    // ==========================================

    /// 资产循环
    ///
    /// 资产列表读取失败视为整批失败；
    /// 单资产的快照加载或处理失败只记为 Error，继续下一资产
    fn run<F>(&self, job: BatchJob, options: &BatchOptions, mut per_asset: F) -> EngineResult<BatchReport>
    where
        F: FnMut(AssetSnapshot) -> EngineResult<AssetOutcome>,
    {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        let mut report = BatchReport::new(
            run_id.clone(),
            job,
            options.dry_run,
            options.asset_id,
            options.now,
        );

        if options.dry_run {
            warn!(%run_id, %job, "DRY-RUN 模式: 不会写入任何数据");
        }

        let assets = self.store.list_assets(options.asset_id)?;
        for asset in assets {
            let asset_id = asset.asset_id;
            let outcome = self
                .store
                .load_snapshot(asset)
                .map_err(EngineError::from)
                .and_then(&mut per_asset);

            match outcome {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    error!(asset_id, error = %e, "资产处理失败");
                    report.record(AssetOutcome {
                        asset_id,
                        status: OutcomeStatus::Error,
                        detail: json!({ "error": e.to_string() }),
                    });
                }
            }
        }

        report.elapsed_ms = started.elapsed().as_millis() as i64;
        info!(
            %run_id,
            %job,
            processed = report.processed,
            updated = report.updated,
            unchanged = report.unchanged,
            skipped = report.skipped,
            errors = report.errors,
            elapsed_ms = report.elapsed_ms,
            "批处理完成"
        );
        Ok(report)
    }

    /// 指标写回: 值不变不写；dry-run 只计数
    fn apply_metric(
        &self,
        snapshot: &AssetSnapshot,
        field: MetricField,
        new_value: i64,
        evidence: JsonValue,
        options: &BatchOptions,
    ) -> EngineResult<AssetOutcome> {
        let asset_id = snapshot.asset.asset_id;
        let current = match field {
            MetricField::Mtbf => snapshot.asset.mtbf,
            MetricField::Mttr => snapshot.asset.mttr,
        };
        let detail = json!({
            "field": field,
            "old": current,
            "new": new_value,
            "evidence": evidence,
        });

        if current == new_value {
            debug!(asset_id, %field, value = current, "指标无变化");
            return Ok(AssetOutcome {
                asset_id,
                status: OutcomeStatus::Unchanged,
                detail,
            });
        }

        if options.dry_run {
            warn!(asset_id, %field, old = current, new = new_value, "[DRY-RUN] 指标未写入");
        } else {
            self.store.update_asset_metric(asset_id, field, new_value)?;
            info!(asset_id, %field, old = current, new = new_value, "指标已更新");
        }

        Ok(AssetOutcome {
            asset_id,
            status: OutcomeStatus::Updated,
            detail,
        })
    }
}
