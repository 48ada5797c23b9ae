// ==========================================
// 资产可靠性系统 - 引擎层
// ==========================================
// 职责: MTBF / MTTR 计算、预防性排程决策、批处理驱动
// 红线: 计算引擎不拼 SQL, 所有决策必须输出原因
// ==========================================

pub mod batch;
pub mod error;
pub mod mtbf;
pub mod mttr;
pub mod preventive;

// 重导出核心引擎
pub use batch::{AssetOutcome, BatchJob, BatchOptions, BatchReport, BatchRunner, OutcomeStatus};
pub use error::{EngineError, EngineResult};
pub use mtbf::{FailureInterval, IntervalSkipReason, MtbfEngine, MtbfResult, SkippedInterval};
pub use mttr::{MttrEngine, MttrResult};
pub use preventive::{
    NoActionReason, PreventiveDecision, PreventiveEngine, PreventiveTemplate, ScheduleBasis,
};
