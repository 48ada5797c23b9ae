// ==========================================
// 资产可靠性系统 - 批处理驱动
// ==========================================
// 职责: 逐资产加载快照 → 调用计算/排程引擎 → 按需写库
// 红线: 单资产失败只计数，不中断批次
// 红线: dry-run 不写库，但计数与正式运行一致
// ==========================================

mod core;
mod report;


pub use self::core::{BatchOptions, BatchRunner};
pub use report::{AssetOutcome, BatchJob, BatchReport, OutcomeStatus};
