// ==========================================
// 资产可靠性系统 - API 层
// ==========================================
// 职责: 同步业务操作 (工单完成)，供命令行调用
// ==========================================

pub mod error;
pub mod work_order_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use work_order_api::{CompleteWorkOrderRequest, WorkOrderApi};
