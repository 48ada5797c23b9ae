// ==========================================
// 资产可靠性系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、快照
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod asset;
pub mod snapshot;
pub mod types;
pub mod work_order;

// 重导出核心类型
pub use asset::{Asset, NewAsset};
pub use snapshot::AssetSnapshot;
pub use types::{AssetId, MetricField, WorkOrderId, WorkOrderKind, WorkOrderStatus};
pub use work_order::{MaintenanceRecord, NewWorkOrder, WorkOrder};
