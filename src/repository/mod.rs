// ==========================================
// 资产可靠性系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod asset_repo;
pub mod error;
pub mod maintenance_repo;
pub mod store;
pub mod work_order_repo;

// 重导出核心仓储
pub use asset_repo::AssetRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use maintenance_repo::MaintenanceRecordRepository;
pub use store::{
    AssetReader, MaintenanceRecordReader, MaintenanceStore, MaintenanceWriter,
    SqliteMaintenanceStore, WorkOrderReader,
};
pub use work_order_repo::WorkOrderRepository;
