// ==========================================
// 资产可靠性系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 批处理引擎 (MTBF / MTTR / 预防性工单排程)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 指标计算与排程决策
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AssetId, MetricField, WorkOrderId, WorkOrderKind, WorkOrderStatus};

// 领域实体
pub use domain::{Asset, AssetSnapshot, MaintenanceRecord, NewAsset, NewWorkOrder, WorkOrder};

// 引擎
pub use engine::{
    BatchOptions, BatchReport, BatchRunner, MtbfEngine, MttrEngine, PreventiveDecision,
    PreventiveEngine, PreventiveTemplate,
};

// 仓储
pub use repository::{MaintenanceStore, RepositoryError, SqliteMaintenanceStore};

// API
pub use api::{ApiError, CompleteWorkOrderRequest, WorkOrderApi};

// ==========================================
// 系统常量
// ==========================================

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const SYSTEM_NAME: &str = "资产可靠性批处理引擎";
