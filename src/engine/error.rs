// ==========================================
// 资产可靠性系统 - 引擎层错误类型
// ==========================================

use crate::domain::types::{AssetId, MetricField};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 批处理引擎错误
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("数据访问失败: {0}")]
    Repository(#[from] RepositoryError),

    #[error("结果序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("资产{asset_id}的{field}累计值溢出")]
    MetricOverflow { asset_id: AssetId, field: MetricField },
}

pub type EngineResult<T> = Result<T, EngineError>;
