// ==========================================
// 资产可靠性系统 - 领域类型定义
// ==========================================
// 工单类型/状态在读取边界统一归一化为封闭枚举，
// 引擎内部不再做字符串比较。
// 兼容历史数据中的葡语标签 (corretiva / finalizada ...)，
// 无法识别的历史标签归入 Other，不参与任何过滤匹配。
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 资产ID (自增主键)
pub type AssetId = i64;

/// 工单ID (自增主键)，同时作为维修记录的主键
pub type WorkOrderId = i64;

// ==========================================
// 工单类型 (Work Order Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderKind {
    Corrective, // 纠正性 (故障)
    Predictive, // 预测性
    Preventive, // 预防性
    Other,      // 无法识别的历史标签
}

impl WorkOrderKind {
    /// 大小写不敏感解析，未知标签返回 None
    ///
    /// 用于过滤值 (命令行、配置)，不会得到 Other
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "corrective" | "corretiva" => Some(WorkOrderKind::Corrective),
            "predictive" | "preditiva" => Some(WorkOrderKind::Predictive),
            "preventive" | "preventiva" => Some(WorkOrderKind::Preventive),
            _ => None,
        }
    }

    /// 读取边界的归一化: 未知标签归入 Other
    pub fn from_db_label(s: &str) -> Self {
        Self::parse(s).unwrap_or(WorkOrderKind::Other)
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WorkOrderKind::Corrective => "CORRECTIVE",
            WorkOrderKind::Predictive => "PREDICTIVE",
            WorkOrderKind::Preventive => "PREVENTIVE",
            WorkOrderKind::Other => "OTHER",
        }
    }
}

impl fmt::Display for WorkOrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for WorkOrderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("未知工单类型: {}", s))
    }
}

// ==========================================
// 工单状态 (Work Order Status)
// ==========================================
// 排程只关心 Pending / Completed，
// 其余状态用于识别"存在预防性工单但均未完成"的情况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderStatus {
    Pending,    // 待处理
    InProgress, // 执行中
    Completed,  // 已完成
    Cancelled,  // 已取消
    Other,      // 无法识别的历史标签
}

impl WorkOrderStatus {
    /// 大小写不敏感解析，未知标签返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendente" => Some(WorkOrderStatus::Pending),
            "in_progress" | "em_andamento" => Some(WorkOrderStatus::InProgress),
            "completed" | "finalizada" => Some(WorkOrderStatus::Completed),
            "cancelled" | "cancelada" => Some(WorkOrderStatus::Cancelled),
            _ => None,
        }
    }

    /// 读取边界的归一化: 未知标签归入 Other
    pub fn from_db_label(s: &str) -> Self {
        Self::parse(s).unwrap_or(WorkOrderStatus::Other)
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Pending => "PENDING",
            WorkOrderStatus::InProgress => "IN_PROGRESS",
            WorkOrderStatus::Completed => "COMPLETED",
            WorkOrderStatus::Cancelled => "CANCELLED",
            WorkOrderStatus::Other => "OTHER",
        }
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for WorkOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("未知工单状态: {}", s))
    }
}

// ==========================================
// 可靠性指标字段 (Metric Field)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricField {
    Mtbf,
    Mttr,
}

impl MetricField {
    /// 对应 asset 表的列名
    pub fn column_name(&self) -> &'static str {
        match self {
            MetricField::Mtbf => "mtbf",
            MetricField::Mttr => "mttr",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricField::Mtbf => write!(f, "MTBF"),
            MetricField::Mttr => write!(f, "MTTR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!(WorkOrderKind::parse("Corrective"), Some(WorkOrderKind::Corrective));
        assert_eq!(WorkOrderKind::parse("CORRETIVA"), Some(WorkOrderKind::Corrective));
        assert_eq!(WorkOrderKind::parse(" preventiva "), Some(WorkOrderKind::Preventive));
        assert_eq!(WorkOrderKind::parse("Preditiva"), Some(WorkOrderKind::Predictive));
        assert_eq!(WorkOrderKind::parse("inspection"), None);
    }

    #[test]
    fn test_status_parse_legacy_labels() {
        assert_eq!(WorkOrderStatus::parse("Finalizada"), Some(WorkOrderStatus::Completed));
        assert_eq!(WorkOrderStatus::parse("PENDENTE"), Some(WorkOrderStatus::Pending));
        assert_eq!(WorkOrderStatus::parse("in_progress"), Some(WorkOrderStatus::InProgress));
        assert!("done".parse::<WorkOrderStatus>().is_err());
    }

    #[test]
    fn test_unknown_db_labels_become_other() {
        assert_eq!(WorkOrderStatus::from_db_label("aberta"), WorkOrderStatus::Other);
        assert_eq!(WorkOrderStatus::from_db_label("Finalizada"), WorkOrderStatus::Completed);
        assert_eq!(WorkOrderKind::from_db_label("inspection"), WorkOrderKind::Other);
        assert_eq!(WorkOrderKind::parse("other"), None);
    }

    #[test]
    fn test_db_str_roundtrips_through_parse() {
        for kind in [
            WorkOrderKind::Corrective,
            WorkOrderKind::Predictive,
            WorkOrderKind::Preventive,
        ] {
            assert_eq!(WorkOrderKind::parse(kind.to_db_str()), Some(kind));
        }
        assert_eq!(MetricField::Mttr.column_name(), "mttr");
    }
}
