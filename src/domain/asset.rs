// ==========================================
// 资产可靠性系统 - 资产领域模型
// ==========================================
// 对齐: asset 表
// 红线: mtbf / mttr 为派生指标，只由对应计算器覆写
// ==========================================

use crate::domain::types::AssetId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Asset - 资产
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,
    pub name: String,
    pub periodicity_days: Option<i64>, // 预防性维护周期 (天)，必须为正才会排程
    pub mtbf: i64,                     // 平均故障间隔 (分钟)
    pub mttr: i64,                     // 平均修复时间 (分钟)
    pub created_at: NaiveDateTime,
}

impl Asset {
    /// 有效的预防周期 (天)
    ///
    /// # 返回
    /// - Some(days): 周期为正
    /// - None: 未配置或非正数 (配置错误，排程跳过)
    pub fn valid_periodicity_days(&self) -> Option<i64> {
        self.periodicity_days.filter(|d| *d > 0)
    }
}

/// 新建资产参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    pub name: String,
    pub periodicity_days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn asset(periodicity_days: Option<i64>) -> Asset {
        Asset {
            asset_id: 1,
            name: "Pump-01".to_string(),
            periodicity_days,
            mtbf: 0,
            mttr: 0,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_valid_periodicity() {
        assert_eq!(asset(Some(7)).valid_periodicity_days(), Some(7));
        assert_eq!(asset(Some(0)).valid_periodicity_days(), None);
        assert_eq!(asset(Some(-3)).valid_periodicity_days(), None);
        assert_eq!(asset(None).valid_periodicity_days(), None);
    }
}
