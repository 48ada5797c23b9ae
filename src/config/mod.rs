// ==========================================
// 资产可靠性系统 - 配置层
// ==========================================
// 存储: config_kv 表
// 数据库路径: 命令行 > 环境变量 > 用户数据目录
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};

use std::path::PathBuf;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "MAINT_RELIABILITY_DB_PATH";

/// 默认数据库路径
///
/// 顺序: 环境变量 MAINT_RELIABILITY_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./maint_reliability.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("maint-reliability");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("maint_reliability.db");
        }
    }

    path.to_string_lossy().to_string()
}
