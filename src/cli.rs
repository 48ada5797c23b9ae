// ==========================================
// 命令行参数定义
// ==========================================

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use maint_reliability::config::DB_PATH_ENV;
use maint_reliability::db::parse_datetime;
use maint_reliability::{AssetId, WorkOrderId, WorkOrderKind, WorkOrderStatus};

/// Asset reliability batch engine.
///
/// Recomputes MTBF / MTTR per asset and generates preventive work orders
/// from the asset periodicity.
#[derive(Parser, Debug)]
#[command(name = "maint-reliability", version, about = "Asset reliability batch engine")]
pub struct CliArgs {
    /// SQLite database path (default: user data dir)
    #[arg(long, global = true, env = DB_PATH_ENV)]
    pub db: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create tables if missing and record the schema version
    InitDb,

    /// Recompute MTBF (minutes) for every asset
    Mtbf {
        #[command(flatten)]
        batch: BatchArgs,

        /// Work order kind counted as a failure (overrides mtbf.kind_filter)
        #[arg(long, value_parser = parse_kind)]
        kind: Option<WorkOrderKind>,
    },

    /// Recompute MTTR (minutes) for every asset
    Mttr {
        #[command(flatten)]
        batch: BatchArgs,

        /// Work order status counted as repaired (overrides mttr.status_filter)
        #[arg(long, value_parser = parse_status)]
        status: Option<WorkOrderStatus>,
    },

    /// Generate pending preventive work orders where due
    Preventive {
        #[command(flatten)]
        batch: BatchArgs,

        /// Work order kind treated as preventive (overrides preventive.kind_filter)
        #[arg(long, value_parser = parse_kind)]
        kind: Option<WorkOrderKind>,
    },

    /// Complete a pending work order with its maintenance record
    Complete(CompleteArgs),
}

/// 批处理公共参数
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Compute and count without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Only process this asset
    #[arg(long)]
    pub asset_id: Option<AssetId>,

    /// Print the full run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompleteArgs {
    /// Work order to complete
    #[arg(long)]
    pub work_order_id: WorkOrderId,

    /// Execution start, e.g. "2025-03-01 08:00:00"
    #[arg(long, value_parser = parse_timestamp)]
    pub start: NaiveDateTime,

    /// Execution end, must be after start
    #[arg(long, value_parser = parse_timestamp)]
    pub end: NaiveDateTime,

    /// Time spent in seconds (default: end - start)
    #[arg(long)]
    pub time_spent_secs: Option<i64>,

    #[arg(long)]
    pub executor_id: Option<i64>,

    #[arg(long)]
    pub notes: Option<String>,
}

fn parse_kind(raw: &str) -> Result<WorkOrderKind, String> {
    raw.parse()
}

fn parse_status(raw: &str) -> Result<WorkOrderStatus, String> {
    raw.parse()
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    parse_datetime(raw).ok_or_else(|| format!("无法解析时间 '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_mtbf_with_overrides() {
        let args = CliArgs::try_parse_from([
            "maint-reliability",
            "--db",
            "/tmp/x.db",
            "mtbf",
            "--dry-run",
            "--asset-id",
            "7",
            "--kind",
            "corretiva",
        ])
        .unwrap();

        assert_eq!(args.db.as_deref(), Some("/tmp/x.db"));
        match args.command {
            Command::Mtbf { batch, kind } => {
                assert!(batch.dry_run);
                assert_eq!(batch.asset_id, Some(7));
                assert_eq!(kind, Some(WorkOrderKind::Corrective));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_complete_rejects_bad_timestamp() {
        let result = CliArgs::try_parse_from([
            "maint-reliability",
            "complete",
            "--work-order-id",
            "1",
            "--start",
            "yesterday",
            "--end",
            "2025-03-01 10:00:00",
        ]);
        assert!(result.is_err());
    }
}
