// ==========================================
// 资产可靠性系统 - 命令行主入口
// ==========================================
// 子命令: init-db / mtbf / mttr / preventive / complete
// 退出码: 仅初始化失败（打开数据库、读取配置）时非零，
//         单资产失败只计入报告
// ==========================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{BatchArgs, CliArgs, Command, CompleteArgs};
use maint_reliability::config::{get_default_db_path, ConfigManager};
use maint_reliability::db::{self, CURRENT_SCHEMA_VERSION};
use maint_reliability::logging;
use maint_reliability::repository::{MaintenanceRecordRepository, WorkOrderRepository};
use maint_reliability::{
    BatchOptions, BatchReport, BatchRunner, CompleteWorkOrderRequest, MtbfEngine, MttrEngine,
    PreventiveEngine, SqliteMaintenanceStore, WorkOrderApi,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn main() -> Result<()> {
    let args = CliArgs::parse();

    if args.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("{} v{}", maint_reliability::SYSTEM_NAME, maint_reliability::VERSION);

    let db_path = args.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let conn = open_database(&db_path)?;

    match args.command {
        Command::InitDb => {
            let version = {
                let guard = conn
                    .lock()
                    .map_err(|e| anyhow::anyhow!("锁获取失败: {}", e))?;
                db::read_schema_version(&guard).context("读取 schema 版本失败")?
            };
            println!("数据库已初始化: {} (schema_version={:?})", db_path, version);
        }
        Command::Mtbf { batch, kind } => {
            let config = ConfigManager::from_connection(conn.clone())?;
            let kind = match kind {
                Some(kind) => kind,
                None => config.mtbf_kind_filter().context("读取 mtbf.kind_filter 失败")?,
            };
            let store = SqliteMaintenanceStore::from_connection(conn);
            let report = BatchRunner::new(&store)
                .run_mtbf(&MtbfEngine::new(kind), &batch_options(&batch))
                .context("MTBF 批处理初始化失败")?;
            print_report(&report, batch.json)?;
        }
        Command::Mttr { batch, status } => {
            let config = ConfigManager::from_connection(conn.clone())?;
            let status = match status {
                Some(status) => status,
                None => config
                    .mttr_status_filter()
                    .context("读取 mttr.status_filter 失败")?,
            };
            let store = SqliteMaintenanceStore::from_connection(conn);
            let report = BatchRunner::new(&store)
                .run_mttr(&MttrEngine::new(status), &batch_options(&batch))
                .context("MTTR 批处理初始化失败")?;
            print_report(&report, batch.json)?;
        }
        Command::Preventive { batch, kind } => {
            let config = ConfigManager::from_connection(conn.clone())?;
            let kind = match kind {
                Some(kind) => kind,
                None => config
                    .preventive_kind_filter()
                    .context("读取 preventive.kind_filter 失败")?,
            };
            let template = config
                .preventive_template()
                .context("读取预防性工单模板失败")?;
            let store = SqliteMaintenanceStore::from_connection(conn);
            let report = BatchRunner::new(&store)
                .run_preventive(&PreventiveEngine::new(kind), &template, &batch_options(&batch))
                .context("预防性工单批处理初始化失败")?;
            print_report(&report, batch.json)?;
        }
        Command::Complete(complete) => run_complete(conn, complete)?,
    }

    Ok(())
}

/// 打开数据库并确保 schema 存在
fn open_database(db_path: &str) -> Result<Arc<Mutex<Connection>>> {
    let conn = db::open_sqlite_connection(db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    db::init_schema(&conn).context("初始化数据库 schema 失败")?;

    match db::read_schema_version(&conn).context("读取 schema 版本失败")? {
        Some(v) if v == CURRENT_SCHEMA_VERSION => {}
        other => tracing::warn!(
            found = ?other,
            expected = CURRENT_SCHEMA_VERSION,
            "数据库 schema 版本不一致"
        ),
    }

    Ok(Arc::new(Mutex::new(conn)))
}

fn batch_options(args: &BatchArgs) -> BatchOptions {
    BatchOptions::new(chrono::Local::now().naive_local())
        .dry_run(args.dry_run)
        .asset_id(args.asset_id)
}

fn print_report(report: &BatchReport, as_json: bool) -> Result<()> {
    if as_json {
        let json = serde_json::to_string_pretty(report).context("序列化运行报告失败")?;
        println!("{}", json);
    } else {
        println!("{}", report.summary_line());
    }
    Ok(())
}

fn run_complete(conn: Arc<Mutex<Connection>>, args: CompleteArgs) -> Result<()> {
    let api = WorkOrderApi::new(
        Arc::new(WorkOrderRepository::from_connection(conn.clone())),
        Arc::new(MaintenanceRecordRepository::from_connection(conn)),
    );

    let request = CompleteWorkOrderRequest {
        executor_id: args.executor_id,
        execution_start: args.start,
        execution_end: args.end,
        time_spent_secs: args.time_spent_secs,
        notes: args.notes,
    };

    let record = api
        .complete_work_order(args.work_order_id, request)
        .with_context(|| format!("完成工单 {} 失败", args.work_order_id))?;

    println!(
        "工单 {} 已完成: time_spent={}s",
        record.work_order_id,
        record.time_spent_secs.unwrap_or_default()
    );
    Ok(())
}
