// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 验证 SQLite 仓储的读写、排序、标签归一化与外键语义
// ==========================================


use maint_reliability::db;
use maint_reliability::logging;
use maint_reliability::repository::{
    AssetRepository, MaintenanceRecordRepository, MaintenanceStore, RepositoryError,
    SqliteMaintenanceStore, WorkOrderRepository,
};
use maint_reliability::{
    MaintenanceRecord, MetricField, NewAsset, NewWorkOrder, WorkOrderKind, WorkOrderStatus,
};
use test_helpers::{dt, seed_asset, seed_record, seed_work_order};

#[test]
fn test_init_schema_is_idempotent() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = db::open_sqlite_connection(&db_path).expect("Failed to open db");

    db::init_schema(&conn).expect("second init should succeed");
    let version = db::read_schema_version(&conn).expect("Failed to read version");
    assert_eq!(version, Some(db::CURRENT_SCHEMA_VERSION));
}

#[test]
fn test_asset_create_update_metric_and_list() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = AssetRepository::new(&db_path).expect("Failed to create repo");

    let a = repo
        .create(
            &NewAsset {
                name: "Pump A".to_string(),
                periodicity_days: Some(30),
            },
            dt(2025, 1, 1, 0, 0, 0),
        )
        .unwrap();
    let b = repo
        .create(
            &NewAsset {
                name: "Pump B".to_string(),
                periodicity_days: None,
            },
            dt(2025, 1, 2, 0, 0, 0),
        )
        .unwrap();

    repo.update_metric(a, MetricField::Mtbf, 42).unwrap();
    repo.update_metric(a, MetricField::Mttr, 7).unwrap();

    let asset = repo.find_by_id(a).unwrap().expect("asset should exist");
    assert_eq!(asset.mtbf, 42);
    assert_eq!(asset.mttr, 7);
    assert_eq!(asset.periodicity_days, Some(30));

    let all = repo.list(None).unwrap();
    assert_eq!(all.iter().map(|x| x.asset_id).collect::<Vec<_>>(), vec![a, b]);

    let only_b = repo.list(Some(b)).unwrap();
    assert_eq!(only_b.len(), 1);
    assert_eq!(only_b[0].name, "Pump B");

    assert!(repo.list(Some(9999)).unwrap().is_empty());
}

#[test]
fn test_update_metric_missing_asset_is_not_found() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = AssetRepository::new(&db_path).expect("Failed to create repo");

    let err = repo.update_metric(404, MetricField::Mtbf, 1).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[test]
fn test_work_orders_ordered_and_legacy_labels_normalized() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = db::open_sqlite_connection(&db_path).unwrap();
    let asset_id = seed_asset(&conn, "Compressor", Some(15)).unwrap();

    // 同一时刻创建的两条工单按 ID 排序
    let t = dt(2025, 2, 1, 8, 0, 0);
    let late = seed_work_order(&conn, asset_id, "corretiva", "Finalizada", dt(2025, 2, 3, 0, 0, 0), None).unwrap();
    let first = seed_work_order(&conn, asset_id, "Corrective", "pendente", t, None).unwrap();
    let second = seed_work_order(&conn, asset_id, "PREVENTIVA", "pending", t, Some(dt(2025, 2, 10, 0, 0, 0))).unwrap();
    drop(conn);

    let repo = WorkOrderRepository::new(&db_path).unwrap();
    let orders = repo.list_by_asset(asset_id, None, None).unwrap();
    assert_eq!(
        orders.iter().map(|o| o.work_order_id).collect::<Vec<_>>(),
        vec![first, second, late]
    );
    assert_eq!(orders[0].kind, WorkOrderKind::Corrective);
    assert_eq!(orders[0].status, WorkOrderStatus::Pending);
    assert_eq!(orders[1].kind, WorkOrderKind::Preventive);
    assert_eq!(orders[2].status, WorkOrderStatus::Completed);

    let corrective = repo
        .list_by_asset(asset_id, Some(WorkOrderKind::Corrective), None)
        .unwrap();
    assert_eq!(corrective.len(), 2);

    let completed_corrective = repo
        .list_by_asset(
            asset_id,
            Some(WorkOrderKind::Corrective),
            Some(WorkOrderStatus::Completed),
        )
        .unwrap();
    assert_eq!(completed_corrective.len(), 1);
    assert_eq!(completed_corrective[0].work_order_id, late);
}

#[test]
fn test_unknown_labels_are_normalized_to_other() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = db::open_sqlite_connection(&db_path).unwrap();
    let asset_id = seed_asset(&conn, "Boiler", Some(10)).unwrap();
    let odd_kind =
        seed_work_order(&conn, asset_id, "inspection", "pending", dt(2025, 1, 1, 0, 0, 0), None).unwrap();
    let odd_status =
        seed_work_order(&conn, asset_id, "corrective", "aberta", dt(2025, 1, 2, 0, 0, 0), None).unwrap();
    drop(conn);

    let repo = WorkOrderRepository::new(&db_path).unwrap();
    let orders = repo.list_by_asset(asset_id, None, None).unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].work_order_id, odd_kind);
    assert_eq!(orders[0].kind, WorkOrderKind::Other);
    assert_eq!(orders[0].status, WorkOrderStatus::Pending);
    assert_eq!(orders[1].work_order_id, odd_status);
    assert_eq!(orders[1].status, WorkOrderStatus::Other);

    // 未知标签不匹配任何过滤值
    let pending = repo
        .list_by_asset(asset_id, None, Some(WorkOrderStatus::Pending))
        .unwrap();
    assert_eq!(pending.len(), 1);
    let corrective = repo
        .list_by_asset(asset_id, Some(WorkOrderKind::Corrective), None)
        .unwrap();
    assert_eq!(corrective.len(), 1);
}

#[test]
fn test_delete_asset_sets_work_order_reference_to_null() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = db::open_sqlite_connection(&db_path).unwrap();
    let asset_id = seed_asset(&conn, "Conveyor", Some(7)).unwrap();
    let order_id =
        seed_work_order(&conn, asset_id, "corrective", "pending", dt(2025, 1, 1, 0, 0, 0), None).unwrap();
    drop(conn);

    let asset_repo = AssetRepository::new(&db_path).unwrap();
    assert_eq!(asset_repo.delete(asset_id).unwrap(), 1);
    assert!(asset_repo.find_by_id(asset_id).unwrap().is_none());

    let order = WorkOrderRepository::new(&db_path)
        .unwrap()
        .find_by_id(order_id)
        .unwrap()
        .expect("work order must survive asset deletion");
    assert_eq!(order.asset_id, None);
}

#[test]
fn test_create_work_order_round_trip() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = db::open_sqlite_connection(&db_path).unwrap();
    let asset_id = seed_asset(&conn, "Fan", Some(7)).unwrap();
    drop(conn);

    let repo = WorkOrderRepository::new(&db_path).unwrap();
    let new_order = NewWorkOrder {
        title: "Auto".to_string(),
        description: Some("generated".to_string()),
        kind: WorkOrderKind::Preventive,
        status: WorkOrderStatus::Pending,
        created_at: dt(2025, 1, 1, 12, 0, 0),
        scheduled_at: Some(dt(2025, 1, 8, 12, 0, 0)),
        asset_id: Some(asset_id),
        requester_id: None,
    };
    let id = repo.create(&new_order).unwrap();

    let stored = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(stored.title, "Auto");
    assert_eq!(stored.scheduled_at, Some(dt(2025, 1, 8, 12, 0, 0)));
    assert_eq!(stored.asset_id, Some(asset_id));
    assert_eq!(stored.status, WorkOrderStatus::Pending);
}

#[test]
fn test_complete_with_record_is_one_shot() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = db::open_sqlite_connection(&db_path).unwrap();
    let asset_id = seed_asset(&conn, "Valve", None).unwrap();
    let order_id =
        seed_work_order(&conn, asset_id, "corrective", "pending", dt(2025, 1, 1, 0, 0, 0), None).unwrap();
    drop(conn);

    let repo = WorkOrderRepository::new(&db_path).unwrap();
    let record = MaintenanceRecord {
        work_order_id: order_id,
        executor_id: Some(3),
        execution_start: dt(2025, 1, 1, 9, 0, 0),
        execution_end: dt(2025, 1, 1, 10, 0, 0),
        time_spent_secs: Some(3600),
        notes: None,
    };
    repo.complete_with_record(&record).unwrap();

    let order = repo.find_by_id(order_id).unwrap().unwrap();
    assert_eq!(order.status, WorkOrderStatus::Completed);

    let err = repo.complete_with_record(&record).unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidStateTransition { .. }));

    let missing = MaintenanceRecord {
        work_order_id: 9999,
        ..record
    };
    let err = repo.complete_with_record(&missing).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[test]
fn test_find_records_by_ids_and_snapshot() {
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = db::open_sqlite_connection(&db_path).unwrap();
    let asset_id = seed_asset(&conn, "Press", Some(14)).unwrap();
    let w1 = seed_work_order(&conn, asset_id, "corrective", "completed", dt(2025, 1, 1, 0, 0, 0), None).unwrap();
    let w2 = seed_work_order(&conn, asset_id, "corrective", "completed", dt(2025, 1, 5, 0, 0, 0), None).unwrap();
    let w3 = seed_work_order(&conn, asset_id, "corrective", "pending", dt(2025, 1, 9, 0, 0, 0), None).unwrap();
    seed_record(&conn, w1, dt(2025, 1, 1, 1, 0, 0), dt(2025, 1, 1, 2, 0, 0), Some(3600)).unwrap();
    seed_record(&conn, w2, dt(2025, 1, 5, 1, 0, 0), dt(2025, 1, 5, 1, 30, 0), None).unwrap();
    drop(conn);

    let records = MaintenanceRecordRepository::new(&db_path)
        .unwrap()
        .find_by_work_order_ids(&[w1, w2, w3])
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[&w1].time_spent_secs, Some(3600));
    assert_eq!(records[&w2].time_spent_secs, None);
    assert!(!records.contains_key(&w3));

    let conn = test_helpers::open_shared_connection(&db_path).unwrap();
    let store = SqliteMaintenanceStore::from_connection(conn);
    let asset = store.asset_repo().find_by_id(asset_id).unwrap().unwrap();
    let snapshot = store.load_snapshot(asset).unwrap();
    assert_eq!(snapshot.work_orders().len(), 3);
    assert!(snapshot.record_for(w1).is_some());
    assert!(snapshot.record_for(w3).is_none());
}
