// ==========================================
// 并发处置测试
// ==========================================
// 职责: 验证同一批次上的并发捐赠/清理相互串行化，不超额分配、不重复报废
// ==========================================


#[cfg(test)]
mod concurrent_disposition_test {
    use perishable_disposition::domain::BatchStatus;
    use perishable_disposition::engine::DispositionError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use crate::test_helpers::*;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    // ==========================================
    // 测试1: 独立连接并发捐赠（跨连接的写锁串行化）
    // ==========================================

    #[test]
    fn test_concurrent_donations_never_over_allocate() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let setup_conn = open_shared(&db_path);
        let batch_id = seed_batch(&setup_conn, PRODUCT_MILK, 100, date(2026, 3, 15));

        let workers = 10;
        let barrier = Arc::new(Barrier::new(workers));
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let db_path = db_path.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let conn = open_shared(&db_path);
                    let engines = build_engines(&conn, MockConfig::default());
                    barrier.wait();
                    block_on(engines.allocator.donate(
                        batch_id,
                        RECIPIENT_FOOD_BANK,
                        15,
                        at(2026, 3, 10, 9),
                    ))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 6);
        for result in results.iter().filter(|r| r.is_err()) {
            assert_eq!(
                result,
                &Err(DispositionError::InsufficientQuantity {
                    batch_id,
                    requested: 15,
                    available: 10,
                })
            );
        }

        let batch = load_batch(&setup_conn, batch_id);
        assert_eq!(batch.quantity, 10);
        assert_eq!(batch.status, BatchStatus::Available);

        let engines = build_engines(&setup_conn, MockConfig::default());
        let donated: i64 = engines
            .log_repo
            .list_donations_by_batch(batch_id)
            .unwrap()
            .iter()
            .map(|d| d.quantity)
            .sum();
        assert_eq!(donated, 90);
        assert!(engines.auditor.audit().unwrap().is_clean());
    }

    // ==========================================
    // 测试2: 共享连接并发捐赠直至全部捐完
    // ==========================================

    #[test]
    fn test_shared_connection_donations_reach_donated_once() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let conn = open_shared(&db_path);
        let batch_id = seed_batch(&conn, PRODUCT_BREAD, 20, date(2026, 3, 15));
        let engines = Arc::new(build_engines(&conn, MockConfig::default()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engines = engines.clone();
                thread::spawn(move || {
                    block_on(engines.allocator.donate(
                        batch_id,
                        RECIPIENT_SHELTER,
                        5,
                        at(2026, 3, 10, 9),
                    ))
                })
            })
            .collect();

        let succeeded = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(succeeded, 4);
        let batch = load_batch(&conn, batch_id);
        assert_eq!(batch.quantity, 0);
        assert_eq!(batch.status, BatchStatus::Donated);
        assert!(engines.auditor.audit().unwrap().is_clean());
    }

    // ==========================================
    // 测试3: 清理与捐赠并发竞争同一过期批次
    // ==========================================

    #[test]
    fn test_sweep_and_donation_race_keeps_invariants() {
        for _ in 0..5 {
            let (_temp_file, db_path) = create_test_db().unwrap();
            let setup_conn = open_shared(&db_path);
            let batch_id = seed_batch(&setup_conn, PRODUCT_MILK, 30, date(2026, 3, 8));
            let barrier = Arc::new(Barrier::new(2));

            let donor = {
                let db_path = db_path.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let conn = open_shared(&db_path);
                    let engines = build_engines(&conn, MockConfig::default());
                    barrier.wait();
                    block_on(engines.allocator.donate(
                        batch_id,
                        RECIPIENT_FOOD_BANK,
                        10,
                        at(2026, 3, 10, 9),
                    ))
                })
            };
            let sweeper = {
                let db_path = db_path.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let conn = open_shared(&db_path);
                    let engines = build_engines(&conn, MockConfig::default());
                    barrier.wait();
                    block_on(
                        engines
                            .sweeper
                            .sweep_expired(date(2026, 3, 10), at(2026, 3, 10, 9)),
                    )
                })
            };

            let donation = donor.join().unwrap();
            let summary = sweeper.join().unwrap().unwrap();

            let batch = load_batch(&setup_conn, batch_id);
            assert_eq!(batch.quantity, 0);
            assert_eq!(batch.status, BatchStatus::Wasted);
            assert_eq!(summary.batches_wasted, 1);

            match donation {
                // 捐赠先提交: 只报废剩余 20
                Ok(_) => assert_eq!(summary.total_quantity_wasted, 20),
                // 清理先提交: 捐赠看到 0 可用
                Err(e) => {
                    assert!(matches!(
                        e,
                        DispositionError::InsufficientQuantity { available: 0, .. }
                    ));
                    assert_eq!(summary.total_quantity_wasted, 30);
                }
            }

            let engines = build_engines(&setup_conn, MockConfig::default());
            assert_eq!(engines.log_repo.list_wastes_by_batch(batch_id).unwrap().len(), 1);
            assert!(engines.auditor.audit().unwrap().is_clean());
        }
    }

    // ==========================================
    // 测试4: 捐赠进行中审计不应误报
    // ==========================================

    #[test]
    fn test_audit_during_donations_reports_no_false_violations() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let conn = open_shared(&db_path);
        let batch_id = seed_batch(&conn, PRODUCT_MILK, 100_000, date(2026, 3, 15));
        let engines = Arc::new(build_engines(&conn, MockConfig::default()));
        let done = Arc::new(AtomicBool::new(false));

        let donor = {
            let engines = engines.clone();
            let done = done.clone();
            thread::spawn(move || {
                for _ in 0..300 {
                    block_on(engines.allocator.donate(
                        batch_id,
                        RECIPIENT_FOOD_BANK,
                        1,
                        at(2026, 3, 10, 9),
                    ))
                    .unwrap();
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let mut audits = 0;
        while !done.load(Ordering::SeqCst) || audits < 50 {
            let report = engines.auditor.audit().unwrap();
            assert!(report.is_clean(), "{:?}", report.violations);
            audits += 1;
        }
        donor.join().unwrap();

        let batch = load_batch(&conn, batch_id);
        assert_eq!(batch.quantity, 100_000 - 300);
        assert!(engines.auditor.audit().unwrap().is_clean());
    }

    #[test]
    fn test_audit_on_separate_connection_sees_consistent_snapshot() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let setup_conn = open_shared(&db_path);
        let batch_id = seed_batch(&setup_conn, PRODUCT_BREAD, 100_000, date(2026, 3, 15));
        let done = Arc::new(AtomicBool::new(false));

        let donor = {
            let db_path = db_path.clone();
            let done = done.clone();
            thread::spawn(move || {
                let conn = open_shared(&db_path);
                let engines = build_engines(&conn, MockConfig::default());
                for _ in 0..200 {
                    block_on(engines.allocator.donate(
                        batch_id,
                        RECIPIENT_SHELTER,
                        1,
                        at(2026, 3, 10, 9),
                    ))
                    .unwrap();
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let audit_conn = open_shared(&db_path);
        let auditor = build_engines(&audit_conn, MockConfig::default()).auditor;
        let mut audits = 0;
        while !done.load(Ordering::SeqCst) || audits < 50 {
            let report = auditor.audit().unwrap();
            assert!(report.is_clean(), "{:?}", report.violations);
            audits += 1;
        }
        donor.join().unwrap();

        assert_eq!(load_batch(&setup_conn, batch_id).quantity, 100_000 - 200);
    }
}
