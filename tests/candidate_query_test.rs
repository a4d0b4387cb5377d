// ==========================================
// 捐赠候选查询集成测试
// ==========================================


#[cfg(test)]
mod candidate_query_test {
    use crate::test_helpers::*;

    #[tokio::test]
    async fn test_candidates_within_inclusive_horizon() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let conn = open_shared(&db_path);
        let engines = build_engines(&conn, MockConfig::default());

        let today = date(2026, 3, 10);
        let _expired = seed_batch(&conn, PRODUCT_MILK, 5, date(2026, 3, 9));
        let due_today = seed_batch(&conn, PRODUCT_MILK, 6, date(2026, 3, 10));
        let due_edge = seed_batch(&conn, PRODUCT_BREAD, 7, date(2026, 3, 13));
        let _too_far = seed_batch(&conn, PRODUCT_MILK, 8, date(2026, 3, 14));

        let candidates = engines
            .candidate_query
            .list_candidates(today, Some(3))
            .await
            .unwrap();

        let ids: Vec<i64> = candidates.iter().map(|c| c.batch_id).collect();
        assert_eq!(ids, vec![due_today, due_edge]);
        assert_eq!(candidates[0].days_left, 0);
        assert_eq!(candidates[1].days_left, 3);
    }

    #[tokio::test]
    async fn test_candidates_exclude_terminal_batches_and_use_config_horizon() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let conn = open_shared(&db_path);
        let engines = build_engines(
            &conn,
            MockConfig {
                horizon_days: 1,
                ..MockConfig::default()
            },
        );

        let today = date(2026, 3, 10);
        let donated = seed_batch(&conn, PRODUCT_MILK, 4, date(2026, 3, 11));
        let available = seed_batch(&conn, PRODUCT_MILK, 9, date(2026, 3, 11));
        let _outside = seed_batch(&conn, PRODUCT_MILK, 9, date(2026, 3, 12));

        engines
            .allocator
            .donate(donated, RECIPIENT_FOOD_BANK, 4, at(2026, 3, 10, 9))
            .await
            .unwrap();

        let candidates = engines
            .candidate_query
            .list_candidates(today, None)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].batch_id, available);
        assert_eq!(candidates[0].quantity, 9);
    }

    #[tokio::test]
    async fn test_candidate_product_details_from_catalog() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let conn = open_shared(&db_path);
        let engines = build_engines(&conn, MockConfig::default());

        let today = date(2026, 3, 10);
        seed_batch(&conn, PRODUCT_MILK, 5, date(2026, 3, 11));
        // MockCatalog 未收录面包
        seed_batch(&conn, PRODUCT_BREAD, 5, date(2026, 3, 12));

        let candidates = engines
            .candidate_query
            .list_candidates(today, Some(5))
            .await
            .unwrap();

        assert_eq!(candidates[0].product_name.as_deref(), Some("牛奶"));
        assert_eq!(candidates[0].category_id, Some(1));
        assert_eq!(candidates[1].product_name, None);
        assert_eq!(candidates[1].category_id, None);
    }

    #[tokio::test]
    async fn test_query_is_read_only_and_restartable() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let conn = open_shared(&db_path);
        let engines = build_engines(&conn, MockConfig::default());

        let batch_id = seed_batch(&conn, PRODUCT_MILK, 5, date(2026, 3, 11));
        let before = load_batch(&conn, batch_id);

        let first = engines
            .candidate_query
            .list_candidates(date(2026, 3, 10), Some(3))
            .await
            .unwrap();
        let second = engines
            .candidate_query
            .list_candidates(date(2026, 3, 10), Some(3))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(load_batch(&conn, batch_id), before);
    }
}
