// ==========================================
// 处置 API 端到端测试
// ==========================================
// 职责: 通过 AppState 组装的真实组件（SQLite 目录 + ConfigManager）验证命令响应
// ==========================================


#[cfg(test)]
mod disposition_api_test {
    use perishable_disposition::api::response::ResponseStatus;
    use perishable_disposition::app::AppState;
    use perishable_disposition::config::config_keys;
    use perishable_disposition::domain::{BatchStatus, DispositionEvent};

    use crate::test_helpers::*;

    fn setup() -> (tempfile::NamedTempFile, AppState) {
        let (temp_file, db_path) = create_test_db().unwrap();
        let state = AppState::new(db_path).unwrap();
        (temp_file, state)
    }

    #[tokio::test]
    async fn test_donate_success_response() {
        let (_temp_file, state) = setup();
        let batch_id = seed_batch(&state.conn, PRODUCT_MILK, 50, date(2026, 3, 15));

        let response = state
            .disposition_api
            .donate_at(batch_id, RECIPIENT_FOOD_BANK, 20, at(2026, 3, 10, 9))
            .await;

        assert!(response.is_ok());
        assert_eq!(response.code, "OK");
        let receipt = response.data.unwrap();
        assert_eq!(receipt.remaining_quantity, 30);
        assert_eq!(receipt.status, BatchStatus::Available);
    }

    #[tokio::test]
    async fn test_insufficient_quantity_response_carries_detail() {
        let (_temp_file, state) = setup();
        let batch_id = seed_batch(&state.conn, PRODUCT_MILK, 10, date(2026, 3, 15));

        let response = state
            .disposition_api
            .donate_at(batch_id, RECIPIENT_FOOD_BANK, 20, at(2026, 3, 10, 9))
            .await;

        assert_eq!(response.status, ResponseStatus::Error);
        assert_eq!(response.code, "INSUFFICIENT_QUANTITY");
        assert!(response.data.is_none());
        let detail = response.error.unwrap();
        assert_eq!(detail.batch_id, Some(batch_id));
        assert_eq!(detail.requested, Some(20));
        assert_eq!(detail.available, Some(10));
        assert!(!detail.retryable);
    }

    #[tokio::test]
    async fn test_unknown_recipient_in_sqlite_directory() {
        let (_temp_file, state) = setup();
        let batch_id = seed_batch(&state.conn, PRODUCT_MILK, 10, date(2026, 3, 15));

        let response = state
            .disposition_api
            .donate_at(batch_id, 99, 1, at(2026, 3, 10, 9))
            .await;

        assert_eq!(response.code, "RECIPIENT_NOT_FOUND");
        assert_eq!(response.error.unwrap().recipient_id, Some(99));
        assert_eq!(load_batch(&state.conn, batch_id).quantity, 10);
    }

    #[tokio::test]
    async fn test_sweep_uses_configured_waste_reason() {
        let (_temp_file, state) = setup();
        state
            .config_manager
            .set_config_value(config_keys::WASTE_REASON, "spoiled")
            .unwrap();
        let batch_id = seed_batch(&state.conn, PRODUCT_BREAD, 12, date(2026, 3, 9));

        let response = state
            .disposition_api
            .sweep_expired_at(date(2026, 3, 10), at(2026, 3, 10, 0))
            .await;

        assert!(response.is_ok());
        let summary = response.data.unwrap();
        assert_eq!(summary.wasted_batch_ids, vec![batch_id]);
        assert_eq!(summary.total_quantity_wasted, 12);

        let history = state.disposition_api.batch_history(batch_id);
        let events = history.data.unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], DispositionEvent::Wasted(r) if r.reason == "spoiled"));
    }

    #[tokio::test]
    async fn test_candidates_use_sqlite_catalog_and_config_horizon() {
        let (_temp_file, state) = setup();
        state
            .config_manager
            .set_config_value(config_keys::CANDIDATE_HORIZON_DAYS, "1")
            .unwrap();
        let near = seed_batch(&state.conn, PRODUCT_BREAD, 5, date(2026, 3, 11));
        seed_batch(&state.conn, PRODUCT_MILK, 5, date(2026, 3, 12));

        let response = state
            .disposition_api
            .list_candidates_as_of(date(2026, 3, 10), None)
            .await;

        let candidates = response.data.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].batch_id, near);
        assert_eq!(candidates[0].product_name.as_deref(), Some("面包"));
        assert_eq!(candidates[0].category_id, Some(2));
    }

    #[tokio::test]
    async fn test_history_and_audit() {
        let (_temp_file, state) = setup();
        let batch_id = seed_batch(&state.conn, PRODUCT_MILK, 40, date(2026, 3, 9));

        state
            .disposition_api
            .donate_at(batch_id, RECIPIENT_SHELTER, 25, at(2026, 3, 8, 10))
            .await;
        state
            .disposition_api
            .sweep_expired_at(date(2026, 3, 10), at(2026, 3, 10, 0))
            .await;

        let events = state.disposition_api.batch_history(batch_id).data.unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DispositionEvent::Donated(_)));
        assert!(matches!(&events[1], DispositionEvent::Wasted(r) if r.quantity == 15));

        let missing = state.disposition_api.batch_history(4242);
        assert_eq!(missing.code, "BATCH_NOT_FOUND");

        let audit = state.disposition_api.audit();
        let report = audit.data.unwrap();
        assert_eq!(report.batches_checked, 1);
        assert!(report.is_clean());
    }
}
