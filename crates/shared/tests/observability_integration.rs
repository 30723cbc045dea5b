//! 可观测性模块集成测试

mod metrics_tests {
    use ecosrev_shared::observability::metrics::{
        get_handle, install_recorder, record_credit, record_ledger_request, record_redemption,
    };

    #[test]
    fn test_recorded_counters_are_rendered() {
        let handle = install_recorder("observability-test").unwrap();
        assert!(get_handle().is_some());

        record_credit("success");
        record_credit("DUPLICATE_SCAN");
        record_redemption("partial");
        record_ledger_request("write_balance", "ok", 0.05);
        record_ledger_request("write_balance", "LEDGER_OUTCOME_UNKNOWN", 10.0);

        let rendered = handle.render();
        assert!(rendered.contains("points_credits_total"));
        assert!(rendered.contains("points_redemptions_total"));
        assert!(rendered.contains("ledger_requests_total"));
        assert!(rendered.contains("service_starts_total"));

        // 重复安装返回同一个 handle
        assert!(install_recorder("observability-test").is_ok());
    }
}

mod config_tests {
    use ecosrev_shared::observability::ObservabilityConfig;

    #[test]
    fn test_observability_config_builders() {
        let config = ObservabilityConfig::default()
            .with_service_name("ecosrev")
            .with_log_level("debug");

        assert_eq!(config.service_name, "ecosrev");
        assert_eq!(config.log_level, "debug");
        assert!(!config.json_logs());
    }
}
