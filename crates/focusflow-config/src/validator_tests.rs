    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_unsupported_grade() {
        let mut config = Config::default();
        config.simplifier.grade = 7;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "simplifier.grade"));
    }

    #[test]
    fn test_validate_every_supported_grade() {
        for grade in SUPPORTED_GRADES {
            let mut config = Config::default();
            config.simplifier.grade = grade;
            assert!(ConfigValidator::validate(&config).unwrap().is_valid());
        }
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let mut config = Config::default();
        config.simplifier.batch_size = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "simplifier.batch_size"));
    }

    #[test]
    fn test_validate_invalid_base_url() {
        let mut config = Config::default();
        config.remote.base_url = "invalid-url".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "remote.base_url"));
    }

    #[test]
    fn test_validate_non_http_base_url() {
        let mut config = Config::default();
        config.remote.base_url = "ftp://example.com/api".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validate_invalid_health_url() {
        let mut config = Config::default();
        config.remote.health_url = Some("not a url".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "remote.health_url"));
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let mut config = Config::default();
        config.remote.probe_timeout_ms = 0;
        config.remote.request_timeout_secs = 0;
        config.service.reply_timeout_secs = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_validate_empty_sqlite_path() {
        let mut config = Config::default();
        config.cache.path = std::path::PathBuf::new();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "cache.path"));
    }

    #[test]
    fn test_empty_path_ignored_for_memory_backend() {
        let mut config = Config::default();
        config.cache.backend = CacheBackend::Memory;
        config.cache.path = std::path::PathBuf::new();

        assert!(ConfigValidator::validate(&config).unwrap().is_valid());
    }

    #[test]
    fn test_low_max_entries_warning() {
        let mut config = Config::default();
        config.cache.max_entries = 10;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "cache.max_entries"));
    }

    #[test]
    fn test_zero_pacing_warning() {
        let mut config = Config::default();
        config.simplifier.precompute_pacing_ms = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_zero_channel_capacity() {
        let mut config = Config::default();
        config.service.channel_capacity = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_ensure_valid_reports_first_error() {
        let mut config = Config::default();
        config.simplifier.grade = 9;

        let err = ConfigValidator::ensure_valid(&config).unwrap_err();
        assert!(err.to_string().contains("simplifier.grade"));
    }

    #[test]
    fn test_validation_result_default() {
        let result = ValidationResult::default();
        assert!(result.is_valid());
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validation_result_add_warning() {
        let mut result = ValidationResult::default();
        result.add_warning(ValidationWarning::new("test", "warning"));
        assert!(result.is_valid()); // Warnings don't make it invalid
        assert_eq!(result.warnings.len(), 1);
    }
