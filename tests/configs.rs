use hansard_ingest::configs::ImportConfig;

#[test]
fn test_partial_config_keeps_defaults() {
    let json = r#"
    {
        "procedural_word_limit": 200,
        "timing_bonus": 0.5
    }
    "#;

    let config: ImportConfig = serde_json::from_str(json).expect("Failed to parse config");

    assert_eq!(config.procedural_word_limit, 200);
    assert_eq!(config.timing_bonus, 0.5);
    assert_eq!(config.slug_max_chars, 50);
    assert_eq!(config.best_match_warning, 0.75);
    assert_eq!(config.paragraph_id_coverage, 0.95);
}

#[test]
fn test_load_from_missing_file_is_an_error() {
    let err = ImportConfig::load_from_file("/nonexistent/import.json")
        .expect_err("missing file should fail");
    assert!(err.starts_with("Failed to read import.json"));
}

#[test]
fn test_load_default_with_env_var() {
    let json = r#"
    {
        "reuse_penalty": 0.05,
        "missing_paragraph_ratio": 0.5
    }
    "#;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(temp_dir.path().join("import.json"), json).expect("Failed to write import.json");

    std::env::set_var("CONFIGS_PATH", temp_dir.path().to_str().unwrap());
    let config = ImportConfig::load_default().expect("Failed to load default config");
    std::env::remove_var("CONFIGS_PATH");

    assert_eq!(config.reuse_penalty, 0.05);
    assert_eq!(config.missing_paragraph_ratio, 0.5);
    assert_eq!(config.easy_match_warning, 0.9);
}
