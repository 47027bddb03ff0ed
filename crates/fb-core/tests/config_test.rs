use fb_core::config::Config;

#[test]
fn default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.general.log_level, "info");
    assert_eq!(cfg.general.log_format, "human");
    assert_eq!(cfg.api.base_url, "http://localhost:3000");
    assert_eq!(cfg.api.request_timeout_secs, 30);
    assert_eq!(cfg.board.recent_leads, 10);
    assert_eq!(cfg.board.notice_history, 50);
    assert!(cfg.session.token_path.is_none());
    cfg.validate().expect("defaults validate");
}

#[test]
fn config_roundtrip() {
    let cfg = Config::default();
    let toml_str = cfg.to_toml().expect("serialize to toml");
    assert!(toml_str.contains("localhost:3000"));

    let parsed: Config = toml::from_str(&toml_str).expect("parse toml back");
    assert_eq!(parsed.api.base_url, cfg.api.base_url);
    assert_eq!(parsed.board.notice_history, cfg.board.notice_history);
    parsed.validate().expect("config validates");
}

#[test]
fn config_partial_toml() {
    let partial = r#"
[api]
base_url = "https://crm.example.com"

[board]
recent_leads = 5
"#;
    let cfg: Config = toml::from_str(partial).expect("parse partial");
    assert_eq!(cfg.api.base_url, "https://crm.example.com");
    assert_eq!(cfg.board.recent_leads, 5);
    // defaults fill in the rest
    assert_eq!(cfg.api.request_timeout_secs, 30);
    assert_eq!(cfg.general.log_level, "info");
    cfg.validate().expect("config validates");
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").unwrap();

    let cfg = Config::load_from(&path).expect("load");
    assert_eq!(cfg.general.log_level, "debug");
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from(dir.path().join("nope.toml")).expect_err("missing file");
    assert!(err.to_string().starts_with("io:"));
}

#[test]
fn non_http_base_url_fails_validation() {
    let mut cfg = Config::default();
    cfg.api.base_url = "ftp://crm".to_string();
    let err = cfg.validate().expect_err("validation should fail");
    assert!(err.to_string().contains("api.base_url"));
}

#[test]
fn zero_timeout_fails_validation() {
    let mut cfg = Config::default();
    cfg.api.request_timeout_secs = 0;
    let err = cfg.validate().expect_err("validation should fail");
    assert!(err.to_string().contains("request_timeout_secs"));
}

#[test]
fn zero_notice_history_fails_validation() {
    let mut cfg = Config::default();
    cfg.board.notice_history = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn base_url_override_trims_trailing_slash() {
    let mut cfg = Config::default();
    cfg.override_base_url(Some("https://api.example.com/ "));
    assert_eq!(cfg.api.base_url, "https://api.example.com");

    cfg.override_base_url(Some("   "));
    assert_eq!(cfg.api.base_url, "https://api.example.com");

    cfg.override_base_url(None);
    assert_eq!(cfg.api.base_url, "https://api.example.com");
}

#[test]
fn token_path_defaults_under_home() {
    let cfg = Config::default();
    let path = cfg.session.resolved_token_path();
    assert!(path.ends_with(".funnelboard/session.json"));
}
