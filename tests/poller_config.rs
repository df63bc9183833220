// tests/poller_config.rs
use graph_feed_poller::config::PollerConfig;
use graph_feed_poller::poll::request::FeedKind;

#[test]
fn loads_a_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("poller.toml");
    std::fs::write(
        &path,
        r#"
        queries = ["acme"]
        feed = "tagged"
        limit = 5
        lookback_secs = 600
        "#,
    )
    .unwrap();

    let cfg = PollerConfig::load_from(&path).unwrap();
    assert_eq!(cfg.queries, vec!["acme".to_string()]);
    assert_eq!(cfg.feed, FeedKind::Tagged);
    assert_eq!(cfg.limit, 5);
    assert_eq!(cfg.lookback_secs, 600);
}

#[test]
fn rejects_an_invalid_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("poller.toml");
    std::fs::write(&path, r#"queries = []"#).unwrap();
    assert!(PollerConfig::load_from(&path).is_err());

    std::fs::write(&path, "queries = [\"x\"]\nlimit = 0\n").unwrap();
    assert!(PollerConfig::load_from(&path).is_err());
}

#[test]
fn missing_file_is_a_readable_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = PollerConfig::load_from(&tmp.path().join("nope.toml")).unwrap_err();
    assert!(err.to_string().contains("reading poller config"));
}
