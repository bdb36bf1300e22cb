//! Integration tests for configuration loading

use pinbridge::infra::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"{
        "Duration": 3,
        "Pin": 21,
        "Broker": "tcp://192.168.1.50:1883",
        "Topic": "home/lamp"
    }"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::load(temp_file.path()).unwrap();

    assert_eq!(config.duration, 3);
    assert_eq!(config.pin, 21);
    assert_eq!(config.broker, "tcp://192.168.1.50:1883");
    assert_eq!(config.topic, "home/lamp");
}

#[test]
fn test_load_missing_file_fails() {
    assert!(Config::load("/nonexistent/config.json").is_err());
}
