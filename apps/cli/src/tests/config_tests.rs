use super::*;

use std::collections::HashMap;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_from(&dir.path().join("missing.toml"), env_of(&[]));
    assert_eq!(settings, ClientSettings::default());
    assert_eq!(settings.api_url, "http://localhost:4000/api");
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(
        &path,
        "api_url = \"https://vote.example.com/api\"\nstore_url = \"./data/session.db\"\n",
    )
    .expect("write");

    let settings = load_settings_from(&path, env_of(&[]));
    assert_eq!(settings.api_url, "https://vote.example.com/api");
    assert_eq!(settings.store_url.as_deref(), Some("./data/session.db"));
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(&path, "api_url = \"https://file.example.com/api\"\n").expect("write");

    let settings = load_settings_from(
        &path,
        env_of(&[
            ("VOTE_API_URL", "https://env.example.com/api"),
            ("APP__API_URL", "https://app.example.com/api"),
            ("VOTE_STORE_URL", "sqlite::memory:"),
        ]),
    );
    assert_eq!(settings.api_url, "https://app.example.com/api");
    assert_eq!(settings.store_url.as_deref(), Some("sqlite::memory:"));
}

#[test]
fn empty_env_values_are_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_from(
        &dir.path().join("missing.toml"),
        env_of(&[("VOTE_API_URL", "  ")]),
    );
    assert_eq!(settings.api_url, DEFAULT_API_BASE_URL);
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(SETTINGS_FILE);
    fs::write(&path, "api_url = [not toml").expect("write");

    let settings = load_settings_from(&path, env_of(&[]));
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn validates_api_urls() {
    assert_eq!(
        validate_api_url("http://localhost:4000/api/").expect("valid"),
        "http://localhost:4000/api"
    );
    assert!(validate_api_url("localhost:4000").is_err());
    assert!(validate_api_url("ftp://example.com").is_err());
    assert!(validate_api_url("not a url").is_err());
}

#[test]
fn explicit_store_path_becomes_sqlite_url() {
    let settings = ClientSettings {
        store_url: Some("./data/session.db".to_string()),
        ..Default::default()
    };
    assert_eq!(
        settings.resolve_store_url().expect("store url"),
        "sqlite://./data/session.db"
    );

    let memory = ClientSettings {
        store_url: Some("sqlite::memory:".to_string()),
        ..Default::default()
    };
    assert_eq!(memory.resolve_store_url().expect("store url"), "sqlite::memory:");
}
