use super::*;

fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();

    apply_file(
        &mut settings,
        "server_url = \"https://auth.example.com/api/v1\"\nrequest_timeout_ms = 2500\n",
    )
    .expect("apply");

    assert_eq!(settings.server_url, "https://auth.example.com/api/v1");
    assert_eq!(settings.request_timeout(), Duration::from_millis(2500));
}

#[test]
fn negative_timeout_in_file_is_an_error() {
    let mut settings = Settings::default();

    let err = apply_file(&mut settings, "request_timeout_ms = -1\n").expect_err("negative");

    assert!(err.to_string().contains("request_timeout_ms"));
}

#[test]
fn zero_timeout_in_file_is_an_error() {
    let mut settings = Settings::default();

    let err = apply_file(&mut settings, "request_timeout_ms = 0\n").expect_err("zero");

    assert!(err.to_string().contains("positive"));
    assert_eq!(settings.request_timeout_ms, 10_000);
}

#[test]
fn zero_timeout_in_env_is_ignored() {
    let mut settings = Settings::default();

    apply_env(&mut settings, env(&[("APP__REQUEST_TIMEOUT_MS", "0")]));

    assert_eq!(settings.request_timeout_ms, 10_000);
}

#[test]
fn env_overrides_file_and_ignores_garbage() {
    let mut settings = Settings {
        server_url: "http://from-file".to_string(),
        request_timeout_ms: 100,
    };

    apply_env(
        &mut settings,
        env(&[
            ("ADMIN_SERVER_URL", "http://plain"),
            ("APP__SERVER_URL", "http://app"),
            ("ADMIN_REQUEST_TIMEOUT_MS", "soon"),
        ]),
    );

    assert_eq!(settings.server_url, "http://app");
    assert_eq!(settings.request_timeout_ms, 100);
}

#[test]
fn explicit_missing_config_file_fails() {
    let err = load_settings(Some(Path::new("/nonexistent/admin.toml"))).expect_err("missing");

    assert!(err.to_string().contains("failed to read config file"));
}
