use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_with_only_api_key() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("API_KEY", "secret")])).unwrap();
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.model, DEFAULT_MODEL);
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.generation, GenerationConfig { thinking_budget: 0, temperature: None });
    assert_eq!(
        cfg.timeouts,
        LlmTimeouts { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    );
}

#[test]
fn falls_back_to_gemini_api_key() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "g-key")])).unwrap();
    assert_eq!(cfg.api_key, "g-key");
}

#[test]
fn named_key_var_takes_precedence() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[
        ("LLM_API_KEY_ENV", "MY_KEY"),
        ("MY_KEY", "mine"),
        ("API_KEY", "default"),
    ]))
    .unwrap();
    assert_eq!(cfg.api_key, "mine");
}

#[test]
fn named_key_var_unset_is_missing() {
    let err = LlmConfig::from_lookup(lookup_from(&[("LLM_API_KEY_ENV", "MY_KEY"), ("API_KEY", "default")]))
        .unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { ref var } if var == "MY_KEY"));
}

#[test]
fn missing_key_errors() {
    let err = LlmConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { ref var } if var == "API_KEY"));
}

#[test]
fn blank_key_counts_as_missing() {
    let err = LlmConfig::from_lookup(lookup_from(&[("API_KEY", "   ")])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { .. }));
}

#[test]
fn parses_overrides() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[
        ("API_KEY", "secret"),
        ("LLM_MODEL", "gemini-2.5-pro"),
        ("LLM_BASE_URL", "https://example.test/v1beta/"),
        ("LLM_TEMPERATURE", "0.2"),
        ("LLM_REQUEST_TIMEOUT_SECS", "42"),
        ("LLM_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();
    assert_eq!(cfg.model, "gemini-2.5-pro");
    assert_eq!(cfg.base_url, "https://example.test/v1beta");
    assert_eq!(cfg.generation.temperature, Some(0.2));
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn bad_timeout_falls_back_to_default() {
    let cfg =
        LlmConfig::from_lookup(lookup_from(&[("API_KEY", "secret"), ("LLM_REQUEST_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_LLM_REQUEST_TIMEOUT_SECS);
}

#[test]
fn bad_temperature_errors() {
    let err = LlmConfig::from_lookup(lookup_from(&[("API_KEY", "secret"), ("LLM_TEMPERATURE", "hot")])).unwrap_err();
    assert!(err.to_string().contains("invalid LLM_TEMPERATURE"));

    let err = LlmConfig::from_lookup(lookup_from(&[("API_KEY", "secret"), ("LLM_TEMPERATURE", "3.5")])).unwrap_err();
    assert!(matches!(err, LlmError::ConfigParse(_)));
}

#[test]
fn from_env_reads_named_key_var() {
    unsafe {
        std::env::set_var("LLM_API_KEY_ENV", "__TEST_SHEETMASTER_KEY_4411__");
        std::env::set_var("__TEST_SHEETMASTER_KEY_4411__", "from-env");
    }
    let cfg = LlmConfig::from_env();
    unsafe {
        std::env::remove_var("LLM_API_KEY_ENV");
        std::env::remove_var("__TEST_SHEETMASTER_KEY_4411__");
    }
    assert_eq!(cfg.unwrap().api_key, "from-env");
}
