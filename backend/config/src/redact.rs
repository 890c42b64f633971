//! Config redaction: mask credentials before a config is printed or logged.

use serde_json::Value;

static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "publicKey",
    "public_key",
    "anonKey",
    "anon_key",
    "token",
    "secret",
    "password",
];

/// Replace every sensitive string with its first four characters plus `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => {
            let hint = if s.chars().count() > 8 {
                format!("{}***", s.chars().take(4).collect::<String>())
            } else {
                "***".to_string()
            };
            Value::String(hint)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_credentials() {
        let v = json!({
            "insight": { "apiKey": "AIzaSyA-very-secret" },
            "remote": { "url": "https://abc.supabase.co", "publicKey": "eyJhbGciOi.payload" }
        });
        let redacted = redact(&v);
        assert_eq!(redacted["insight"]["apiKey"], "AIza***");
        assert_eq!(redacted["remote"]["publicKey"], "eyJh***");
        assert_eq!(redacted["remote"]["url"], "https://abc.supabase.co");
    }

    #[test]
    fn short_secrets_are_fully_hidden() {
        let redacted = redact(&json!({ "apiKey": "abc" }));
        assert_eq!(redacted["apiKey"], "***");
    }
}
