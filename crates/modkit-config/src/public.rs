//! Stripping fields that must never leave the build machine

use modkit_core::{AppConfig, INTERNAL_KEY};
use serde_json::Value;

/// Top-level keys removed from the public config
const PRIVATE_KEYS: [&str; 2] = [INTERNAL_KEY, "hooks"];

/// Nested `(parent, child)` keys removed from the public config
const PRIVATE_NESTED_KEYS: [(&str, &str); 4] = [
    ("ios", "config"),
    ("android", "config"),
    ("updates", "codeSigningCertificate"),
    ("updates", "codeSigningMetadata"),
];

/// Copy of `config` safe to embed in a shipped app
pub fn strip_private_fields(config: &AppConfig) -> AppConfig {
    let mut public = config.without_mods();
    for key in PRIVATE_KEYS {
        public.remove(key);
    }
    for (parent, child) in PRIVATE_NESTED_KEYS {
        if let Some(Value::Object(section)) = public.fields_mut().get_mut(parent) {
            section.remove(child);
        }
    }
    public
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_private_fields_removed() {
        let config = AppConfig::from_value(json!({
            "name": "app",
            "_internal": {"projectRoot": "/app"},
            "hooks": {"postPublish": []},
            "ios": {"bundleIdentifier": "a.b", "config": {"googleMapsApiKey": "secret"}},
            "android": {"config": {"googleMaps": {"apiKey": "secret"}}},
            "updates": {"url": "https://u", "codeSigningCertificate": "./cert.pem", "codeSigningMetadata": {}}
        }));
        let Some(config) = config else {
            return;
        };

        let public = strip_private_fields(&config);
        assert_eq!(
            public.to_value(),
            json!({
                "name": "app",
                "ios": {"bundleIdentifier": "a.b"},
                "android": {},
                "updates": {"url": "https://u"}
            })
        );
        assert!(!public.has_mods());
    }
}
