//! Environment variable handling for the checkout service.
//!
//! Config files mark secrets with the `secret_from_env` placeholder. At load
//! time each placeholder is resolved from the environment, first through the
//! prefixed name (`BACS_CHECKOUT_SECRET_STRIPE_SECRET_KEY`) and then through
//! the plain name used by Stripe's sample deployments (`STRIPE_SECRET_KEY`).

use serde_json::Value;
use std::env;
use tracing::{debug, warn};

pub const DEFAULT_PREFIX: &str = "BACS_CHECKOUT";
pub const SECRET_PREFIX: &str = "BACS_CHECKOUT_SECRET";

/// Separates path segments in override variables (`BACS_CHECKOUT__SERVER__PORT`).
pub const CONFIG_SEPARATOR: &str = "__";

/// Placeholder value that asks the loader to read the value from the environment
pub const SECRET_MARKER: &str = "secret_from_env";

/// Prefix of override variables; `PREFIX` replaces the default.
pub fn config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Segments whose values must never come from a committed file.
const SECRET_WORDS: &[&str] = &["secret", "key", "password", "token"];

pub fn is_secret_path(path: &str) -> bool {
    let path = path.to_lowercase();
    SECRET_WORDS.iter().any(|word| path.contains(word))
}

/// Variable names consulted for a config path, in lookup order.
///
/// * `stripe.secret_key` → `BACS_CHECKOUT_SECRET_STRIPE_SECRET_KEY`, `STRIPE_SECRET_KEY`
/// * `stripe.domain` → `BACS_CHECKOUT__STRIPE__DOMAIN`
pub fn env_var_candidates(path: &str) -> Vec<String> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();

    if is_secret_path(path) {
        vec![
            format!("{}_{}", SECRET_PREFIX, segments.join("_")).to_uppercase(),
            segments.join("_").to_uppercase(),
        ]
    } else {
        vec![format!(
            "{}{}{}",
            config_prefix(),
            CONFIG_SEPARATOR,
            segments.join(CONFIG_SEPARATOR)
        )
        .to_uppercase()]
    }
}

/// First candidate variable that is set, with its name.
pub fn lookup(path: &str) -> Option<(String, String)> {
    env_var_candidates(path)
        .into_iter()
        .find_map(|name| env::var(&name).ok().map(|value| (name, value)))
}

/// Replace every `secret_from_env` string inside `value` with its environment value.
///
/// Returns the number of placeholders resolved. Unresolved placeholders are
/// left in place and logged.
pub fn inject_env_vars(value: &mut Value) -> usize {
    let mut path = Vec::new();
    resolve_markers(value, &mut path)
}

fn resolve_markers(value: &mut Value, path: &mut Vec<String>) -> usize {
    match value {
        Value::Object(map) => map
            .iter_mut()
            .map(|(key, child)| {
                path.push(key.clone());
                let resolved = resolve_markers(child, path);
                path.pop();
                resolved
            })
            .sum(),
        Value::Array(items) => items
            .iter_mut()
            .enumerate()
            .map(|(index, child)| {
                path.push(index.to_string());
                let resolved = resolve_markers(child, path);
                path.pop();
                resolved
            })
            .sum(),
        Value::String(s) if s == SECRET_MARKER => {
            let dotted = path.join(".");
            match lookup(&dotted) {
                Some((name, resolved)) => {
                    debug!("{} taken from {}", dotted, name);
                    *s = resolved;
                    1
                }
                None => {
                    warn!(
                        "No environment value for {} (tried {})",
                        dotted,
                        env_var_candidates(&dotted).join(", ")
                    );
                    0
                }
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidates_for_plain_values() {
        assert_eq!(
            env_var_candidates("server.port"),
            vec!["BACS_CHECKOUT__SERVER__PORT".to_string()]
        );
        assert_eq!(
            env_var_candidates("stripe.domain"),
            vec!["BACS_CHECKOUT__STRIPE__DOMAIN".to_string()]
        );
    }

    #[test]
    fn test_candidates_for_secrets() {
        assert_eq!(
            env_var_candidates("stripe.secret_key"),
            vec![
                "BACS_CHECKOUT_SECRET_STRIPE_SECRET_KEY".to_string(),
                "STRIPE_SECRET_KEY".to_string(),
            ]
        );
        assert_eq!(
            env_var_candidates("stripe.webhook_secret")[1],
            "STRIPE_WEBHOOK_SECRET"
        );
        assert_eq!(
            env_var_candidates("stripe.publishable_key")[1],
            "STRIPE_PUBLISHABLE_KEY"
        );
    }

    #[test]
    fn test_secret_detection() {
        assert!(is_secret_path("stripe.publishable_key"));
        assert!(is_secret_path("stripe.webhook_secret"));
        assert!(!is_secret_path("stripe.currency"));
        assert!(!is_secret_path("static_files.dir"));
    }

    #[test]
    fn test_prefixed_secret_wins_over_plain_name() {
        // Unique path so parallel tests never share the variables.
        env::set_var("BACS_CHECKOUT_SECRET_INJECTTEST_API_KEY", "from_prefixed");
        env::set_var("INJECTTEST_API_KEY", "from_plain");
        let mut value = json!({
            "injecttest": { "api_key": "secret_from_env", "domain": "http://localhost" }
        });

        assert_eq!(inject_env_vars(&mut value), 1);
        assert_eq!(value["injecttest"]["api_key"], "from_prefixed");
        assert_eq!(value["injecttest"]["domain"], "http://localhost");
    }

    #[test]
    fn test_plain_name_fallback_inside_arrays() {
        env::set_var("FALLBACKTEST_0_TOKEN", "tok_plain");
        let mut value = json!({ "fallbacktest": [ { "token": "secret_from_env" } ] });

        assert_eq!(inject_env_vars(&mut value), 1);
        assert_eq!(value["fallbacktest"][0]["token"], "tok_plain");
    }

    #[test]
    fn test_unresolved_marker_is_left_in_place() {
        let mut value = json!({ "nosuchservice": { "api_token": "secret_from_env" } });

        assert_eq!(inject_env_vars(&mut value), 0);
        assert_eq!(value["nosuchservice"]["api_token"], SECRET_MARKER);
    }
}
