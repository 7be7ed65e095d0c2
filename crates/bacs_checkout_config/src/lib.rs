use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

pub mod env_vars;
pub mod models;

pub use env_vars::SECRET_MARKER;
pub use models::*;

/// Loads the application configuration.
///
/// Sources, later ones winning:
/// 1. `<CONFIG_DIR>/default.*`
/// 2. `<CONFIG_DIR>/<RUN_ENV>.*` (`RUN_ENV` defaults to `debug`)
/// 3. `BACS_CHECKOUT__*` environment variables (`__` separates path segments)
///
/// Afterwards `secret_from_env` placeholders are resolved and the plain
/// `DOMAIN` / `STATIC_DIR` variables are applied.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::config_prefix();
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    let builder = Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 4242_i64)?
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    let mut raw: serde_json::Value = builder.build()?.try_deserialize()?;
    env_vars::inject_env_vars(&mut raw);

    let config: AppConfig = serde_json::from_value(raw)
        .map_err(|err| ConfigError::Message(format!("failed to parse config: {err}")))?;
    let config = apply_legacy_env_overrides(config);

    info!(
        "Configuration loaded (RUN_ENV={}, stripe enabled: {})",
        run_env, config.use_stripe
    );
    Ok(config)
}

/// Applies the plain variables used by Stripe's sample servers.
pub fn apply_legacy_env_overrides(mut config: AppConfig) -> AppConfig {
    if let Ok(domain) = env::var("DOMAIN") {
        match config.stripe.as_mut() {
            Some(stripe) => stripe.domain = domain,
            None => warn!("DOMAIN is set but there is no [stripe] section to apply it to"),
        }
    }
    if let Ok(dir) = env::var("STATIC_DIR") {
        config.static_files = Some(StaticFilesConfig { dir });
    }
    config
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, once.
///
/// `DOTENV_OVERRIDE` wins, then a first command line argument starting with
/// `.env`, then `.env` itself. A missing file is not an error. Returns the
/// path that was tried.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // The loader reads process-wide variables; tests touching them take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "CONFIG_DIR",
        "RUN_ENV",
        "DOMAIN",
        "STATIC_DIR",
        "BACS_CHECKOUT__SERVER__PORT",
        "BACS_CHECKOUT_SECRET_STRIPE_SECRET_KEY",
        "BACS_CHECKOUT_SECRET_STRIPE_PUBLISHABLE_KEY",
        "BACS_CHECKOUT_SECRET_STRIPE_WEBHOOK_SECRET",
        "STRIPE_SECRET_KEY",
        "STRIPE_PUBLISHABLE_KEY",
        "STRIPE_WEBHOOK_SECRET",
    ];

    /// Clears the loader's variables on creation and again on drop.
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
    }

    impl EnvGuard<'_> {
        fn new(vars: &[(&str, &str)]) -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            for key in ENV_KEYS {
                env::remove_var(key);
            }
            for (key, value) in vars {
                env::set_var(key, value);
            }
            Self { _lock: lock }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for key in ENV_KEYS {
                env::remove_var(key);
            }
        }
    }

    const DEFAULT_TOML: &str = r#"
use_stripe = true

[server]
host = "0.0.0.0"
port = 4242

[stripe]
publishable_key = "secret_from_env"
secret_key = "secret_from_env"
webhook_secret = "secret_from_env"
domain = "http://localhost:4242"
currency = "gbp"

[static_files]
dir = "client"
"#;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_files_then_run_env_then_env_vars() {
        let dir = tempdir().unwrap();
        write(dir.path(), "default.toml", DEFAULT_TOML);
        write(
            dir.path(),
            "staging.toml",
            "[server]\nhost = \"10.0.0.1\"\n\n[stripe]\ncurrency = \"eur\"\n",
        );
        let config_dir = dir.path().to_string_lossy().into_owned();
        let _env = EnvGuard::new(&[
            ("CONFIG_DIR", config_dir.as_str()),
            ("RUN_ENV", "staging"),
            ("BACS_CHECKOUT__SERVER__PORT", "8080"),
            ("BACS_CHECKOUT_SECRET_STRIPE_SECRET_KEY", "sk_test_prefixed"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_plain"),
        ]);

        let config = load_config().unwrap();

        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(config.use_stripe);
        let stripe = config.stripe.unwrap();
        assert_eq!(stripe.currency.as_deref(), Some("eur"));
        assert_eq!(stripe.domain, "http://localhost:4242");
        assert_eq!(stripe.secret_key, "sk_test_prefixed");
        assert_eq!(stripe.publishable_key, "pk_test_plain");
        assert!(stripe.webhook_signing_secret().is_none());
        assert_eq!(config.static_files.unwrap().dir, "client");
    }

    #[test]
    fn test_empty_config_dir_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("missing").to_string_lossy().into_owned();
        let _env = EnvGuard::new(&[("CONFIG_DIR", config_dir.as_str())]);

        let config = load_config().unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4242);
        assert!(!config.use_stripe);
        assert!(config.stripe.is_none());
        assert!(config.static_files.is_none());
    }

    #[test]
    fn test_domain_and_static_dir_override_files() {
        let dir = tempdir().unwrap();
        write(dir.path(), "default.toml", DEFAULT_TOML);
        let config_dir = dir.path().to_string_lossy().into_owned();
        let _env = EnvGuard::new(&[
            ("CONFIG_DIR", config_dir.as_str()),
            ("STRIPE_SECRET_KEY", "sk_test_1"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_1"),
            ("DOMAIN", "https://example.test"),
            ("STATIC_DIR", "/srv/bacs"),
        ]);

        let config = load_config().unwrap();

        assert_eq!(config.stripe.unwrap().domain, "https://example.test");
        assert_eq!(config.static_files.unwrap().dir, "/srv/bacs");
    }

    #[test]
    fn test_domain_without_stripe_section_changes_nothing() {
        let _env = EnvGuard::new(&[("DOMAIN", "https://example.test"), ("STATIC_DIR", "site")]);
        let config: AppConfig = serde_json::from_value(json!({
            "server": { "host": "127.0.0.1", "port": 4242 },
            "use_stripe": true
        }))
        .unwrap();

        let config = apply_legacy_env_overrides(config);

        assert!(config.stripe.is_none());
        assert_eq!(config.static_files.unwrap().dir, "site");
    }

    #[test]
    fn test_negative_tolerance_is_rejected() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "default.toml",
            r#"
[server]
host = "127.0.0.1"
port = 4242

[stripe]
publishable_key = "pk_test_1"
secret_key = "sk_test_1"
domain = "http://localhost:4242"
webhook_tolerance_secs = -1
"#,
        );
        let config_dir = dir.path().to_string_lossy().into_owned();
        let _env = EnvGuard::new(&[("CONFIG_DIR", config_dir.as_str())]);

        assert!(load_config().is_err());
    }

    #[test]
    fn test_stripe_defaults_applied() {
        let config: AppConfig = serde_json::from_value(json!({
            "server": { "host": "127.0.0.1", "port": 4242 },
            "use_stripe": true,
            "stripe": {
                "publishable_key": "pk_test_1",
                "secret_key": "sk_test_1",
                "domain": "http://localhost:4242"
            }
        }))
        .unwrap();

        let stripe = config.stripe.unwrap();
        assert_eq!(stripe.api_base, "https://api.stripe.com");
        assert_eq!(stripe.payment_method_types, vec!["bacs_debit".to_string()]);
        assert_eq!(stripe.webhook_tolerance_secs, 300);
        assert_eq!(stripe.max_webhook_body_bytes, 65536);
        assert!(stripe.webhook_signing_secret().is_none());
        assert!(config.static_files.is_none());
    }

    #[test]
    fn test_unresolved_webhook_secret_is_ignored() {
        let stripe: StripeConfig = serde_json::from_value(json!({
            "publishable_key": "pk_test_1",
            "secret_key": "sk_test_1",
            "domain": "http://localhost:4242",
            "webhook_secret": "secret_from_env"
        }))
        .unwrap();
        assert!(stripe.webhook_signing_secret().is_none());

        let stripe = StripeConfig {
            webhook_secret: Some("whsec_abc".to_string()),
            ..stripe
        };
        assert_eq!(stripe.webhook_signing_secret(), Some("whsec_abc"));
    }

    #[test]
    fn test_use_stripe_defaults_to_false() {
        let config: AppConfig = serde_json::from_value(json!({
            "server": { "host": "0.0.0.0", "port": 8080 }
        }))
        .unwrap();
        assert!(!config.use_stripe);
        assert!(config.stripe.is_none());
    }
}
