//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! `init_env()` is idempotent; getters call it lazily.
use std::sync::Once;
use tracing::info;

static INIT: Once = Once::new();

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        if dotenv::dotenv().is_ok() {
            return;
        }
        // Fallback to the crate root so `cargo run` from a subdirectory still finds it.
        let candidate = format!("{}/.env", env!("CARGO_MANIFEST_DIR"));
        let _ = dotenv::from_filename(candidate);
    });
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

pub(crate) fn redact_value(key: &str, val: &str) -> String {
    let k = key.to_ascii_uppercase();
    if k.contains("PASSWORD")
        || k.contains("SECRET")
        || k.contains("KEY")
        || k.contains("TOKEN")
    {
        return "***".to_string();
    }

    // Trim so we don't accidentally log credentials hidden behind newlines.
    let val_trim = val.trim();

    // Always redact postgres DSNs even if the key isn't obviously sensitive.
    if let Ok(mut u) = url::Url::parse(val_trim) {
        let scheme = u.scheme().to_ascii_lowercase();
        if scheme == "postgres" || scheme == "postgresql" {
            let _ = u.set_username("***");
            let _ = u.set_password(Some("***"));
            return u.to_string();
        }
    }

    val_trim.to_string()
}

/// Validate required keys and log a consolidated, redacted snapshot of configuration.
/// Values are read through `lookup`; returns an error naming every missing key.
pub fn preflight_check_with<F>(
    title: &str,
    required: &[&str],
    also_log: &[&str],
    lookup: F,
) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let present = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|k| present(*k).is_none())
        .collect();
    let snapshot: Vec<(String, String)> = also_log
        .iter()
        .map(|&k| {
            let v = present(k).unwrap_or_default();
            (k.to_string(), redact_value(k, &v))
        })
        .collect();
    info!(target = "preflight", title, snapshot = ?snapshot, "configuration snapshot");
    if !missing.is_empty() {
        return Err(anyhow::anyhow!(format!(
            "missing required env: {:?}",
            missing
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_secrets_and_dsn_credentials() {
        assert_eq!(redact_value("B2_APPLICATION_KEY", "abc"), "***");
        assert_eq!(redact_value("SUPABASE_KEY", "eyJ..."), "***");
        let dsn = redact_value("DATABASE_URL", "postgres://user:pw@db.example.com:5432/app");
        assert!(!dsn.contains("pw"));
        assert!(dsn.contains("db.example.com"));
        assert_eq!(redact_value("B2_BUCKET", " media "), "media");
    }

    #[test]
    fn preflight_reports_every_missing_key() {
        let lookup = |k: &str| match k {
            "A" => Some("1".to_string()),
            "B" => Some("   ".to_string()),
            _ => None,
        };
        let err = preflight_check_with("test", &["A", "B", "C"], &["A"], lookup).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"B\""));
        assert!(msg.contains("\"C\""));
        assert!(!msg.contains("\"A\""));
    }
}
