//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::str::FromStr;
use std::sync::Once;

static INIT: Once = Once::new();

/// Load .env if present, exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
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

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Boolean flag; accepts 1/true/on/yes (case-insensitive) as true.
pub fn env_flag(key: &str, default: bool) -> bool {
    init_env();
    match std::env::var(key) {
        Ok(raw) => {
            let v = raw.trim().to_ascii_lowercase();
            matches!(v.as_str(), "1" | "true" | "on" | "yes")
        }
        Err(_) => default,
    }
}

/// Database URL (tries specific -> generic). Returns first found.
pub fn db_url() -> anyhow::Result<String> {
    init_env();
    for k in ["KASPI_DB_URL", "DATABASE_URL", "DB_URL"] {
        if let Some(v) = env_opt(k) {
            return Ok(v);
        }
    }
    Err(anyhow::anyhow!("no database URL env vars set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_on_garbage() {
        std::env::set_var("KP_TEST_PARSE", "not-a-number");
        assert_eq!(env_parse::<u64>("KP_TEST_PARSE", 15), 15);
        std::env::remove_var("KP_TEST_PARSE");
    }

    #[test]
    fn env_flag_accepts_common_truthy_spellings() {
        for raw in ["1", "true", "ON", "yes"] {
            std::env::set_var("KP_TEST_FLAG", raw);
            assert!(env_flag("KP_TEST_FLAG", false), "{raw} should be truthy");
        }
        std::env::set_var("KP_TEST_FLAG", "0");
        assert!(!env_flag("KP_TEST_FLAG", true));
        std::env::remove_var("KP_TEST_FLAG");
    }

    #[test]
    fn env_opt_treats_blank_as_unset() {
        std::env::set_var("KP_TEST_OPT", "   ");
        assert_eq!(env_opt("KP_TEST_OPT"), None);
        std::env::remove_var("KP_TEST_OPT");
    }
}
