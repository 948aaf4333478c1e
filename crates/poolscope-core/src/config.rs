//! Runtime settings resolved from the process environment.

use std::env;
use std::path::PathBuf;

pub const PLACEHOLDER_URL: &str = "https://placeholder.supabase.co";
pub const PLACEHOLDER_KEY: &str = "placeholder-key";
pub const DEFAULT_SNAPSHOT_TABLE: &str = "aerodrome_pools";
pub const DEFAULT_APR_TABLE: &str = "apr_data";

const URL_VARS: [&str; 3] = ["POOLSCOPE_SUPABASE_URL", "SUPABASE_URL", "VITE_SUPABASE_URL"];
const KEY_VARS: [&str; 3] = [
    "POOLSCOPE_SUPABASE_ANON_KEY",
    "SUPABASE_ANON_KEY",
    "VITE_SUPABASE_ANON_KEY",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub supabase_url: String,
    pub anon_key: String,
    pub snapshot_table: String,
    pub apr_table: String,
    pub home: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            supabase_url: String::from(PLACEHOLDER_URL),
            anon_key: String::from(PLACEHOLDER_KEY),
            snapshot_table: String::from(DEFAULT_SNAPSHOT_TABLE),
            apr_table: String::from(DEFAULT_APR_TABLE),
            home: PathBuf::from(".poolscope"),
        }
    }
}

impl Settings {
    /// Reads settings from the environment. Missing credentials fall back to
    /// placeholders rather than failing; see [`Settings::has_valid_credentials`].
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves settings through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let first_of = |names: &[&str]| names.iter().find_map(|name| get(name));

        let defaults = Self::default();
        let home = get("POOLSCOPE_HOME")
            .map(PathBuf::from)
            .or_else(|| get("HOME").map(|home| PathBuf::from(home).join(".poolscope")))
            .unwrap_or(defaults.home);

        Self {
            supabase_url: first_of(&URL_VARS[..])
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or(defaults.supabase_url),
            anon_key: first_of(&KEY_VARS[..]).unwrap_or(defaults.anon_key),
            snapshot_table: get("POOLSCOPE_SNAPSHOT_TABLE").unwrap_or(defaults.snapshot_table),
            apr_table: get("POOLSCOPE_APR_TABLE").unwrap_or(defaults.apr_table),
            home,
        }
    }

    /// False when either credential is still the placeholder, meaning queries
    /// will fail and the dashboard runs degraded.
    pub fn has_valid_credentials(&self) -> bool {
        self.supabase_url != PLACEHOLDER_URL && self.anon_key != PLACEHOLDER_KEY
    }

    pub fn theme_path(&self) -> PathBuf {
        self.home.join("theme")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn missing_credentials_fall_back_to_placeholders() {
        let settings = settings(&[]);
        assert_eq!(settings.supabase_url, PLACEHOLDER_URL);
        assert_eq!(settings.anon_key, PLACEHOLDER_KEY);
        assert_eq!(settings.snapshot_table, DEFAULT_SNAPSHOT_TABLE);
        assert!(!settings.has_valid_credentials());
    }

    #[test]
    fn prefixed_variables_win_over_fallbacks() {
        let settings = settings(&[
            ("POOLSCOPE_SUPABASE_URL", "https://primary.supabase.co/"),
            ("VITE_SUPABASE_URL", "https://vite.supabase.co"),
            ("VITE_SUPABASE_ANON_KEY", "vite-key"),
        ]);

        assert_eq!(settings.supabase_url, "https://primary.supabase.co");
        assert_eq!(settings.anon_key, "vite-key");
        assert!(settings.has_valid_credentials());
    }

    #[test]
    fn blank_values_are_ignored() {
        let settings = settings(&[("SUPABASE_URL", "   "), ("POOLSCOPE_APR_TABLE", "")]);
        assert_eq!(settings.supabase_url, PLACEHOLDER_URL);
        assert_eq!(settings.apr_table, DEFAULT_APR_TABLE);
    }

    #[test]
    fn home_prefers_explicit_override() {
        let explicit = settings(&[("POOLSCOPE_HOME", "/tmp/ps"), ("HOME", "/home/me")]);
        assert_eq!(explicit.theme_path(), PathBuf::from("/tmp/ps/theme"));

        let derived = settings(&[("HOME", "/home/me")]);
        assert_eq!(derived.home, PathBuf::from("/home/me/.poolscope"));
    }
}
