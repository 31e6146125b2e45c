use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub const DEFAULT_RESET_REDIRECT_URL: &str =
    "https://felicialyden.github.io/recipe-search-frontend/#/reset-password";

/// Service settings: built-in defaults, then an optional `config.toml`, then environment
/// variables (`SUPABASE_URL`, `SUPABASE_KEY`, `SUPABASE_SERVICE_ROLE_KEY`, `PORT`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub port: u16,
    pub database_path: String,
    pub migrations_path: String,
    pub supabase_url: String,
    /// Public (anon) key used for end-user auth calls
    pub supabase_key: String,
    /// Privileged key, only used to delete identities
    pub supabase_service_role_key: String,
    pub reset_redirect_url: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("port", 3000)?
            .set_default("database_path", "database/recipebook.db")?
            .set_default(
                "migrations_path",
                concat!(env!("CARGO_MANIFEST_DIR"), "/../database/migrations"),
            )?
            .set_default("reset_redirect_url", DEFAULT_RESET_REDIRECT_URL)?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::default())
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::set_var;

    #[test]
    fn test_settings_from_environment() {
        set_var("SUPABASE_URL", "https://project.supabase.co");
        set_var("SUPABASE_KEY", "anon");
        set_var("SUPABASE_SERVICE_ROLE_KEY", "service");
        set_var("PORT", "8081");

        let settings = Settings::load().unwrap();
        assert_eq!(settings.supabase_url, "https://project.supabase.co");
        assert_eq!(settings.supabase_key, "anon");
        assert_eq!(settings.supabase_service_role_key, "service");
        assert_eq!(settings.bind_address(), "0.0.0.0:8081");
        assert_eq!(settings.reset_redirect_url, DEFAULT_RESET_REDIRECT_URL);
    }
}
