use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use url::Url;

use super::{FigmentErrorAttachable, ParseError};

/// Root configuration of the admin tool.
#[derive(Debug, Deserialize)]
pub struct Admin {
    pub db: super::Database,
}

impl Admin {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ParseError> {
        let url = Url::parse(self.db.primary.url.as_str())
            .change_context(ParseError)
            .attach_printable("invalid Postgres connection URL")?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(Report::new(ParseError)
                .attach_printable("connection URL must use the postgres:// scheme"));
        }

        Ok(())
    }
}

impl Admin {
    const DEFAULT_CONFIG_FILE: &'static str = "lunara.toml";

    /// Creates a default [`Figment`](figment::Figment) object to load
    /// admin configuration. This function is there for implementing
    /// [`Admin::load`] and testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // One big con about figment (env provider to be specific) especially
            // these fields with underscore in it.
            .merge(Env::prefixed("LUNARA_").map(|v| match v.as_str() {
                "DB_PRIMARY_MIN_IDLE" => "db.primary.min_idle".into(),
                "DB_PRIMARY_POOL_SIZE" => "db.primary.pool_size".into(),

                "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

                _ => v.as_str().replace('_', ".").into(),
            }))
            // Environment variable aliases
            .merge(Env::raw().map(|v| match v.as_str() {
                "DATABASE_URL" => "db.primary.url".into(),
                _ => v.into(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::num::{NonZeroU32, NonZeroU64};

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost:5432/menstrual_cycle");

            jail.set_env("LUNARA_DB_PRIMARY_MIN_IDLE", "100");
            jail.set_env("LUNARA_DB_PRIMARY_POOL_SIZE", "100");

            jail.set_env("LUNARA_DB_ENFORCE_TLS", "false");
            jail.set_env("LUNARA_DB_TIMEOUT_SECS", "3030");

            let config: Admin = Admin::figment().extract()?;
            assert_eq!(
                config.db.primary.url.as_str(),
                "postgres://localhost:5432/menstrual_cycle"
            );
            assert_eq!(
                config.db.primary.min_idle.unwrap(),
                NonZeroU32::new(100).unwrap()
            );
            assert_eq!(config.db.primary.pool_size, NonZeroU32::new(100).unwrap());

            assert!(!config.db.enforce_tls);
            assert_eq!(config.db.timeout_secs, NonZeroU64::new(3030).unwrap());

            Ok(())
        });
    }

    #[test]
    fn defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost:5432/menstrual_cycle");

            let config: Admin = Admin::figment().extract()?;
            assert_eq!(config.db.primary.min_idle, None);
            assert_eq!(config.db.primary.pool_size, NonZeroU32::new(5).unwrap());
            assert!(config.db.enforce_tls);
            assert_eq!(config.db.timeout_secs, NonZeroU64::new(5).unwrap());

            Ok(())
        });
    }

    #[test]
    fn rejects_non_postgres_urls() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "mysql://localhost:3306/menstrual_cycle");

            let config: Admin = Admin::figment().extract()?;
            assert!(config.validate().is_err());

            Ok(())
        });
    }
}
