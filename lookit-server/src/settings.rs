use std::fmt::Display;
use std::str::FromStr;

use miette::Diagnostic;
use thiserror::Error;
use url::Url;

use crate::mask;

pub const DEBUG_ENV: &str = "DEBUG";
pub const GOOGLE_APPLICATION_CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Every environment variable read by [`Settings`], with its default.
pub const ENVIRONMENT_DEFAULTS: &[(&str, &str)] = &[
    (DEBUG_ENV, ""),
    ("ALLOWED_HOSTS", ""),
    ("BUCKET_NAME", "fakeBucketName"),
    ("DB_NAME", "lookit"),
    ("DB_USER", "postgres"),
    ("DB_PASSWORD", ""),
    ("DB_HOST", "127.0.0.1"),
    ("DB_PORT", "5432"),
    ("SITE_DOMAIN", "localhost:8000"),
    ("SITE_NAME", "Lookit"),
    ("EXPERIMENT_BASE_URL", "http://google.com/"),
    ("BASE_URL", "http://localhost:8000"),
    ("LOGIN_REDIRECT_URL", "http://localhost:8000/exp/"),
    ("ACCOUNT_LOGOUT_REDIRECT_URL", "/api/"),
    ("EMAIL_HOST", "smtp.sendgrid.net"),
    ("EMAIL_HOST_USER", ""),
    ("EMAIL_HOST_PASSWORD", ""),
    ("EMAIL_PORT", "587"),
    ("EMAIL_USE_TLS", "True"),
    ("EMAIL_FROM_ADDRESS", "lookit.robot@some.domain"),
    ("STATIC_URL", GCS_STATIC_URL),
    ("MEDIA_URL", GCS_MEDIA_URL),
    ("GS_BUCKET_NAME", "io-osf-lookit-staging2"),
    ("GS_PROJECT_ID", "cos-staging"),
    ("RAVEN_DSN", ""),
    ("GIT_COMMIT", "No version"),
    ("GOOGLE_TAG_MANAGER_ID", ""),
];

const GCS_STATIC_URL: &str = "https://storage.googleapis.com/io-osf-lookit-staging2/static/";
const GCS_MEDIA_URL: &str = "https://storage.googleapis.com/io-osf-lookit-staging2/media/";
const LOCAL_STATIC_URL: &str = "/static/";
const LOCAL_MEDIA_URL: &str = "/media/";

#[derive(Error, Diagnostic, Debug)]
pub enum SettingsError {
    #[error("environment variable {name} has invalid value '{value}': {reason}")]
    #[diagnostic(code(lookit::error::env))]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Site configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub debug: bool,
    pub allowed_hosts: Vec<String>,
    /// Bucket holding video attachments.
    pub bucket_name: String,
    pub database: DatabaseSettings,
    pub site_domain: String,
    pub site_name: String,
    /// Base URL experiments are served from.
    pub experiment_base_url: String,
    pub base_url: String,
    pub login_redirect_url: String,
    pub account_logout_redirect_url: String,
    pub email: EmailSettings,
    pub storage: Storage,
    pub error_reporting: Option<ErrorReporting>,
    pub google_tag_manager_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub name: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

/// Outgoing mail configuration. Mail is written to the log rather than sent.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub host: String,
    pub host_user: String,
    pub host_password: String,
    pub port: u16,
    pub use_tls: bool,
    pub from_address: String,
}

/// Where static and uploaded media files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// Served by this server from embedded assets.
    Local { static_url: String, media_url: String },
    GoogleCloud {
        static_url: String,
        media_url: String,
        bucket_name: String,
        project_id: String,
    },
}

/// Error reporting service configuration, only present outside debug mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReporting {
    pub dsn: Option<String>,
    pub release: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings with `lookup` returning the raw value of a variable, or
    /// `None` when it is not set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).unwrap_or_else(|| default_value(name).to_string());

        let debug = truthy(lookup(DEBUG_ENV).as_deref().unwrap_or(""));

        let allowed_hosts = var("ALLOWED_HOSTS")
            .split(' ')
            .filter(|h| !h.is_empty())
            .map(|h| h.to_string())
            .collect();

        let database = DatabaseSettings {
            name: var("DB_NAME"),
            user: var("DB_USER"),
            password: var("DB_PASSWORD"),
            host: var("DB_HOST"),
            port: parse("DB_PORT", &var("DB_PORT"))?,
        };

        let email = EmailSettings {
            host: var("EMAIL_HOST"),
            host_user: var("EMAIL_HOST_USER"),
            host_password: var("EMAIL_HOST_PASSWORD"),
            port: parse("EMAIL_PORT", &var("EMAIL_PORT"))?,
            use_tls: truthy(&var("EMAIL_USE_TLS")),
            from_address: var("EMAIL_FROM_ADDRESS"),
        };

        let storage = if lookup(GOOGLE_APPLICATION_CREDENTIALS_ENV)
            .filter(|v| !v.is_empty())
            .is_some()
        {
            Storage::GoogleCloud {
                static_url: var("STATIC_URL"),
                media_url: var("MEDIA_URL"),
                bucket_name: var("GS_BUCKET_NAME"),
                project_id: var("GS_PROJECT_ID"),
            }
        } else {
            Storage::Local {
                static_url: LOCAL_STATIC_URL.to_string(),
                media_url: LOCAL_MEDIA_URL.to_string(),
            }
        };

        let error_reporting = if debug {
            None
        } else {
            Some(ErrorReporting {
                dsn: lookup("RAVEN_DSN").filter(|v| !v.is_empty()),
                release: var("GIT_COMMIT"),
            })
        };

        Ok(Self {
            debug,
            allowed_hosts,
            bucket_name: var("BUCKET_NAME"),
            database,
            site_domain: var("SITE_DOMAIN"),
            site_name: var("SITE_NAME"),
            experiment_base_url: var("EXPERIMENT_BASE_URL"),
            base_url: var("BASE_URL"),
            login_redirect_url: var("LOGIN_REDIRECT_URL"),
            account_logout_redirect_url: var("ACCOUNT_LOGOUT_REDIRECT_URL"),
            email,
            storage,
            error_reporting,
            google_tag_manager_id: lookup("GOOGLE_TAG_MANAGER_ID").filter(|v| !v.is_empty()),
        })
    }

    pub fn log_summary(&self) {
        tracing::debug!(
            debug = self.debug,
            allowed_hosts = self.allowed_hosts.join(" "),
            site = self.site_domain.as_str(),
            base_url = self.base_url.as_str(),
            experiment_base_url = self.experiment_base_url.as_str(),
            "settings loaded"
        );
        tracing::debug!(
            host = self.email.host.as_str(),
            port = self.email.port,
            user = mask::secret(&self.email.host_user),
            password = mask::secret(&self.email.host_password),
            from = mask::email(&self.email.from_address),
            "email uses the console backend, messages are logged and not sent"
        );
        match &self.storage {
            Storage::Local { .. } => tracing::info!("using local assets"),
            Storage::GoogleCloud {
                bucket_name,
                project_id,
                ..
            } => tracing::info!(
                bucket = bucket_name.as_str(),
                project = project_id.as_str(),
                "using Google Cloud Storage for static and media files"
            ),
        }
        if let Some(reporting) = &self.error_reporting {
            tracing::debug!(
                release = reporting.release.as_str(),
                dsn_configured = reporting.dsn.is_some(),
                "error reporting enabled"
            );
        }
    }
}

impl DatabaseSettings {
    /// PostgreSQL connection URL, with user and password percent-encoded.
    pub fn url(&self) -> Result<String, SettingsError> {
        let invalid = |reason: String| SettingsError::InvalidValue {
            name: "DB_HOST".to_string(),
            value: self.host.clone(),
            reason,
        };

        let mut url = Url::parse(&format!("postgres://{}:{}/{}", self.host, self.port, self.name))
            .map_err(|e| invalid(e.to_string()))?;
        url.set_username(&self.user)
            .map_err(|_| invalid("cannot carry a user name".to_string()))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| invalid("cannot carry a password".to_string()))?;
        }
        Ok(url.to_string())
    }
}

impl Storage {
    pub fn static_url(&self) -> &str {
        match self {
            Storage::Local { static_url, .. } => static_url,
            Storage::GoogleCloud { static_url, .. } => static_url,
        }
    }

    pub fn media_url(&self) -> &str {
        match self {
            Storage::Local { media_url, .. } => media_url,
            Storage::GoogleCloud { media_url, .. } => media_url,
        }
    }

    pub fn serves_static_assets(&self) -> bool {
        matches!(self, Storage::Local { .. })
    }
}

pub fn default_value(name: &str) -> &'static str {
    ENVIRONMENT_DEFAULTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .unwrap_or("")
}

/// Any non-empty value is true, including `False` and `0`.
fn truthy(value: &str) -> bool {
    !value.is_empty()
}

fn parse<T>(name: &str, value: &str) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e: T::Err| SettingsError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}
