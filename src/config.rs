use dotenv::dotenv;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::ConfigError;
use crate::services::form_controller::{DEFAULT_SUBMISSION_TIMEOUT, DEFAULT_SUCCESS_DISPLAY};
use crate::services::registry::{DEFAULT_IDLE_TTL, DEFAULT_MAX_OPEN_FORMS};
use crate::services::submission::DEFAULT_SUBMISSION_DELAY;

/// Runtime settings, read from the environment (and `.env` if present)
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub is_production: bool,
    pub submission_delay: Duration,
    pub success_display: Duration,
    pub request_timeout: Duration,
    pub submission_timeout: Duration,
    pub form_idle_ttl: Duration,
    pub max_open_forms: usize,
    /// When set, reservations are POSTed here instead of simulated
    pub reservation_endpoint: Option<String>,
    pub reservation_secret: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            is_production: false,
            submission_delay: DEFAULT_SUBMISSION_DELAY,
            success_display: DEFAULT_SUCCESS_DISPLAY,
            request_timeout: Duration::from_secs(10),
            submission_timeout: DEFAULT_SUBMISSION_TIMEOUT,
            form_idle_ttl: DEFAULT_IDLE_TTL,
            max_open_forms: DEFAULT_MAX_OPEN_FORMS,
            reservation_endpoint: None,
            reservation_secret: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from any variable source; unset variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            settings.bind_addr = parse_var("BIND_ADDR", &addr)?;
        }

        settings.is_production = lookup("ENVIRONMENT")
            .map(|val| val.to_lowercase() == "production")
            .unwrap_or(false);

        if let Some(ms) = lookup("SUBMISSION_DELAY_MS") {
            settings.submission_delay = Duration::from_millis(parse_var("SUBMISSION_DELAY_MS", &ms)?);
        }

        if let Some(secs) = lookup("SUCCESS_DISPLAY_SECS") {
            settings.success_display = Duration::from_secs(parse_var("SUCCESS_DISPLAY_SECS", &secs)?);
        }

        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS") {
            settings.request_timeout = Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", &secs)?);
        }

        if let Some(secs) = lookup("SUBMISSION_TIMEOUT_SECS") {
            settings.submission_timeout = Duration::from_secs(parse_var("SUBMISSION_TIMEOUT_SECS", &secs)?);
        }

        if let Some(secs) = lookup("FORM_IDLE_TTL_SECS") {
            settings.form_idle_ttl = Duration::from_secs(parse_var("FORM_IDLE_TTL_SECS", &secs)?);
        }

        if let Some(max) = lookup("MAX_OPEN_FORMS") {
            settings.max_open_forms = parse_var("MAX_OPEN_FORMS", &max)?;
        }

        settings.reservation_endpoint = non_empty(lookup("RESERVATION_API_ENDPOINT"));
        settings.reservation_secret = non_empty(lookup("RESERVATION_API_SECRET"));

        Ok(settings)
    }

    pub fn log_summary(&self) {
        if self.is_production {
            info!("Running in PRODUCTION mode");
        } else {
            info!("Running in DEVELOPMENT mode");
        }

        match &self.reservation_endpoint {
            Some(endpoint) => info!(
                "Reservations will be sent to {} (signing {})",
                endpoint,
                if self.reservation_secret.is_some() { "enabled" } else { "disabled" }
            ),
            None => info!(
                "No reservation endpoint configured - simulating submissions with {:?} delay",
                self.submission_delay
            ),
        }

        info!("Success message shown for {:?}", self.success_display);
        info!(
            "Backend calls time out after {:?}; idle forms closed after {:?} (max {} open)",
            self.submission_timeout, self.form_idle_ttl, self.max_open_forms
        );
    }
}
