//! Runtime settings.
//!
//! Precedence, lowest first: built-in defaults, a TOML file, `INVOICE_*`
//! environment variables, then whatever the command line sets on top.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::layout::{default_footer_lines, LayoutSettings};
use crate::metrics::unsupported_char;
use crate::money::{DEFAULT_CURRENCY_LABEL, DEFAULT_TAX_AMOUNT};
use crate::sink::{validate_file_name, DEFAULT_FILE_NAME};

/// Order list endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "https://order-management-api-r0e0.onrender.com/orders";

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "invoice.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("environment variable {name}={value:?} is not valid: {reason}")]
    Env {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// All recognized options.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// URL answering `GET` with a JSON array of orders.
    pub endpoint: String,
    /// Flat amount added to every invoice.
    pub tax_amount: f64,
    pub currency_label: String,
    pub company_name: String,
    /// File name the invoice is saved under.
    pub output_file: String,
    pub request_timeout_secs: u64,
    pub footer_lines: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let layout = LayoutSettings::default();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            tax_amount: DEFAULT_TAX_AMOUNT,
            currency_label: DEFAULT_CURRENCY_LABEL.to_owned(),
            company_name: layout.company_name,
            output_file: DEFAULT_FILE_NAME.to_owned(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            footer_lines: default_footer_lines(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from `invoice.toml` in the working
    /// directory when present, then applies environment overrides.
    ///
    /// An explicit `path` must exist; the implicit file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    Self::from_file(implicit)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env(|name| env::var(name).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses a TOML document; absent keys keep their defaults.
    pub fn from_toml(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loading settings from {}", path.display());
        Self::from_toml(&raw, path)
    }

    /// Applies `INVOICE_*` overrides obtained through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("INVOICE_ENDPOINT") {
            self.endpoint = value;
        }
        if let Some(value) = lookup("INVOICE_TAX_AMOUNT") {
            self.tax_amount = value.trim().parse().map_err(|_| ConfigError::Env {
                name: "INVOICE_TAX_AMOUNT",
                value: value.clone(),
                reason: "expected a decimal number".to_owned(),
            })?;
        }
        if let Some(value) = lookup("INVOICE_CURRENCY") {
            self.currency_label = value;
        }
        if let Some(value) = lookup("INVOICE_COMPANY") {
            self.company_name = value;
        }
        if let Some(value) = lookup("INVOICE_OUTPUT_FILE") {
            self.output_file = value;
        }
        if let Some(value) = lookup("INVOICE_TIMEOUT_SECS") {
            self.request_timeout_secs = value.trim().parse().map_err(|_| ConfigError::Env {
                name: "INVOICE_TIMEOUT_SECS",
                value: value.clone(),
                reason: "expected a whole number of seconds".to_owned(),
            })?;
        }
        Ok(())
    }

    /// Checks every option; call again after command line overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;
        if !self.tax_amount.is_finite() || self.tax_amount < 0.0 {
            return Err(ConfigError::Invalid {
                key: "tax_amount",
                reason: format!("{} is not a finite, non-negative amount", self.tax_amount),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be greater than zero".to_owned(),
            });
        }
        let printed = [
            ("currency_label", &self.currency_label),
            ("company_name", &self.company_name),
        ]
        .into_iter()
        .chain(self.footer_lines.iter().map(|line| ("footer_lines", line)));
        for (key, text) in printed {
            if let Some(character) = unsupported_char(text) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("{character:?} in {text:?} cannot be printed with Helvetica"),
                });
            }
        }
        validate_file_name(&self.output_file).map_err(|err| ConfigError::Invalid {
            key: "output_file",
            reason: err.to_string(),
        })?;
        Ok(())
    }

    /// The endpoint as a parsed http(s) URL.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.endpoint).map_err(|err| ConfigError::Invalid {
            key: "endpoint",
            reason: format!("{:?}: {err}", self.endpoint),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Invalid {
                key: "endpoint",
                reason: format!("unsupported scheme `{other}`"),
            }),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Settings handed to the layout engine.
    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            company_name: self.company_name.clone(),
            currency_label: self.currency_label.clone(),
            tax_amount: self.tax_amount,
            footer_lines: self.footer_lines.clone(),
        }
    }
}
