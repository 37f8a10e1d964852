use chrono_tz::Tz;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Placeholder accepted in place of any positional value to keep its default.
pub const NO_ARGUMENT: &str = "!";

pub const DEFAULT_ADDRESS: &str = "localhost";
pub const DEFAULT_PORT: i32 = 8000;
pub const DEFAULT_HOME_PAGE: &str = "index.html";
pub const DEFAULT_NOT_FOUND_PAGE: &str = "not_found.html";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("the specified address '{0}' is neither 'localhost' nor a valid IP address")]
    InvalidAddress(String),
    #[error("the specified port {0} is not a valid port")]
    InvalidPort(i64),
    #[error("the specified port '{0}' is not a number")]
    MalformedPort(String),
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None, allow_negative_numbers = true)]
pub struct Cli {
    /// Адрес сервера: localhost или IP-адрес ("!": по умолчанию)
    pub address: Option<String>,

    /// Порт сервера ("!": по умолчанию 8000)
    pub port: Option<String>,

    /// Файл домашней страницы ("!": index.html)
    pub home_page: Option<String>,

    /// Файл для ненайденных путей ("!": not_found.html)
    pub not_found_page: Option<String>,

    /// Рабочая директория с документами ("!": текущая директория)
    pub working_directory: Option<String>,

    /// Файл журнала
    #[arg(long, default_value = "server.log")]
    pub log_file: PathBuf,

    /// Не дублировать журнал в файл
    #[arg(long)]
    pub no_log_file: bool,

    /// Часовой пояс для меток времени журнала
    #[arg(long, default_value = "UTC", value_parser = parse_timezone)]
    pub timezone: Tz,

    /// Таймаут pselect в миллисекундах
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,
}

fn parse_timezone(value: &str) -> Result<Tz, String> {
    value
        .parse::<Tz>()
        .map_err(|_| format!("unknown timezone '{}'", value))
}

fn positional(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| *v != NO_ARGUMENT)
}

impl Cli {
    pub fn log_file(&self) -> Option<PathBuf> {
        (!self.no_log_file).then(|| self.log_file.clone())
    }

    /// Builds the server settings, filling every omitted or `!` value with its default.
    pub fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        let defaults = ServerConfig::default();

        let port = match positional(&self.port) {
            Some(raw) => raw
                .parse::<i32>()
                .map_err(|_| ConfigError::MalformedPort(raw.to_string()))?,
            None => defaults.port,
        };

        Ok(ServerConfig {
            address: positional(&self.address)
                .map(str::to_string)
                .unwrap_or(defaults.address),
            port,
            home_page: positional(&self.home_page)
                .map(str::to_string)
                .unwrap_or(defaults.home_page),
            not_found_page: positional(&self.not_found_page)
                .map(str::to_string)
                .unwrap_or(defaults.not_found_page),
            working_directory: positional(&self.working_directory)
                .map(PathBuf::from)
                .unwrap_or(defaults.working_directory),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub address: String,
    pub port: i32,
    pub home_page: String,
    pub not_found_page: String,
    pub working_directory: PathBuf,
    pub poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            home_page: DEFAULT_HOME_PAGE.to_string(),
            not_found_page: DEFAULT_NOT_FOUND_PAGE.to_string(),
            working_directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl ServerConfig {
    /// Checks the address and port, returning the port narrowed to what a socket accepts.
    pub fn validate(&self) -> Result<u16, ConfigError> {
        if !is_loopback_name(&self.address) && self.address.parse::<IpAddr>().is_err() {
            return Err(ConfigError::InvalidAddress(self.address.clone()));
        }

        u16::try_from(self.port).map_err(|_| ConfigError::InvalidPort(self.port as i64))
    }
}

pub fn is_loopback_name(address: &str) -> bool {
    address == "localhost"
}

pub fn prefix(address: &str, port: u16) -> String {
    format!("http://{}:{}/", address, port)
}
