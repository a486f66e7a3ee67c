//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::images::ImagePolicy;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PUBLIC_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_CONTENT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SITE_TITLE: &str = "Vetrina";
const DEFAULT_SITE_DESCRIPTION: &str =
    "Marketing pages assembled from headless CMS content blocks.";
const DEFAULT_FOOTER_COPY: &str = "Built with Vetrina.";
const DEFAULT_IMAGE_ALLOWED: &[&str] = &["http://127.0.0.1:1337/uploads"];

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina marketing site server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the Vetrina HTTP front-end.
    Serve(Box<ServeArgs>),
    /// Fetch the home page content once and write the rendered document.
    #[command(name = "render")]
    Render(RenderArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverride {
    /// Override the content backend base address.
    #[arg(long = "content-base-url", value_name = "URL")]
    pub content_base_url: Option<String>,

    /// Override the content backend bearer token.
    #[arg(long = "content-api-token", value_name = "TOKEN")]
    pub content_api_token: Option<String>,

    /// Override the content request timeout.
    #[arg(long = "content-timeout-seconds", value_name = "SECONDS")]
    pub content_timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverride,

    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub content: ContentOverride,

    /// Write the rendered document to this file instead of standard output.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub site: SiteSettings,
    pub images: ImagesSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub public_addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub base_url: Url,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
    pub footer_copy: String,
}

#[derive(Debug, Clone)]
pub struct ImagesSettings {
    pub policy: ImagePolicy,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Render(args)) => raw.apply_content_override(&args.content),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    site: RawSiteSettings,
    images: RawImagesSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.public_port {
            self.server.public_port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }

        self.apply_content_override(&overrides.content);
    }

    fn apply_content_override(&mut self, overrides: &ContentOverride) {
        if let Some(url) = overrides.content_base_url.as_ref() {
            self.content.base_url = Some(url.clone());
        }
        if let Some(token) = overrides.content_api_token.as_ref() {
            self.content.api_token = Some(token.clone());
        }
        if let Some(seconds) = overrides.content_timeout_seconds {
            self.content.timeout_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            site,
            images,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let content = build_content_settings(content)?;
        let site = build_site_settings(site);
        let images = build_images_settings(images)?;

        Ok(Self {
            server,
            logging,
            content,
            site,
            images,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let public_port = server.public_port.unwrap_or(DEFAULT_PUBLIC_PORT);
    if public_port == 0 {
        return Err(LoadError::invalid(
            "server.public_port",
            "port must be greater than zero",
        ));
    }

    let public_addr = parse_socket_addr(&host, public_port)
        .map_err(|reason| LoadError::invalid("server.public_addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        public_addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let raw_url = content
        .base_url
        .and_then(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .ok_or_else(|| {
            LoadError::invalid("content.base_url", "content backend address must be set")
        })?;

    let mut base_url = Url::parse(&raw_url)
        .map_err(|err| LoadError::invalid("content.base_url", format!("failed to parse: {err}")))?;

    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "content.base_url",
            "address must use http or https",
        ));
    }

    // Normalize so relative document paths join under the configured prefix.
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }

    let api_token = content.api_token.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let timeout_secs = content
        .timeout_seconds
        .unwrap_or(DEFAULT_CONTENT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "content.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ContentSettings {
        base_url,
        api_token,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_site_settings(site: RawSiteSettings) -> SiteSettings {
    SiteSettings {
        title: site.title.unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string()),
        description: site
            .description
            .unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_string()),
        footer_copy: site
            .footer_copy
            .unwrap_or_else(|| DEFAULT_FOOTER_COPY.to_string()),
    }
}

fn build_images_settings(images: RawImagesSettings) -> Result<ImagesSettings, LoadError> {
    let entries = images.allowed.unwrap_or_else(|| {
        DEFAULT_IMAGE_ALLOWED
            .iter()
            .map(|entry| (*entry).to_string())
            .collect()
    });

    let policy = ImagePolicy::from_patterns(&entries)
        .map_err(|err| LoadError::invalid("images.allowed", err.to_string()))?;

    Ok(ImagesSettings { policy })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    public_port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    base_url: Option<String>,
    api_token: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    description: Option<String>,
    footer_copy: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawImagesSettings {
    allowed: Option<Vec<String>>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_backend() -> RawSettings {
        let mut raw = RawSettings::default();
        raw.content.base_url = Some("http://127.0.0.1:1337".to_string());
        raw
    }

    #[test]
    fn cli_overrides_take_highest_precedence() {
        let mut raw = raw_with_backend();
        raw.server.public_port = Some(4000);
        raw.logging.level = Some("info".to_string());

        let overrides = ServeOverrides {
            public_port: Some(4321),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        raw.apply_serve_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert_eq!(settings.server.public_addr.port(), 4321);
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    }

    #[test]
    fn content_base_url_is_required() {
        let raw = RawSettings::default();
        let result = Settings::from_raw(raw);
        assert!(matches!(
            result,
            Err(LoadError::Invalid {
                key: "content.base_url",
                ..
            })
        ));
    }

    #[test]
    fn content_base_url_is_normalized_with_trailing_slash() {
        let mut raw = RawSettings::default();
        raw.content.base_url = Some("https://cms.example.com/strapi".to_string());

        let settings = Settings::from_raw(raw).expect("valid settings");
        assert_eq!(
            settings.content.base_url.as_str(),
            "https://cms.example.com/strapi/"
        );
    }

    #[test]
    fn content_base_url_rejects_non_http_schemes() {
        let mut raw = RawSettings::default();
        raw.content.base_url = Some("ftp://cms.example.com".to_string());

        assert!(matches!(
            Settings::from_raw(raw),
            Err(LoadError::Invalid {
                key: "content.base_url",
                ..
            })
        ));
    }

    #[test]
    fn blank_api_token_is_treated_as_absent() {
        let mut raw = raw_with_backend();
        raw.content.api_token = Some("   ".to_string());

        let settings = Settings::from_raw(raw).expect("valid settings");
        assert_eq!(settings.content.api_token, None);
    }

    #[test]
    fn malformed_image_pattern_is_a_load_error() {
        let mut raw = raw_with_backend();
        raw.images.allowed = Some(vec!["ftp://files.example.com".to_string()]);

        assert!(matches!(
            Settings::from_raw(raw),
            Err(LoadError::Invalid {
                key: "images.allowed",
                ..
            })
        ));
    }

    #[test]
    fn cli_json_logging_enforces_format() {
        let mut raw = raw_with_backend();
        let overrides = ServeOverrides {
            log_json: Some(true),
            ..Default::default()
        };

        raw.apply_serve_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert!(matches!(settings.logging.format, LogFormat::Json));
    }

    #[test]
    fn default_to_serve_command() {
        let args = CliArgs::parse_from(["vetrina"]);
        let command = args
            .command
            .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
        assert!(matches!(command, Command::Serve(_)));
    }

    #[test]
    fn parse_render_arguments() {
        let args = CliArgs::parse_from([
            "vetrina",
            "render",
            "--content-base-url",
            "http://127.0.0.1:1337",
            "--output",
            "/tmp/home.html",
        ]);

        match args.command.expect("render command") {
            Command::Render(render) => {
                assert_eq!(
                    render.content.content_base_url.as_deref(),
                    Some("http://127.0.0.1:1337")
                );
                assert_eq!(
                    render.output.as_deref(),
                    Some(std::path::Path::new("/tmp/home.html"))
                );
            }
            _ => panic!("wrong command parsed"),
        }
    }

    #[test]
    fn parse_serve_overrides() {
        let args = CliArgs::parse_from([
            "vetrina",
            "serve",
            "--server-host",
            "0.0.0.0",
            "--content-base-url",
            "http://content.internal:1337",
        ]);

        match args.command.expect("serve command") {
            Command::Serve(serve) => {
                assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
                assert_eq!(
                    serve.overrides.content.content_base_url.as_deref(),
                    Some("http://content.internal:1337")
                );
            }
            _ => panic!("wrong command parsed"),
        }
    }
}
