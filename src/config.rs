use anyhow::{Context, Result};
use clap::Parser;
use std::{env, str::FromStr};

pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str =
    "https://bootsnipp.com/bootstrap-builder/libs/builder/icons/image.svg";

/// Author, title and badge written into every upload's metadata.
///
/// Stand-ins until uploads carry an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDefaults {
    pub author: String,
    pub title: String,
    pub badge: String,
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            author: "Dummy User".into(),
            title: "Dummy title".into(),
            badge: "dummy badge".into(),
        }
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    pub container: String,
    pub display: DisplayDefaults,
    pub placeholder_image_url: String,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Record, upload and browse videos")]
pub struct Args {
    /// Host to bind to (overrides VIDEO_GALLERY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides VIDEO_GALLERY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where video payloads are stored (overrides VIDEO_GALLERY_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides VIDEO_GALLERY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Container videos are written to (overrides VIDEO_GALLERY_CONTAINER)
    #[arg(long)]
    pub container: Option<String>,

    /// Largest accepted upload in bytes (overrides VIDEO_GALLERY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Apply the database schema and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::resolve(args, |name: &str| env::var(name).ok())?;
        Ok((cfg, migrate))
    }

    /// Merge CLI args over values from `lookup` over built-in defaults.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.into());

        let env_port = parse_var(&lookup, "VIDEO_GALLERY_PORT", 8000)?;
        let env_max_upload =
            parse_var(&lookup, "VIDEO_GALLERY_MAX_UPLOAD_BYTES", 256 * 1024 * 1024)?;
        let defaults = DisplayDefaults::default();

        Ok(Self {
            host: args
                .host
                .unwrap_or_else(|| var("VIDEO_GALLERY_HOST", "0.0.0.0")),
            port: args.port.unwrap_or(env_port),
            storage_dir: args
                .storage_dir
                .unwrap_or_else(|| var("VIDEO_GALLERY_STORAGE_DIR", "./data/objects")),
            database_url: args.database_url.unwrap_or_else(|| {
                var(
                    "VIDEO_GALLERY_DATABASE_URL",
                    "sqlite://./data/meta/video_gallery.db",
                )
            }),
            container: args
                .container
                .unwrap_or_else(|| var("VIDEO_GALLERY_CONTAINER", "videos")),
            display: DisplayDefaults {
                author: var("VIDEO_GALLERY_AUTHOR", &defaults.author),
                title: var("VIDEO_GALLERY_TITLE", &defaults.title),
                badge: var("VIDEO_GALLERY_BADGE", &defaults.badge),
            },
            placeholder_image_url: var(
                "VIDEO_GALLERY_PLACEHOLDER_IMAGE_URL",
                DEFAULT_PLACEHOLDER_IMAGE_URL,
            ),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = AppConfig::resolve(Args::default(), env_of(&[])).unwrap();

        assert_eq!(cfg.addr(), "0.0.0.0:8000");
        assert_eq!(cfg.container, "videos");
        assert_eq!(cfg.display, DisplayDefaults::default());
        assert_eq!(cfg.placeholder_image_url, DEFAULT_PLACEHOLDER_IMAGE_URL);
        assert_eq!(cfg.max_upload_bytes, 256 * 1024 * 1024);
    }

    #[test]
    fn cli_overrides_environment() {
        let args = Args::try_parse_from(["video-gallery", "--port", "9100", "--container", "clips"])
            .unwrap();
        let env = env_of(&[
            ("VIDEO_GALLERY_PORT", "7000"),
            ("VIDEO_GALLERY_CONTAINER", "ignored"),
            ("VIDEO_GALLERY_HOST", "127.0.0.1"),
            ("VIDEO_GALLERY_AUTHOR", "Grace"),
        ]);

        let cfg = AppConfig::resolve(args, env).unwrap();

        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.container, "clips");
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.display.author, "Grace");
        assert_eq!(cfg.display.title, "Dummy title");
    }

    #[test]
    fn bad_port_is_reported() {
        let err = AppConfig::resolve(Args::default(), env_of(&[("VIDEO_GALLERY_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("VIDEO_GALLERY_PORT"));
    }
}
