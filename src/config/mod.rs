pub mod toml_config;

pub use toml_config::WatchConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "thesis-watch")]
#[command(about = "Emails a summary of the thesis topics on a web page, highlighting new ones")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "thesis-watch.toml")]
    pub config: String,

    /// Override the monitored page URL
    #[arg(long)]
    pub url: Option<String>,

    /// Override the snapshot file path
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Show what would be sent without sending mail or updating the snapshot
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliArgs {
    /// Applies command-line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut WatchConfig) {
        if let Some(url) = &self.url {
            tracing::info!("🔧 Source URL overridden to: {}", url);
            config.source.url = url.clone();
        }

        if let Some(snapshot) = &self.snapshot {
            tracing::info!("🔧 Snapshot path overridden to: {}", snapshot);
            config.snapshot.path = snapshot.clone();
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let args = CliArgs::parse_from([
            "thesis-watch",
            "--config",
            "custom.toml",
            "--url",
            "https://example.org/topics",
            "--snapshot",
            "/tmp/titles.txt",
            "--dry-run",
        ]);
        assert_eq!(args.config, "custom.toml");
        assert!(args.dry_run);
        assert!(!args.json);

        let mut config = WatchConfig::from_toml_str(
            r#"
[source]
url = "https://www.example.com/original"

[snapshot]
path = "last_thesis_titles.txt"

[smtp]
host = "smtp.example.com"
port = 587
from = "a@example.com"
password = "pw"
to = "b@example.com"
"#,
        )
        .unwrap();

        args.apply_overrides(&mut config);
        assert_eq!(config.source.url, "https://example.org/topics");
        assert_eq!(config.snapshot.path, "/tmp/titles.txt");
    }

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::parse_from(["thesis-watch"]);
        assert_eq!(args.config, "thesis-watch.toml");
        assert!(args.url.is_none());
        assert!(!args.verbose);
    }
}
