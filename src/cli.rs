use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ado-explorer")]
#[command(author, version, about = "Browse Azure DevOps projects, pipelines and releases", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.config/ado-explorer/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pre-fill the organization URL on the connect screen
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Log file (defaults to the user cache directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `ado_explorer=trace`
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(|| {
            dirs::cache_dir().map(|dir| dir.join("ado-explorer").join("ado-explorer.log"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ado-explorer"]);
        assert!(cli.config.is_none());
        assert!(cli.base_url.is_none());
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "ado-explorer",
            "--base-url",
            "https://dev.azure.com/org",
            "--log-file",
            "/tmp/x.log",
            "--log-level",
            "debug",
            "-c",
            "cfg.toml",
        ]);
        assert_eq!(cli.base_url.as_deref(), Some("https://dev.azure.com/org"));
        assert_eq!(cli.log_path(), Some(PathBuf::from("/tmp/x.log")));
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.config, Some(PathBuf::from("cfg.toml")));
    }
}
