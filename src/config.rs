use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// UI preferences read from `config.toml`.
///
/// The connection (base URL and API key) is deliberately absent: it is
/// entered on the connect screen and lives only for the session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    pub settings: Settings,
    pub keybindings: Keybindings,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API request timeout in seconds, 0 for none
    pub api_timeout: u64,
    /// Seconds before a status message disappears
    pub status_timeout: u64,
    /// Number of rows to jump with Ctrl+D/U
    pub page_jump: usize,
    /// Fuzzy instead of substring matching for free-text search
    pub fuzzy_search: bool,
}

/// Customizable keybindings (single character keys)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    // Navigation
    pub down: char,
    pub up: char,
    pub top: char,
    pub bottom: char,
    // Filters
    pub search: char,
    pub production_filter: char,
    // Actions
    pub refresh: char,
    pub open: char,
    pub copy_id: char,
    pub disconnect: char,
    pub help: char,
    pub quit: char,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub border: String,
    pub border_active: String,
    pub text: String,
    pub text_muted: String,
    pub highlight: String,
    pub success: String,
    pub failure: String,
    pub warning: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_timeout: 30,
            status_timeout: 5,
            page_jump: 10,
            fuzzy_search: false,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.api_timeout > 0).then(|| Duration::from_secs(self.api_timeout))
    }
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            // Navigation (vim-style)
            down: 'j',
            up: 'k',
            top: 'g',
            bottom: 'G',
            // Filters
            search: 'f',
            production_filter: 'p',
            // Actions
            refresh: 'r',
            open: 'o',
            copy_id: 'y',
            disconnect: 'D',
            help: '?',
            quit: 'q',
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            // One Dark color scheme
            border: "#5c6370".to_string(),        // Gray
            border_active: "#61afef".to_string(), // Blue
            text: "#abb2bf".to_string(),          // Light gray
            text_muted: "#5c6370".to_string(),    // Muted gray
            highlight: "#61afef".to_string(),     // Blue
            success: "#98c379".to_string(),       // Green
            failure: "#e06c75".to_string(),       // Red
            warning: "#e5c07b".to_string(),       // Yellow
        }
    }
}

impl Config {
    /// Parse a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Load from an explicit path, or the first standard location that
    /// exists. Falls back to defaults when no file is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        for path in Self::candidate_paths() {
            if path.is_file() {
                log::info!("loading config from {}", path.display());
                return Self::load_from(&path);
            }
        }

        Ok(Config::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        // 1. XDG path (~/.config/ado-explorer/config.toml), common on macOS too
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".config").join("ado-explorer").join("config.toml"));
        }
        // 2. Platform config dir (~/Library/Application Support/ on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("ado-explorer").join("config.toml"));
        }
        // 3. ~/.ado-explorer.toml
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".ado-explorer.toml"));
        }
        paths
    }
}

impl Theme {
    pub fn parse_color(&self, hex: &str) -> ratatui::style::Color {
        // Parse hex color string (e.g., "#61afef")
        let channel = |range: std::ops::Range<usize>| hex.get(range).and_then(|h| u8::from_str_radix(h, 16).ok());
        if hex.starts_with('#') && hex.len() == 7 {
            if let (Some(r), Some(g), Some(b)) = (channel(1..3), channel(3..5), channel(5..7)) {
                return ratatui::style::Color::Rgb(r, g, b);
            }
        }
        // Fallback to white if parsing fails
        ratatui::style::Color::White
    }

    /// Color for a pipeline or environment status
    pub fn tone_color(&self, tone: crate::explorer::view::Tone) -> ratatui::style::Color {
        use crate::explorer::view::Tone;
        match tone {
            Tone::Success => self.parse_color(&self.success),
            Tone::Failure => self.parse_color(&self.failure),
            Tone::Neutral => self.parse_color(&self.text_muted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.settings.api_timeout, 30);
        assert!(!config.settings.fuzzy_search);
        assert_eq!(config.keybindings.production_filter, 'p');
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r##"
[settings]
api_timeout = 10
fuzzy_search = true

[theme]
success = "#00ff00"

[keybindings]
search = "/"
"##
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.settings.api_timeout, 10);
        assert!(config.settings.fuzzy_search);
        assert_eq!(config.settings.status_timeout, 5);
        assert_eq!(config.keybindings.search, '/');
        assert_eq!(config.keybindings.quit, 'q');
        assert_eq!(config.theme.parse_color(&config.theme.success), Color::Rgb(0, 255, 0));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[settings]\napi_timeout = \"soon\"").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_parse_color_fallback() {
        let theme = Theme::default();
        assert_eq!(theme.parse_color("#61afef"), Color::Rgb(0x61, 0xaf, 0xef));
        assert_eq!(theme.parse_color("blue"), Color::White);
    }

    #[test]
    fn test_parse_color_non_ascii_does_not_panic() {
        let theme = Theme::default();
        // 7 bytes, but 'é' straddles the channel boundaries
        assert_eq!("#aébcd".len(), 7);
        assert_eq!(theme.parse_color("#aébcd"), Color::White);
    }

    #[test]
    fn test_zero_api_timeout_means_no_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[settings]\napi_timeout = 0").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.settings.request_timeout(), None);
        assert_eq!(Settings::default().request_timeout(), Some(Duration::from_secs(30)));
    }
}
