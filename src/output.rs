//! # Output Configuration
//!
//! Controls how the CLI decorates its status lines. Colors and emoji are used
//! only when the terminal and the user allow it:
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ```rust,ignore
//! let output = OutputConfig::from_env_and_flag("auto");
//! println!("{} Device tree registered", emoji(&output, "📦", "[ADD]"));
//! ```

use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and the `--color` flag
    /// (`always`, `never`, anything else means auto-detect).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Styles `text` as a success line.
    pub fn success(&self, text: &str) -> String {
        self.styled(text, console::Style::new().green())
    }

    /// Styles `text` as a warning line.
    pub fn warning(&self, text: &str) -> String {
        self.styled(text, console::Style::new().yellow())
    }

    /// Styles `text` as an error line.
    pub fn failure(&self, text: &str) -> String {
        self.styled(text, console::Style::new().red().bold())
    }

    fn styled(&self, text: &str, style: console::Style) -> String {
        if self.use_color {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
