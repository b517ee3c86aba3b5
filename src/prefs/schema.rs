//! Preferences schema and sanitization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Language used when the stored tag is missing or malformed.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Color theme identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    /// Terminal default colors with cyan accents.
    #[default]
    Default,
    /// Bright accents for dark terminals.
    Dark,
    /// Muted accents for light terminals.
    Light,
    /// Maximum contrast, no dim colors.
    HighContrast,
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Theme::Default),
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            "high-contrast" | "high_contrast" | "highcontrast" => Ok(Theme::HighContrast),
            _ => Err(()),
        }
    }
}

/// Units used for data-plane statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsUnits {
    /// Binary byte multiples (KiB, MiB).
    #[default]
    Bytes,
    /// Decimal bit multiples (kbit, Mbit).
    Bits,
}

impl StatsUnits {
    /// The other unit.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            StatsUnits::Bytes => StatsUnits::Bits,
            StatsUnits::Bits => StatsUnits::Bytes,
        }
    }
}

impl FromStr for StatsUnits {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bytes" | "b" => Ok(StatsUnits::Bytes),
            "bits" | "bit" => Ok(StatsUnits::Bits),
            _ => Err(()),
        }
    }
}

/// Which mode the configurator should pick on its own at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoSelectMode {
    /// Always show the mode picker.
    #[default]
    None,
    /// Jump straight to the client configuration list.
    Client,
    /// Start in server mode.
    Server,
}

impl FromStr for AutoSelectMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(AutoSelectMode::None),
            "client" => Ok(AutoSelectMode::Client),
            "server" => Ok(AutoSelectMode::Server),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AutoSelectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoSelectMode::None => write!(f, "none"),
            AutoSelectMode::Client => write!(f, "client"),
            AutoSelectMode::Server => write!(f, "server"),
        }
    }
}

/// User preferences read by the configurator and the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preferences {
    /// Color theme.
    pub theme: Theme,
    /// UI language tag.
    pub language: String,
    /// Units for traffic counters.
    pub stats_units: StatsUnits,
    /// Show the data-plane statistics panel.
    pub show_dataplane_stats: bool,
    /// Show the data-plane log tail.
    pub show_dataplane_logs: bool,
    /// Show the keybinding footer.
    pub show_footer: bool,
    /// Mode chosen automatically at startup.
    pub auto_select_mode: AutoSelectMode,
    /// Connect to the remembered client configuration without asking.
    pub auto_connect: bool,
    /// Last client configuration picked in the configurator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_select_client_config: Option<PathBuf>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            language: DEFAULT_LANGUAGE.to_string(),
            stats_units: StatsUnits::Bytes,
            show_dataplane_stats: true,
            show_dataplane_logs: true,
            show_footer: true,
            auto_select_mode: AutoSelectMode::None,
            auto_connect: false,
            auto_select_client_config: None,
        }
    }
}

impl Preferences {
    /// Normalize fields that can be set to nonsense through `update`.
    pub fn sanitize(&mut self) {
        let language = self.language.trim();
        if is_language_tag(language) {
            self.language = language.to_string();
        } else {
            self.language = DEFAULT_LANGUAGE.to_string();
        }

        if self
            .auto_select_client_config
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            self.auto_select_client_config = None;
        }
    }

    /// Build preferences from the loosely-typed on-disk form.
    pub(crate) fn from_raw(raw: RawPreferences) -> Self {
        let defaults = Preferences::default();

        let mut prefs = Preferences {
            theme: parse_enum("theme", raw.theme, defaults.theme),
            language: raw
                .language
                .and_then(|v| match v {
                    toml::Value::String(s) if is_language_tag(s.trim()) => Some(s),
                    other => {
                        warn!("Ignoring invalid language preference: {}", other);
                        None
                    }
                })
                .unwrap_or(defaults.language),
            stats_units: parse_enum("stats_units", raw.stats_units, defaults.stats_units),
            show_dataplane_stats: parse_bool(
                "show_dataplane_stats",
                raw.show_dataplane_stats,
                defaults.show_dataplane_stats,
            ),
            show_dataplane_logs: parse_bool(
                "show_dataplane_logs",
                raw.show_dataplane_logs,
                defaults.show_dataplane_logs,
            ),
            show_footer: parse_bool("show_footer", raw.show_footer, defaults.show_footer),
            auto_select_mode: parse_enum(
                "auto_select_mode",
                raw.auto_select_mode,
                defaults.auto_select_mode,
            ),
            auto_connect: parse_bool("auto_connect", raw.auto_connect, defaults.auto_connect),
            auto_select_client_config: match raw.auto_select_client_config {
                Some(toml::Value::String(s)) => Some(PathBuf::from(s)),
                Some(other) => {
                    warn!("Ignoring invalid auto_select_client_config: {}", other);
                    None
                }
                None => None,
            },
        };

        prefs.sanitize();
        prefs
    }
}

/// On-disk form where every field may be missing or of the wrong type.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPreferences {
    theme: Option<toml::Value>,
    language: Option<toml::Value>,
    stats_units: Option<toml::Value>,
    show_dataplane_stats: Option<toml::Value>,
    show_dataplane_logs: Option<toml::Value>,
    show_footer: Option<toml::Value>,
    auto_select_mode: Option<toml::Value>,
    auto_connect: Option<toml::Value>,
    auto_select_client_config: Option<toml::Value>,
}

fn parse_enum<T: FromStr>(field: &str, value: Option<toml::Value>, default: T) -> T {
    match value {
        None => default,
        Some(toml::Value::String(s)) => s.parse().unwrap_or_else(|_| {
            warn!("Unknown {} '{}', using default", field, s);
            default
        }),
        Some(other) => {
            warn!("Invalid {} value {}, using default", field, other);
            default
        }
    }
}

fn parse_bool(field: &str, value: Option<toml::Value>, default: bool) -> bool {
    match value {
        None => default,
        Some(toml::Value::Boolean(b)) => b,
        Some(other) => {
            warn!("Invalid {} value {}, using default", field, other);
            default
        }
    }
}

/// Loose BCP-47 check: a 2-3 letter primary subtag and up to two
/// alphanumeric subtags (`en`, `pt-BR`, `zh-Hans-CN`).
fn is_language_tag(tag: &str) -> bool {
    let mut parts = tag.split(['-', '_']);
    let Some(primary) = parts.next() else {
        return false;
    };
    if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    let rest: Vec<&str> = parts.collect();
    rest.len() <= 2
        && rest
            .iter()
            .all(|p| (2..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}
