//! Launcher events as read from the pipe, one JSON object per line.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// One decoded event line. Every field is optional; a line that does not
/// decode becomes the empty event, which dispatches to nothing.
///
/// Fields are coerced leniently: numbers may be floats (truncated) or numeric
/// strings, and scalar `system`/`rom` values are taken as text. A field that
/// cannot be coerced reads as absent without losing the rest of the line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(
        alias = "rompath",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub rom: Option<String>,
    #[serde(deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub b: Option<i64>,
    #[serde(deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub g: Option<i64>,
    #[serde(deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub r: Option<i64>,
    #[serde(deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub br: Option<i64>,
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(b)),
        _ => None,
    })
}

impl Event {
    /// Event with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            event: Some(name.into()),
            ..Self::default()
        }
    }

    /// Decode one line. Anything but a JSON object is logged and yields the
    /// empty event.
    pub fn parse_line(line: &str) -> Self {
        let decoded = match serde_json::from_str::<Value>(line) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).map_err(|e| e.to_string()),
            Ok(_) => Err("not a JSON object".to_string()),
            Err(e) => Err(e.to_string()),
        };
        match decoded {
            Ok(event) => event,
            Err(e) => {
                warn!("Ignoring malformed event line {line:?}: {e}");
                Self::default()
            }
        }
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from_name(self.event.as_deref().unwrap_or_default())
    }
}

/// Event names the dispatcher acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    ReloadConfig,
    Menu,
    GameStart,
    GameEnd,
    Shutdown,
    Reboot,
    SettingsChanged,
    AttractOn,
    AttractOff,
    Solid,
    Off,
    Unknown(String),
}

impl EventKind {
    /// Case-insensitive lookup; `controls-changed` shares the settings action.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "reload-config" => Self::ReloadConfig,
            "menu" => Self::Menu,
            "game-start" => Self::GameStart,
            "game-end" => Self::GameEnd,
            "shutdown" => Self::Shutdown,
            "reboot" => Self::Reboot,
            "settings-changed" | "controls-changed" => Self::SettingsChanged,
            "attract-on" => Self::AttractOn,
            "attract-off" => Self::AttractOff,
            "solid" => Self::Solid,
            "off" => Self::Off,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ReloadConfig => "reload-config",
            Self::Menu => "menu",
            Self::GameStart => "game-start",
            Self::GameEnd => "game-end",
            Self::Shutdown => "shutdown",
            Self::Reboot => "reboot",
            Self::SettingsChanged => "settings-changed",
            Self::AttractOn => "attract-on",
            Self::AttractOff => "attract-off",
            Self::Solid => "solid",
            Self::Off => "off",
            Self::Unknown(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
