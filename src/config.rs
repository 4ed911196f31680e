//! `systems.json` snapshot and color/layout resolution.
//!
//! The file is keyed by lowercase system id; each entry may carry a
//! `start_layout`, `rom_overrides` and an `accent`. A top-level `defaults`
//! entry holds `menu_color` and the `attract` mode name.
//!
//! ```json
//! {
//!   "snes": {
//!     "accent": { "r": 120, "g": 0, "b": 200, "br": 40 },
//!     "start_layout": ["#FF0000", "#00FF00:32", { "r": 0, "g": 0, "b": 255, "br": 40 }],
//!     "rom_overrides": { "Foo": { "start_layout": ["#FFFFFF:90"] } }
//!   },
//!   "defaults": { "menu_color": "#402000:28", "attract": "rainbow" }
//! }
//! ```
//!
//! Nothing here fails: a missing or malformed value resolves to its default.

use std::path::{Path, PathBuf};

use multiverse_transport::{Color, Frame};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Where the configuration lives on a Recalbox install.
pub const DEFAULT_CONFIG_PATH: &str = "/recalbox/share/pixel-multiverse/systems.json";

/// Menu color when `defaults.menu_color` is absent or unusable.
pub const DEFAULT_MENU_COLOR: Color = Color::new(0, 32, 64, 28);

/// Attract mode when `defaults.attract` is absent.
pub const DEFAULT_ATTRACT_MODE: &str = "breath";

/// Brightness for hex layout entries without a `:brightness` suffix.
const LAYOUT_HEX_BRIGHTNESS: i64 = 64;

/// Brightness for object layout entries without `br`: dark.
const LAYOUT_FIELDS_BRIGHTNESS: i64 = 0;

/// Brightness for accent/menu colors that do not give one.
const ACCENT_BRIGHTNESS: i64 = 24;

const DEFAULTS_KEY: &str = "defaults";

/// A color as written in the configuration: an object or a hex string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ColorSpec {
    Fields(ColorFields),
    Hex(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ColorFields {
    r: i64,
    g: i64,
    b: i64,
    br: Option<i64>,
}

impl ColorSpec {
    fn from_value(value: &Value) -> Option<Self> {
        ColorSpec::deserialize(value).ok()
    }

    /// Resolve to a tuple, brightness capped at `BRIGHT_LIMIT`.
    fn to_color(&self, default_br: i64) -> Color {
        match self {
            ColorSpec::Fields(f) => Color::limited(f.b, f.g, f.r, f.br.unwrap_or(default_br)),
            ColorSpec::Hex(s) => parse_hex_color(s, default_br),
        }
    }
}

/// Parse `"#RRGGBB[:brightness]"`.
///
/// A missing or non-numeric brightness uses `default_br`; anything that is not
/// a well-formed hex triplet yields [`Color::OFF`].
pub fn parse_hex_color(spec: &str, default_br: i64) -> Color {
    let spec = spec.trim();
    let (hex, br) = match spec.split_once(':') {
        Some((hex, br)) => (hex.trim(), br.trim().parse().unwrap_or(default_br)),
        None => (spec, default_br),
    };

    let Some(digits) = hex.strip_prefix('#') else {
        return Color::OFF;
    };
    if digits.len() != 6 || !digits.is_ascii() {
        return Color::OFF;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::limited(b as i64, g as i64, r as i64, br),
        _ => Color::OFF,
    }
}

/// Convert a layout array into a frame: truncated or zero-padded to
/// `NUM_LEDS`, unusable entries dark.
fn layout_frame(items: &[Value]) -> Frame {
    let colors: Vec<Color> = items
        .iter()
        .map(|item| {
            ColorSpec::from_value(item)
                .map(|spec| match spec {
                    ColorSpec::Fields(_) => spec.to_color(LAYOUT_FIELDS_BRIGHTNESS),
                    ColorSpec::Hex(_) => spec.to_color(LAYOUT_HEX_BRIGHTNESS),
                })
                .unwrap_or(Color::OFF)
        })
        .collect();
    Frame::from_slice(&colors)
}

/// Read-only configuration snapshot.
///
/// Replaced wholesale on reload; resolvers only ever read it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemsConfig {
    root: Map<String, Value>,
}

impl SystemsConfig {
    /// Load from disk. Errors are logged and give an empty snapshot.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(cfg) => {
                info!("Loaded {}: {}", path.display(), cfg.system_keys().join(","));
                cfg
            }
            Err(e) => {
                warn!("Config not loaded from {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Load from disk, reporting why it failed.
    pub fn try_load(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
        Self::from_json(&content)
    }

    /// Parse from a JSON string. The document must be an object.
    pub fn from_json(content: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(root)) => Ok(Self { root }),
            Ok(_) => Err("top level is not an object".to_string()),
            Err(e) => Err(format!("parse JSON: {e}")),
        }
    }

    /// All top-level keys, sorted.
    pub fn system_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.root.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn system(&self, system_key: &str) -> Option<&Map<String, Value>> {
        self.root.get(system_key)?.as_object()
    }

    fn defaults(&self) -> Option<&Map<String, Value>> {
        self.root.get(DEFAULTS_KEY)?.as_object()
    }

    /// Static layout for a game start.
    ///
    /// `rom_overrides[rom_key].start_layout` wins over the system's own
    /// `start_layout`. A layout that is not an array counts as absent.
    pub fn start_layout(&self, system_key: &str, rom_key: &str) -> Option<Frame> {
        let system = self.system(system_key)?;

        let rom_layout = system
            .get("rom_overrides")
            .and_then(Value::as_object)
            .and_then(|overrides| overrides.get(rom_key))
            .and_then(|rom| rom.get("start_layout"))
            .and_then(Value::as_array);

        rom_layout
            .or_else(|| system.get("start_layout").and_then(Value::as_array))
            .map(|items| layout_frame(items))
    }

    /// The system's accent color, if it declares one.
    pub fn accent(&self, system_key: &str) -> Option<Color> {
        let value = self.system(system_key)?.get("accent")?;
        ColorSpec::from_value(value).map(|spec| spec.to_color(ACCENT_BRIGHTNESS))
    }

    /// `defaults.menu_color`, or [`DEFAULT_MENU_COLOR`].
    pub fn default_menu_color(&self) -> Color {
        self.defaults()
            .and_then(|d| d.get("menu_color"))
            .and_then(ColorSpec::from_value)
            .map(|spec| spec.to_color(ACCENT_BRIGHTNESS))
            .unwrap_or(DEFAULT_MENU_COLOR)
    }

    /// `defaults.attract`, lowercased, or [`DEFAULT_ATTRACT_MODE`].
    pub fn default_attract_mode(&self) -> String {
        self.defaults()
            .and_then(|d| d.get("attract"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ATTRACT_MODE)
            .to_ascii_lowercase()
    }

    /// Accent for `system_key`, falling back to the default menu color.
    pub fn menu_color_for(&self, system_key: &str) -> Color {
        self.accent(system_key)
            .unwrap_or_else(|| self.default_menu_color())
    }
}

/// Default config path, overridable through `PM_CONFIG`.
pub fn default_config_path() -> PathBuf {
    std::env::var_os("PM_CONFIG")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
