//! EmulationStation state snapshot (`/tmp/es_state.inf`).
//!
//! A `key=value` text file the launcher rewrites as the user navigates.
//! Read on demand, never cached: it is only consulted when an event does
//! not carry its own system or ROM.

use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_STATE_PATH: &str = "/tmp/es_state.inf";

/// Parsed snapshot of the launcher state file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherState {
    values: HashMap<String, String>,
}

impl LauncherState {
    /// Read the file; a missing or unreadable file is an empty snapshot.
    pub fn read(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .map(|text| Self::parse(&text))
            .unwrap_or_default()
    }

    /// Parse `key=value` lines. Lines without `=` are skipped; the first `=`
    /// splits, so values may contain `=`.
    pub fn parse(text: &str) -> Self {
        let values = text
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// `SystemId`, else `System`.
    pub fn system_id(&self) -> Option<&str> {
        self.get("SystemId").or_else(|| self.get("System"))
    }

    pub fn rom_path(&self) -> Option<&str> {
        self.get("RomPath")
    }
}

/// ROM key used in `rom_overrides`: basename without extension.
pub fn rom_key(rom_path: &str) -> String {
    Path::new(rom_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
