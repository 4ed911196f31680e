//! Device discovery for the LED bridge.
//!
//! Order of preference:
//! 1. `PM_PORT` (or an explicit override) if the path exists
//! 2. `/dev/serial/by-id` entries matching a known vendor/product hint,
//!    data interface before console interface
//! 3. Conventional CDC-ACM paths
//!
//! Every candidate from 2 and 3 is verified by opening it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::protocol::serial;

/// Environment variable that overrides discovery
pub const PORT_ENV: &str = "PM_PORT";

/// Directory of stable device symlinks
pub const BY_ID_DIR: &str = "/dev/serial/by-id";

/// Substrings (lowercase) identifying the bridge in by-id names
const NAME_HINTS: &[&str] = &["picade", "pimoroni", "max"];

/// USB interface suffix of the data channel; the console channel sorts after it
const DATA_INTERFACE: &str = "if02";

const FALLBACK_PORTS: &[&str] = &["/dev/ttyACM0", "/dev/ttyACM1"];

/// Serial device discovery
#[derive(Debug, Clone)]
pub struct Discovery {
    override_path: Option<PathBuf>,
    by_id_dir: PathBuf,
    fallbacks: Vec<PathBuf>,
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new()
    }
}

impl Discovery {
    /// Standard discovery, honoring `PM_PORT`.
    pub fn new() -> Self {
        Self {
            override_path: std::env::var_os(PORT_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            by_id_dir: PathBuf::from(BY_ID_DIR),
            fallbacks: FALLBACK_PORTS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Replace the override path (e.g. from a CLI flag).
    pub fn with_override(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.override_path = path;
        }
        self
    }

    /// Scan a different by-id directory.
    pub fn with_by_id_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.by_id_dir = dir.into();
        self
    }

    /// Replace the fallback list.
    pub fn with_fallbacks(mut self, fallbacks: Vec<PathBuf>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// by-id entries matching a name hint, in preference order.
    pub fn by_id_candidates(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.by_id_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot read {}: {e}", self.by_id_dir.display());
                return Vec::new();
            }
        };

        let mut found: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy().to_lowercase();
                NAME_HINTS.iter().any(|hint| name.contains(hint))
            })
            .map(|entry| entry.path())
            .collect();

        found.sort_by_key(|p| (!is_data_interface(p), p.clone()));
        found
    }

    /// All candidates that would be probed, in order (override excluded).
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut all = self.by_id_candidates();
        all.extend(self.fallbacks.iter().filter(|p| p.exists()).cloned());
        all
    }

    /// Find the bridge, verifying candidates with `probe`.
    pub fn find_with<F>(&self, mut probe: F) -> Result<PathBuf, TransportError>
    where
        F: FnMut(&Path) -> bool,
    {
        if let Some(ref path) = self.override_path {
            if path.exists() {
                info!("Using {} from override", path.display());
                return Ok(path.clone());
            }
            warn!("Override {} does not exist, scanning", path.display());
        }

        for candidate in self.candidates() {
            if probe(&candidate) {
                info!("Found LED bridge at {}", candidate.display());
                return Ok(candidate);
            }
            debug!("Candidate {} did not open", candidate.display());
        }

        Err(TransportError::DeviceNotFound(format!(
            "no openable device under {} or {:?}",
            self.by_id_dir.display(),
            self.fallbacks
        )))
    }

    /// Find the bridge, verifying candidates by opening them.
    pub fn find(&self) -> Result<PathBuf, TransportError> {
        self.find_with(probe_serial)
    }
}

fn is_data_interface(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().contains(DATA_INTERFACE))
        .unwrap_or(false)
}

/// Open and immediately close a serial device.
pub fn probe_serial(path: &Path) -> bool {
    serialport::new(path.to_string_lossy(), serial::BAUD_RATE)
        .timeout(serial::PROBE_TIMEOUT)
        .open()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "multiverse-discovery-{tag}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn discovery_in(dir: &Path) -> Discovery {
        Discovery {
            override_path: None,
            by_id_dir: dir.to_path_buf(),
            fallbacks: Vec::new(),
        }
    }

    #[test]
    fn test_data_interface_preferred() {
        let dir = scratch_dir("prefer");
        for name in [
            "usb-Pimoroni_Picade_Max_E661-if00",
            "usb-Pimoroni_Picade_Max_E661-if02",
            "usb-Logitech_Receiver-if00",
        ] {
            File::create(dir.join(name)).unwrap();
        }

        let found = discovery_in(&dir).by_id_candidates();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "usb-Pimoroni_Picade_Max_E661-if02",
                "usb-Pimoroni_Picade_Max_E661-if00",
            ]
        );
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_probe_failure_falls_through() {
        let dir = scratch_dir("probe");
        File::create(dir.join("usb-Pimoroni_Picade_Max-if02")).unwrap();
        File::create(dir.join("usb-Pimoroni_Picade_Max-if00")).unwrap();

        let found = discovery_in(&dir)
            .find_with(|p| p.to_string_lossy().ends_with("if00"))
            .unwrap();
        assert!(found.to_string_lossy().ends_with("if00"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_nothing_found() {
        let dir = scratch_dir("empty");
        let err = discovery_in(&dir).find_with(|_| true).unwrap_err();
        assert!(matches!(err, TransportError::DeviceNotFound(_)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_existing_override_skips_probe() {
        let dir = scratch_dir("override");
        let dev = dir.join("ttyFAKE");
        File::create(&dev).unwrap();

        let found = discovery_in(&dir)
            .with_override(Some(dev.clone()))
            .find_with(|_| panic!("override must not be probed"))
            .unwrap();
        assert_eq!(found, dev);
        fs::remove_dir_all(&dir).ok();
    }
}
