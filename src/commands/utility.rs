//! Utility commands: send, ports, check-config

use anyhow::Context;
use multiverse_transport::discovery::PORT_ENV;
use multiverse_transport::{Color, Discovery};
use pm_daemon::{Event, SystemsConfig};
use std::path::{Path, PathBuf};

fn describe(c: Color) -> String {
    format!("#{:02X}{:02X}{:02X} br={}", c.r, c.g, c.b, c.br)
}

/// Post one event line into the daemon's pipe.
pub fn send(fifo: &Path, name: &str, system: Option<&str>, rom: Option<&str>) -> anyhow::Result<()> {
    let event = Event {
        system: system.map(str::to_string),
        rom: rom.map(str::to_string),
        ..Event::named(name)
    };
    let line = serde_json::to_string(&event)?;
    pm_daemon::pipe::post_line(fifo, &line)
        .with_context(|| format!("write {} (is the daemon running?)", fifo.display()))?;
    println!("{line}");
    Ok(())
}

/// Print discovery candidates in the order they would be tried.
pub fn ports(port: Option<PathBuf>) {
    let discovery = Discovery::new();
    if let Some(p) = port {
        println!("Override (--port): {}", p.display());
    } else if let Some(p) = std::env::var_os(PORT_ENV) {
        println!("Override (${PORT_ENV}): {}", PathBuf::from(p).display());
    }

    let candidates = discovery.candidates();
    if candidates.is_empty() {
        println!("No candidate serial devices found.");
        return;
    }
    for (i, path) in candidates.iter().enumerate() {
        println!("{:>2}. {}", i + 1, path.display());
    }
}

/// Load systems.json strictly and print the resolved colors and layouts.
pub fn check_config(path: &Path) -> anyhow::Result<()> {
    let cfg = SystemsConfig::try_load(path).map_err(anyhow::Error::msg)?;
    println!("{}", path.display());
    println!("  menu color:  {}", describe(cfg.default_menu_color()));
    println!("  attract:     {}", cfg.default_attract_mode());

    for system in cfg.system_keys().into_iter().filter(|k| *k != "defaults") {
        let accent = cfg
            .accent(system)
            .map(describe)
            .unwrap_or_else(|| "-".to_string());
        let layout = if cfg.start_layout(system, "").is_some() {
            "yes"
        } else {
            "no"
        };
        println!("  {system:<12} accent {accent:<20} start layout {layout}");
    }
    Ok(())
}
