// Pixel Multiverse LED daemon - Shared Library
// Event model, configuration, animations and the scheduling loop

pub mod color;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod effect;
pub mod error;
pub mod event;
pub mod launcher_state;
pub mod pipe;
pub mod player;

pub use config::SystemsConfig;
pub use daemon::{DaemonPaths, Scheduler};
pub use dispatch::{Dispatcher, Outcome};
pub use effect::idle::{IdleGenerator, IdlePattern};
pub use error::DaemonError;
pub use event::{Event, EventKind};
pub use player::{Pacer, Player, SleepPacer};
