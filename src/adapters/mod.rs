//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements          | Connects to                  |
//! |--------------|---------------------|------------------------------|
//! | `background` | BackgroundPort      | Worker threads + inbox       |
//! | `log_sink`   | EventSink           | `log` facade                 |
//! | `shell`      | ShellPort           | sysfs-style nodes, `sh`      |
//! |              | FileProbe           | Filesystem                   |
//! | `sim`        | ActionPort          | Simulated radios             |
//! |              | StatePoller         |                              |
//! |              | Camera / WakeLock   | Simulated torch hardware     |
//! |              | RecorderPort        | Recording file on disk       |
//! | `store`      | SettingsStore       | In-memory key-value store    |
//! |              | ConfigPort          | postcard blob                |
//! | `time`       | (clock)             | `std::time::Instant`         |

pub mod background;
pub mod log_sink;
pub mod shell;
pub mod sim;
pub mod store;
pub mod time;
