// Library surface shared by the binary and the headless/integration tests.
// Terminal rendering stays in the binary.
pub mod app_dirs;
pub mod backup;
pub mod calibration;
pub mod clock;
pub mod completion;
pub mod config;
pub mod counting;
pub mod feedback;
pub mod history;
pub mod logging;
pub mod models;
pub mod recovery;
pub mod registry;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod store;
pub mod timer;
pub mod util;
