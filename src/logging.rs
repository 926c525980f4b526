use std::fs::{self, OpenOptions};
use std::path::Path;

use env_logger::{Builder, Env, Target};

fn builder() -> Builder {
    // RUST_LOG still wins when set
    Builder::from_env(Env::default().default_filter_or("info"))
}

/// Append log lines to `path`. The terminal belongs to the TUI, so nothing
/// goes to stderr while it runs.
pub fn init_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    // a second init (tests) is ignored
    let _ = builder().target(Target::Pipe(Box::new(file))).try_init();
    Ok(())
}

/// Plain stderr logging for one-shot subcommands
pub fn init_stderr() {
    let _ = builder().target(Target::Stderr).try_init();
}
