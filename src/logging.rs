use anyhow::Result;
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::path::Path;

pub const LOG_FILE: &str = "gator_mail.log";

/// One-shot commands log to stderr, warnings and up unless `RUST_LOG` says
/// otherwise.
pub fn init_stderr() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}

/// The TUI owns the terminal, so its logs go to a file.
pub fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}
