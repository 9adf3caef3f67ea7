pub mod callback;
pub mod session;
pub mod store;
pub mod token_store;
pub mod tokens_file;

use anyhow::Result;
use std::sync::Arc;

use crate::config::{Config, StorageKind};
use store::SessionStore;
use token_store::KeyringStore;
use tokens_file::FileStore;

pub use callback::{CallbackListener, CallbackParams};
pub use session::{Session, begin_login, resolve_callback};

/// Opens the session store selected in the config.
pub fn open_store(cfg: &Config) -> Result<Arc<dyn SessionStore>> {
    Ok(match cfg.storage {
        StorageKind::File => Arc::new(FileStore::in_config_dir()?),
        StorageKind::Keyring => Arc::new(KeyringStore::new()),
    })
}
