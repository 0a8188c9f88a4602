use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;

use super::session::StoredSession;

/// Durable session persistence. The file-backed implementation plays the
/// role a browser's localStorage plays for a web client.
pub trait TokenStore: Send + Sync {
    /// Returns `None` when nothing is stored or the stored data is unreadable.
    fn load(&self) -> Option<StoredSession>;
    fn save(&self, session: &StoredSession) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// Stores the session as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<StoredSession> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    fn save(&self, session: &StoredSession) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create session dir {}", dir.display()))?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("write session file {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("remove session file {}", self.path.display()))
            }
        }
    }
}

/// Keeps the session only for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<StoredSession> {
        self.slot.lock().expect("lock poisoned").clone()
    }

    fn save(&self, session: &StoredSession) -> anyhow::Result<()> {
        *self.slot.lock().expect("lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.slot.lock().expect("lock poisoned") = None;
        Ok(())
    }
}
