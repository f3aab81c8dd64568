//! Keybinding persistence and conflict detection.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::action_map::{Action, InputBinding, InputMap};

/// File name of the user keybinding table inside the config directory.
pub const KEYBINDINGS_FILE: &str = "keybindings.ron";

/// Errors from reading or writing a keybinding file.
#[derive(Debug, thiserror::Error)]
pub enum KeybindingError {
    #[error("keybinding file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed keybinding file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize keybindings: {0}")]
    Serialize(#[from] ron::Error),
}

/// The same input bound to more than one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub binding: InputBinding,
    /// Sorted, so reports are stable.
    pub actions: Vec<Action>,
}

impl InputMap {
    /// Every binding that triggers more than one action.
    #[must_use]
    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        let mut seen: HashMap<InputBinding, Vec<Action>> = HashMap::new();
        for (action, bindings) in &self.bindings {
            for binding in bindings {
                seen.entry(*binding).or_default().push(*action);
            }
        }

        seen.into_iter()
            .filter(|(_, actions)| actions.len() > 1)
            .map(|(binding, mut actions)| {
                actions.sort();
                Conflict { binding, actions }
            })
            .collect()
    }

    /// Write the map as RON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), KeybindingError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Read a map from RON.
    pub fn try_load(path: &Path) -> Result<Self, KeybindingError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_ron(&contents)?)
    }

    /// Load the user's bindings, falling back to the defaults (and writing
    /// them out) if the file is missing, or to the defaults alone if it is
    /// malformed. Conflicts are logged but kept.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        let map = match Self::try_load(path) {
            Ok(map) => {
                info!("Loaded keybindings from {}", path.display());
                map
            }
            Err(KeybindingError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let map = Self::default();
                if let Err(e) = map.save(path) {
                    warn!("Could not write default keybindings to {}: {e}", path.display());
                }
                map
            }
            Err(e) => {
                warn!("{e} ({}); using defaults", path.display());
                Self::default()
            }
        };

        for conflict in map.detect_conflicts() {
            warn!(binding = ?conflict.binding, actions = ?conflict.actions, "Keybinding conflict");
        }
        map
    }
}
