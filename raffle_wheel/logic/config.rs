use crate::error::{RaffleError, RaffleError::*};
use crate::rotation::{Rotation, DEFAULT_EXTRA_SPINS, DEFAULT_POINTER_ANGLE};
use crate::Degrees;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LABEL_MAX_CHARS: usize = 18;

/// Keys under which a session is persisted
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageKeys {
    pub participants_text: String,
    pub participants_list: String,
    pub prizes_text: String,
    pub prizes_list: String,
    pub history: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            participants_text: "participantsText".into(),
            participants_list: "participantsList".into(),
            prizes_text: "prizesText".into(),
            prizes_list: "prizesList".into(),
            history: "winnersHistory".into(),
        }
    }
}

impl StorageKeys {
    fn all(&self) -> [&str; 5] {
        [
            &self.participants_text,
            &self.participants_list,
            &self.prizes_text,
            &self.prizes_list,
            &self.history,
        ]
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RaffleConfig {
    /// full turns added to every spin before it settles
    pub extra_spins: u32,
    /// angle of the pointer, 0° is "right" and angles grow clockwise
    pub pointer_angle: Degrees,
    pub keys: StorageKeys,
    /// longer labels are truncated on the wheel
    pub label_max_chars: usize,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            extra_spins: DEFAULT_EXTRA_SPINS,
            pointer_angle: DEFAULT_POINTER_ANGLE,
            keys: StorageKeys::default(),
            label_max_chars: DEFAULT_LABEL_MAX_CHARS,
        }
    }
}

impl RaffleConfig {
    /// Parse a JSON config, missing fields take their default value
    pub fn from_json(raw: &str) -> Result<Self, RaffleError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| {
            log::error!("Error when parsing the config: {e}");
            InvalidConfig
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RaffleError> {
        // check the pointer
        self.rotation()?;

        if self.label_max_chars == 0 {
            return Err(InvalidConfig);
        }

        // check the keys
        let keys = self.keys.all();
        for (i, key) in keys.iter().enumerate() {
            if key.is_empty() || keys[i + 1..].contains(key) {
                return Err(InvalidConfig);
            }
        }

        Ok(())
    }

    pub fn rotation(&self) -> Result<Rotation, RaffleError> {
        Rotation::new(self.pointer_angle, self.extra_spins)
    }
}
