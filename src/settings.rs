use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// Owner recorded on taxonomy records when nobody is signed in.
pub const LOCAL_OWNER_ID: &str = "local";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Day,
    Night,
}

impl Default for ThemeMode {
    fn default() -> Self {
        ThemeMode::Day
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSettings {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserSettings {
    pub theme: ThemeMode,
    pub account: Option<AccountSettings>,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> UserSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update_theme(&self, theme: ThemeMode) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.theme = theme;
        self.persist(&guard)
    }

    pub fn update_account(&self, account: Option<AccountSettings>) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.account = account;
        self.persist(&guard)
    }

    /// The identifier stamped onto records created by this user, falling back
    /// to the literal local owner when unauthenticated.
    pub fn owner_id(&self) -> String {
        self.data
            .read()
            .unwrap()
            .account
            .as_ref()
            .map(|account| account.id.clone())
            .unwrap_or_else(|| LOCAL_OWNER_ID.to_string())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_falls_back_to_local_when_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.owner_id(), LOCAL_OWNER_ID);

        store
            .update_account(Some(AccountSettings {
                id: "user-42".into(),
                display_name: "Sam".into(),
            }))
            .unwrap();
        assert_eq!(store.owner_id(), "user-42");
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        store.update_theme(ThemeMode::Night).unwrap();
        drop(store);

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.snapshot().theme, ThemeMode::Night);
    }
}
