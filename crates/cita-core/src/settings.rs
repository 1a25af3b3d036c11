// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed home-page settings persisted through an [`OptionStore`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CitaError;
use crate::traits::OptionStore;

/// Site home-page settings.
///
/// Every field is optional; an unset record reads back with all fields `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HomeSettings {
    pub title: Option<String>,
    pub description: Option<String>,
    pub layout: Option<i64>,
    pub color: Option<String>,
    pub show_featured: Option<bool>,
    pub sections: Option<Vec<serde_json::Value>>,
}

impl HomeSettings {
    /// Option key the record is stored under.
    pub const OPTION_KEY: &'static str = "custom_home_settings";

    /// Load the stored settings, or the empty record if none were saved.
    pub async fn load(store: &dyn OptionStore) -> Result<Self, CitaError> {
        match store.get_option(Self::OPTION_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| CitaError::Storage {
                source: Box::new(e),
            }),
            None => {
                debug!(key = Self::OPTION_KEY, "no stored settings, using empty record");
                Ok(Self::default())
            }
        }
    }

    /// Replace the whole stored record with `self`; fields left `None` are
    /// cleared.
    pub async fn save(&self, store: &dyn OptionStore) -> Result<(), CitaError> {
        let raw = serde_json::to_string(self).map_err(|e| CitaError::Internal(e.to_string()))?;
        store.set_option(Self::OPTION_KEY, &raw).await?;
        info!(key = Self::OPTION_KEY, "home settings updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl OptionStore for MapStore {
        async fn get_option(&self, key: &str) -> Result<Option<String>, CitaError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set_option(&self, key: &str, value: &str) -> Result<(), CitaError> {
            self.0
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn unset_settings_load_empty() {
        let store = MapStore::default();
        let settings = HomeSettings::load(&store).await.unwrap();
        assert_eq!(settings, HomeSettings::default());
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = MapStore::default();
        let settings = HomeSettings {
            title: Some("Clinic".into()),
            layout: Some(2),
            show_featured: Some(true),
            sections: Some(vec![serde_json::json!("hero")]),
            ..Default::default()
        };
        settings.save(&store).await.unwrap();

        let loaded = HomeSettings::load(&store).await.unwrap();
        assert_eq!(loaded, settings);
    }

    #[tokio::test]
    async fn save_replaces_whole_record() {
        let store = MapStore::default();
        HomeSettings {
            title: Some("Clinic".into()),
            color: Some("#336699".into()),
            ..Default::default()
        }
        .save(&store)
        .await
        .unwrap();

        let second = HomeSettings {
            layout: Some(3),
            ..Default::default()
        };
        second.save(&store).await.unwrap();

        let loaded = HomeSettings::load(&store).await.unwrap();
        assert_eq!(loaded, second);
        assert!(loaded.title.is_none());
    }

    #[tokio::test]
    async fn corrupt_value_is_storage_error() {
        let store = MapStore::default();
        store
            .set_option(HomeSettings::OPTION_KEY, "not json")
            .await
            .unwrap();
        let err = HomeSettings::load(&store).await.unwrap_err();
        assert_eq!(err.code(), "persistence_failure");
    }
}
