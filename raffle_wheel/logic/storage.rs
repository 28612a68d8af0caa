use crate::error::{RaffleError, RaffleError::*};
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt::Debug;

/// Durable string key/value store backing a session.
///
/// `write_batch` applies all the given entries or none of them, so that the
/// pools and the history written for one transition never disagree.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, RaffleError>;

    fn write_batch(&mut self, entries: &[(&str, String)]) -> Result<(), RaffleError>;
}

/// Read a JSON value. A missing key gives `Ok(None)`, an undecodable one gives
/// `StorageCorruption`.
pub fn read_json<T, S>(store: &S, key: &str) -> Result<Option<T>, RaffleError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Corrupted value for key {key}: {e}");
            Err(StorageCorruption)
        }
    }
}

/// Store that remembers nothing
#[derive(Default, Debug, Clone, Copy)]
pub struct NoopStore;

impl KeyValueStore for NoopStore {
    fn get(&self, _key: &str) -> Result<Option<String>, RaffleError> {
        Ok(None)
    }

    fn write_batch(&mut self, _entries: &[(&str, String)]) -> Result<(), RaffleError> {
        Ok(())
    }
}

/// In-memory store. It can be told to fail the next writes, to check that a
/// failed write leaves the session untouched.
#[derive(Default, Debug)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    failing_writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            failing_writes: Cell::new(0),
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn fail_next_writes(&self, nb_writes: usize) {
        self.failing_writes.set(nb_writes);
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, RaffleError> {
        Ok(self.values.get(key).cloned())
    }

    fn write_batch(&mut self, entries: &[(&str, String)]) -> Result<(), RaffleError> {
        let failing = self.failing_writes.get();
        if failing > 0 {
            self.failing_writes.set(failing - 1);
            return Err(StorageUnavailable);
        }
        for (key, value) in entries {
            debug!("write {key}: {value}");
            self.values.insert(key.to_string(), value.clone());
        }
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, RaffleError> {
        (**self).get(key)
    }

    fn write_batch(&mut self, entries: &[(&str, String)]) -> Result<(), RaffleError> {
        (**self).write_batch(entries)
    }
}

/// Storage written one item at a time, where every write may fail on its own
pub trait ItemStorage {
    type Error: Debug;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    fn remove_item(&self, key: &str) -> Result<(), Self::Error>;
}

/// Write the entries one by one. When a write fails, the entries already
/// written get their previous value back and the batch fails.
pub fn write_items<T: ItemStorage + ?Sized>(
    storage: &T,
    entries: &[(&str, String)],
) -> Result<(), RaffleError> {
    // keep the previous values to put them back if a write fails
    let mut previous = Vec::with_capacity(entries.len());
    for (key, _) in entries {
        let value = storage.get_item(key).map_err(|e| {
            error!("Error when reading {key}: {e:?}");
            StorageUnavailable
        })?;
        previous.push((*key, value));
    }

    for (i, (key, value)) in entries.iter().enumerate() {
        if let Err(e) = storage.set_item(key, value) {
            error!("Error when writing {key}: {e:?}");
            for (key, value) in &previous[..i] {
                let restored = match value {
                    Some(value) => storage.set_item(key, value),
                    None => storage.remove_item(key),
                };
                if let Err(e) = restored {
                    error!("Error when restoring {key}: {e:?}");
                }
            }
            return Err(StorageUnavailable);
        }
    }
    Ok(())
}

#[cfg(feature = "web")]
pub use web::LocalStorage;

#[cfg(feature = "web")]
mod web {
    use super::*;
    use wasm_bindgen::JsValue;

    /// Browser `localStorage`
    pub struct LocalStorage {
        storage: web_sys::Storage,
    }

    impl LocalStorage {
        pub fn new() -> Result<Self, RaffleError> {
            let storage = web_sys::window()
                .and_then(|window| window.local_storage().ok().flatten())
                .ok_or(StorageUnavailable)?;
            Ok(Self { storage })
        }
    }

    impl ItemStorage for LocalStorage {
        type Error = JsValue;

        fn get_item(&self, key: &str) -> Result<Option<String>, JsValue> {
            self.storage.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), JsValue> {
            self.storage.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), JsValue> {
            self.storage.remove_item(key)
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Result<Option<String>, RaffleError> {
            self.get_item(key).map_err(|e| {
                error!("Error when reading {key}: {e:?}");
                StorageUnavailable
            })
        }

        fn write_batch(&mut self, entries: &[(&str, String)]) -> Result<(), RaffleError> {
            write_items(&*self, entries)
        }
    }
}
