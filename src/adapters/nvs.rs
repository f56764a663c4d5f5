//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`].
//!
//! - **`espidf`**: default NVS partition through `esp_idf_svc::nvs`, one
//!   namespace handle opened per call.
//! - **host**: in-memory map keyed by `namespace::key`, for tests and
//!   simulation.
//!
//! The commissioning config is stored as a postcard blob under
//! `commissioning/config` and validated before every write.

use log::info;
#[cfg(feature = "espidf")]
use log::warn;

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::CommissioningConfig;

#[cfg(not(feature = "espidf"))]
use std::collections::HashMap;

#[cfg(feature = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

pub const CONFIG_NAMESPACE: &str = "commissioning";
pub const CONFIG_KEY: &str = "config";

/// Upper bound for a stored config blob.
const MAX_BLOB_SIZE: usize = 128;

pub struct NvsAdapter {
    #[cfg(not(feature = "espidf"))]
    store: HashMap<String, Vec<u8>>,
    #[cfg(feature = "espidf")]
    partition: EspDefaultNvsPartition,
}

impl NvsAdapter {
    /// Open the default NVS partition.
    #[cfg(feature = "espidf")]
    pub fn new(partition: EspDefaultNvsPartition) -> Self {
        info!("NvsAdapter: ESP-IDF NVS");
        Self { partition }
    }

    /// Empty in-memory store.
    #[cfg(not(feature = "espidf"))]
    pub fn new() -> Self {
        info!("NvsAdapter: simulation backend");
        Self {
            store: HashMap::new(),
        }
    }

    #[cfg(not(feature = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    #[cfg(feature = "espidf")]
    fn open(&self, namespace: &str, write: bool) -> Result<EspNvs<NvsDefault>, StorageError> {
        EspNvs::new(self.partition.clone(), namespace, write).map_err(|e| {
            warn!("NvsAdapter: open '{}' failed: {}", namespace, e);
            StorageError::IoError
        })
    }
}

#[cfg(not(feature = "espidf"))]
impl Default for NvsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<CommissioningConfig, ConfigError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let len = self.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf)?;
        let config: CommissioningConfig =
            postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
        info!("NvsAdapter: loaded config ({} bytes)", len);
        Ok(config)
    }

    fn save(&mut self, config: &CommissioningConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config)
            .map_err(|_| ConfigError::Storage(StorageError::IoError))?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::Storage(StorageError::Full));
        }
        self.write(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

#[cfg(not(feature = "espidf"))]
impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.get(&Self::composite_key(namespace, key)) {
            Some(data) if data.len() > buf.len() => Err(StorageError::Full),
            Some(data) => {
                buf[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store
            .insert(Self::composite_key(namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&Self::composite_key(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store
            .contains_key(&Self::composite_key(namespace, key))
    }
}

#[cfg(feature = "espidf")]
impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let nvs = self.open(namespace, false)?;
        match nvs.get_raw(key, buf) {
            Ok(Some(data)) => Ok(data.len()),
            Ok(None) => Err(StorageError::NotFound),
            Err(e) => {
                warn!("NvsAdapter: read {}/{} failed: {}", namespace, key, e);
                Err(StorageError::IoError)
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let mut nvs = self.open(namespace, true)?;
        nvs.set_raw(key, data).map(|_| ()).map_err(|e| {
            warn!("NvsAdapter: write {}/{} failed: {}", namespace, key, e);
            StorageError::IoError
        })
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let mut nvs = self.open(namespace, true)?;
        nvs.remove(key)
            .map(|_| ())
            .map_err(|_| StorageError::IoError)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.open(namespace, false)
            .and_then(|nvs| nvs.contains(key).map_err(|_| StorageError::IoError))
            .unwrap_or(false)
    }
}
