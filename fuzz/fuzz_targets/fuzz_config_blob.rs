//! Fuzz target: persisted config blob
//!
//! Writes arbitrary bytes where the commissioning config lives and checks:
//! - `load` never panics
//! - anything `load` accepts re-encodes and reloads identically
//! - `AppService::load_config` always hands back a valid config
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use sleepynode::adapters::nvs::{CONFIG_KEY, CONFIG_NAMESPACE, NvsAdapter};
use sleepynode::app::ports::{ConfigPort, StoragePort};
use sleepynode::app::service::AppService;

fuzz_target!(|data: &[u8]| {
    let mut nvs = NvsAdapter::new();
    if nvs.write(CONFIG_NAMESPACE, CONFIG_KEY, data).is_err() {
        return;
    }

    if let Ok(config) = nvs.load() {
        if nvs.save(&config).is_ok() {
            assert_eq!(nvs.load(), Ok(config));
        }
    }

    let effective = AppService::load_config(&nvs);
    assert!(effective.validate().is_ok());
});
