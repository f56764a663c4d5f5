//! Persisted configuration feeding the commissioning core.

use std::time::Duration;

use sleepynode::adapters::nvs::{CONFIG_KEY, CONFIG_NAMESPACE, NvsAdapter};
use sleepynode::app::ports::{ConfigPort, StoragePort};
use sleepynode::app::service::AppService;
use sleepynode::commissioning::{CommissioningMode as Mode, CommissioningOutcome as Outcome};
use sleepynode::config::CommissioningConfig;

use crate::mock_hw::SimNode;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[test]
fn first_boot_uses_defaults() {
    let nvs = NvsAdapter::new();
    assert_eq!(AppService::load_config(&nvs), CommissioningConfig::default());
}

#[test]
fn corrupted_store_falls_back_to_defaults() {
    let mut nvs = NvsAdapter::new();
    nvs.write(CONFIG_NAMESPACE, CONFIG_KEY, &[0xFF, 0xFF]).unwrap();
    assert_eq!(AppService::load_config(&nvs), CommissioningConfig::default());
}

#[test]
fn stored_backoff_drives_the_node() {
    let mut stored = CommissioningConfig::default();
    stored.backoff.initial_delay_secs = 5;
    stored.backoff.max_delay_secs = 20;
    stored.backoff.max_attempts = 3;

    let mut nvs = NvsAdapter::new();
    nvs.save(&stored).unwrap();

    let mut node = SimNode::new(AppService::load_config(&nvs));
    node.start();
    for _ in 0..5 {
        node.status(Mode::ParentLost, Outcome::Failure);
    }
    assert_eq!(
        node.rejoin_delays(),
        vec![secs(6), secs(7), secs(8), secs(20), secs(20)]
    );
}
