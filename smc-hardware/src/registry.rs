//! Key registry
//!
//! Pairs the static catalog with the subset of keys that actually respond on
//! this machine. The working subset of a category is computed by probing the
//! first time it is asked for and never recomputed.

use std::sync::OnceLock;

use smc_core::{ByteOrder, Category, ClientConfig, Key, ProbeConfig};
use tracing::{debug, info};

use crate::connection::Connection;

/// Catalog plus lazily probed working keys
#[derive(Debug)]
pub struct KeyRegistry {
    probe: ProbeConfig,
    float_order: ByteOrder,
    working: [OnceLock<Vec<Key>>; 5],
}

impl KeyRegistry {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            probe: config.probe.clone(),
            float_order: config.float_byte_order,
            working: Default::default(),
        }
    }

    /// Every candidate key of `category`, in declaration order
    pub fn all_keys(&self, category: Category) -> &'static [Key] {
        category.all_keys()
    }

    /// Keys of `category` that returned a plausible value when probed.
    ///
    /// The first call probes every candidate key over `connection`;
    /// concurrent first callers wait for that single pass. Later calls issue
    /// no controller requests.
    pub fn working_keys(&self, category: Category, connection: &Connection) -> &[Key] {
        self.working[category.index()].get_or_init(|| self.probe_category(category, connection))
    }

    /// Whether `key` is in the working subset of its category
    pub fn is_working(&self, key: Key, connection: &Connection) -> bool {
        Category::of_key(key)
            .filter(|category| category.all_keys().contains(&key))
            .is_some_and(|category| self.working_keys(category, connection).contains(&key))
    }

    /// Whether `category` has already been probed
    pub fn is_probed(&self, category: Category) -> bool {
        self.working[category.index()].get().is_some()
    }

    fn probe_category(&self, category: Category, connection: &Connection) -> Vec<Key> {
        let range = self.probe.range(category);
        let candidates = category.all_keys();
        debug!("Probing {} {} keys", candidates.len(), category);

        let working: Vec<Key> = candidates
            .iter()
            .copied()
            .filter(|&key| match connection.read_number(key, self.float_order) {
                Ok(value) if range.accepts(value) => true,
                Ok(value) => {
                    debug!("  {} = {} is implausible, skipping", key, value);
                    false
                }
                Err(e) => {
                    debug!("  {} skipped: {}", key, e);
                    false
                }
            })
            .collect();

        info!(
            "{} of {} {} keys are working",
            working.len(),
            candidates.len(),
            category
        );
        working
    }
}
