//! Simulated controller
//!
//! [`MockSmc`] answers key-info, read and read-index requests from an
//! in-memory key table. It backs the unit tests and the CLI's `--mock` mode,
//! and counts every request it serves so tests can assert on round trips.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use smc_core::catalog::KEY_COUNT;
use smc_core::{Key, Result, SmcError, TypeTag};

use crate::protocol::{status, SmcOp, SmcRequest, SmcResponse, MAX_DATA_SIZE};
use crate::transport::SmcTransport;

/// Attribute bits reported for every simulated key (readable)
const READABLE: u8 = 0x80;

#[derive(Debug, Clone)]
struct MockKey {
    tag: TypeTag,
    size: u32,
    bytes: Vec<u8>,
    /// Status returned for value reads
    read_status: u8,
    /// Successful reads left before every read fails with the given status
    fail_after: Option<(u32, u8)>,
}

/// Request counters shared between a [`MockSmc`] and the test observing it
#[derive(Debug, Default)]
pub struct MockStats {
    key_info: AtomicU64,
    reads: AtomicU64,
    index: AtomicU64,
    per_key: Mutex<HashMap<Key, u64>>,
    closed: AtomicBool,
}

impl MockStats {
    /// Key-info requests served
    pub fn key_info_requests(&self) -> u64 {
        self.key_info.load(Ordering::SeqCst)
    }

    /// Value reads served
    pub fn read_requests(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Read-index requests served
    pub fn index_requests(&self) -> u64 {
        self.index.load(Ordering::SeqCst)
    }

    /// All requests served
    pub fn total_requests(&self) -> u64 {
        self.key_info_requests() + self.read_requests() + self.index_requests()
    }

    /// Key-info and read requests that named `key`
    pub fn requests_for(&self, key: Key) -> u64 {
        self.per_key
            .lock()
            .map(|map| map.get(&key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Whether the transport has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn record(&self, request: &SmcRequest) {
        let counter = match request.op {
            SmcOp::ReadKeyInfo => &self.key_info,
            SmcOp::ReadBytes => &self.reads,
            SmcOp::ReadIndex => &self.index,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        if request.op != SmcOp::ReadIndex {
            if let Ok(mut map) = self.per_key.lock() {
                *map.entry(request.key).or_insert(0) += 1;
            }
        }
    }
}

/// In-memory controller
#[derive(Debug, Default)]
pub struct MockSmc {
    keys: BTreeMap<Key, MockKey>,
    latency: Option<Duration>,
    stats: Arc<MockStats>,
}

impl MockSmc {
    /// Empty controller. Only `#KEY` exists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a readable key holding `bytes` under `tag`
    pub fn with_key(mut self, key: Key, tag: TypeTag, bytes: &[u8]) -> Self {
        self.keys.insert(
            key,
            MockKey {
                tag,
                size: bytes.len() as u32,
                bytes: bytes.to_vec(),
                read_status: status::SUCCESS,
                fail_after: None,
            },
        );
        self
    }

    /// Add a key that reads `bytes` `good_reads` times, then fails every
    /// later read with `read_status`
    pub fn with_key_failing_after(
        mut self,
        key: Key,
        tag: TypeTag,
        bytes: &[u8],
        good_reads: u32,
        read_status: u8,
    ) -> Self {
        self = self.with_key(key, tag, bytes);
        if let Some(entry) = self.keys.get_mut(&key) {
            entry.fail_after = Some((good_reads, read_status));
        }
        self
    }

    /// Add a key whose key-info succeeds but whose value read fails with
    /// `read_status`
    pub fn with_failing_key(mut self, key: Key, tag: TypeTag, size: u32, read_status: u8) -> Self {
        self.keys.insert(
            key,
            MockKey {
                tag,
                size,
                bytes: Vec::new(),
                read_status,
                fail_after: None,
            },
        );
        self
    }

    /// Delay every round trip by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Counters for this controller; stays valid after the mock is moved
    /// into a connection.
    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    /// A two-fan Intel-era laptop: CPU/GPU/battery temperatures, a few rails,
    /// an ambient light sensor and a zeroed (unpopulated) temperature slot.
    pub fn macbook_pro() -> Self {
        let fpe2 = |rpm: u16| (rpm * 4).to_be_bytes();
        let sp78 = |celsius: f32| ((celsius * 256.0) as i16).to_be_bytes();
        let flt = |value: f32| value.to_be_bytes();

        let mut mock = Self::new()
            .with_key(Key::new(*b"FNum"), TypeTag::UInt8, &[2])
            .with_key(Key::new(*b"TC0D"), TypeTag::SP78, &sp78(45.25))
            .with_key(Key::new(*b"TC0P"), TypeTag::SP78, &sp78(41.5))
            .with_key(Key::new(*b"TG0D"), TypeTag::SP78, &sp78(52.0))
            .with_key(Key::new(*b"TB0T"), TypeTag::SP78, &sp78(30.75))
            .with_key(Key::new(*b"TA0P"), TypeTag::SP78, &sp78(0.0))
            .with_key(Key::new(*b"Th0H"), TypeTag::SP78, &sp78(48.0))
            .with_key(Key::new(*b"VC0C"), TypeTag::Float32, &flt(1.05))
            .with_key(Key::new(*b"VD0R"), TypeTag::Float32, &flt(12.35))
            .with_key(Key::new(*b"VG0C"), TypeTag::Float32, &flt(0.0))
            .with_key(Key::new(*b"IC0R"), TypeTag::Float32, &flt(2.4))
            .with_key(Key::new(*b"ID0R"), TypeTag::Float32, &flt(3.1))
            .with_key(Key::new(*b"PC0C"), TypeTag::Float32, &flt(14.2))
            .with_key(Key::new(*b"PSTR"), TypeTag::Float32, &flt(27.8))
            .with_key(Key::new(*b"ALV0"), TypeTag::UInt32, &212u32.to_be_bytes())
            .with_key(Key::new(*b"RPlt"), TypeTag::from_code(*b"ch8*"), b"j680");

        for (index, current, target) in [(0usize, 1800u16, 1800u16), (1, 2004, 2000)] {
            for (role, rpm) in [
                (smc_core::FanRole::Current, current),
                (smc_core::FanRole::Minimum, 1200),
                (smc_core::FanRole::Maximum, 6000),
                (smc_core::FanRole::Target, target),
            ] {
                if let Some(key) = Key::fan(index, role) {
                    mock = mock.with_key(key, TypeTag::FPE2, &fpe2(rpm));
                }
            }
        }
        mock
    }

    /// Key table as the controller enumerates it, `#KEY` included
    fn table(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.keys.keys().copied().collect();
        if !self.keys.contains_key(&KEY_COUNT) {
            keys.push(KEY_COUNT);
            keys.sort();
        }
        keys
    }

    /// Count one value read of `key` against its budget; the failure status
    /// once the budget is spent
    fn spend_read(&mut self, key: Key) -> Option<u8> {
        let (left, failure) = self.keys.get_mut(&key)?.fail_after.as_mut()?;
        if *left == 0 {
            return Some(*failure);
        }
        *left -= 1;
        None
    }

    fn lookup(&self, key: Key) -> Option<MockKey> {
        if let Some(entry) = self.keys.get(&key) {
            return Some(entry.clone());
        }
        (key == KEY_COUNT).then(|| {
            let count = self.table().len() as u32;
            MockKey {
                tag: TypeTag::UInt32,
                size: 4,
                bytes: count.to_be_bytes().to_vec(),
                read_status: status::SUCCESS,
                fail_after: None,
            }
        })
    }
}

impl SmcTransport for MockSmc {
    fn call(&mut self, request: &SmcRequest) -> Result<SmcResponse> {
        if self.stats.is_closed() {
            return Err(SmcError::Protocol("Mock SMC is closed".to_string()));
        }
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        self.stats.record(request);

        let response = match request.op {
            SmcOp::ReadKeyInfo => match self.lookup(request.key) {
                Some(entry) => SmcResponse {
                    data_size: entry.size,
                    data_type: entry.tag.to_u32(),
                    data_attributes: READABLE,
                    ..SmcResponse::ok(request.key)
                },
                None => SmcResponse::failure(request.key, status::KEY_NOT_FOUND),
            },
            SmcOp::ReadBytes => {
                let exhausted = self.spend_read(request.key);
                match (self.lookup(request.key), exhausted) {
                    (Some(_), Some(failure)) => SmcResponse::failure(request.key, failure),
                    (Some(entry), None) if entry.read_status != status::SUCCESS => {
                        SmcResponse::failure(request.key, entry.read_status)
                    }
                    (Some(entry), None) => {
                        let mut response = SmcResponse::ok(request.key);
                        let len = entry.bytes.len().min(MAX_DATA_SIZE);
                        response.bytes[..len].copy_from_slice(&entry.bytes[..len]);
                        response
                    }
                    (None, _) => SmcResponse::failure(request.key, status::KEY_NOT_FOUND),
                }
            }
            SmcOp::ReadIndex => match self.table().get(request.index as usize) {
                Some(key) => SmcResponse::ok(*key),
                None => SmcResponse::failure(request.key, status::KEY_INDEX_RANGE),
            },
        };

        Ok(response)
    }

    fn close(&mut self) -> Result<()> {
        self.stats.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn description(&self) -> &str {
        "mock SMC"
    }
}
