//! Controller connection
//!
//! Owns the transport handle, serializes round trips over it and caches
//! key-info per key for the lifetime of the connection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock};

use smc_core::catalog::KEY_COUNT;
use smc_core::{decode_with, ByteOrder, Key, KeyInfo, Result, SmcError};
use tracing::{debug, warn};

use crate::protocol::{status, SmcRequest, SmcResponse, MAX_DATA_SIZE};
use crate::transport::{describe_status, SmcTransport};

/// A live channel to the System Management Controller.
///
/// All methods take `&self`; round trips are serialized internally so the
/// connection can be shared between threads.
pub struct Connection {
    transport: Mutex<Box<dyn SmcTransport>>,
    key_info: RwLock<HashMap<Key, KeyInfo>>,
    round_trips: AtomicU64,
}

impl Connection {
    /// Open the platform controller service.
    #[cfg(target_os = "macos")]
    pub fn open() -> Result<Self> {
        let driver = crate::iokit::IoKitDriver::open()?;
        Ok(Self::with_transport(Box::new(driver)))
    }

    /// Open the platform controller service.
    ///
    /// Always fails off macOS.
    #[cfg(not(target_os = "macos"))]
    pub fn open() -> Result<Self> {
        Err(SmcError::Connection(
            "SMC access requires macOS".to_string(),
        ))
    }

    /// Create a connection over an arbitrary transport
    ///
    /// This is primarily useful for testing with simulated controllers.
    pub fn with_transport(transport: Box<dyn SmcTransport>) -> Self {
        debug!("SMC connection using {}", transport.description());
        Self {
            transport: Mutex::new(transport),
            key_info: RwLock::new(HashMap::new()),
            round_trips: AtomicU64::new(0),
        }
    }

    /// Release the handle. Consuming `self` makes later use impossible.
    pub fn close(self) -> Result<()> {
        let mut transport = self
            .transport
            .into_inner()
            .map_err(|_| SmcError::Protocol("SMC transport lock poisoned".to_string()))?;
        transport.close()
    }

    /// Number of completed controller round trips
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::Relaxed)
    }

    /// Transport description for logs and `info` output
    pub fn description(&self) -> Result<String> {
        Ok(self.lock_transport()?.description().to_string())
    }

    fn lock_transport(&self) -> Result<MutexGuard<'_, Box<dyn SmcTransport>>> {
        self.transport
            .lock()
            .map_err(|_| SmcError::Protocol("SMC transport lock poisoned".to_string()))
    }

    fn exchange(
        &self,
        transport: &mut Box<dyn SmcTransport>,
        request: &SmcRequest,
    ) -> Result<SmcResponse> {
        let response = transport.call(request)?;
        self.round_trips.fetch_add(1, Ordering::Relaxed);
        debug!(
            "SMC {:?} {} -> status 0x{:02X}",
            request.op, request.key, response.result
        );
        Ok(response)
    }

    fn cached_info(&self, key: Key) -> Result<Option<KeyInfo>> {
        let cache = self
            .key_info
            .read()
            .map_err(|_| SmcError::Protocol("Key-info cache lock poisoned".to_string()))?;
        Ok(cache.get(&key).copied())
    }

    /// Size and type of `key`.
    ///
    /// Fetched at most once per key; later calls are served from the cache.
    pub fn key_info(&self, key: Key) -> Result<KeyInfo> {
        if let Some(info) = self.cached_info(key)? {
            return Ok(info);
        }

        let mut transport = self.lock_transport()?;

        // Another thread may have fetched it while we waited.
        if let Some(info) = self.cached_info(key)? {
            return Ok(info);
        }

        let response = self.exchange(&mut transport, &SmcRequest::key_info(key))?;
        match response.result {
            status::SUCCESS => {}
            status::KEY_NOT_FOUND => return Err(SmcError::KeyNotFound(key)),
            code => {
                debug!("Key-info for {} failed: {}", key, describe_status(code));
                return Err(SmcError::Read { key, status: code });
            }
        }

        let info = response.key_info();
        if info.size as usize > MAX_DATA_SIZE {
            return Err(SmcError::Protocol(format!(
                "Key {} reports size {} (maximum {})",
                key, info.size, MAX_DATA_SIZE
            )));
        }

        self.key_info
            .write()
            .map_err(|_| SmcError::Protocol("Key-info cache lock poisoned".to_string()))?
            .insert(key, info);
        Ok(info)
    }

    /// Raw value bytes of `key`, `info.size` bytes long
    pub fn read_value(&self, key: Key, info: &KeyInfo) -> Result<Vec<u8>> {
        let size = info.size as usize;
        if size > MAX_DATA_SIZE {
            return Err(SmcError::Protocol(format!(
                "Requested size {} exceeds maximum {}",
                size, MAX_DATA_SIZE
            )));
        }

        let mut transport = self.lock_transport()?;
        let response = self.exchange(&mut transport, &SmcRequest::read_bytes(key, info))?;
        match response.result {
            status::SUCCESS => Ok(response.bytes[..size].to_vec()),
            status::KEY_NOT_FOUND => Err(SmcError::KeyNotFound(key)),
            code => {
                debug!("Read of {} failed: {}", key, describe_status(code));
                Err(SmcError::Read { key, status: code })
            }
        }
    }

    /// Key-info plus raw value bytes
    pub fn read_raw(&self, key: Key) -> Result<(KeyInfo, Vec<u8>)> {
        let info = self.key_info(key)?;
        let bytes = self.read_value(key, &info)?;
        Ok((info, bytes))
    }

    /// Read `key` and decode it to a number
    pub fn read_number(&self, key: Key, float_order: ByteOrder) -> Result<f64> {
        let (info, bytes) = self.read_raw(key).map_err(|e| {
            debug!("Failed to read {}: {}", key, e);
            e
        })?;

        Self::decode(key, &info, &bytes, float_order)
    }

    /// Decode bytes read from `key`. Every decode in the client goes through
    /// here so failures are logged apart from read failures.
    pub fn decode(key: Key, info: &KeyInfo, bytes: &[u8], float_order: ByteOrder) -> Result<f64> {
        decode_with(bytes, info.tag, float_order).map_err(|e| {
            warn!("Failed to decode {} ({}): {}", key, info.tag, e);
            e
        })
    }

    /// Total number of keys the controller exposes (`#KEY`)
    pub fn key_count(&self) -> Result<u32> {
        let (info, bytes) = self.read_raw(KEY_COUNT)?;
        let value = Self::decode(KEY_COUNT, &info, &bytes, ByteOrder::Big)?;
        if !(0.0..=f64::from(u32::MAX)).contains(&value) {
            return Err(SmcError::Protocol(format!(
                "Key count has unexpected value {}",
                value
            )));
        }
        Ok(value as u32)
    }

    /// Key stored at position `index` of the controller's key table
    pub fn key_at_index(&self, index: u32) -> Result<Key> {
        let mut transport = self.lock_transport()?;
        let response = self.exchange(&mut transport, &SmcRequest::read_index(index))?;
        match response.result {
            status::SUCCESS => Ok(response.key),
            code => Err(SmcError::Protocol(format!(
                "Reading key at index {} failed: {} (0x{:02X})",
                index,
                describe_status(code),
                code
            ))),
        }
    }
}
