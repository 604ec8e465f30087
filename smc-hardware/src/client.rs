//! Telemetry reader
//!
//! [`SmcClient`] is the public entry point: it owns one [`Connection`] and
//! one [`KeyRegistry`] and combines them into typed sensor queries.

use smc_core::catalog::{AMBIENT_LIGHT, CPU_DIE_TEMPERATURE, FAN_COUNT};
use smc_core::{Category, ClientConfig, FanRole, Key, KeyInfo, Reading, Result, SmcError};
use tracing::debug;

use crate::connection::Connection;
use crate::registry::KeyRegistry;
use crate::transport::SmcTransport;

/// SMC telemetry client
///
/// `Send + Sync`; share it between threads with `Arc`.
pub struct SmcClient {
    connection: Connection,
    registry: KeyRegistry,
    config: ClientConfig,
}

impl SmcClient {
    /// Open the platform controller
    pub fn open(config: ClientConfig) -> Result<Self> {
        let connection = Connection::open()?;
        Ok(Self::from_connection(connection, config))
    }

    /// Create a client over an arbitrary transport
    ///
    /// This is primarily useful for testing with [`MockSmc`](crate::MockSmc).
    pub fn with_transport(transport: Box<dyn SmcTransport>, config: ClientConfig) -> Self {
        Self::from_connection(Connection::with_transport(transport), config)
    }

    fn from_connection(connection: Connection, config: ClientConfig) -> Self {
        Self {
            connection,
            registry: KeyRegistry::new(&config),
            config,
        }
    }

    /// Release the controller handle
    pub fn close(self) -> Result<()> {
        self.connection.close()
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Every catalogued key of `category`
    pub fn all_keys(&self, category: Category) -> &'static [Key] {
        self.registry.all_keys(category)
    }

    /// Catalogued keys of `category` that work on this machine
    pub fn working_keys(&self, category: Category) -> &[Key] {
        self.registry.working_keys(category, &self.connection)
    }

    /// Size and type of `key`
    pub fn key_info(&self, key: Key) -> Result<KeyInfo> {
        self.connection.key_info(key)
    }

    /// Key-info and undecoded value bytes of `key`
    pub fn read_raw(&self, key: Key) -> Result<(KeyInfo, Vec<u8>)> {
        self.connection.read_raw(key)
    }

    /// Decode bytes previously read from `key` with this client's settings
    pub fn decode(&self, key: Key, info: &KeyInfo, bytes: &[u8]) -> Result<f64> {
        Connection::decode(key, info, bytes, self.config.float_byte_order)
    }

    /// Read and decode any key, catalogued or not
    pub fn read_number_for_key(&self, key: Key) -> Result<f64> {
        self.connection
            .read_number(key, self.config.float_byte_order)
    }

    /// Read `key` and attach its unit
    pub fn read_reading(&self, key: Key) -> Result<Reading> {
        Ok(Reading::new(key, self.read_number_for_key(key)?))
    }

    /// Read every working key of `category`, in catalog order.
    ///
    /// One entry per working key. A key that answered during probing but
    /// fails now keeps its error; the caller decides whether to skip it.
    pub fn read_category(&self, category: Category) -> Vec<(Key, Result<Reading>)> {
        self.working_keys(category)
            .iter()
            .map(|&key| (key, self.read_reading(key)))
            .collect()
    }

    /// Display name of `key`. Never fails.
    pub fn human_readable_name_for_key(&self, key: Key) -> String {
        smc_core::human_readable_name_for_key(key)
    }

    /// CPU die temperature in °C
    pub fn cpu_temperature_in_degrees_celsius(&self) -> Result<f64> {
        self.read_working(CPU_DIE_TEMPERATURE)
    }

    /// Number of fans the controller reports, 0 if it has no fan count key
    pub fn number_of_fans(&self) -> Result<usize> {
        match self.read_unsigned(FAN_COUNT) {
            Ok(count) => Ok(count as usize),
            Err(SmcError::KeyNotFound(_)) => {
                debug!("No {} key, assuming no fans", FAN_COUNT);
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Current speed of fan `index` in RPM
    pub fn speed_of_fan(&self, index: usize) -> Result<f64> {
        self.read_fan(index, FanRole::Current)
    }

    /// Minimum speed of fan `index` in RPM
    pub fn minimum_speed_of_fan(&self, index: usize) -> Result<f64> {
        self.read_fan(index, FanRole::Minimum)
    }

    /// Maximum speed of fan `index` in RPM
    pub fn maximum_speed_of_fan(&self, index: usize) -> Result<f64> {
        self.read_fan(index, FanRole::Maximum)
    }

    /// Target speed of fan `index` in RPM
    pub fn target_speed_of_fan(&self, index: usize) -> Result<f64> {
        self.read_fan(index, FanRole::Target)
    }

    /// Ambient light level in lux
    pub fn ambient_light_in_lux(&self) -> Result<u32> {
        self.read_unsigned(AMBIENT_LIGHT).map_err(|e| match e {
            SmcError::KeyNotFound(key) => SmcError::SensorUnavailable(key),
            e => e,
        })
    }

    /// Number of keys the controller exposes
    pub fn key_count(&self) -> Result<u32> {
        self.connection.key_count()
    }

    /// Every key the controller exposes, in its own table order
    pub fn controller_keys(&self) -> Result<Vec<Key>> {
        let count = self.connection.key_count()?;
        debug!("Enumerating {} controller keys", count);
        (0..count)
            .map(|index| self.connection.key_at_index(index))
            .collect()
    }

    fn read_fan(&self, index: usize, role: FanRole) -> Result<f64> {
        let count = self.number_of_fans()?;
        if index >= count {
            return Err(SmcError::IndexOutOfRange { index, count });
        }
        match Key::fan(index, role) {
            Some(key) => self.read_working(key),
            // slots past F (hex digit) have no key code
            None => Err(SmcError::SensorUnavailable(Key::fan_wildcard(role))),
        }
    }

    /// Read a catalogued key only if probing found it working
    fn read_working(&self, key: Key) -> Result<f64> {
        if !self.registry.is_working(key, &self.connection) {
            return Err(SmcError::SensorUnavailable(key));
        }
        self.read_number_for_key(key)
    }

    fn read_unsigned(&self, key: Key) -> Result<u32> {
        let value = self.read_number_for_key(key)?;
        if !(0.0..=f64::from(u32::MAX)).contains(&value) {
            return Err(SmcError::Protocol(format!(
                "{} holds {} where a count was expected",
                key, value
            )));
        }
        Ok(value as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSmc;
    use crate::protocol::status;
    use smc_core::TypeTag;

    fn client(mock: MockSmc) -> SmcClient {
        SmcClient::with_transport(Box::new(mock), ClientConfig::default())
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmcClient>();
    }

    #[test]
    fn test_cpu_temperature() {
        let client = client(MockSmc::macbook_pro());
        assert_eq!(client.cpu_temperature_in_degrees_celsius().unwrap(), 45.25);
    }

    #[test]
    fn test_cpu_temperature_unavailable() {
        let client = client(MockSmc::new());
        let err = client.cpu_temperature_in_degrees_celsius().unwrap_err();
        assert!(matches!(err, SmcError::SensorUnavailable(k) if k == CPU_DIE_TEMPERATURE));
    }

    #[test]
    fn test_fans() {
        let client = client(MockSmc::macbook_pro());

        assert_eq!(client.number_of_fans().unwrap(), 2);
        assert_eq!(client.speed_of_fan(0).unwrap(), 1800.0);
        assert_eq!(client.speed_of_fan(1).unwrap(), 2004.0);
        assert_eq!(client.minimum_speed_of_fan(1).unwrap(), 1200.0);
        assert_eq!(client.maximum_speed_of_fan(0).unwrap(), 6000.0);
        assert_eq!(client.target_speed_of_fan(1).unwrap(), 2000.0);
    }

    #[test]
    fn test_fan_index_out_of_range() {
        let client = client(MockSmc::macbook_pro());
        let err = client.speed_of_fan(2).unwrap_err();
        assert!(matches!(
            err,
            SmcError::IndexOutOfRange { index: 2, count: 2 }
        ));
    }

    #[test]
    fn test_no_fan_count_key_means_no_fans() {
        let client = client(MockSmc::new());
        assert_eq!(client.number_of_fans().unwrap(), 0);
        assert!(matches!(
            client.speed_of_fan(0).unwrap_err(),
            SmcError::IndexOutOfRange { index: 0, count: 0 }
        ));
    }

    #[test]
    fn test_fan_counted_but_not_working() {
        let client = client(MockSmc::new().with_key(FAN_COUNT, TypeTag::UInt8, &[1]));
        let err = client.speed_of_fan(0).unwrap_err();
        assert!(matches!(err, SmcError::SensorUnavailable(_)));
    }

    #[test]
    fn test_ambient_light() {
        let client = client(MockSmc::macbook_pro());
        assert_eq!(client.ambient_light_in_lux().unwrap(), 212);

        let client = client_without_light();
        assert!(matches!(
            client.ambient_light_in_lux().unwrap_err(),
            SmcError::SensorUnavailable(k) if k == AMBIENT_LIGHT
        ));
    }

    fn client_without_light() -> SmcClient {
        client(MockSmc::new().with_key(FAN_COUNT, TypeTag::UInt8, &[0]))
    }

    #[test]
    fn test_read_category_skips_implausible() {
        let client = client(MockSmc::macbook_pro());
        let readings = client.read_category(Category::Voltage);
        let keys: Vec<Key> = readings.iter().map(|(key, _)| *key).collect();

        assert_eq!(keys, vec![Key::new(*b"VC0C"), Key::new(*b"VD0R")]);
        let first = readings[0].1.as_ref().unwrap();
        assert_eq!(first.unit, smc_core::Unit::Volt);
        assert_eq!(first.key, keys[0]);
    }

    #[test]
    fn test_read_category_reports_failure_after_probing() {
        let flaky = Key::new(*b"TC0D");
        let client = client(
            MockSmc::new()
                .with_key_failing_after(
                    flaky,
                    TypeTag::SP78,
                    &[0x2D, 0x40],
                    1,
                    status::KEY_NOT_READABLE,
                )
                .with_key(Key::new(*b"TC0P"), TypeTag::SP78, &[0x29, 0x80]),
        );

        // the one good read is spent by probing
        assert!(client.working_keys(Category::Temperature).contains(&flaky));

        let readings = client.read_category(Category::Temperature);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].0, flaky);
        assert!(matches!(
            readings[0].1,
            Err(SmcError::Read { key, status: status::KEY_NOT_READABLE }) if key == flaky
        ));
        assert_eq!(readings[1].1.as_ref().unwrap().value, 41.5);
    }

    #[test]
    fn test_fan_slot_without_key_code() {
        let client = client(MockSmc::new().with_key(FAN_COUNT, TypeTag::UInt8, &[20]));

        assert_eq!(client.number_of_fans().unwrap(), 20);
        for index in [16, 19] {
            let err = client.speed_of_fan(index).unwrap_err();
            assert!(
                matches!(err, SmcError::SensorUnavailable(_)),
                "fan {}: {:?}",
                index,
                err
            );
        }
        assert!(matches!(
            client.target_speed_of_fan(20).unwrap_err(),
            SmcError::IndexOutOfRange { index: 20, count: 20 }
        ));
    }

    #[test]
    fn test_failing_key_excluded_and_reported() {
        let key = Key::new(*b"TC0P");
        let client = client(MockSmc::new().with_failing_key(
            key,
            TypeTag::SP78,
            2,
            status::KEY_NOT_READABLE,
        ));

        assert!(!client.working_keys(Category::Temperature).contains(&key));
        assert!(matches!(
            client.read_number_for_key(key).unwrap_err(),
            SmcError::Read { status: status::KEY_NOT_READABLE, .. }
        ));
    }

    #[test]
    fn test_controller_keys() {
        let client = client(MockSmc::macbook_pro());
        let keys = client.controller_keys().unwrap();

        assert_eq!(keys.len() as u32, client.key_count().unwrap());
        assert!(keys.contains(&Key::new(*b"RPlt")));
        assert!(keys.contains(&smc_core::catalog::KEY_COUNT));
    }
}
