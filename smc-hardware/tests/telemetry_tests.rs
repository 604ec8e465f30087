//! Integration tests for the telemetry client against the simulated controller
//!
//! These exercise the public API only: probing, caching, fan indexing and
//! error reporting as seen by a caller holding an `SmcClient`.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use smc_core::catalog::{FAN_COUNT, FAN_SLOTS};
use smc_core::{Category, ClientConfig, Key, Result, SmcError, TypeTag};
use smc_hardware::protocol::status;
use smc_hardware::{MockSmc, SmcClient};

fn client(mock: MockSmc) -> SmcClient {
    SmcClient::with_transport(Box::new(mock), ClientConfig::default())
}

fn is_subsequence(part: &[Key], whole: &[Key]) -> bool {
    let mut rest = whole.iter();
    part.iter().all(|key| rest.any(|k| k == key))
}

#[test]
fn test_concurrent_first_probe_runs_once() {
    let mock = MockSmc::macbook_pro().with_latency(Duration::from_millis(1));
    let stats = mock.stats();
    let client = Arc::new(client(mock));

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let client = Arc::clone(&client);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                client.working_keys(Category::Temperature).to_vec()
            })
        })
        .collect();

    let results: Vec<Vec<Key>> = handles
        .into_iter()
        .map(|h| h.join().expect("probe thread panicked"))
        .collect();

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(
        stats.key_info_requests(),
        client.all_keys(Category::Temperature).len() as u64
    );
}

#[test]
fn test_working_keys_idempotent() {
    let mock = MockSmc::macbook_pro();
    let stats = mock.stats();
    let client = client(mock);

    for category in Category::ALL {
        let first = client.working_keys(category).to_vec();
        let requests = stats.total_requests();
        let round_trips = client.connection().round_trips();

        let second = client.working_keys(category).to_vec();

        assert_eq!(first, second);
        assert_eq!(stats.total_requests(), requests);
        assert_eq!(client.connection().round_trips(), round_trips);
    }
}

#[test]
fn test_working_keys_are_ordered_subsequence() {
    let mocks = [
        MockSmc::new(),
        MockSmc::macbook_pro(),
        MockSmc::new()
            .with_key(Key::new(*b"Tg05"), TypeTag::SP78, &[0x20, 0x00])
            .with_key(Key::new(*b"TC0D"), TypeTag::SP78, &[0x30, 0x00])
            .with_key(Key::new(*b"TB1T"), TypeTag::FP88, &[0x1E, 0x80]),
    ];

    for mock in mocks {
        let client = client(mock);
        for category in Category::ALL {
            let working = client.working_keys(category);
            assert!(
                is_subsequence(working, client.all_keys(category)),
                "{} working keys out of order: {:?}",
                category,
                working
            );
        }
    }
}

#[test]
fn test_fan_index_out_of_range_for_every_index_past_count() {
    let two_fans = client(MockSmc::macbook_pro());
    let no_fans = client(MockSmc::new().with_key(FAN_COUNT, TypeTag::UInt8, &[0]));

    for client in [&two_fans, &no_fans] {
        let count = client.number_of_fans().unwrap();
        for index in count..count + FAN_SLOTS + 8 {
            for result in [
                client.speed_of_fan(index),
                client.minimum_speed_of_fan(index),
                client.maximum_speed_of_fan(index),
                client.target_speed_of_fan(index),
            ] {
                assert!(matches!(
                    result,
                    Err(SmcError::IndexOutOfRange { index: i, count: c }) if i == index && c == count
                ));
            }
        }
    }
}

#[test]
fn test_failing_read_excluded_and_surfaced() -> Result<()> {
    let broken = Key::new(*b"F0Mx");
    let client = client(
        MockSmc::new()
            .with_key(FAN_COUNT, TypeTag::UInt8, &[1])
            .with_key(Key::new(*b"F0Ac"), TypeTag::FPE2, &[0x1C, 0x20])
            .with_failing_key(broken, TypeTag::FPE2, 2, status::KEY_NOT_READABLE),
    );

    let working = client.working_keys(Category::Fan);
    assert!(working.contains(&Key::new(*b"F0Ac")));
    assert!(!working.contains(&broken));

    assert!(matches!(
        client.read_number_for_key(broken),
        Err(SmcError::Read { key, status: status::KEY_NOT_READABLE }) if key == broken
    ));
    assert!(matches!(
        client.maximum_speed_of_fan(0),
        Err(SmcError::SensorUnavailable(key)) if key == broken
    ));
    assert_eq!(client.speed_of_fan(0)?, 1800.0);

    Ok(())
}

#[test]
fn test_unsupported_tag_excluded_from_probe() {
    let key = Key::new(*b"TC0P");
    let client = client(MockSmc::new().with_key(key, TypeTag::from_code(*b"{pwm"), &[0x40, 0x00]));

    assert!(client.working_keys(Category::Temperature).is_empty());
    assert!(matches!(
        client.read_number_for_key(key),
        Err(SmcError::Decode { .. })
    ));
}

#[test]
fn test_human_readable_names_never_empty() {
    let client = client(MockSmc::new());

    let odd_keys = [
        Key::new(*b"ZZZZ"),
        Key::new([0, 1, 2, 3]),
        Key::new(*b"F9Tg"),
        Key::new(*b"FaAc"),
        Key::new(*b"#KEY"),
    ];
    let catalogued = Category::ALL
        .iter()
        .flat_map(|category| category.all_keys().iter().copied());

    for key in catalogued.chain(odd_keys) {
        assert!(!client.human_readable_name_for_key(key).is_empty(), "{:?}", key);
    }
}

#[test]
fn test_read_category_matches_working_keys() {
    let client = client(MockSmc::macbook_pro());

    for category in Category::ALL {
        let readings = client.read_category(category);
        let keys: Vec<Key> = readings.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, client.working_keys(category));
        for (key, result) in &readings {
            assert_eq!(result.as_ref().map(|r| r.key).ok(), Some(*key));
        }
    }
}

#[test]
fn test_close_then_mock_rejects_calls() -> Result<()> {
    let mock = MockSmc::macbook_pro();
    let stats = mock.stats();
    let client = client(mock);

    client.cpu_temperature_in_degrees_celsius()?;
    client.close()?;

    assert!(stats.is_closed());
    Ok(())
}

#[test]
fn test_sensor_failing_after_probing_surfaces_read_error() {
    let key = Key::new(*b"TC0D");
    let client = client(MockSmc::new().with_key_failing_after(
        key,
        TypeTag::SP78,
        &[0x2D, 0x40],
        1,
        status::KEY_NOT_READABLE,
    ));

    assert_eq!(client.working_keys(Category::Temperature), &[key]);

    let readings = client.read_category(Category::Temperature);
    assert_eq!(readings.len(), 1);
    assert!(matches!(
        &readings[0],
        (k, Err(SmcError::Read { status: status::KEY_NOT_READABLE, .. })) if *k == key
    ));
    assert!(matches!(
        client.cpu_temperature_in_degrees_celsius(),
        Err(SmcError::Read { .. })
    ));
}
