//! Telemetry cache refresh and validity tracking against a mock bus.

use powerboard::app::events::{AppEvent, TelemetryRecord};
use powerboard::bus::Bus;
use powerboard::error::GatewayError;
use powerboard::telemetry::{Category, TelemetryCache, Unit};

use crate::mock_gateway::{GatewayCall, MockGateway, RecordingSink, data_log, error_log};

fn open_bus() -> Bus<MockGateway> {
    let bus = Bus::new(MockGateway::new());
    bus.open("/dev/i2c-1").unwrap();
    bus
}

#[test]
fn successful_refresh_validates_every_unit() {
    let bus = open_bus();
    let cache = TelemetryCache::new(1);
    let sink = RecordingSink::new();

    cache.refresh_error_logs(&bus, &sink);

    let readings = cache.error_logs();
    assert!(readings.iter().all(|r| r.valid));
    assert_eq!(readings[0].value, error_log(1, 1));
    assert_eq!(readings[3].value, error_log(4, 4));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(TelemetryRecord::EscErrorLog { .. }))), 4);
}

#[test]
fn failed_unit_keeps_value_and_clears_bit() {
    let bus = open_bus();
    let cache = TelemetryCache::new(1);
    let sink = RecordingSink::new();

    cache.refresh_data_logs(&bus, &sink);
    let before = cache.data_logs();

    bus.transact(|g| g.fail(Category::DataLog, Unit::Esc(2)));
    cache.refresh_data_logs(&bus, &sink);
    let after = cache.data_logs();

    assert!(!after[1].valid);
    assert_eq!(after[1].value, before[1].value);
    assert!(after[0].valid && after[2].valid && after[3].valid);
    assert_ne!(after[0].value, before[0].value, "healthy units are re-read");
    assert_eq!(
        sink.count(|e| *e
            == AppEvent::ReadFailed {
                unit: Unit::Esc(2),
                category: Category::DataLog,
                error: GatewayError::ReadFailed,
            }),
        1
    );
}

#[test]
fn failure_does_not_leak_into_other_categories() {
    let bus = open_bus();
    let cache = TelemetryCache::new(1);
    let sink = RecordingSink::new();
    bus.transact(|g| g.fail(Category::Resistance, Unit::Esc(3)));

    cache.refresh_all(&bus, &sink);

    assert!(!cache.resistance()[2].valid);
    assert!(cache.device_info()[2].valid);
    assert!(cache.error_logs()[2].valid);
    assert!(cache.board_info().valid);
}

#[test]
fn recovered_unit_is_valid_again() {
    let bus = open_bus();
    let cache = TelemetryCache::new(1);
    let sink = RecordingSink::new();
    bus.transact(|g| g.fail(Category::BoardInfo, Unit::Board));

    cache.refresh_board_info(&bus, &sink);
    assert!(!cache.board_info().valid);

    bus.transact(MockGateway::heal);
    cache.refresh_board_info(&bus, &sink);
    assert!(cache.board_info().valid);
}

#[test]
fn refresh_all_runs_in_fixed_order() {
    let bus = open_bus();
    let cache = TelemetryCache::new(1);
    let sink = RecordingSink::new();
    bus.transact(|g| g.calls.clear());

    cache.refresh_all(&bus, &sink);

    let order: Vec<Category> = bus.transact(|g| {
        g.calls
            .iter()
            .filter_map(|c| match c {
                GatewayCall::Read(category, _) => Some(*category),
                _ => None,
            })
            .collect()
    });
    let mut expected = Vec::new();
    for category in [Category::ErrorLog, Category::DataLog, Category::DeviceInfo, Category::Resistance] {
        expected.extend([category; 4]);
    }
    expected.push(Category::BoardInfo);
    assert_eq!(order, expected);
}

#[test]
fn closed_bus_short_circuits_without_reads() {
    let bus = Bus::new(MockGateway::new());
    let cache = TelemetryCache::new(1);
    let sink = RecordingSink::new();

    cache.refresh_all(&bus, &sink);

    assert!(bus.transact(|g| g.calls.is_empty()));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RefreshSkipped(_))), 5);
    assert!(cache.device_info().iter().all(|r| !r.valid));
}

#[test]
fn bus_closing_invalidates_previously_good_data() {
    let bus = open_bus();
    let cache = TelemetryCache::new(1);
    let sink = RecordingSink::new();

    cache.refresh_data_logs(&bus, &sink);
    let before = cache.data_logs();
    bus.close();
    cache.refresh_data_logs(&bus, &sink);

    let after = cache.data_logs();
    assert!(after.iter().all(|r| !r.valid));
    for (a, b) in after.iter().zip(before.iter()) {
        assert_eq!(a.value, b.value);
    }
}

#[test]
fn esc_ids_follow_base_id() {
    let bus = open_bus();
    let cache = TelemetryCache::new(5);
    let sink = RecordingSink::new();

    cache.refresh_data_logs(&bus, &sink);

    let readings = cache.data_logs();
    assert_eq!(readings[0].unit, Unit::Esc(5));
    assert_eq!(readings[3].unit, Unit::Esc(8));
    assert_eq!(readings[3].value, data_log(8, 4));
}

#[test]
fn decoded_values_use_fixed_point_conversions() {
    let bus = open_bus();
    let cache = TelemetryCache::new(1);
    let sink = RecordingSink::new();

    cache.refresh_data_logs(&bus, &sink);
    let data = cache.data_logs()[0].value;

    assert!((data.motor_current_max_a() - 1.0).abs() < f32::EPSILON);
    assert!((data.motor_current_avg_a() - 3.7).abs() < 1e-5);
    assert_eq!(data.motor_temp_max_c(), 20);
}

#[test]
fn highest_base_id_reads_up_to_the_last_id() {
    let bus = open_bus();
    let cache = TelemetryCache::new(252);
    let sink = RecordingSink::new();
    bus.transact(|g| g.calls.clear());

    cache.refresh_error_logs(&bus, &sink);

    assert_eq!(cache.esc_id(3), u8::MAX);
    assert!(bus.transact(|g| g.calls.contains(&GatewayCall::Read(Category::ErrorLog, Unit::Esc(u8::MAX)))));
    assert!(cache.error_logs().iter().all(|r| r.valid));
}
