//! Integration tests for the PowerboardService composition root.
//!
//! Verifies the command-dispatch chain from an incoming RPC-style command
//! down to gateway calls, and the service-level query contract.

use powerboard::adapters::sim_gateway::SimulatedBoard;
use powerboard::app::commands::{AppCommand, CommandReply};
use powerboard::app::events::AppEvent;
use powerboard::app::service::PowerboardService;
use powerboard::config::SystemConfig;
use powerboard::error::{CommandError, Error, GatewayError};
use powerboard::led::{COLOUR_WHITE, EffectKind, LedChannel, LedCounts, OFF};
use powerboard::power::SHUTDOWN_DISABLED_REASON;

use crate::mock_gateway::{
    GatewayCall, MockGateway, RecordingPowerOff, RecordingSink, open_service, service_with,
};

type SimService = PowerboardService<SimulatedBoard, RecordingPowerOff, RecordingSink>;

fn simulated_service() -> SimService {
    PowerboardService::new(
        SimulatedBoard::new(),
        RecordingPowerOff::default(),
        RecordingSink::new(),
        &SystemConfig::default(),
    )
}

#[test]
fn open_failure_is_a_typed_error() {
    let service = service_with(MockGateway::refusing_open());

    assert_eq!(service.open_bus(), Err(Error::Gateway(GatewayError::OpenFailed)));
    assert!(!service.is_bus_open());
    assert_eq!(
        service.bus().transact(|g| g.calls.clone()),
        vec![GatewayCall::Open("/dev/i2c-1".into())]
    );
}

#[test]
fn never_opened_bus_reports_everything_invalid() {
    let service = service_with(MockGateway::refusing_open());
    let _ = service.open_bus();

    for _ in 0..3 {
        let errors = service.get_esc_error_log();
        let data = service.get_esc_data_log();
        let info = service.get_esc_device_info();
        let resistance = service.get_esc_resistance();
        let board = service.get_board_device_info();

        assert!(errors.iter().all(|r| !r.valid && r.value == Default::default()));
        assert!(data.iter().all(|r| !r.valid && r.value == Default::default()));
        assert!(info.iter().all(|r| !r.valid && r.value == Default::default()));
        assert!(resistance.iter().all(|r| !r.valid && r.value == Default::default()));
        assert!(!board.valid && board.value == Default::default());
    }
    assert_eq!(service.bus().transact(|g| g.calls.len()), 1, "only the open attempt");
}

#[test]
fn getters_refresh_their_category() {
    let service = open_service();

    let info = service.get_esc_device_info();

    assert!(info.iter().all(|r| r.valid));
    assert_eq!(service.bus().transact(|g| g.calls.len()), 4);
    assert!(service.get_board_device_info().valid);
    assert!(service.telemetry().board_info().valid);
}

#[test]
fn refresh_command_reads_every_category() {
    let service = open_service();

    assert_eq!(service.handle_command(AppCommand::RefreshTelemetry), CommandReply::Ok);

    assert_eq!(service.bus().transact(|g| g.calls.len()), 17);
    assert!(service.telemetry().resistance().iter().all(|r| r.valid));
}

#[test]
fn led_colour_command_reaches_the_bus() {
    let service = open_service();

    let reply = service.handle_command(AppCommand::SetLedColor {
        count: 5,
        colour: COLOUR_WHITE,
        additional: Some(2),
    });

    assert!(reply.is_ok());
    let calls = service.bus().transact(|g| g.calls.clone());
    assert_eq!(calls[0], GatewayCall::SetLedCounts(LedCounts::new([5, 5, 5, 5, 2])));
    assert_eq!(calls.last(), Some(&GatewayCall::Commit));
    assert_eq!(service.with_leds(|l| l.channels().counts()), LedCounts::new([5, 5, 5, 5, 2]));
}

#[test]
fn custom_effect_command_arms_engine_and_fast_tick_renders() {
    let service = open_service();

    let reply = service.handle_command(AppCommand::SetLedCustomEffect {
        kind: EffectKind::Alternating.code(),
        kill_predefined: true,
    });

    assert_eq!(reply, CommandReply::Ok);
    assert_eq!(service.sink().count(|e| *e == AppEvent::LedEffectArmed(EffectKind::Alternating)), 1);
    assert!(service.fast_tick(100));
    assert!(!service.fast_tick(101));
    assert!(service.bus().transact(|g| g
        .calls
        .iter()
        .any(|c| matches!(c, GatewayCall::WriteLedBuffer(LedChannel::RearLeft, _)))));
}

#[test]
fn unknown_effect_code_is_rejected() {
    let service = open_service();

    let reply = service.handle_command(AppCommand::SetLedCustomEffect { kind: 42, kill_predefined: true });

    assert!(matches!(reply, CommandReply::Failed(CommandError::InvalidArgument(_))));
    assert!(service.bus().transact(|g| g.calls.is_empty()));
    assert!(!service.with_leds(|l| l.engine().is_running()));
}

#[test]
fn failed_commands_are_reported_once() {
    let service = service_with(MockGateway::new());

    let reply = service.handle_command(AppCommand::SetLedColor {
        count: 5,
        colour: COLOUR_WHITE,
        additional: None,
    });

    assert_eq!(reply, CommandReply::Failed(CommandError::Gateway(GatewayError::NotOpen)));
    assert_eq!(
        service.sink().count(|e| *e
            == AppEvent::CommandFailed {
                command: "set_led_color",
                error: CommandError::Gateway(GatewayError::NotOpen),
            }),
        1
    );
}

#[test]
fn shutdown_command_needs_confirmation() {
    let service = open_service();

    assert_eq!(
        service.handle_command(AppCommand::RequestShutdown { confirm: false }),
        CommandReply::Disabled(SHUTDOWN_DISABLED_REASON)
    );
    assert!(service.bus().transact(|g| g.writes().is_empty()));
    assert_eq!(service.sink().count(|e| matches!(e, AppEvent::CommandFailed { .. })), 0);

    assert_eq!(service.handle_command(AppCommand::RequestShutdown { confirm: true }), CommandReply::Ok);
    assert_eq!(service.bus().transact(|g| g.writes()), vec![GatewayCall::TurnOff]);
}

#[test]
fn open_bus_tells_the_board_its_led_counts() {
    let service = service_with(MockGateway::new());

    service.open_bus().unwrap();

    assert_eq!(
        service.bus().transact(|g| g.calls.clone()),
        vec![GatewayCall::Open("/dev/i2c-1".into()), GatewayCall::SetLedCounts(LedCounts::uniform(8, 0))]
    );
    assert_eq!(service.with_leds(|l| l.board_counts()), Some(LedCounts::uniform(8, 0)));
}

#[test]
fn failed_count_sync_does_not_fail_the_open() {
    let mut gateway = MockGateway::new();
    gateway.fail_set_counts = true;
    let service = service_with(gateway);

    assert_eq!(service.open_bus(), Ok(()));
    assert!(service.is_bus_open());
    assert_eq!(service.with_leds(|l| l.board_counts()), None);
}

#[test]
fn blank_effect_renders_on_simulated_board() {
    let service = simulated_service();
    service.open_bus().unwrap();
    service.set_led_custom_effect(EffectKind::None.code(), false).unwrap();

    assert!(service.fast_tick(0));

    assert_eq!(service.sink().count(|e| matches!(e, AppEvent::LedWriteFailed(_))), 0);
    assert_eq!(service.bus().transact(|g| g.led_buffer(LedChannel::RearLeft).to_vec()), vec![OFF; 8]);
}

#[test]
fn alternating_armed_before_open_starts_once_bus_opens() {
    let service = simulated_service();
    service.set_led_custom_effect(EffectKind::Alternating.code(), false).unwrap();

    assert!(!service.fast_tick(0));
    service.open_bus().unwrap();
    let written: Vec<u64> = (1..17).filter(|&t| service.fast_tick(t)).collect();

    assert_eq!(written, vec![4, 8, 12, 16]);
    assert_eq!(service.bus().transact(|g| g.led_counts()), LedCounts::uniform(8, 0));
    assert_eq!(service.sink().count(|e| *e == AppEvent::LedWriteRecovered), 1);
}
