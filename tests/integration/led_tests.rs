//! LED controller: tick-driven effects and direct colour commands.

use powerboard::app::events::AppEvent;
use powerboard::bus::Bus;
use powerboard::error::{CommandError, GatewayError};
use powerboard::led::effects::{FRONT_TEMPLATES, REAR_TEMPLATES};
use powerboard::led::{
    COLOUR_GREEN, COLOUR_RED, ChannelColours, EffectKind, LedChannel, LedController, LedCounts, OFF,
    PredefinedEffect,
};

use crate::mock_gateway::{GatewayCall, MockGateway, RecordingSink};

fn open_bus() -> Bus<MockGateway> {
    let bus = Bus::new(MockGateway::new());
    bus.open("/dev/i2c-1").unwrap();
    bus.transact(|g| g.calls.clear());
    bus
}

fn commits(bus: &Bus<MockGateway>) -> usize {
    bus.transact(|g| g.count(|c| *c == GatewayCall::Commit))
}

fn predefined() -> PredefinedEffect {
    PredefinedEffect {
        colours: [COLOUR_RED, COLOUR_GREEN, COLOUR_RED, COLOUR_GREEN],
        on_cycles: 3,
        off_cycles: 7,
        kind: 2,
        persist: false,
    }
}

// ── Tick-driven effects ───────────────────────────────────────

#[test]
fn alternating_writes_only_on_flip_ticks() {
    let bus = open_bus();
    let sink = RecordingSink::new();
    let mut leds = LedController::new(LedCounts::uniform(4, 0));
    leds.set_custom_effect(&bus, EffectKind::Alternating, false).unwrap();

    let written: Vec<u64> = (0..17).filter(|&t| leds.tick(t, &bus, &sink)).collect();

    assert_eq!(written, vec![0, 4, 8, 12, 16]);
    assert_eq!(commits(&bus), 5);
}

#[test]
fn alternating_first_frame_resizes_and_paints_all_primary() {
    let bus = open_bus();
    let sink = RecordingSink::new();
    let mut leds = LedController::new(LedCounts::uniform(4, 2));
    leds.set_custom_effect(&bus, EffectKind::Alternating, false).unwrap();

    assert!(leds.tick(0, &bus, &sink));

    let calls = bus.transact(|g| g.calls.clone());
    assert_eq!(calls[0], GatewayCall::SetLedCounts(LedCounts::new([8, 8, 8, 8, 2])));
    assert!(calls.contains(&GatewayCall::WriteLedBuffer(LedChannel::FrontLeft, FRONT_TEMPLATES[0].to_vec())));
    assert!(calls.contains(&GatewayCall::WriteLedBuffer(LedChannel::RearRight, REAR_TEMPLATES[0].to_vec())));
    assert_eq!(calls.last(), Some(&GatewayCall::Commit));
    assert_eq!(leds.channels().buffer(LedChannel::FrontRight), &FRONT_TEMPLATES[0][..]);
}

#[test]
fn front_only_flip_leaves_rear_alone() {
    let bus = open_bus();
    let sink = RecordingSink::new();
    let mut leds = LedController::new(LedCounts::uniform(8, 0));
    leds.set_custom_effect(&bus, EffectKind::Alternating, false).unwrap();
    leds.tick(0, &bus, &sink);
    bus.transact(|g| g.calls.clear());

    assert!(leds.tick(4, &bus, &sink));

    let calls = bus.transact(|g| g.calls.clone());
    assert_eq!(
        calls,
        vec![
            GatewayCall::WriteLedBuffer(LedChannel::FrontLeft, FRONT_TEMPLATES[1].to_vec()),
            GatewayCall::WriteLedBuffer(LedChannel::FrontRight, FRONT_TEMPLATES[1].to_vec()),
            GatewayCall::Commit,
        ]
    );
    assert_eq!(leds.channels().buffer(LedChannel::RearLeft), &REAR_TEMPLATES[0][..]);
}

#[test]
fn rearm_restarts_phase_at_arming_tick() {
    let bus = open_bus();
    let sink = RecordingSink::new();
    let mut leds = LedController::new(LedCounts::uniform(8, 0));
    leds.set_custom_effect(&bus, EffectKind::Alternating, false).unwrap();
    for t in 0..6 {
        leds.tick(t, &bus, &sink);
    }

    leds.set_custom_effect(&bus, EffectKind::Alternating, false).unwrap();
    bus.transact(|g| g.calls.clear());
    let written: Vec<u64> = (6..15).filter(|&t| leds.tick(t, &bus, &sink)).collect();

    assert_eq!(written, vec![6, 10, 14]);
    let first = bus.transact(|g| g.calls[1].clone());
    assert_eq!(first, GatewayCall::WriteLedBuffer(LedChannel::FrontLeft, FRONT_TEMPLATES[0].to_vec()));
    assert_eq!(leds.channels().buffer(LedChannel::RearLeft), &REAR_TEMPLATES[1][..]);
}

#[test]
fn blank_effect_writes_once() {
    let bus = open_bus();
    let sink = RecordingSink::new();
    let mut leds = LedController::new(LedCounts::uniform(3, 5));
    leds.set_solid_colour(&bus, 3, COLOUR_RED, None).unwrap();
    leds.set_custom_effect(&bus, EffectKind::None, false).unwrap();
    bus.transact(|g| g.calls.clear());

    let written: Vec<u64> = (0..30).filter(|&t| leds.tick(t, &bus, &sink)).collect();

    assert_eq!(written, vec![0]);
    let writes = bus.transact(|g| g.count(|c| matches!(c, GatewayCall::WriteLedBuffer(..))));
    assert_eq!(writes, 4);
    for channel in LedChannel::PRIMARY {
        assert_eq!(leds.channels().buffer(channel), &[OFF; 3][..]);
    }
}

#[test]
fn disarmed_engine_is_silent() {
    let bus = open_bus();
    let sink = RecordingSink::new();
    let mut leds = LedController::new(LedCounts::uniform(8, 0));

    assert!((0..40).all(|t| !leds.tick(t, &bus, &sink)));
    assert!(bus.transact(|g| g.calls.is_empty()));
}

#[test]
fn tick_write_failure_is_reported_once_per_edge() {
    let bus = open_bus();
    let sink = RecordingSink::new();
    let mut leds = LedController::new(LedCounts::uniform(8, 0));
    leds.set_custom_effect(&bus, EffectKind::Alternating, false).unwrap();
    bus.transact(|g| g.fail_led_writes = true);

    for t in 0..20 {
        leds.tick(t, &bus, &sink);
    }
    assert_eq!(sink.count(|e| *e == AppEvent::LedWriteFailed(GatewayError::WriteFailed)), 1);
    assert_eq!(leds.channels().buffer(LedChannel::FrontLeft), &[OFF; 8][..], "host copy untouched");

    bus.transact(|g| g.fail_led_writes = false);
    for t in 20..40 {
        leds.tick(t, &bus, &sink);
    }
    assert_eq!(sink.count(|e| *e == AppEvent::LedWriteRecovered), 1);
}

// ── Direct commands ───────────────────────────────────────────

#[test]
fn solid_colour_disarms_and_writes_primary() {
    let bus = open_bus();
    let mut leds = LedController::new(LedCounts::uniform(8, 4));
    leds.set_custom_effect(&bus, EffectKind::Alternating, false).unwrap();

    leds.set_solid_colour(&bus, 6, COLOUR_GREEN, None).unwrap();

    assert!(!leds.engine().is_running());
    assert_eq!(leds.channels().counts(), LedCounts::new([6, 6, 6, 6, 4]));
    assert_eq!(leds.channels().buffer(LedChannel::RearLeft), &[COLOUR_GREEN; 6][..]);
    assert_eq!(leds.channels().buffer(LedChannel::Additional), &[OFF; 4][..]);
    let additional_writes = bus.transact(|g| {
        g.count(|c| matches!(c, GatewayCall::WriteLedBuffer(LedChannel::Additional, _)))
    });
    assert_eq!(additional_writes, 0);
    assert_eq!(commits(&bus), 1);
}

#[test]
fn solid_colour_with_additional_strip() {
    let bus = open_bus();
    let mut leds = LedController::new(LedCounts::uniform(8, 0));

    leds.set_solid_colour(&bus, 8, COLOUR_RED, Some(12)).unwrap();

    assert_eq!(leds.channels().buffer(LedChannel::Additional), &[COLOUR_RED; 12][..]);
    assert!(bus.transact(|g| g
        .calls
        .contains(&GatewayCall::WriteLedBuffer(LedChannel::Additional, vec![COLOUR_RED; 12]))));
}

#[test]
fn oversized_count_is_rejected_before_bus() {
    let bus = open_bus();
    let mut leds = LedController::new(LedCounts::uniform(8, 0));

    let err = leds.set_solid_colour(&bus, 200, COLOUR_RED, None).unwrap_err();

    assert!(matches!(err, CommandError::InvalidArgument(_)));
    assert!(bus.transact(|g| g.calls.is_empty()));
}

#[test]
fn custom_colours_set_counts_from_lengths() {
    let bus = open_bus();
    let mut leds = LedController::new(LedCounts::uniform(8, 0));
    let mut colours: ChannelColours = Default::default();
    colours[LedChannel::FrontLeft.index()].extend_from_slice(&[COLOUR_RED; 3]).unwrap();
    colours[LedChannel::Additional.index()].extend_from_slice(&[COLOUR_GREEN; 10]).unwrap();

    leds.set_custom_colours(&bus, &colours).unwrap();

    assert_eq!(leds.channels().counts(), LedCounts::new([3, 0, 0, 0, 10]));
    let calls = bus.transact(|g| g.calls.clone());
    assert_eq!(calls[0], GatewayCall::SetLedCounts(LedCounts::new([3, 0, 0, 0, 10])));
    assert_eq!(calls.iter().filter(|c| matches!(c, GatewayCall::WriteLedBuffer(..))).count(), 5);
}

#[test]
fn direct_commands_on_closed_bus_change_nothing() {
    let bus = Bus::new(MockGateway::new());
    let mut leds = LedController::new(LedCounts::uniform(8, 2));
    let before = leds.channels().clone();
    let colours: ChannelColours = Default::default();

    let results = [
        leds.set_solid_colour(&bus, 4, COLOUR_RED, Some(4)),
        leds.set_custom_colours(&bus, &colours),
        leds.set_predefined_effect(&bus, &predefined()),
    ];

    for result in results {
        assert_eq!(result, Err(CommandError::Gateway(GatewayError::NotOpen)));
    }
    assert_eq!(leds.channels(), &before);
    assert!(bus.transact(|g| g.calls.is_empty()));
}

#[test]
fn predefined_effect_uploads_then_enables() {
    let bus = open_bus();
    let mut leds = LedController::new(LedCounts::uniform(8, 0));
    leds.set_custom_effect(&bus, EffectKind::Alternating, false).unwrap();

    leds.set_predefined_effect(&bus, &predefined()).unwrap();

    assert!(!leds.engine().is_running());
    assert_eq!(
        bus.transact(|g| g.calls.clone()),
        vec![GatewayCall::SetPredefined(predefined()), GatewayCall::EnablePredefined(true)]
    );
}

#[test]
fn custom_effect_kills_predefined_only_when_asked() {
    let bus = open_bus();
    let mut leds = LedController::new(LedCounts::uniform(8, 0));

    leds.set_custom_effect(&bus, EffectKind::Alternating, false).unwrap();
    assert!(bus.transact(|g| g.calls.is_empty()));

    leds.set_custom_effect(&bus, EffectKind::Alternating, true).unwrap();
    assert_eq!(bus.transact(|g| g.calls.clone()), vec![GatewayCall::EnablePredefined(false)]);
    assert!(leds.engine().is_running());
    assert_eq!(leds.engine().kind(), EffectKind::Alternating);
}

#[test]
fn resize_is_resent_after_failed_first_frame() {
    let bus = open_bus();
    let sink = RecordingSink::new();
    let mut leds = LedController::new(LedCounts::uniform(4, 1));
    leds.set_custom_effect(&bus, EffectKind::Alternating, false).unwrap();
    bus.transact(|g| g.fail_set_counts = true);

    assert!(!leds.tick(0, &bus, &sink));
    assert_eq!(leds.channels().counts(), LedCounts::uniform(4, 1));
    assert_eq!(leds.board_counts(), None);

    bus.transact(|g| {
        g.fail_set_counts = false;
        g.calls.clear();
    });
    let written: Vec<u64> = (1..9).filter(|&t| leds.tick(t, &bus, &sink)).collect();

    assert_eq!(written, vec![4, 8]);
    let calls = bus.transact(|g| g.calls.clone());
    assert_eq!(calls[0], GatewayCall::SetLedCounts(LedCounts::new([8, 8, 8, 8, 1])));
    for channel in LedChannel::PRIMARY {
        assert!(calls.iter().any(|c| matches!(c, GatewayCall::WriteLedBuffer(ch, b) if *ch == channel && b.len() == 8)));
    }
    assert_eq!(leds.channels().counts(), LedCounts::new([8, 8, 8, 8, 1]));
    assert_eq!(leds.board_counts(), Some(LedCounts::new([8, 8, 8, 8, 1])));
    assert_eq!(sink.count(|e| *e == AppEvent::LedWriteRecovered), 1);
}

#[test]
fn blank_effect_tells_an_unsynced_board_its_counts() {
    let bus = open_bus();
    let sink = RecordingSink::new();
    let mut leds = LedController::new(LedCounts::uniform(6, 0));
    leds.set_custom_effect(&bus, EffectKind::None, false).unwrap();

    assert!(leds.tick(0, &bus, &sink));

    let calls = bus.transact(|g| g.calls.clone());
    assert_eq!(calls[0], GatewayCall::SetLedCounts(LedCounts::uniform(6, 0)));
    assert_eq!(calls.last(), Some(&GatewayCall::Commit));
}

#[test]
fn synced_counts_are_not_resent() {
    let bus = open_bus();
    let sink = RecordingSink::new();
    let mut leds = LedController::new(LedCounts::uniform(6, 0));
    leds.sync_counts(&bus).unwrap();
    leds.set_custom_effect(&bus, EffectKind::None, false).unwrap();
    bus.transact(|g| g.calls.clear());

    assert!(leds.tick(0, &bus, &sink));

    assert_eq!(bus.transact(|g| g.count(|c| matches!(c, GatewayCall::SetLedCounts(_)))), 0);
}
