//! Last-known ESC and board telemetry with per-category validity.
//!
//! Each category (error log, data log, device info, resistance, board info)
//! keeps its own values and its own [`Validity`] bitset.  A refresh pass
//! always starts by clearing the whole bitset, then re-sets the bit of every
//! unit whose read succeeds.  A failed read leaves the previous value in
//! place (never zeroed) with its bit cleared, so callers can tell stale data
//! from fresh.
//!
//! ```text
//!  refresh_all:  error logs → data logs → device info → resistance → board info
//!
//!  per category:  clear bits ─▶ bus open? ──no──▶ done (all invalid)
//!                                   │yes
//!                                   ▼
//!                  for unit: read ─ok─▶ store value, set bit, emit Telemetry
//!                                └err─▶ keep value, emit ReadFailed
//! ```
//!
//! Categories are guarded independently so a reader never observes a torn
//! entry while a refresh is writing.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::events::{AppEvent, TelemetryRecord};
use crate::app::ports::{DeviceGateway, EventSink};
use crate::bus::Bus;
use crate::error::GatewayError;
use crate::model::{DataLog, DeviceInfo, ESC_COUNT, ErrorLog, Resistance};

// ───────────────────────────────────────────────────────────────
// Identity
// ───────────────────────────────────────────────────────────────

/// Which physical unit a reading belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// ESC by logical id.
    Esc(u8),
    Board,
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Esc(id) => write!(f, "ESC{id}"),
            Self::Board => write!(f, "BOARD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    ErrorLog,
    DataLog,
    DeviceInfo,
    Resistance,
    BoardInfo,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::ErrorLog => "ERROR LOG",
            Self::DataLog => "DATA",
            Self::DeviceInfo | Self::BoardInfo => "INFO",
            Self::Resistance => "RESISTANCE",
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Validity bitset
// ───────────────────────────────────────────────────────────────

/// One bit per unit; set only while the cached value reflects the most
/// recent successful read.  Supports up to 8 units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validity<const N: usize> {
    bits: u8,
}

impl<const N: usize> Validity<N> {
    const MASK: u8 = if N >= 8 { u8::MAX } else { (1u8 << N) - 1 };

    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn clear_all(&mut self) {
        self.bits = 0;
    }

    pub fn set(&mut self, index: usize) {
        debug_assert!(index < N, "unit index out of range: {index}");
        self.bits |= (1u8 << index) & Self::MASK;
    }

    pub fn is_set(&self, index: usize) -> bool {
        index < N && self.bits & (1u8 << index) != 0
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }
}

// ───────────────────────────────────────────────────────────────
// Per-category storage
// ───────────────────────────────────────────────────────────────

/// Cached value of one unit together with its validity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading<T> {
    pub unit: Unit,
    pub value: T,
    pub valid: bool,
}

#[derive(Clone, Copy)]
struct Entries<T: Copy, const N: usize> {
    values: [T; N],
    validity: Validity<N>,
}

/// Values and validity of one category, updated atomically.
pub struct CategoryCache<T: Copy, const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, Cell<Entries<T, N>>>,
}

impl<T: Copy, const N: usize> CategoryCache<T, N> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Mutex::new(Cell::new(Entries {
                values: [initial; N],
                validity: Validity::new(),
            })),
        }
    }

    /// Mark every unit invalid; values are kept.
    fn invalidate(&self) {
        self.inner.lock(|cell| {
            let mut entries = cell.get();
            entries.validity.clear_all();
            cell.set(entries);
        });
    }

    fn store(&self, index: usize, value: T) {
        self.inner.lock(|cell| {
            let mut entries = cell.get();
            entries.values[index] = value;
            entries.validity.set(index);
            cell.set(entries);
        });
    }

    /// Consistent copy of all values and their validity.
    pub fn snapshot(&self) -> ([T; N], Validity<N>) {
        let entries = self.inner.lock(Cell::get);
        (entries.values, entries.validity)
    }
}

// ───────────────────────────────────────────────────────────────
// TelemetryCache
// ───────────────────────────────────────────────────────────────

/// Last-known telemetry of the four ESCs and the power board.
pub struct TelemetryCache {
    esc_base_id: u8,
    error_logs: CategoryCache<ErrorLog, ESC_COUNT>,
    data_logs: CategoryCache<DataLog, ESC_COUNT>,
    device_info: CategoryCache<DeviceInfo, ESC_COUNT>,
    resistance: CategoryCache<Resistance, ESC_COUNT>,
    board_info: CategoryCache<DeviceInfo, 1>,
}

impl TelemetryCache {
    /// Empty cache; everything starts default-valued and invalid.
    pub fn new(esc_base_id: u8) -> Self {
        Self {
            esc_base_id,
            error_logs: CategoryCache::new(ErrorLog::default()),
            data_logs: CategoryCache::new(DataLog::default()),
            device_info: CategoryCache::new(DeviceInfo::default()),
            resistance: CategoryCache::new(Resistance::default()),
            board_info: CategoryCache::new(DeviceInfo::default()),
        }
    }

    /// Logical id of the ESC in `slot`.
    pub fn esc_id(&self, slot: usize) -> u8 {
        self.esc_base_id + slot as u8
    }

    // ── Refresh ───────────────────────────────────────────────

    /// Refresh every category in the fixed order.
    pub fn refresh_all<G: DeviceGateway>(&self, bus: &Bus<G>, sink: &impl EventSink) {
        self.refresh_error_logs(bus, sink);
        self.refresh_data_logs(bus, sink);
        self.refresh_device_info(bus, sink);
        self.refresh_resistance(bus, sink);
        self.refresh_board_info(bus, sink);
    }

    pub fn refresh_error_logs<G: DeviceGateway>(&self, bus: &Bus<G>, sink: &impl EventSink) {
        self.refresh_escs(
            &self.error_logs,
            Category::ErrorLog,
            bus,
            sink,
            |g, id| g.read_error_log(id),
            |esc_id, log| TelemetryRecord::EscErrorLog { esc_id, log },
        );
    }

    pub fn refresh_data_logs<G: DeviceGateway>(&self, bus: &Bus<G>, sink: &impl EventSink) {
        self.refresh_escs(
            &self.data_logs,
            Category::DataLog,
            bus,
            sink,
            |g, id| g.read_data_log(id),
            |esc_id, data| TelemetryRecord::EscDataLog { esc_id, data },
        );
    }

    pub fn refresh_device_info<G: DeviceGateway>(&self, bus: &Bus<G>, sink: &impl EventSink) {
        self.refresh_escs(
            &self.device_info,
            Category::DeviceInfo,
            bus,
            sink,
            |g, id| g.read_device_info(id),
            |esc_id, info| TelemetryRecord::EscDeviceInfo { esc_id, info },
        );
    }

    pub fn refresh_resistance<G: DeviceGateway>(&self, bus: &Bus<G>, sink: &impl EventSink) {
        self.refresh_escs(
            &self.resistance,
            Category::Resistance,
            bus,
            sink,
            |g, id| g.read_resistance(id),
            |esc_id, resistance| TelemetryRecord::EscResistance { esc_id, resistance },
        );
    }

    pub fn refresh_board_info<G: DeviceGateway>(&self, bus: &Bus<G>, sink: &impl EventSink) {
        self.board_info.invalidate();
        if !bus.is_open() {
            sink.emit(&AppEvent::RefreshSkipped(Category::BoardInfo));
            return;
        }

        match bus.transact_open(|g| g.read_board_info()) {
            Ok(info) => {
                self.board_info.store(0, info);
                sink.emit(&AppEvent::Telemetry(TelemetryRecord::BoardInfo(info)));
            }
            Err(error) => sink.emit(&AppEvent::ReadFailed {
                unit: Unit::Board,
                category: Category::BoardInfo,
                error,
            }),
        }
    }

    /// Shared per-ESC refresh loop.  A failing unit never stops the pass.
    fn refresh_escs<G, T>(
        &self,
        cache: &CategoryCache<T, ESC_COUNT>,
        category: Category,
        bus: &Bus<G>,
        sink: &impl EventSink,
        read: impl Fn(&mut G, u8) -> Result<T, GatewayError>,
        record: impl Fn(u8, T) -> TelemetryRecord,
    ) where
        G: DeviceGateway,
        T: Copy,
    {
        cache.invalidate();
        if !bus.is_open() {
            sink.emit(&AppEvent::RefreshSkipped(category));
            return;
        }

        for slot in 0..ESC_COUNT {
            let esc_id = self.esc_id(slot);
            match bus.transact_open(|g| read(g, esc_id)) {
                Ok(value) => {
                    cache.store(slot, value);
                    sink.emit(&AppEvent::Telemetry(record(esc_id, value)));
                }
                Err(error) => sink.emit(&AppEvent::ReadFailed {
                    unit: Unit::Esc(esc_id),
                    category,
                    error,
                }),
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn error_logs(&self) -> [Reading<ErrorLog>; ESC_COUNT] {
        self.esc_readings(&self.error_logs)
    }

    pub fn data_logs(&self) -> [Reading<DataLog>; ESC_COUNT] {
        self.esc_readings(&self.data_logs)
    }

    pub fn device_info(&self) -> [Reading<DeviceInfo>; ESC_COUNT] {
        self.esc_readings(&self.device_info)
    }

    pub fn resistance(&self) -> [Reading<Resistance>; ESC_COUNT] {
        self.esc_readings(&self.resistance)
    }

    pub fn board_info(&self) -> Reading<DeviceInfo> {
        let (values, validity) = self.board_info.snapshot();
        Reading {
            unit: Unit::Board,
            value: values[0],
            valid: validity.is_set(0),
        }
    }

    fn esc_readings<T: Copy>(&self, cache: &CategoryCache<T, ESC_COUNT>) -> [Reading<T>; ESC_COUNT] {
        let (values, validity) = cache.snapshot();
        core::array::from_fn(|slot| Reading {
            unit: Unit::Esc(self.esc_id(slot)),
            value: values[slot],
            valid: validity.is_set(slot),
        })
    }
}
