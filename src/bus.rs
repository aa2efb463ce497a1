//! Exclusive access to the shared hardware bus.
//!
//! Telemetry refreshes, LED writes and shutdown writes all go through one
//! [`Bus`].  A single `embassy-sync` blocking mutex guards the gateway so
//! only one transaction is in flight at a time.
//!
//! Closures passed to [`Bus::transact`] must not call back into the same
//! `Bus`; the inner `RefCell` would panic on the nested borrow.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::ports::DeviceGateway;
use crate::error::GatewayError;

pub struct Bus<G> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<G>>,
}

impl<G: DeviceGateway> Bus<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(gateway)),
        }
    }

    /// Run `f` with exclusive access to the gateway.
    pub fn transact<R>(&self, f: impl FnOnce(&mut G) -> R) -> R {
        self.inner.lock(|cell| {
            let mut gateway = cell.borrow_mut();
            f(&mut *gateway)
        })
    }

    /// Run `f` only if the transport is open; otherwise fail fast with
    /// [`GatewayError::NotOpen`] without touching the device.
    pub fn transact_open<R>(
        &self,
        f: impl FnOnce(&mut G) -> Result<R, GatewayError>,
    ) -> Result<R, GatewayError> {
        self.transact(|g| if g.is_open() { f(g) } else { Err(GatewayError::NotOpen) })
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().is_open())
    }

    pub fn open(&self, address: &str) -> Result<(), GatewayError> {
        self.transact(|g| g.open(address))
    }

    pub fn close(&self) {
        self.transact(|g| g.close());
    }
}
