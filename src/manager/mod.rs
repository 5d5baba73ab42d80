//! Owner of the active syslog delivery pipeline.
//!
//! [`SyslogManager`] holds at most one active delivery and swaps it
//! atomically on reconfiguration. Publishers clone the current delivery
//! under a short read lock and perform all network I/O after releasing it.

mod delivery;


use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::{
    config::{ConfigError, SyslogConfig, Transport},
    log_record::LogRecord,
    rate_limited_warner::RateLimitedWarner,
};

use delivery::ActiveDelivery;
pub use delivery::INTERNAL_LOGGER;

/// Observable state of a [`SyslogManager`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagerState {
    /// No collector configured; publishing is a no-op.
    Unconfigured,
    /// A delivery pipeline is installed.
    Active { target: String, transport: Transport },
}

/// Process-local handle on the syslog delivery pipeline.
///
/// The host creates one manager and shares it with every logging call site.
#[derive(Debug, Default)]
pub struct SyslogManager {
    active: RwLock<Option<Arc<ActiveDelivery>>>,
    reconfigure_lock: Mutex<()>,
    warner: RateLimitedWarner,
}

impl SyslogManager {
    /// Create an unconfigured manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager and install `config`.
    pub fn init(config: SyslogConfig) -> Result<Self, ConfigError> {
        let manager = Self::new();
        manager.reconfigure(config)?;
        Ok(manager)
    }

    /// Replace the active configuration.
    ///
    /// A disabled configuration retires the current delivery. Otherwise the
    /// new pipeline sends its confirmation record before any publisher can
    /// observe it, then replaces the previous pipeline. The previous sender
    /// closes once publishers already using it have finished. On error the
    /// previous pipeline stays in force.
    pub fn reconfigure(&self, config: SyslogConfig) -> Result<(), ConfigError> {
        let _guard = self.reconfigure_lock.lock();
        if !config.is_enabled() {
            let previous = self.active.write().take();
            if let Some(previous) = previous {
                previous.retire();
            }
            log::debug!("syslog delivery not configured");
            return Ok(());
        }

        let delivery = Arc::new(ActiveDelivery::new(config)?);
        let confirmation = delivery.confirm(&self.warner);
        let previous = self.active.write().replace(delivery);
        log::info!("{confirmation}");
        if let Some(previous) = previous {
            previous.retire();
        }
        Ok(())
    }

    /// Retire the active delivery and return to the unconfigured state.
    pub fn shutdown(&self) {
        let _guard = self.reconfigure_lock.lock();
        let previous = self.active.write().take();
        if let Some(previous) = previous {
            previous.retire();
        }
        self.warner.flush(delivery::warn_dropped);
    }

    /// Deliver `record` through the active pipeline.
    ///
    /// Records below the configured minimum level are ignored. Delivery
    /// failures are logged locally and never reach the caller.
    pub fn publish(&self, record: &LogRecord) {
        if let Some(delivery) = self.snapshot() {
            delivery.publish(record, &self.warner);
        }
    }

    pub fn state(&self) -> ManagerState {
        match self.snapshot() {
            None => ManagerState::Unconfigured,
            Some(delivery) => ManagerState::Active {
                target: delivery.sender.target(),
                transport: delivery.sender.transport(),
            },
        }
    }

    /// Configuration of the active pipeline, if any.
    pub fn active_config(&self) -> Option<SyslogConfig> {
        self.snapshot().map(|delivery| delivery.config.clone())
    }

    fn snapshot(&self) -> Option<Arc<ActiveDelivery>> {
        self.active.read().clone()
    }
}

impl Drop for SyslogManager {
    fn drop(&mut self) {
        if let Some(previous) = self.active.get_mut().take() {
            previous.retire();
        }
    }
}
