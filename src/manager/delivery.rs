//! The live configuration, sender and formatter triple.

use std::{
    cell::Cell,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    config::{ConfigError, SyslogConfig},
    formatter::SyslogFormatter,
    level::Level,
    log_record::LogRecord,
    rate_limited_warner::RateLimitedWarner,
    severity::passes_filter,
    transport::TransportSender,
};

/// Logger name stamped on records the manager emits itself.
pub const INTERNAL_LOGGER: &str = "femtosyslog";

thread_local! {
    static IN_DELIVERY: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as delivering a record.
///
/// A host may route the `log` facade back into the manager. Records
/// published while a scope is live on the same thread are dropped, so the
/// manager's own diagnostics can never feed back into delivery.
struct DeliveryScope;

impl DeliveryScope {
    fn enter() -> Option<Self> {
        IN_DELIVERY.with(|active| (!active.replace(true)).then_some(DeliveryScope))
    }
}

impl Drop for DeliveryScope {
    fn drop(&mut self) {
        IN_DELIVERY.with(|active| active.set(false));
    }
}

/// One installed delivery pipeline. Immutable apart from the sender's own
/// connection state.
#[derive(Debug)]
pub(super) struct ActiveDelivery {
    pub(super) config: SyslogConfig,
    pub(super) sender: TransportSender,
    formatter: SyslogFormatter,
    format_error_logged: AtomicBool,
}

impl ActiveDelivery {
    pub(super) fn new(config: SyslogConfig) -> Result<Self, ConfigError> {
        let sender = TransportSender::from_config(&config)?;
        let formatter = SyslogFormatter::new(
            config.format(),
            config.app_name(),
            config.message_hostname(),
            config.facility(),
        );
        Ok(Self {
            config,
            sender,
            formatter,
            format_error_logged: AtomicBool::new(false),
        })
    }

    pub(super) fn confirmation_message(&self) -> String {
        format!(
            "Configured to output log messages to syslog server {} on transport {}",
            self.sender.target(),
            self.config.transport().label()
        )
    }

    /// Send the activation notice, ignoring the level filter.
    pub(super) fn confirm(&self, warner: &RateLimitedWarner) -> String {
        let message = self.confirmation_message();
        let record = LogRecord::new(INTERNAL_LOGGER, Level::Info, &message);
        self.deliver(&record, warner);
        message
    }

    /// Filter, format and send `record`. Failures are reported locally and
    /// the record is dropped.
    pub(super) fn publish(&self, record: &LogRecord, warner: &RateLimitedWarner) {
        if passes_filter(record.level, self.config.min_level()) {
            self.deliver(record, warner);
        }
    }

    fn deliver(&self, record: &LogRecord, warner: &RateLimitedWarner) {
        let Some(_scope) = DeliveryScope::enter() else {
            return;
        };
        let bytes = match self.formatter.format(record) {
            Ok(bytes) => bytes,
            Err(err) => {
                if !self.format_error_logged.swap(true, Ordering::Relaxed) {
                    log::error!("cannot format syslog record for {}: {err}", self.sender.target());
                }
                drop_record(warner);
                return;
            }
        };
        if let Err(err) = self.sender.send(&bytes) {
            log::debug!("dropping syslog record: {err}");
            drop_record(warner);
        }
    }

    /// Release the manager's handle on a replaced delivery.
    ///
    /// Publishers that snapshotted this delivery before the swap finish
    /// their sends; the sender closes when the last snapshot is dropped.
    pub(super) fn retire(self: Arc<Self>) {
        log::debug!("retiring syslog sender for {}", self.sender.target());
    }
}

fn drop_record(warner: &RateLimitedWarner) {
    warner.record_drop();
    warner.warn_if_due(warn_dropped);
}

pub(super) fn warn_dropped(count: u64) {
    log::warn!("femtosyslog: {count} log records dropped since last warning");
}
