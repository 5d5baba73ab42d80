//! End-to-end delivery through the public API.

use femtosyslog::{
    Facility, Level, LogRecord, ManagerState, MessageFormat, SyslogConfig, SyslogManager,
    SyslogSettings, Transport, passes_filter,
};
use rstest::rstest;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{TcpCollector, UdpCollector};

fn udp_config(collector: &UdpCollector, min_level: Level) -> SyslogConfig {
    SyslogConfig::builder()
        .with_server("127.0.0.1", collector.port())
        .with_min_level(min_level)
        .with_app_name("deliver")
        .build()
        .expect("valid udp configuration")
}

#[rstest]
fn settings_drive_udp_delivery() {
    let collector = UdpCollector::bind();
    let json = format!(
        r#"{{
            "syslogTransport": "UDP",
            "syslogServerHostname": " 127.0.0.1 ",
            "syslogServerPort": {},
            "levelFilter": "INFO",
            "appName": "jenkins",
            "messageHostname": "build-01",
            "facility": "LOCAL3",
            "messageFormat": "RFC_3164"
        }}"#,
        collector.port()
    );
    let settings: SyslogSettings = serde_json::from_str(&json).expect("settings json");
    let manager = SyslogManager::init(settings.into_config().expect("valid settings"))
        .expect("install delivery");

    let confirmation = collector.recv();
    assert!(confirmation.contains(" build-01 jenkins: Configured"), "{confirmation}");

    manager.publish(&LogRecord::new("job", Level::Info, "build started"));
    let datagram = collector.recv();
    // LOCAL3 (19) * 8 + informational (6)
    assert!(datagram.starts_with("<158>"), "{datagram}");
    assert!(datagram.ends_with("build-01 jenkins: build started"), "{datagram}");
}

#[rstest]
fn rfc5424_over_tcp_uses_octet_counting() {
    let collector = TcpCollector::spawn(MessageFormat::Rfc5424);
    let config = SyslogConfig::builder()
        .with_server("127.0.0.1", collector.port())
        .with_transport(Transport::Tcp)
        .with_format(MessageFormat::Rfc5424)
        .with_facility(Facility::Daemon)
        .with_message_hostname(Some("ci-host".into()))
        .with_app_name("pipeline")
        .build()
        .expect("valid tcp configuration");
    let manager = SyslogManager::init(config).expect("install delivery");

    let confirmation = collector.recv();
    assert!(
        confirmation.contains(" ci-host pipeline "),
        "unexpected header in {confirmation}"
    );
    assert!(confirmation.contains(" femtosyslog - Configured"), "{confirmation}");

    manager.publish(&LogRecord::new("deploy", Level::Severe, "line one\nline two"));
    let frame = collector.recv();
    assert!(frame.starts_with("<27>1 "), "{frame}");
    assert!(frame.ends_with(" deploy - line one line two"), "{frame}");
}

#[rstest]
fn only_records_at_or_above_minimum_are_delivered() {
    for min_level in Level::ALL {
        let collector = UdpCollector::bind();
        let manager = SyslogManager::init(udp_config(&collector, min_level)).expect("install");
        for level in Level::ALL {
            manager.publish(&LogRecord::new("filter", level, level.as_str()));
        }
        let received = collector.drain();
        let expected = Level::ALL
            .iter()
            .filter(|level| passes_filter(**level, min_level))
            .count();
        // The confirmation record is always delivered first.
        assert_eq!(received.len(), expected + 1, "min {min_level}: {received:?}");
        for level in Level::ALL {
            let delivered = received
                .iter()
                .skip(1)
                .any(|m| m.ends_with(&format!("deliver: {}", level.as_str())));
            assert_eq!(
                delivered,
                passes_filter(level, min_level),
                "{level} with min {min_level}"
            );
        }
    }
}

#[rstest]
fn off_filter_delivers_only_the_confirmation() {
    let collector = UdpCollector::bind();
    let manager = SyslogManager::init(udp_config(&collector, Level::Off)).expect("install");
    manager.publish(&LogRecord::new("filter", Level::Severe, "suppressed"));
    let received = collector.drain();
    assert_eq!(received.len(), 1, "{received:?}");
    assert!(received[0].contains("Configured to output log messages"));
}

#[rstest]
fn blank_hostname_leaves_manager_unconfigured() {
    let settings = SyslogSettings {
        syslog_server_hostname: Some("   ".into()),
        ..SyslogSettings::default()
    };
    let manager = SyslogManager::init(settings.into_config().expect("valid settings"))
        .expect("disabled configuration is accepted");
    assert_eq!(manager.state(), ManagerState::Unconfigured);
}
