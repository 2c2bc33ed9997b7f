//! Integration tests for the timer-driven status device

use statusblock::{
    load_config, DeviceError, DeviceId, DeviceRegistry, RuntimeConfig, SharedBuffer, StatusDevice,
    TraceLog, CAPACITY,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BUFFER TESTS
// ============================================================================

#[test]
fn test_buffer_starts_empty() {
    let buf = SharedBuffer::new();
    assert!(!buf.has_data());
    assert_eq!(buf.available_len(), 0);
}

#[test]
fn test_buffer_write_publishes_length() {
    let mut buf = SharedBuffer::new();
    let n = buf.write(b"status record");
    assert_eq!(n, 13);
    assert!(buf.has_data());
    assert_eq!(buf.available_len(), 13);
}

#[test]
fn test_buffer_write_truncates_oversized_input() {
    let mut buf = SharedBuffer::new();
    let oversized = vec![0xAB; CAPACITY + 100];
    let n = buf.write(&oversized);
    assert_eq!(n, CAPACITY, "writes must cap at capacity, not fail");
    assert_eq!(buf.available_len(), CAPACITY);
}

#[test]
fn test_buffer_take_is_destructive() {
    let mut buf = SharedBuffer::new();
    buf.write(b"0123456789");

    let out = buf.take(4);
    assert_eq!(out, b"0123");
    assert_eq!(
        buf.available_len(),
        0,
        "take consumes the whole record even when asked for fewer bytes"
    );

    let rest = buf.take(100);
    assert!(rest.is_empty(), "nothing remains after a take");
}

#[test]
fn test_buffer_take_is_bounded_by_available_length() {
    let mut buf = SharedBuffer::new();
    buf.write(b"abc");
    let out = buf.take(2000);
    assert_eq!(out, b"abc");
}

// ============================================================================
// BLOCKING READ AGAINST THE REAL TIMER
// ============================================================================

#[test]
fn test_blocking_read_returns_the_first_firing() {
    let device = Arc::new(StatusDevice::new(Duration::from_millis(200)));
    device.on_open().expect("open should succeed");

    let token = device.cancel_token();
    let start = Instant::now();
    let bytes = device.read(2000, &token).expect("read should succeed");
    let elapsed = start.elapsed();

    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("tick: 1"), "first record expected, got: {}", text);
    assert!(bytes.len() <= CAPACITY);
    assert!(
        elapsed >= Duration::from_millis(100),
        "the read must have blocked until the firing, elapsed {:?}",
        elapsed
    );
    assert_eq!(device.available_len(), 0, "the read drains the buffer");

    device.on_release();
}

#[test]
fn test_timer_rearms_and_keeps_firing() {
    let device = StatusDevice::new(Duration::from_millis(50));
    device.on_open().expect("open should succeed");

    thread::sleep(Duration::from_millis(500));
    device.on_release();

    let firings = device.firings();
    assert!(
        firings >= 5,
        "expected at least 5 firings in 500ms at a 50ms period, got {}",
        firings
    );
    assert_eq!(device.metrics().firings(), firings);
}

#[test]
fn test_release_stops_the_timer() {
    let device = StatusDevice::new(Duration::from_millis(50));
    device.on_open().expect("open should succeed");
    thread::sleep(Duration::from_millis(180));
    device.on_release();
    assert!(!device.is_armed());

    let after_release = device.firings();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(
        device.firings(),
        after_release,
        "no firing may land after release returns"
    );
}

#[test]
fn test_reopen_rearms_and_ticks_stay_monotonic() {
    let device = Arc::new(StatusDevice::new(Duration::from_millis(50)));

    device.on_open().expect("first open");
    thread::sleep(Duration::from_millis(120));
    device.on_release();
    let first_session = device.firings();
    assert!(first_session >= 1);

    device.on_open().expect("reopen");
    let token = device.cancel_token();
    let bytes = device.read(2000, &token).expect("read in second session");
    device.on_release();

    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("tick: "), "record expected, got: {}", text);
    assert!(
        device.firings() > first_session,
        "the tick count persists across sessions and keeps growing"
    );
}

#[test]
fn test_double_open_keeps_a_single_timer() {
    let device = StatusDevice::new(Duration::from_millis(50));
    device.on_open().expect("first open");
    device.on_open().expect("second open rearms");

    thread::sleep(Duration::from_millis(500));
    device.on_release();

    // One live timer: the firing count stays close to elapsed / period.
    let firings = device.firings();
    assert!(
        firings <= 13,
        "two live timers would roughly double the rate, got {} firings",
        firings
    );
}

// ============================================================================
// REGISTRY TESTS
// ============================================================================

#[test]
fn test_registry_rejects_duplicate_identifier() {
    let registry = DeviceRegistry::new();
    let id = DeviceId { major: 60, minor: 0 };
    let device = Arc::new(StatusDevice::new(Duration::from_secs(10)));

    registry.register(id, device.clone()).expect("first register");
    match registry.register(id, device) {
        Err(DeviceError::AlreadyRegistered { major: 60, minor: 0 }) => {}
        other => panic!("expected AlreadyRegistered, got {:?}", other.err()),
    }
}

#[test]
fn test_registry_lookup_and_unregister() {
    let registry = DeviceRegistry::new();
    let id = DeviceId { major: 61, minor: 2 };
    let device = Arc::new(StatusDevice::new(Duration::from_secs(10)));

    registry.register(id, device).expect("register");
    assert!(registry.lookup(id).is_some());
    assert_eq!(registry.len(), 1);

    let removed = registry.unregister(id);
    assert!(removed.is_some());
    assert!(registry.lookup(id).is_none());
    assert!(registry.is_empty());

    // The slot is reusable after unregistration.
    let device = Arc::new(StatusDevice::new(Duration::from_secs(10)));
    registry.register(id, device).expect("re-register");
}

// ============================================================================
// CONFIG TESTS
// ============================================================================

#[test]
fn test_config_defaults_when_file_is_missing() {
    let cfg = load_config("no/such/file.toml");
    assert_eq!(cfg.major, 60);
    assert_eq!(cfg.minor, 0);
    assert_eq!(cfg.delay_secs, 10);
    assert_eq!(cfg.delay(), Duration::from_secs(10));
}

#[test]
fn test_config_parses_partial_files() {
    let cfg: RuntimeConfig = toml::from_str("delay_secs = 3").expect("parse");
    assert_eq!(cfg.delay_secs, 3);
    assert_eq!(cfg.major, 60, "unset fields keep their defaults");
}

#[test]
fn test_config_loads_from_file() {
    let path = std::env::temp_dir().join("statusblock_config_test.toml");
    std::fs::write(&path, "major = 61\nminor = 1\ndelay_secs = 4\n").expect("write config");

    let cfg = load_config(path.to_str().expect("utf8 path"));
    assert_eq!(cfg.major, 61);
    assert_eq!(cfg.minor, 1);
    assert_eq!(cfg.delay_secs, 4);
    assert_eq!(cfg.device_id(), DeviceId { major: 61, minor: 1 });

    let _ = std::fs::remove_file(&path);
}

// ============================================================================
// TRACE LOG TESTS
// ============================================================================

#[test]
fn test_trace_log_trims_to_capacity() {
    let log = TraceLog::new(3);
    for i in 0..5 {
        log.write(format!("entry {}", i));
    }
    assert_eq!(log.len(), 3);
    assert_eq!(log.read_all(), vec!["entry 2", "entry 3", "entry 4"]);
    assert_eq!(log.tail(2), vec!["entry 3", "entry 4"]);
}

#[test]
fn test_lifecycle_transitions_are_traced() {
    let device = StatusDevice::new(Duration::from_millis(50));
    device.on_open().expect("open");
    thread::sleep(Duration::from_millis(120));
    device.on_release();

    let entries = device.trace().read_all();
    assert!(entries.iter().any(|e| e.starts_with("open:")));
    assert!(entries.iter().any(|e| e.starts_with("firing")));
    assert!(entries.iter().any(|e| e.starts_with("release:")));
}

// ============================================================================
// RECORD FORMAT TESTS
// ============================================================================

#[test]
fn test_status_record_is_bounded() {
    let record = statusblock::producer::format_status(u64::MAX, Duration::from_secs(u32::MAX as u64));
    assert!(
        record.len() < CAPACITY,
        "a fixed-format record always fits the buffer"
    );
    assert!(record.contains("tick: "));
    assert!(record.contains("uptime_ms: "));
}
