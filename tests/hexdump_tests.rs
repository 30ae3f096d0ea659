//! Hex dump formatting through the producer

mod common;

use common::{drain_all, plain_config, plain_line, MockPort, MockSink};
use zlogger::{zlog_dump, LogError, LogSink, Logger, Severity};

fn message(line: &str) -> &str {
    line.rsplit_once(':').map(|(_, m)| m).unwrap()
}

#[test]
fn test_dump_twenty_bytes() {
    let sink = MockSink::new("Mem", 224);
    let sinks: [&dyn LogSink; 1] = [&sink];
    let logger = Logger::<MockPort>::new(MockPort::new(), &sinks);
    logger.init(&plain_config(Severity::Info)).unwrap();

    let data: Vec<u8> = (0x00..0x14).collect();
    assert_eq!(logger.dump_buffer(Severity::Info, "Bus", "rx", &data), Ok(()));
    drain_all(&logger);

    assert_eq!(
        sink.lines(),
        vec![
            plain_line('I', "Bus", "rx", "00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F"),
            plain_line('I', "Bus", "rx", "10 11 12 13"),
        ]
    );
}

#[test]
fn test_dump_empty_buffer() {
    let sink = MockSink::new("Mem", 224);
    let sinks: [&dyn LogSink; 1] = [&sink];
    let logger = Logger::<MockPort>::new(MockPort::new(), &sinks);
    logger.init(&plain_config(Severity::Info)).unwrap();

    assert_eq!(logger.dump_buffer(Severity::Info, "Bus", "rx", &[]), Ok(()));
    assert_eq!(logger.pending_bytes(), 0);
}

#[test]
fn test_dump_partitions_every_length() {
    let sink = MockSink::new("Mem", 224);
    let sinks: [&dyn LogSink; 1] = [&sink];
    let logger = Logger::<MockPort>::new(MockPort::new(), &sinks);
    logger.init(&plain_config(Severity::Info)).unwrap();

    for len in [1usize, 15, 16, 17, 32, 33, 50] {
        let data: Vec<u8> = (0..len).map(|i| (i * 37 + 0xA0) as u8).collect();
        logger.dump_buffer(Severity::Info, "Bus", "rx", &data).unwrap();
        drain_all(&logger);

        let lines = sink.lines();
        assert_eq!(lines.len(), len.div_ceil(16), "len {}", len);

        let mut rebuilt = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let groups: Vec<&str> = message(line).split(' ').collect();
            assert_eq!(groups.len(), (len - i * 16).min(16));
            for group in groups {
                assert_eq!(group.len(), 2);
                assert_eq!(group, group.to_uppercase());
                rebuilt.push(u8::from_str_radix(group, 16).unwrap());
            }
        }
        assert_eq!(rebuilt, data);

        sink.received.lock().unwrap().clear();
    }
}

#[test]
fn test_dump_filtered_below_threshold() {
    let sink = MockSink::new("Mem", 224);
    let sinks: [&dyn LogSink; 1] = [&sink];
    let logger = Logger::<MockPort>::new(MockPort::new(), &sinks);
    logger.init(&plain_config(Severity::Warn)).unwrap();

    assert_eq!(logger.dump_buffer(Severity::Debug, "Bus", "rx", &[1, 2, 3]), Ok(()));
    assert_eq!(logger.pending_bytes(), 0);
}

#[test]
fn test_dump_stops_at_first_failure() {
    let sink = MockSink::new("Mem", 224);
    let sinks: [&dyn LogSink; 1] = [&sink];
    let logger = Logger::<MockPort>::new(MockPort::new(), &sinks);

    assert_eq!(
        logger.dump_buffer(Severity::Info, "Bus", "rx", &[0u8; 40]),
        Err(LogError::NotInitialized)
    );

    logger.init(&plain_config(Severity::Info)).unwrap();
    assert_eq!(
        logger.dump_buffer_raw(99, "Bus", "rx", &[0u8; 40]),
        Err(LogError::InvalidArgument)
    );
    assert_eq!(logger.pending_bytes(), 0);
}

#[test]
fn test_dump_macro() {
    let sink = MockSink::new("Mem", 224);
    let sinks: [&dyn LogSink; 1] = [&sink];
    let logger = Logger::<MockPort>::new(MockPort::new(), &sinks);
    logger.init(&plain_config(Severity::Info)).unwrap();

    zlog_dump!(logger, Severity::Info, "Bus", &[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
    drain_all(&logger);
    assert_eq!(
        sink.lines(),
        vec![plain_line('I', "Bus", "test_dump_macro", "DE AD BE EF")]
    );
}
