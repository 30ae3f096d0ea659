//! Log sinks
//!
//! A sink is a byte transport the drain step fans chunks out to. The sink
//! set is fixed when the logger is built; iteration order is fan-out order.

pub mod serial;

use crate::error::LogResult;

/// Byte-oriented log output.
///
/// `init` runs from `Logger::init`, the other methods only from the drain
/// context.
pub trait LogSink: Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Bring the transport up.
    fn init(&self) -> LogResult;

    /// Largest chunk the sink wants right now. Zero means "not ready".
    fn preferred_chunk_size(&self) -> usize;

    /// Write `bytes`, returning how many were accepted.
    fn write(&self, bytes: &[u8]) -> usize;
}

/// Smallest preferred chunk across `sinks`; zero when there are none.
pub fn smallest_chunk(sinks: &[&dyn LogSink]) -> usize {
    sinks
        .iter()
        .map(|sink| sink.preferred_chunk_size())
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(usize);

    impl LogSink for Fixed {
        fn name(&self) -> &str {
            "Fixed"
        }
        fn init(&self) -> LogResult {
            Ok(())
        }
        fn preferred_chunk_size(&self) -> usize {
            self.0
        }
        fn write(&self, bytes: &[u8]) -> usize {
            bytes.len()
        }
    }

    #[test]
    fn test_smallest_chunk() {
        let a = Fixed(32);
        let b = Fixed(8);
        assert_eq!(smallest_chunk(&[&a, &b]), 8);
        assert_eq!(smallest_chunk(&[&a]), 32);
        assert_eq!(smallest_chunk(&[]), 0);
    }
}
