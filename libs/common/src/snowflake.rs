use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Custom epoch: 2025-01-01T00:00:00Z in milliseconds since Unix epoch.
const FOLIO_EPOCH_MS: u64 = 1_735_689_600_000;

const WORKER_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

/// 64-bit time-ordered ID generator for message IDs.
///
/// Layout (MSB → LSB): 42-bit timestamp in ms since the Folio epoch,
/// 10-bit worker ID, 12-bit per-millisecond sequence. IDs from one
/// generator are strictly increasing; the timestamp prefix keeps them
/// sortable by creation time across workers.
pub struct SnowflakeGenerator {
    worker_id: u64,
    /// Packed `timestamp << SEQUENCE_BITS | sequence` of the last ID.
    last: Mutex<u64>,
}

impl SnowflakeGenerator {
    pub fn new(worker_id: u16) -> Self {
        assert!(
            (worker_id as u64) < (1 << WORKER_BITS),
            "worker_id must fit in {WORKER_BITS} bits"
        );
        Self {
            worker_id: worker_id as u64,
            last: Mutex::new(0),
        }
    }

    pub fn generate(&self) -> i64 {
        let mut last = self.last.lock().unwrap();

        // Never reuse a (timestamp, sequence) pair: take the max of the wall
        // clock and the last issued slot, bumping the sequence within the
        // same millisecond.
        let mut candidate = (current_ms() - FOLIO_EPOCH_MS) << SEQUENCE_BITS;
        if candidate <= *last {
            candidate = *last + 1;
            if candidate & SEQUENCE_MASK == 0 {
                // Sequence exhausted for this millisecond — wait it out.
                let next_ms = candidate >> SEQUENCE_BITS;
                while current_ms() - FOLIO_EPOCH_MS < next_ms {
                    std::hint::spin_loop();
                }
            }
        }
        *last = candidate;

        let ts = candidate >> SEQUENCE_BITS;
        let seq = candidate & SEQUENCE_MASK;
        ((ts << (WORKER_BITS + SEQUENCE_BITS)) | (self.worker_id << SEQUENCE_BITS) | seq) as i64
    }
}

fn current_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before Unix epoch")
        .as_millis() as u64
}
