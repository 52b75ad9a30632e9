//! RocksDB storage backend for the Veritas node.

use anyhow::Result;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};

/// Column family names for different data types.
const CF_STATE: &str = "state";
const CF_EVENTS: &str = "events";

/// Key of the ledger snapshot in the state column family.
const SNAPSHOT_KEY: &[u8] = b"ledger";

/// RocksDB-backed storage for the Veritas node.
pub struct Storage {
    db: DB,
    /// Makes every commit fail, to exercise the node's rollback path.
    #[cfg(test)]
    fail_commits: AtomicBool,
}

/// An encoded event envelope waiting to be written.
#[derive(Debug, Clone)]
pub struct PendingEvent {
    pub stream: &'static str,
    pub seq: u64,
    pub envelope: Vec<u8>,
}

/// `stream/` followed by the big-endian sequence number, so that a stream's
/// events iterate in order.
fn event_key(stream: &str, seq: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(stream.len() + 9);
    key.extend_from_slice(stream.as_bytes());
    key.push(b'/');
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_STATE, Options::default()),
            ColumnFamilyDescriptor::new(CF_EVENTS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self {
            db,
            #[cfg(test)]
            fail_commits: AtomicBool::new(false),
        })
    }

    fn cf(&self, cf_name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))
    }

    /// Get a value from a column family.
    pub fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let value = self.db.get_cf(self.cf(cf_name)?, key)?;
        Ok(value)
    }

    /// Flush memtables to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Write a ledger snapshot together with the events it introduced.
    /// Either all of it lands or none of it does.
    pub fn commit(&self, snapshot: &[u8], events: &[PendingEvent]) -> Result<()> {
        #[cfg(test)]
        if self.fail_commits.load(Ordering::SeqCst) {
            anyhow::bail!("injected storage failure");
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_STATE)?, SNAPSHOT_KEY, snapshot);
        let events_cf = self.cf(CF_EVENTS)?;
        for event in events {
            batch.put_cf(events_cf, event_key(event.stream, event.seq), &event.envelope);
        }
        self.db.write(batch)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Get the serialized ledger snapshot, if one was ever written.
    pub fn get_snapshot(&self) -> Result<Option<Vec<u8>>> {
        self.get(CF_STATE, SNAPSHOT_KEY)
    }

    /// Get an encoded event envelope.
    pub fn get_event(&self, stream: &str, seq: u64) -> Result<Option<Vec<u8>>> {
        self.get(CF_EVENTS, &event_key(stream, seq))
    }

    /// Every stored envelope of `stream`, in sequence order.
    pub fn events(&self, stream: &str) -> Result<Vec<Vec<u8>>> {
        let start = event_key(stream, 0);
        let prefix = &start[..stream.len() + 1];
        let mut out = Vec::new();
        for item in self
            .db
            .iterator_cf(self.cf(CF_EVENTS)?, IteratorMode::From(&start, Direction::Forward))
        {
            let (key, value) = item?;
            if key.len() != start.len() || !key.starts_with(prefix) {
                break;
            }
            out.push(value.to_vec());
        }
        Ok(out)
    }

    /// Sequence number the next event of `stream` will be stored under,
    /// i.e. one past the highest stored, or 0 for an empty stream.
    pub fn next_event_seq(&self, stream: &str) -> Result<u64> {
        let upper = event_key(stream, u64::MAX);
        let prefix = &upper[..stream.len() + 1];
        let mut iter = self
            .db
            .iterator_cf(self.cf(CF_EVENTS)?, IteratorMode::From(&upper, Direction::Reverse));

        match iter.next() {
            Some(item) => {
                let (key, _) = item?;
                if key.len() != upper.len() || !key.starts_with(prefix) {
                    return Ok(0);
                }
                let mut seq = [0u8; 8];
                seq.copy_from_slice(&key[prefix.len()..]);
                Ok(u64::from_be_bytes(seq) + 1)
            }
            None => Ok(0),
        }
    }
}
