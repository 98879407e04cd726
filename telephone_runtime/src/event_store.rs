//! Append-only event store — binary protobuf log.
//!
//! Storage format: length-prefixed protobuf frames.
//!   [4-byte LE length][protobuf bytes][4-byte LE length][protobuf bytes]...
//!
//! Rules:
//!   - Strict append only. Reset is itself an event, never a truncation.
//!   - fsync after every write
//!   - Sequence strictly increasing (validated on append)

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use prost::Message;
use thiserror::Error;
use tracing::{debug, warn};

use crate::proto_types::ProtoEventEnvelope;

/// Largest frame accepted when reading. Anything bigger is corruption.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event log I/O: {0}")]
    Io(#[from] io::Error),
    #[error("sequence violation in event store: expected {expected}, got {got}")]
    Sequence { expected: u64, got: u64 },
    #[error("invalid frame length {len} at byte {offset}")]
    FrameLength { len: usize, offset: u64 },
    #[error("truncated frame at byte {offset}")]
    Truncated { offset: u64 },
    #[error("protobuf decode error at byte {offset}: {source}")]
    Decode {
        offset: u64,
        #[source]
        source: prost::DecodeError,
    },
}

/// Append-only event log backed by a binary file.
#[derive(Debug)]
pub struct EventStore {
    path: PathBuf,
    last_sequence: u64,
}

impl EventStore {
    /// Open or create an event log at the given path.
    /// Reads existing frames to determine the last sequence number.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let last_sequence = if path.exists() {
            Self::read_all_from_file(path)?
                .last()
                .map(|e| e.sequence)
                .unwrap_or(0)
        } else {
            0
        };

        debug!(path = %path.display(), last_sequence, "event log opened");
        Ok(Self {
            path: path.to_path_buf(),
            last_sequence,
        })
    }

    /// Append a single event. Writes one length-prefixed frame and fsyncs.
    pub fn append_event(&mut self, event: &ProtoEventEnvelope) -> Result<(), StoreError> {
        let expected = self.last_sequence + 1;
        if event.sequence != expected {
            return Err(StoreError::Sequence {
                expected,
                got: event.sequence,
            });
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let buf = event.encode_to_vec();
        let len = buf.len() as u32;

        write_or_rollback(&mut file, |file| {
            {
                let mut writer = BufWriter::new(&mut *file);
                writer.write_all(&len.to_le_bytes())?;
                writer.write_all(&buf)?;
                writer.flush()?;
            }
            file.sync_all()
        })?;

        self.last_sequence = event.sequence;
        Ok(())
    }

    /// Load all events from the log in sequence order.
    pub fn load_all_events(&self) -> Result<Vec<ProtoEventEnvelope>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Self::read_all_from_file(&self.path)
    }

    /// Events with a sequence strictly greater than `sequence`.
    pub fn load_events_after(&self, sequence: u64) -> Result<Vec<ProtoEventEnvelope>, StoreError> {
        let mut events = self.load_all_events()?;
        events.retain(|e| e.sequence > sequence);
        Ok(events)
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all frames from a file, validating frame integrity.
    fn read_all_from_file(path: &Path) -> Result<Vec<ProtoEventEnvelope>, StoreError> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut events = Vec::new();
        let mut len_buf = [0u8; 4];
        let mut offset: u64 = 0;

        loop {
            match reader.read_exact(&mut len_buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len == 0 || len > MAX_FRAME_LEN {
                warn!(path = %path.display(), offset, len, "corrupt frame header");
                return Err(StoreError::FrameLength { len, offset });
            }

            let mut frame = vec![0u8; len];
            reader
                .read_exact(&mut frame)
                .map_err(|_| StoreError::Truncated { offset })?;

            let event = ProtoEventEnvelope::decode(frame.as_slice())
                .map_err(|source| StoreError::Decode { offset, source })?;

            events.push(event);
            offset += 4 + len as u64;
        }

        Ok(events)
    }
}

/// Run `write` against the log; on failure cut the file back to its
/// previous length so no torn frame is left behind.
fn write_or_rollback(
    file: &mut File,
    write: impl FnOnce(&mut File) -> io::Result<()>,
) -> io::Result<()> {
    let prev_len = file.metadata()?.len();
    if let Err(err) = write(file) {
        warn!(prev_len, error = %err, "append failed, truncating partial frame");
        file.set_len(prev_len)?;
        file.sync_all()?;
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto_types::{EventKind, ProtoEvent, Reset};

    fn reset_frame(sequence: u64) -> ProtoEventEnvelope {
        ProtoEventEnvelope {
            sequence,
            logical_time: sequence,
            event: Some(ProtoEvent {
                kind: Some(EventKind::Reset(Reset {})),
            }),
            schema_version: 1,
        }
    }

    #[test]
    fn append_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log").join("events.log");
        {
            let mut store = EventStore::open(&path).unwrap();
            store.append_event(&reset_frame(1)).unwrap();
            store.append_event(&reset_frame(2)).unwrap();
        }
        let store = EventStore::open(&path).unwrap();
        assert_eq!(store.last_sequence(), 2);
        assert_eq!(store.load_all_events().unwrap().len(), 2);
        assert_eq!(store.load_events_after(1).unwrap()[0].sequence, 2);
    }

    #[test]
    fn gap_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = EventStore::open(&dir.path().join("events.log")).unwrap();
        let err = store.append_event(&reset_frame(3)).unwrap_err();
        assert!(matches!(err, StoreError::Sequence { expected: 1, got: 3 }));
    }

    #[test]
    fn truncated_tail_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        {
            let mut store = EventStore::open(&path).unwrap();
            store.append_event(&reset_frame(1)).unwrap();
        }
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&40u32.to_le_bytes()).unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
        drop(file);

        assert!(matches!(
            EventStore::open(&path),
            Err(StoreError::Truncated { .. })
        ));
    }

    #[test]
    fn zero_length_frame_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        std::fs::write(&path, 0u32.to_le_bytes()).unwrap();
        assert!(matches!(
            EventStore::open(&path),
            Err(StoreError::FrameLength { len: 0, offset: 0 })
        ));
    }

    #[test]
    fn failed_append_leaves_no_partial_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let mut store = EventStore::open(&path).unwrap();
        store.append_event(&reset_frame(1)).unwrap();
        let len_before = std::fs::metadata(&path).unwrap().len();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        let err = write_or_rollback(&mut file, |f| {
            f.write_all(&64u32.to_le_bytes())?;
            f.write_all(&[7, 7])?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        })
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        drop(file);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), len_before);

        store.append_event(&reset_frame(2)).unwrap();
        let reopened = EventStore::open(&path).unwrap();
        assert_eq!(reopened.last_sequence(), 2);
        assert_eq!(reopened.load_all_events().unwrap().len(), 2);
    }
}
