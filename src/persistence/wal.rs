use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{read_u32, WalEntry, WriteAheadLog};
use crate::error::{QuarryError, Result};

const HEADER_LEN: usize = 8;

/// Append-only write-ahead log file.
///
/// Record format:
/// - u32 length (little endian)
/// - u32 crc32 of payload
/// - bincode-encoded [`WalEntry`]
///
/// A record cut short at the end of the file (a crash mid-append) is
/// dropped on replay; a complete record with a bad checksum is an error.
pub struct FileWal {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileWal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn checksum(payload: &[u8]) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(payload);
        hasher.finalize()
    }
}

impl WriteAheadLog for FileWal {
    fn append(&self, entry: &WalEntry) -> Result<()> {
        let payload = bincode::serialize(entry)?;
        let len = u32::try_from(payload.len())
            .map_err(|_| QuarryError::Persistence("write-ahead log record too large".to_string()))?;

        let mut record = Vec::with_capacity(HEADER_LEN + payload.len());
        record.extend_from_slice(&len.to_le_bytes());
        record.extend_from_slice(&Self::checksum(&payload).to_le_bytes());
        record.extend_from_slice(&payload);

        let mut file = self.file.lock();
        file.write_all(&record)?;
        file.flush()?;
        debug!(command = entry.name(), id = entry.document_id(), "appended to write-ahead log");
        Ok(())
    }

    fn replay(&self) -> Result<Vec<WalEntry>> {
        let mut buf = Vec::new();
        {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(0))?;
            file.read_to_end(&mut buf)?;
        }

        let mut entries = Vec::new();
        let mut offset = 0;
        while offset < buf.len() {
            let (Some(len), Some(expected)) = (read_u32(&buf, offset), read_u32(&buf, offset + 4))
            else {
                warn!(path = %self.path.display(), offset, "torn write-ahead log header ignored");
                break;
            };
            let start = offset + HEADER_LEN;
            let Some(payload) = buf.get(start..start + len as usize) else {
                warn!(path = %self.path.display(), offset, "torn write-ahead log record ignored");
                break;
            };
            let actual = Self::checksum(payload);
            if actual != expected {
                return Err(QuarryError::ChecksumMismatch { expected, actual });
            }
            entries.push(bincode::deserialize(payload)?);
            offset = start + len as usize;
        }
        Ok(entries)
    }

    fn reset(&self) -> Result<()> {
        let mut file = self.file.lock();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}
