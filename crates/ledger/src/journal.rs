// Path: crates/ledger/src/journal.rs
//! Append-only block journal.
//!
//! Each committed block is written as a bincode header followed by the
//! bincode-encoded block, then flushed and synced before the block becomes
//! visible to readers. Replaying the journal yields the chain in order.

use medchain_types::app::Block;
use medchain_types::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Header for a journal entry.
#[derive(Serialize, Deserialize, Debug)]
struct JournalEntryHeader {
    index: u64,
    data_len: u64,
}

fn corrupt(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::CorruptJournal(e.to_string())
}

/// The file operations a journal needs beyond `Write`.
pub trait JournalFile: Write {
    /// Current length in bytes.
    fn size(&self) -> std::io::Result<u64>;
    /// Cuts the file back to `len` bytes.
    fn truncate(&self, len: u64) -> std::io::Result<()>;
    /// Forces written data to stable storage.
    fn sync(&self) -> std::io::Result<()>;
}

impl JournalFile for File {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.metadata()?.len())
    }
    fn truncate(&self, len: u64) -> std::io::Result<()> {
        self.set_len(len)
    }
    fn sync(&self) -> std::io::Result<()> {
        self.sync_data()
    }
}

/// Appends whole entries to a journal file.
///
/// An entry is either fully written and synced or not present at all: a
/// failed write is cut back to the previous end of file. If that cut itself
/// fails the writer refuses every further append, since the file tail is
/// then unknown.
pub struct JournalWriter<F = File> {
    path: PathBuf,
    file: F,
    poisoned: bool,
}

impl<F> std::fmt::Debug for JournalWriter<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalWriter")
            .field("path", &self.path)
            .field("poisoned", &self.poisoned)
            .finish()
    }
}

impl JournalWriter {
    /// Opens `path` for appending, creating it and its parent directory if needed.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::with_file(path, file))
    }
}

impl<F: JournalFile> JournalWriter<F> {
    /// Wraps an already opened journal file.
    pub fn with_file(path: &Path, file: F) -> Self {
        Self {
            path: path.to_path_buf(),
            file,
            poisoned: false,
        }
    }

    /// Appends one block and syncs it to disk.
    pub fn append(&mut self, block: &Block) -> Result<(), LedgerError> {
        if self.poisoned {
            return Err(corrupt(format!(
                "{} has an unrecoverable partial entry",
                self.path.display()
            )));
        }
        let entry = encode_entry(block)?;
        let start = self.file.size()?;
        match self.write_synced(&entry) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.rollback(start, block.index);
                Err(e)
            }
        }
    }

    fn write_synced(&mut self, entry: &[u8]) -> Result<(), LedgerError> {
        self.file.write_all(entry)?;
        self.file.flush()?;
        self.file.sync()?;
        Ok(())
    }

    fn rollback(&mut self, len: u64, index: u64) {
        let cut = self.file.truncate(len).and_then(|()| self.file.sync());
        match cut {
            Ok(()) => tracing::warn!(
                target: "ledger",
                path = %self.path.display(),
                index,
                len,
                "Discarded partial journal entry"
            ),
            Err(e) => {
                self.poisoned = true;
                tracing::error!(
                    target: "ledger",
                    path = %self.path.display(),
                    index,
                    error = %e,
                    "Failed to discard partial journal entry"
                );
            }
        }
    }
}

/// Header plus body of one entry, built in memory so it reaches the file in
/// a single write.
fn encode_entry(block: &Block) -> Result<Vec<u8>, LedgerError> {
    let data = bincode::serialize(block).map_err(corrupt)?;
    let header = JournalEntryHeader {
        index: block.index,
        data_len: data.len() as u64,
    };
    let mut entry = bincode::serialize(&header).map_err(corrupt)?;
    entry.extend_from_slice(&data);
    Ok(entry)
}

/// Streams blocks back out of a journal file.
pub struct JournalReader {
    reader: BufReader<File>,
}

impl JournalReader {
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }

    fn read_entry(&mut self) -> Result<Block, LedgerError> {
        let header: JournalEntryHeader =
            bincode::deserialize_from(&mut self.reader).map_err(corrupt)?;
        let len = usize::try_from(header.data_len).map_err(corrupt)?;
        let mut data = vec![0u8; len];
        self.reader
            .read_exact(&mut data)
            .map_err(|e| corrupt(format!("truncated entry {}: {}", header.index, e)))?;
        let block: Block = bincode::deserialize(&data).map_err(corrupt)?;
        if block.index != header.index {
            return Err(corrupt(format!(
                "entry header says block {} but body holds block {}",
                header.index, block.index
            )));
        }
        Ok(block)
    }
}

impl Iterator for JournalReader {
    type Item = Result<Block, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let at_end = match self.reader.fill_buf() {
            Ok(buf) => buf.is_empty(),
            Err(e) => return Some(Err(e.into())),
        };
        if at_end {
            return None;
        }
        Some(self.read_entry())
    }
}

/// Reads every block from `path`. A missing file yields an empty chain.
pub fn replay(path: &Path) -> Result<Vec<Block>, LedgerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    JournalReader::open(path)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use medchain_types::app::{MedicalRecord, RecordKind};
    use std::io;
    use tempfile::tempdir;

    /// A journal file that accepts `budget` more bytes and then fails.
    struct ShortFile {
        inner: File,
        budget: Option<usize>,
        truncate_fails: bool,
    }

    impl ShortFile {
        fn open(path: &Path) -> Self {
            let inner = OpenOptions::new().create(true).append(true).open(path).unwrap();
            Self {
                inner,
                budget: None,
                truncate_fails: false,
            }
        }
    }

    impl Write for ShortFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            match self.budget {
                Some(0) => Err(io::Error::new(io::ErrorKind::Other, "no space left on device")),
                Some(left) => {
                    let n = self.inner.write(&buf[..buf.len().min(left)])?;
                    self.budget = Some(left - n);
                    Ok(n)
                }
                None => self.inner.write(buf),
            }
        }
        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    impl JournalFile for ShortFile {
        fn size(&self) -> io::Result<u64> {
            self.inner.size()
        }
        fn truncate(&self, len: u64) -> io::Result<()> {
            if self.truncate_fails {
                return Err(io::Error::new(io::ErrorKind::Other, "read-only file system"));
            }
            self.inner.truncate(len)
        }
        fn sync(&self) -> io::Result<()> {
            self.inner.sync()
        }
    }

    fn block(index: u64) -> Block {
        Block {
            index,
            hash: format!("00{index:02x}"),
            previous_hash: String::new(),
            timestamp: index * 10,
            payload: MedicalRecord::new(
                format!("r-{index}"),
                "patient-1",
                RecordKind::Diagnosis,
                "Flu",
                "Seasonal",
                index * 10,
            ),
            nonce: index,
        }
    }

    #[test]
    fn test_journal_write_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.journal");

        let mut writer = JournalWriter::open(&path).unwrap();
        writer.append(&block(0)).unwrap();
        writer.append(&block(1)).unwrap();
        drop(writer);

        let blocks = replay(&path).unwrap();
        assert_eq!(blocks, vec![block(0), block(1)]);
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.journal");

        JournalWriter::open(&path).unwrap().append(&block(0)).unwrap();
        JournalWriter::open(&path).unwrap().append(&block(1)).unwrap();

        assert_eq!(replay(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        assert!(replay(&dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_tail_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.journal");
        let mut writer = JournalWriter::open(&path).unwrap();
        writer.append(&block(0)).unwrap();
        writer.append(&block(1)).unwrap();
        drop(writer);

        let len = std::fs::metadata(&path).unwrap().len();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(len - 3).unwrap();

        assert!(matches!(replay(&path), Err(LedgerError::CorruptJournal(_))));
    }

    #[test]
    fn test_failed_write_leaves_no_partial_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.journal");
        let mut writer = JournalWriter::with_file(&path, ShortFile::open(&path));
        writer.append(&block(0)).unwrap();
        let clean_len = std::fs::metadata(&path).unwrap().len();

        writer.file.budget = Some(7);
        assert!(writer.append(&block(1)).is_err());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), clean_len);

        writer.file.budget = None;
        writer.append(&block(1)).unwrap();
        drop(writer);

        assert_eq!(replay(&path).unwrap(), vec![block(0), block(1)]);
    }

    #[test]
    fn test_failed_rollback_refuses_further_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.journal");
        let mut writer = JournalWriter::with_file(&path, ShortFile::open(&path));
        writer.append(&block(0)).unwrap();

        writer.file.budget = Some(7);
        writer.file.truncate_fails = true;
        assert!(writer.append(&block(1)).is_err());

        writer.file.budget = None;
        assert!(matches!(
            writer.append(&block(1)),
            Err(LedgerError::CorruptJournal(_))
        ));
    }
}
