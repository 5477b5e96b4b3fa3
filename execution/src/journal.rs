//! Append-only journal storage.
//!
//! The file format is a sequence of records:
//!
//! ```text
//! [len: u32 BE][payload: len bytes][sha256(payload): 32 bytes]
//! ```
//!
//! where `payload` is the canonical encoding of a [`JournalMessage`]. Every append is
//! synced before returning, so a message returned from [`Journal::read_all`] was
//! durably recorded. A message is only accepted if its payload decodes again within the
//! codec limits; otherwise the journal could not be reopened.
//!
//! ## Recovery
//!
//! A crash can leave a partially written record at the end of the file. Such a tail is
//! treated as an append that never happened: it is logged and cut off when the journal
//! is opened for writing, and again before the next append. A failed append is rolled
//! back to the last complete record. If that rollback fails too, the journal refuses
//! further appends until it is reopened. A complete record whose digest or payload is
//! invalid is corruption and is reported with its index and offset.
//!
//! [`JournalReader`] opens a journal without modifying it, so it can be pointed at a
//! file another process is appending to.

use bytes::BytesMut;
use commonware_codec::{DecodeExt, Encode};
use commonware_cryptography::{sha256::Sha256, Hasher};
use ignition_types::{JournalMessage, JournalMessageType};
use std::fs::{File, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Largest encoded message accepted by a journal.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

const LENGTH_PREFIX_SIZE: usize = 4;
const DIGEST_SIZE: usize = 32;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("journal record {index} at offset {offset} is corrupted: {reason}")]
    Corrupted {
        index: usize,
        offset: u64,
        reason: String,
    },
    #[error("message of {size} bytes exceeds the {max} byte limit")]
    Oversize { size: usize, max: usize },
    #[error("{message_type} message exceeds a codec limit: {source}")]
    Unreadable {
        message_type: JournalMessageType,
        #[source]
        source: commonware_codec::Error,
    },
    #[error("journal {} refuses appends after a failed rollback; reopen it", .path.display())]
    Poisoned { path: PathBuf },
}

/// Ordered, append-only message log.
pub trait Journal {
    /// Durably records `message` after every previously appended message.
    fn append(&mut self, message: &JournalMessage) -> Result<(), JournalError>;

    /// Returns every recorded message in append order.
    fn read_all(&self) -> Result<Vec<JournalMessage>, JournalError>;
}

/// Encodes `message`, rejecting it if the payload is too large or would not decode.
fn encode_message(
    message: &JournalMessage,
    max_message_size: usize,
) -> Result<BytesMut, JournalError> {
    let payload = message.encode();
    if payload.len() > max_message_size {
        return Err(JournalError::Oversize {
            size: payload.len(),
            max: max_message_size,
        });
    }
    JournalMessage::decode(payload.as_ref()).map_err(|source| JournalError::Unreadable {
        message_type: message.message_type(),
        source,
    })?;
    Ok(payload)
}

/// Frames `payload` as a journal record.
fn encode_record(payload: &[u8]) -> BytesMut {
    let digest = Sha256::hash(payload);
    let mut record = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len() + DIGEST_SIZE);
    record.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    record.extend_from_slice(payload);
    record.extend_from_slice(digest.as_ref());
    record
}

/// Journal kept in memory, for tests and dry runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryJournal {
    messages: Vec<JournalMessage>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<JournalMessage>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Journal for MemoryJournal {
    fn append(&mut self, message: &JournalMessage) -> Result<(), JournalError> {
        encode_message(message, MAX_MESSAGE_SIZE)?;
        self.messages.push(message.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<JournalMessage>, JournalError> {
        Ok(self.messages.clone())
    }
}

/// Outcome of scanning a journal file.
struct Scan {
    messages: Vec<JournalMessage>,
    /// Offset just past the last complete record.
    valid_len: u64,
}

/// Journal persisted to a single file.
pub struct FileJournal {
    path: PathBuf,
    file: File,
    max_message_size: usize,
    records: usize,
    /// Length of the file up to the last complete record.
    committed: u64,
    poisoned: bool,
    #[cfg(test)]
    failpoints: Failpoints,
}

/// Injected I/O failures.
#[cfg(test)]
#[derive(Default)]
struct Failpoints {
    /// Write this many bytes of the next record, then fail.
    partial_write: Option<usize>,
    rollback: bool,
}

impl FileJournal {
    /// Opens (or creates) the journal at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        Self::open_with_max_message_size(path, MAX_MESSAGE_SIZE)
    }

    pub fn open_with_max_message_size(
        path: impl AsRef<Path>,
        max_message_size: usize,
    ) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        let bytes = std::fs::read(&path)?;
        let scan = scan(&bytes, max_message_size)?;
        if scan.valid_len < bytes.len() as u64 {
            warn!(
                path = %path.display(),
                discarded = bytes.len() as u64 - scan.valid_len,
                "discarding incomplete journal record"
            );
            file.set_len(scan.valid_len)?;
            file.sync_all()?;
        }
        info!(path = %path.display(), records = scan.messages.len(), "opened journal");

        Ok(Self {
            path,
            file,
            max_message_size,
            records: scan.messages.len(),
            committed: scan.valid_len,
            poisoned: false,
            #[cfg(test)]
            failpoints: Failpoints::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records in the file.
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Cuts anything written past the last complete record since it was observed.
    fn repair_tail(&mut self) -> Result<(), JournalError> {
        let len = self.file.metadata()?.len();
        if len == self.committed {
            return Ok(());
        }
        if len < self.committed {
            return Err(JournalError::Corrupted {
                index: self.records,
                offset: len,
                reason: format!("file shrank below {} bytes", self.committed),
            });
        }
        warn!(
            path = %self.path.display(),
            discarded = len - self.committed,
            "discarding unexpected journal tail"
        );
        self.file.set_len(self.committed)?;
        self.file.sync_data()?;
        Ok(())
    }

    fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        #[cfg(test)]
        if let Some(written) = self.failpoints.partial_write.take() {
            self.file.write_all(&record[..written.min(record.len())])?;
            return Err(io::Error::other("injected write failure"));
        }
        self.file.write_all(record)?;
        self.file.sync_data()
    }

    fn truncate_to_committed(&mut self) -> io::Result<()> {
        #[cfg(test)]
        if self.failpoints.rollback {
            return Err(io::Error::other("injected rollback failure"));
        }
        self.file.set_len(self.committed)?;
        self.file.sync_data()
    }

    /// Drops a partially written record. On failure the journal is poisoned.
    fn rollback(&mut self) {
        match self.truncate_to_committed() {
            Ok(()) => warn!(
                path = %self.path.display(),
                len = self.committed,
                "rolled back failed journal append"
            ),
            Err(err) => {
                self.poisoned = true;
                error!(
                    path = %self.path.display(),
                    error = %err,
                    "could not roll back failed journal append"
                );
            }
        }
    }
}

impl Journal for FileJournal {
    fn append(&mut self, message: &JournalMessage) -> Result<(), JournalError> {
        if self.poisoned {
            return Err(JournalError::Poisoned {
                path: self.path.clone(),
            });
        }
        let payload = encode_message(message, self.max_message_size)?;
        let record = encode_record(&payload);

        self.repair_tail()?;
        if let Err(err) = self.write_record(&record) {
            self.rollback();
            return Err(err.into());
        }
        self.committed += record.len() as u64;
        self.records += 1;
        debug!(
            index = self.records - 1,
            message_type = %message.message_type(),
            "appended journal record"
        );
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<JournalMessage>, JournalError> {
        read_records(&self.path, self.max_message_size)
    }
}

/// Read-only view of a journal file.
///
/// Opening a reader never creates, truncates or locks the file. An incomplete record at
/// the end is skipped, since it may be an append still in progress.
#[derive(Clone, Debug)]
pub struct JournalReader {
    path: PathBuf,
    max_message_size: usize,
}

impl JournalReader {
    /// Opens the existing journal at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        Self::open_with_max_message_size(path, MAX_MESSAGE_SIZE)
    }

    pub fn open_with_max_message_size(
        path: impl AsRef<Path>,
        max_message_size: usize,
    ) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        File::open(&path)?;
        Ok(Self {
            path,
            max_message_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every complete record in append order.
    pub fn read_all(&self) -> Result<Vec<JournalMessage>, JournalError> {
        read_records(&self.path, self.max_message_size)
    }
}

fn read_records(
    path: &Path,
    max_message_size: usize,
) -> Result<Vec<JournalMessage>, JournalError> {
    let bytes = std::fs::read(path)?;
    let scan = scan(&bytes, max_message_size)?;
    if scan.valid_len < bytes.len() as u64 {
        warn!(
            path = %path.display(),
            ignored = bytes.len() as u64 - scan.valid_len,
            "ignoring incomplete journal record"
        );
    }
    Ok(scan.messages)
}

fn scan(bytes: &[u8], max_message_size: usize) -> Result<Scan, JournalError> {
    let mut messages = Vec::new();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let index = messages.len();
        let remaining = &bytes[offset..];
        if remaining.len() < LENGTH_PREFIX_SIZE {
            break;
        }
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        prefix.copy_from_slice(&remaining[..LENGTH_PREFIX_SIZE]);
        let len = u32::from_be_bytes(prefix) as usize;
        if len > max_message_size {
            return Err(JournalError::Corrupted {
                index,
                offset: offset as u64,
                reason: format!("record length {len} exceeds {max_message_size}"),
            });
        }
        let record_len = LENGTH_PREFIX_SIZE + len + DIGEST_SIZE;
        if remaining.len() < record_len {
            break;
        }

        let payload = &remaining[LENGTH_PREFIX_SIZE..LENGTH_PREFIX_SIZE + len];
        let stored = &remaining[LENGTH_PREFIX_SIZE + len..record_len];
        let digest = Sha256::hash(payload);
        if digest.as_ref() != stored {
            return Err(JournalError::Corrupted {
                index,
                offset: offset as u64,
                reason: "digest mismatch".to_string(),
            });
        }
        let message =
            JournalMessage::decode(payload).map_err(|err| JournalError::Corrupted {
                index,
                offset: offset as u64,
                reason: err.to_string(),
            })?;

        messages.push(message);
        offset += record_len;
    }

    Ok(Scan {
        messages,
        valid_len: offset as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{
        call_init, confirm, deployment_init, onchain_request, receipt, run_start, send,
        send_data_init, static_call_success, wipe,
    };
    use ignition_types::constants::{
        MAX_ARGUMENTS, MAX_DATA_LENGTH, MAX_DEPENDENCIES, MAX_FUTURE_ID_LENGTH,
        MAX_HEX_STRING_LENGTH, MAX_LIBRARIES, MAX_LOGS, MAX_STRING_LENGTH, MAX_TOPICS,
        MAX_VALUE_DEPTH,
    };
    use ignition_types::SolidityValue;
    use std::io::{Seek, SeekFrom, Write};

    fn messages() -> Vec<JournalMessage> {
        vec![
            run_start(31337),
            deployment_init("Module#Token", &[]),
            onchain_request("Module#Token", 0),
            send("Module#Token", 0, "0xaaa", 0),
        ]
    }

    #[test]
    fn memory_journal_preserves_order() {
        let mut journal = MemoryJournal::new();
        for message in messages() {
            journal.append(&message).unwrap();
        }
        assert_eq!(journal.len(), 4);
        assert_eq!(journal.read_all().unwrap(), messages());
    }

    #[test]
    fn file_journal_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        {
            let mut journal = FileJournal::open(&path).unwrap();
            assert!(journal.is_empty());
            for message in messages() {
                journal.append(&message).unwrap();
            }
        }
        let journal = FileJournal::open(&path).unwrap();
        assert_eq!(journal.len(), 4);
        assert_eq!(journal.read_all().unwrap(), messages());
    }

    #[test]
    fn truncated_tail_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        {
            let mut journal = FileJournal::open(&path).unwrap();
            for message in messages() {
                journal.append(&message).unwrap();
            }
        }
        let full = std::fs::metadata(&path).unwrap().len();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(full - 10).unwrap();
        drop(file);

        let mut journal = FileJournal::open(&path).unwrap();
        assert_eq!(journal.read_all().unwrap(), messages()[..3].to_vec());

        // Appends land after the last complete record.
        journal.append(&messages()[3]).unwrap();
        let reopened = FileJournal::open(&path).unwrap();
        assert_eq!(reopened.read_all().unwrap(), messages());
    }

    #[test]
    fn corrupted_record_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        {
            let mut journal = FileJournal::open(&path).unwrap();
            for message in messages() {
                journal.append(&message).unwrap();
            }
        }
        // Flip a payload byte of the first record.
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        file.seek(SeekFrom::Start(LENGTH_PREFIX_SIZE as u64 + 1))
            .unwrap();
        file.write_all(&[0xff]).unwrap();
        drop(file);

        match FileJournal::open(&path) {
            Err(JournalError::Corrupted { index, offset, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(offset, 0);
            }
            other => panic!("expected corruption, got {:?}", other.map(|j| j.len())),
        }
    }

    #[test]
    fn undecodable_payload_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        let payload = [250u8, 1, 2];
        std::fs::write(&path, encode_record(&payload)).unwrap();

        let err = FileJournal::open(&path).err().unwrap();
        assert!(matches!(err, JournalError::Corrupted { index: 0, .. }));
    }

    #[test]
    fn oversize_message_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal =
            FileJournal::open_with_max_message_size(dir.path().join("journal.bin"), 16).unwrap();
        let err = journal
            .append(&deployment_init("Module#Token", &[]))
            .unwrap_err();
        assert!(matches!(err, JournalError::Oversize { max: 16, .. }));
        assert!(journal.is_empty());
        assert!(journal.read_all().unwrap().is_empty());
    }

    fn append_bytes(path: &Path, bytes: &[u8]) {
        let mut file = OpenOptions::new().append(true).open(path).unwrap();
        file.write_all(bytes).unwrap();
        file.sync_all().unwrap();
    }

    fn record_of(message: &JournalMessage) -> BytesMut {
        encode_record(&message.encode())
    }

    #[test]
    fn append_discards_foreign_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        let mut journal = FileJournal::open(&path).unwrap();
        for message in &messages()[..3] {
            journal.append(message).unwrap();
        }
        let committed = std::fs::metadata(&path).unwrap().len();

        // Half a record lands after the journal was opened.
        let record = record_of(&messages()[3]);
        append_bytes(&path, &record[..record.len() / 2]);

        journal.append(&messages()[3]).unwrap();
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            committed + record.len() as u64
        );
        let reopened = FileJournal::open(&path).unwrap();
        assert_eq!(reopened.read_all().unwrap(), messages());
    }

    #[test]
    fn failed_write_is_rolled_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        let mut journal = FileJournal::open(&path).unwrap();
        for message in &messages()[..2] {
            journal.append(message).unwrap();
        }
        let committed = std::fs::metadata(&path).unwrap().len();

        journal.failpoints.partial_write = Some(LENGTH_PREFIX_SIZE + 3);
        let err = journal.append(&messages()[2]).unwrap_err();
        assert!(matches!(err, JournalError::Io(_)));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), committed);
        assert_eq!(journal.len(), 2);

        for message in &messages()[2..] {
            journal.append(message).unwrap();
        }
        let reopened = FileJournal::open(&path).unwrap();
        assert_eq!(reopened.len(), 4);
        assert_eq!(reopened.read_all().unwrap(), messages());
    }

    #[test]
    fn failed_rollback_poisons_journal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        let mut journal = FileJournal::open(&path).unwrap();
        journal.append(&messages()[0]).unwrap();

        journal.failpoints.partial_write = Some(LENGTH_PREFIX_SIZE + 3);
        journal.failpoints.rollback = true;
        assert!(matches!(
            journal.append(&messages()[1]),
            Err(JournalError::Io(_))
        ));
        assert!(matches!(
            journal.append(&messages()[1]),
            Err(JournalError::Poisoned { .. })
        ));
        drop(journal);

        // Reopening drops the partial record.
        let mut journal = FileJournal::open(&path).unwrap();
        assert_eq!(journal.read_all().unwrap(), messages()[..1].to_vec());
        journal.append(&messages()[1]).unwrap();
        assert_eq!(journal.read_all().unwrap(), messages()[..2].to_vec());
    }

    /// One message per codec limit, each just past it.
    fn over_limit() -> Vec<(&'static str, JournalMessage)> {
        let mut long_name = deployment_init(&format!("Module#{}", "N".repeat(300)), &[]);
        if let JournalMessage::DeploymentExecutionStateInitialize(init) = &mut long_name {
            init.artifact_future_id = "Module#Token".to_string();
        }

        let mut libraries = deployment_init("Module#Token", &[]);
        if let JournalMessage::DeploymentExecutionStateInitialize(init) = &mut libraries {
            init.libraries = (0..=MAX_LIBRARIES)
                .map(|i| (format!("Lib{i}"), format!("0x{i:040x}")))
                .collect();
        }

        let dependencies: Vec<String> = (0..=MAX_DEPENDENCIES)
            .map(|i| format!("Module#F{i}"))
            .collect();
        let dependencies: Vec<&str> = dependencies.iter().map(String::as_str).collect();

        let mut data = send_data_init("Module#Fund", &[]);
        if let JournalMessage::SendDataExecutionStateInitialize(init) = &mut data {
            init.data = vec![0; MAX_DATA_LENGTH + 1];
        }

        let mut arguments = call_init("Module#Token.mint", &["Module#Token"]);
        if let JournalMessage::CallExecutionStateInitialize(init) = &mut arguments {
            init.args = vec![SolidityValue::Bool(true); MAX_ARGUMENTS + 1];
        }

        let mut nested = SolidityValue::Uint(1);
        for _ in 0..=MAX_VALUE_DEPTH {
            nested = SolidityValue::Array(vec![nested]);
        }

        let mut topics = confirm("Module#Token", 0, "0xaaa");
        if let JournalMessage::TransactionConfirm { receipt, .. } = &mut topics {
            receipt.logs[0].topics = vec!["0x01".to_string(); MAX_TOPICS + 1];
        }

        let mut logs = confirm("Module#Token", 0, "0xaaa");
        if let JournalMessage::TransactionConfirm { receipt: r, .. } = &mut logs {
            r.logs = vec![receipt().logs[0].clone(); MAX_LOGS + 1];
        }

        vec![
            ("future id", wipe(&"F".repeat(MAX_FUTURE_ID_LENGTH + 1))),
            ("name", long_name),
            (
                "hex string",
                confirm("Module#Token", 0, &"a".repeat(MAX_HEX_STRING_LENGTH + 1)),
            ),
            (
                "string",
                static_call_success(
                    "Module#Token.balanceOf",
                    SolidityValue::String("s".repeat(MAX_STRING_LENGTH + 1)),
                ),
            ),
            ("data", data),
            ("dependencies", deployment_init("Module#Token", &dependencies)),
            ("libraries", libraries),
            ("arguments", arguments),
            (
                "value depth",
                static_call_success("Module#Token.balanceOf", nested),
            ),
            ("topics", topics),
            ("logs", logs),
        ]
    }

    #[test]
    fn messages_past_codec_limits_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        let mut file_journal = FileJournal::open(&path).unwrap();
        let mut memory_journal = MemoryJournal::new();
        file_journal.append(&run_start(31337)).unwrap();

        for (limit, message) in over_limit() {
            let expected = message.message_type();
            match file_journal.append(&message) {
                Err(JournalError::Unreadable { message_type, .. }) => {
                    assert_eq!(message_type, expected, "{limit}")
                }
                other => panic!("{limit}: expected rejection, got {other:?}"),
            }
            assert!(
                matches!(
                    memory_journal.append(&message),
                    Err(JournalError::Unreadable { .. })
                ),
                "{limit}"
            );
        }
        assert!(memory_journal.is_empty());
        assert_eq!(file_journal.len(), 1);

        let reopened = FileJournal::open(&path).unwrap();
        assert_eq!(reopened.read_all().unwrap(), vec![run_start(31337)]);
    }

    #[test]
    fn reader_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        let mut journal = FileJournal::open(&path).unwrap();
        for message in &messages()[..3] {
            journal.append(message).unwrap();
        }

        // A writer is halfway through its next record.
        let record = record_of(&messages()[3]);
        let (head, rest) = record.split_at(record.len() / 2);
        append_bytes(&path, head);
        let len = std::fs::metadata(&path).unwrap().len();

        let reader = JournalReader::open(&path).unwrap();
        assert_eq!(reader.read_all().unwrap(), messages()[..3].to_vec());
        let reader = JournalReader::open_with_max_message_size(&path, 4096).unwrap();
        assert_eq!(reader.read_all().unwrap().len(), 3);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), len);

        // The writer finishes and the reader sees the record.
        append_bytes(&path, rest);
        assert_eq!(reader.read_all().unwrap(), messages());
    }

    #[test]
    fn reader_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");
        match JournalReader::open(&path) {
            Err(JournalError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::NotFound),
            other => panic!("expected missing file, got {other:?}"),
        }
        assert!(!path.exists());
    }
}
