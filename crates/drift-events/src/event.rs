//! Life-cycle event model with partial equality
//!
//! Events carry the transfer's virtualized slot (see [`crate::slots`]) instead
//! of the engine's opaque transfer id, so expectations in scenarios stay small
//! and human-readable. Equality between two events of the same variant is
//! partial: optional fields compare equal whenever either side left them
//! unspecified, and file sets compare as multisets.

use std::collections::HashMap;
use std::fmt;

/// One file entry inside a transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileInfo {
    /// Engine-assigned file id
    pub id: String,
    /// Path of the file relative to the transfer root
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

impl FileInfo {
    /// Convenience constructor used heavily by scenario expectations.
    pub fn new(id: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            size,
        }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File(id: {}, path: {}, size: {})",
            self.id, self.path, self.size
        )
    }
}

/// A single life-cycle event reported by the transfer engine.
///
/// `slot` is the first-seen index of the transfer id, `file` is the engine's
/// file id within that transfer. Optional numeric fields act as wildcards
/// when `None`: an expectation that does not pin them matches any concrete
/// value. Concrete values, including zero, must match exactly.
#[derive(Debug, Clone)]
pub enum Event {
    /// Outgoing transfer was queued locally.
    Queued {
        /// Transfer slot
        slot: usize,
        /// Logical peer name
        peer: String,
        /// Files offered by the transfer, compared as a multiset
        files: Vec<FileInfo>,
    },
    /// Incoming transfer request arrived from a peer.
    RequestReceived {
        /// Transfer slot
        slot: usize,
        /// Logical peer name
        peer: String,
        /// Files offered by the transfer, compared as a multiset
        files: Vec<FileInfo>,
    },
    /// Outgoing transfer could not reach the peer and was parked for retry.
    TransferDeferred {
        /// Transfer slot
        slot: usize,
        /// Logical peer name
        peer: String,
        /// Engine status code
        status: u32,
        /// OS error code, wildcard when unspecified
        os_err: Option<i32>,
    },
    /// Whole transfer was canceled.
    FinishTransferCanceled {
        /// Transfer slot
        slot: usize,
        /// Whether the remote side initiated the cancel
        by_peer: bool,
    },
    /// Whole transfer failed.
    FinishFailedTransfer {
        /// Transfer slot
        slot: usize,
        /// Engine status code
        status: u32,
        /// OS error code, wildcard when unspecified
        os_err: Option<i32>,
    },
    /// Engine-level error not tied to a transfer.
    RuntimeError {
        /// Engine status code
        status: u32,
    },

    /// File download was accepted and is waiting for the engine to start it.
    Pending {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
    },
    /// File transfer started.
    Start {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Bytes already transferred at start (resume), wildcard when
        /// unspecified
        transferred: Option<u64>,
    },
    /// File transfer progressed.
    Progress {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Bytes transferred so far, wildcard when unspecified
        transferred: Option<u64>,
    },
    /// File transfer was throttled by the engine.
    Throttled {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Bytes transferred when throttling kicked in, wildcard when
        /// unspecified
        transferred: Option<u64>,
    },
    /// File transfer was paused.
    Paused {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
    },
    /// File finished uploading.
    FinishFileUploaded {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
    },
    /// File finished downloading.
    FinishFileDownloaded {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Path the engine stored the file under
        final_path: String,
    },
    /// File was rejected.
    FinishFileRejected {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Whether the remote side rejected it
        by_peer: bool,
    },
    /// File failed.
    FinishFileFailed {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Engine status code
        status: u32,
        /// OS error code, wildcard when unspecified
        os_err: Option<i32>,
    },

    /// Checksum computation before finalizing a download started.
    FinalizeChecksumStarted {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Total bytes to checksum, wildcard when unspecified
        size: Option<u64>,
    },
    /// Checksum computation before finalizing a download progressed.
    FinalizeChecksumProgress {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Bytes checksummed so far, wildcard when unspecified
        bytes: Option<u64>,
    },
    /// Checksum computation before finalizing a download finished.
    FinalizeChecksumFinished {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
    },
    /// Checksum verification of resumed data started.
    VerifyChecksumStarted {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Total bytes to verify, wildcard when unspecified
        size: Option<u64>,
    },
    /// Checksum verification of resumed data progressed.
    VerifyChecksumProgress {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Bytes verified so far, wildcard when unspecified
        bytes: Option<u64>,
    },
    /// Checksum verification of resumed data finished.
    VerifyChecksumFinished {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
    },
}

/// Wildcard comparison for optional fields: unspecified on either side
/// matches anything.
fn opt_eq<T: PartialEq>(lhs: &Option<T>, rhs: &Option<T>) -> bool {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => lhs == rhs,
        _ => true,
    }
}

/// Multiset comparison over file entries: order irrelevant, duplicate counts
/// matter.
fn files_eq(lhs: &[FileInfo], rhs: &[FileInfo]) -> bool {
    if lhs.len() != rhs.len() {
        return false;
    }

    let mut counts: HashMap<&FileInfo, usize> = HashMap::with_capacity(lhs.len());
    for file in lhs {
        *counts.entry(file).or_default() += 1;
    }
    for file in rhs {
        match counts.get_mut(file) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return false,
        }
    }

    true
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        use Event::*;

        match (self, other) {
            (
                Queued { slot, peer, files },
                Queued {
                    slot: r_slot,
                    peer: r_peer,
                    files: r_files,
                },
            ) => slot == r_slot && peer == r_peer && files_eq(files, r_files),
            (
                RequestReceived { slot, peer, files },
                RequestReceived {
                    slot: r_slot,
                    peer: r_peer,
                    files: r_files,
                },
            ) => slot == r_slot && peer == r_peer && files_eq(files, r_files),
            (
                TransferDeferred {
                    slot,
                    peer,
                    status,
                    os_err,
                },
                TransferDeferred {
                    slot: r_slot,
                    peer: r_peer,
                    status: r_status,
                    os_err: r_os_err,
                },
            ) => {
                slot == r_slot && peer == r_peer && status == r_status && opt_eq(os_err, r_os_err)
            }
            (
                FinishTransferCanceled { slot, by_peer },
                FinishTransferCanceled {
                    slot: r_slot,
                    by_peer: r_by_peer,
                },
            ) => slot == r_slot && by_peer == r_by_peer,
            (
                FinishFailedTransfer {
                    slot,
                    status,
                    os_err,
                },
                FinishFailedTransfer {
                    slot: r_slot,
                    status: r_status,
                    os_err: r_os_err,
                },
            ) => slot == r_slot && status == r_status && opt_eq(os_err, r_os_err),
            (RuntimeError { status }, RuntimeError { status: r_status }) => status == r_status,

            (
                Pending { slot, file },
                Pending {
                    slot: r_slot,
                    file: r_file,
                },
            ) => slot == r_slot && file == r_file,
            (
                Start {
                    slot,
                    file,
                    transferred,
                },
                Start {
                    slot: r_slot,
                    file: r_file,
                    transferred: r_transferred,
                },
            ) => slot == r_slot && file == r_file && opt_eq(transferred, r_transferred),
            (
                Progress {
                    slot,
                    file,
                    transferred,
                },
                Progress {
                    slot: r_slot,
                    file: r_file,
                    transferred: r_transferred,
                },
            ) => slot == r_slot && file == r_file && opt_eq(transferred, r_transferred),
            (
                Throttled {
                    slot,
                    file,
                    transferred,
                },
                Throttled {
                    slot: r_slot,
                    file: r_file,
                    transferred: r_transferred,
                },
            ) => slot == r_slot && file == r_file && opt_eq(transferred, r_transferred),
            (
                Paused { slot, file },
                Paused {
                    slot: r_slot,
                    file: r_file,
                },
            ) => slot == r_slot && file == r_file,
            (
                FinishFileUploaded { slot, file },
                FinishFileUploaded {
                    slot: r_slot,
                    file: r_file,
                },
            ) => slot == r_slot && file == r_file,
            (
                FinishFileDownloaded {
                    slot,
                    file,
                    final_path,
                },
                FinishFileDownloaded {
                    slot: r_slot,
                    file: r_file,
                    final_path: r_final_path,
                },
            ) => slot == r_slot && file == r_file && final_path == r_final_path,
            (
                FinishFileRejected {
                    slot,
                    file,
                    by_peer,
                },
                FinishFileRejected {
                    slot: r_slot,
                    file: r_file,
                    by_peer: r_by_peer,
                },
            ) => slot == r_slot && file == r_file && by_peer == r_by_peer,
            (
                FinishFileFailed {
                    slot,
                    file,
                    status,
                    os_err,
                },
                FinishFileFailed {
                    slot: r_slot,
                    file: r_file,
                    status: r_status,
                    os_err: r_os_err,
                },
            ) => {
                slot == r_slot && file == r_file && status == r_status && opt_eq(os_err, r_os_err)
            }

            (
                FinalizeChecksumStarted { slot, file, size },
                FinalizeChecksumStarted {
                    slot: r_slot,
                    file: r_file,
                    size: r_size,
                },
            ) => slot == r_slot && file == r_file && opt_eq(size, r_size),
            (
                FinalizeChecksumProgress { slot, file, bytes },
                FinalizeChecksumProgress {
                    slot: r_slot,
                    file: r_file,
                    bytes: r_bytes,
                },
            ) => slot == r_slot && file == r_file && opt_eq(bytes, r_bytes),
            (
                FinalizeChecksumFinished { slot, file },
                FinalizeChecksumFinished {
                    slot: r_slot,
                    file: r_file,
                },
            ) => slot == r_slot && file == r_file,
            (
                VerifyChecksumStarted { slot, file, size },
                VerifyChecksumStarted {
                    slot: r_slot,
                    file: r_file,
                    size: r_size,
                },
            ) => slot == r_slot && file == r_file && opt_eq(size, r_size),
            (
                VerifyChecksumProgress { slot, file, bytes },
                VerifyChecksumProgress {
                    slot: r_slot,
                    file: r_file,
                    bytes: r_bytes,
                },
            ) => slot == r_slot && file == r_file && opt_eq(bytes, r_bytes),
            (
                VerifyChecksumFinished { slot, file },
                VerifyChecksumFinished {
                    slot: r_slot,
                    file: r_file,
                },
            ) => slot == r_slot && file == r_file,

            _ => false,
        }
    }
}

/// Formats an optional field, printing `*` for wildcards.
fn fmt_opt<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "*".to_string(),
    }
}

fn fmt_files(files: &[FileInfo]) -> String {
    let entries: Vec<String> = files.iter().map(FileInfo::to_string).collect();
    format!("[{}]", entries.join(", "))
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Event::*;

        match self {
            Queued { slot, peer, files } => write!(
                f,
                "Queued(slot {slot}, peer: {peer}, files: {})",
                fmt_files(files)
            ),
            RequestReceived { slot, peer, files } => write!(
                f,
                "RequestReceived(slot {slot}, peer: {peer}, files: {})",
                fmt_files(files)
            ),
            TransferDeferred {
                slot,
                peer,
                status,
                os_err,
            } => write!(
                f,
                "TransferDeferred(slot {slot}, peer: {peer}, status: {status}, os_err: {})",
                fmt_opt(os_err)
            ),
            FinishTransferCanceled { slot, by_peer } => {
                write!(f, "FinishTransferCanceled(slot {slot}, by_peer: {by_peer})")
            }
            FinishFailedTransfer {
                slot,
                status,
                os_err,
            } => write!(
                f,
                "FinishFailedTransfer(slot {slot}, status: {status}, os_err: {})",
                fmt_opt(os_err)
            ),
            RuntimeError { status } => write!(f, "RuntimeError(status: {status})"),

            Pending { slot, file } => write!(f, "Pending(slot {slot}, file: {file})"),
            Start {
                slot,
                file,
                transferred,
            } => write!(
                f,
                "Start(slot {slot}, file: {file}, transferred: {})",
                fmt_opt(transferred)
            ),
            Progress {
                slot,
                file,
                transferred,
            } => write!(
                f,
                "Progress(slot {slot}, file: {file}, transferred: {})",
                fmt_opt(transferred)
            ),
            Throttled {
                slot,
                file,
                transferred,
            } => write!(
                f,
                "Throttled(slot {slot}, file: {file}, transferred: {})",
                fmt_opt(transferred)
            ),
            Paused { slot, file } => write!(f, "Paused(slot {slot}, file: {file})"),
            FinishFileUploaded { slot, file } => {
                write!(f, "FinishFileUploaded(slot {slot}, file: {file})")
            }
            FinishFileDownloaded {
                slot,
                file,
                final_path,
            } => write!(
                f,
                "FinishFileDownloaded(slot {slot}, file: {file}, final_path: {final_path})"
            ),
            FinishFileRejected {
                slot,
                file,
                by_peer,
            } => write!(
                f,
                "FinishFileRejected(slot {slot}, file: {file}, by_peer: {by_peer})"
            ),
            FinishFileFailed {
                slot,
                file,
                status,
                os_err,
            } => write!(
                f,
                "FinishFileFailed(slot {slot}, file: {file}, status: {status}, os_err: {})",
                fmt_opt(os_err)
            ),

            FinalizeChecksumStarted { slot, file, size } => write!(
                f,
                "FinalizeChecksumStarted(slot {slot}, file: {file}, size: {})",
                fmt_opt(size)
            ),
            FinalizeChecksumProgress { slot, file, bytes } => write!(
                f,
                "FinalizeChecksumProgress(slot {slot}, file: {file}, bytes: {})",
                fmt_opt(bytes)
            ),
            FinalizeChecksumFinished { slot, file } => {
                write!(f, "FinalizeChecksumFinished(slot {slot}, file: {file})")
            }
            VerifyChecksumStarted { slot, file, size } => write!(
                f,
                "VerifyChecksumStarted(slot {slot}, file: {file}, size: {})",
                fmt_opt(size)
            ),
            VerifyChecksumProgress { slot, file, bytes } => write!(
                f,
                "VerifyChecksumProgress(slot {slot}, file: {file}, bytes: {})",
                fmt_opt(bytes)
            ),
            VerifyChecksumFinished { slot, file } => {
                write!(f, "VerifyChecksumFinished(slot {slot}, file: {file})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(transferred: Option<u64>) -> Event {
        Event::Progress {
            slot: 0,
            file: "f1".to_string(),
            transferred,
        }
    }

    #[test]
    fn wildcard_matches_any_concrete_value() {
        assert_eq!(progress(None), progress(Some(1024)));
        assert_eq!(progress(Some(1024)), progress(None));
        assert_eq!(progress(None), progress(None));
    }

    #[test]
    fn concrete_zero_is_not_a_wildcard() {
        assert_ne!(progress(Some(0)), progress(Some(1024)));
        assert_eq!(progress(Some(0)), progress(Some(0)));
    }

    #[test]
    fn different_variants_never_match() {
        let start = Event::Start {
            slot: 0,
            file: "f1".to_string(),
            transferred: None,
        };
        assert_ne!(start, progress(None));
    }

    #[test]
    fn file_sets_compare_as_multisets() {
        let a = FileInfo::new("a", "a.txt", 1);
        let b = FileInfo::new("b", "b.txt", 2);

        let queued = |files: Vec<FileInfo>| Event::Queued {
            slot: 0,
            peer: "alice".to_string(),
            files,
        };

        assert_eq!(
            queued(vec![a.clone(), b.clone()]),
            queued(vec![b.clone(), a.clone()])
        );
        assert_ne!(queued(vec![a.clone(), a.clone()]), queued(vec![a.clone()]));
        assert_ne!(
            queued(vec![a.clone(), a.clone()]),
            queued(vec![a.clone(), b])
        );
        assert_eq!(queued(vec![]), queued(vec![]));
    }

    #[test]
    fn display_is_deterministic() {
        let event = Event::Start {
            slot: 2,
            file: "f9".to_string(),
            transferred: None,
        };
        assert_eq!(event.to_string(), "Start(slot 2, file: f9, transferred: *)");
        assert_eq!(event.to_string(), format!("{event}"));
    }
}
