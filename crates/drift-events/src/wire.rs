//! Raw event payload contract
//!
//! The engine reports events as externally tagged JSON,
//! `{"type": "...", "data": {...}}`, with opaque transfer ids. This module
//! owns the serde types for that payload and the translation into the
//! harness's [`Event`] model, registering transfer ids with the
//! [`SlotRegistry`] on first sight.
//!
//! Field names follow the engine's contract verbatim, including the
//! `transfered` spelling.

use serde::Deserialize;

use crate::event::{Event, FileInfo};
use crate::slots::SlotRegistry;

/// One file entry in a transfer request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFile {
    /// Engine-assigned file id
    pub id: String,
    /// Path relative to the transfer root
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

/// Failure description attached to failed/deferred events.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatus {
    /// Engine status code
    pub status: u32,
    /// OS error code when the failure came from the OS
    #[serde(default)]
    pub os_error_code: Option<i32>,
}

/// The engine's raw event payload, one variant per life-cycle event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RawEvent {
    /// Incoming transfer request
    RequestReceived {
        /// Logical peer name, already resolved by the identity layer
        peer: String,
        /// Opaque transfer id
        transfer: String,
        /// Offered files
        files: Vec<RawFile>,
    },
    /// Outgoing transfer queued
    RequestQueued {
        /// Logical peer name
        peer: String,
        /// Opaque transfer id
        transfer: String,
        /// Offered files
        files: Vec<RawFile>,
    },
    /// File transfer started
    FileStarted {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
        /// Bytes already present on resume
        transfered: u64,
    },
    /// File transfer progressed
    FileProgress {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
        /// Bytes transferred so far
        transfered: u64,
    },
    /// File transfer throttled
    FileThrottled {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
        /// Bytes transferred when throttled
        transfered: u64,
    },
    /// File download accepted, waiting to start
    FilePending {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
    },
    /// File transfer paused
    FilePaused {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
    },
    /// File finished uploading
    FileUploaded {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
    },
    /// File finished downloading
    FileDownloaded {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
        /// Path the file ended up under
        final_path: String,
    },
    /// File rejected
    FileRejected {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
        /// Whether the remote side rejected
        by_peer: bool,
    },
    /// File failed
    FileFailed {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
        /// Failure description
        status: RawStatus,
    },
    /// Whole transfer canceled
    TransferCanceled {
        /// Opaque transfer id
        transfer: String,
        /// Whether the remote side canceled
        by_peer: bool,
    },
    /// Whole transfer failed
    TransferFailed {
        /// Opaque transfer id
        transfer: String,
        /// Failure description
        status: RawStatus,
    },
    /// Outgoing transfer deferred after a connection failure
    TransferDeferred {
        /// Opaque transfer id
        transfer: String,
        /// Logical peer name
        peer: String,
        /// Failure description
        status: RawStatus,
    },
    /// Finalize-checksum started
    FinalizeChecksumStarted {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
        /// Total bytes to checksum
        size: u64,
    },
    /// Finalize-checksum progressed
    FinalizeChecksumProgress {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
        /// Bytes checksummed so far
        bytes_checksummed: u64,
    },
    /// Finalize-checksum finished
    FinalizeChecksumFinished {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
    },
    /// Verify-checksum started
    VerifyChecksumStarted {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
        /// Total bytes to verify
        size: u64,
    },
    /// Verify-checksum progressed
    VerifyChecksumProgress {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
        /// Bytes verified so far
        bytes_checksummed: u64,
    },
    /// Verify-checksum finished
    VerifyChecksumFinished {
        /// Opaque transfer id
        transfer: String,
        /// File id
        file: String,
    },
    /// Engine-level error
    RuntimeError {
        /// Engine status code
        status: u32,
    },
}

fn convert_files(files: Vec<RawFile>) -> Vec<FileInfo> {
    files
        .into_iter()
        .map(|f| FileInfo {
            id: f.id,
            path: f.path,
            size: f.size,
        })
        .collect()
}

impl Event {
    /// Translates a raw payload into the slot-virtualized event model.
    ///
    /// The transfer id is registered with `slots` on first sight, so slot
    /// numbering follows the peer's first-seen arrival order. Every optional
    /// field of the resulting event is concrete; wildcards only ever appear
    /// on the expectation side.
    pub fn from_raw(raw: RawEvent, slots: &SlotRegistry) -> Self {
        match raw {
            RawEvent::RequestQueued {
                peer,
                transfer,
                files,
            } => Event::Queued {
                slot: slots.register_if_new(&transfer),
                peer,
                files: convert_files(files),
            },
            RawEvent::RequestReceived {
                peer,
                transfer,
                files,
            } => Event::RequestReceived {
                slot: slots.register_if_new(&transfer),
                peer,
                files: convert_files(files),
            },
            RawEvent::FileStarted {
                transfer,
                file,
                transfered,
            } => Event::Start {
                slot: slots.register_if_new(&transfer),
                file,
                transferred: Some(transfered),
            },
            RawEvent::FileProgress {
                transfer,
                file,
                transfered,
            } => Event::Progress {
                slot: slots.register_if_new(&transfer),
                file,
                transferred: Some(transfered),
            },
            RawEvent::FileThrottled {
                transfer,
                file,
                transfered,
            } => Event::Throttled {
                slot: slots.register_if_new(&transfer),
                file,
                transferred: Some(transfered),
            },
            RawEvent::FilePending { transfer, file } => Event::Pending {
                slot: slots.register_if_new(&transfer),
                file,
            },
            RawEvent::FilePaused { transfer, file } => Event::Paused {
                slot: slots.register_if_new(&transfer),
                file,
            },
            RawEvent::FileUploaded { transfer, file } => Event::FinishFileUploaded {
                slot: slots.register_if_new(&transfer),
                file,
            },
            RawEvent::FileDownloaded {
                transfer,
                file,
                final_path,
            } => Event::FinishFileDownloaded {
                slot: slots.register_if_new(&transfer),
                file,
                final_path,
            },
            RawEvent::FileRejected {
                transfer,
                file,
                by_peer,
            } => Event::FinishFileRejected {
                slot: slots.register_if_new(&transfer),
                file,
                by_peer,
            },
            RawEvent::FileFailed {
                transfer,
                file,
                status,
            } => Event::FinishFileFailed {
                slot: slots.register_if_new(&transfer),
                file,
                status: status.status,
                os_err: status.os_error_code,
            },
            RawEvent::TransferCanceled { transfer, by_peer } => Event::FinishTransferCanceled {
                slot: slots.register_if_new(&transfer),
                by_peer,
            },
            RawEvent::TransferFailed { transfer, status } => Event::FinishFailedTransfer {
                slot: slots.register_if_new(&transfer),
                status: status.status,
                os_err: status.os_error_code,
            },
            RawEvent::TransferDeferred {
                transfer,
                peer,
                status,
            } => Event::TransferDeferred {
                slot: slots.register_if_new(&transfer),
                peer,
                status: status.status,
                os_err: status.os_error_code,
            },
            RawEvent::FinalizeChecksumStarted {
                transfer,
                file,
                size,
            } => Event::FinalizeChecksumStarted {
                slot: slots.register_if_new(&transfer),
                file,
                size: Some(size),
            },
            RawEvent::FinalizeChecksumProgress {
                transfer,
                file,
                bytes_checksummed,
            } => Event::FinalizeChecksumProgress {
                slot: slots.register_if_new(&transfer),
                file,
                bytes: Some(bytes_checksummed),
            },
            RawEvent::FinalizeChecksumFinished { transfer, file } => {
                Event::FinalizeChecksumFinished {
                    slot: slots.register_if_new(&transfer),
                    file,
                }
            }
            RawEvent::VerifyChecksumStarted {
                transfer,
                file,
                size,
            } => Event::VerifyChecksumStarted {
                slot: slots.register_if_new(&transfer),
                file,
                size: Some(size),
            },
            RawEvent::VerifyChecksumProgress {
                transfer,
                file,
                bytes_checksummed,
            } => Event::VerifyChecksumProgress {
                slot: slots.register_if_new(&transfer),
                file,
                bytes: Some(bytes_checksummed),
            },
            RawEvent::VerifyChecksumFinished { transfer, file } => Event::VerifyChecksumFinished {
                slot: slots.register_if_new(&transfer),
                file,
            },
            RawEvent::RuntimeError { status } => Event::RuntimeError { status },
        }
    }
}
