//! Scenario action vocabulary
//!
//! An action is one ordered step of a scenario: either an engine command or
//! a matching primitive over the peer's mailbox. Actions run strictly in
//! sequence; the first failure aborts the remainder of the scenario for that
//! peer.

use std::fmt;
use std::time::Duration;

use drift_events::{Event, NoiseFilter};

use crate::error::HarnessError;
use crate::peer::Peer;

/// One step of a scenario.
#[derive(Debug, Clone)]
pub enum Action {
    /// Queue an outgoing transfer and register its id, so the initiating
    /// side sees the transfer under the next free slot.
    NewTransfer {
        /// Target peer name
        peer: String,
        /// Paths to offer
        paths: Vec<String>,
    },
    /// Start downloading a file of an incoming transfer.
    Download {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
        /// Destination directory
        destination: String,
    },
    /// Cancel a whole transfer.
    CancelTransfer {
        /// Transfer slot
        slot: usize,
    },
    /// Reject a single file.
    RejectFile {
        /// Transfer slot
        slot: usize,
        /// File id
        file: String,
    },
    /// Shut the engine down.
    Stop,

    /// Ordered wait for exactly one event.
    Wait {
        /// The expected event
        target: Event,
        /// Noise classes to discard while waiting
        filter: NoiseFilter,
    },
    /// Unordered wait for a multiset of events.
    WaitRacy {
        /// The expected events, any arrival order
        targets: Vec<Event>,
        /// Noise classes to discard while waiting
        filter: NoiseFilter,
    },
    /// Assert that no surviving event arrives within the window.
    ExpectSilence {
        /// Length of the window
        duration: Duration,
        /// Noise classes that do not break the silence
        filter: NoiseFilter,
    },
    /// Let events accumulate for the window, then log and discard them.
    /// For phases whose outcome is inspected structurally elsewhere.
    DrainEvents {
        /// Length of the window
        duration: Duration,
    },
    /// Discard everything buffered so far, between scenario phases.
    ClearEvents,
    /// Plain suspension, e.g. to let the other peer come up.
    Sleep {
        /// How long to suspend
        duration: Duration,
    },
}

impl Action {
    /// Runs this action against `peer`.
    pub async fn run(&self, peer: &Peer) -> Result<(), HarnessError> {
        match self {
            Action::NewTransfer {
                peer: remote,
                paths,
            } => {
                let transfer_id = peer
                    .engine()
                    .new_transfer(remote, paths)
                    .await
                    .map_err(HarnessError::engine)?;
                let slot = peer.slots().register_if_new(&transfer_id);
                tracing::debug!(%transfer_id, slot, "transfer queued");
                Ok(())
            }
            Action::Download {
                slot,
                file,
                destination,
            } => {
                let transfer_id = peer.resolve_slot(*slot)?;
                peer.engine()
                    .download(&transfer_id, file, destination)
                    .await
                    .map_err(HarnessError::engine)
            }
            Action::CancelTransfer { slot } => {
                let transfer_id = peer.resolve_slot(*slot)?;
                peer.engine()
                    .cancel_transfer(&transfer_id)
                    .await
                    .map_err(HarnessError::engine)
            }
            Action::RejectFile { slot, file } => {
                let transfer_id = peer.resolve_slot(*slot)?;
                peer.engine()
                    .reject_file(&transfer_id, file)
                    .await
                    .map_err(HarnessError::engine)
            }
            Action::Stop => peer.engine().stop().await.map_err(HarnessError::engine),

            Action::Wait { target, filter } => {
                peer.mailbox().wait_for(target, filter).await?;
                Ok(())
            }
            Action::WaitRacy { targets, filter } => {
                peer.mailbox().wait_racy(targets, filter).await?;
                Ok(())
            }
            Action::ExpectSilence { duration, filter } => {
                match peer.mailbox().wait_for_any_event(*duration, filter).await {
                    None => Ok(()),
                    Some(event) => Err(HarnessError::UnexpectedEvent {
                        event: Box::new(event),
                    }),
                }
            }
            Action::DrainEvents { duration } => {
                let drained = peer.mailbox().gather_all(*duration).await;
                for event in &drained {
                    tracing::debug!(%event, "drained");
                }
                tracing::info!(count = drained.len(), "drained event window");
                Ok(())
            }
            Action::ClearEvents => {
                peer.mailbox().clear();
                Ok(())
            }
            Action::Sleep { duration } => {
                tokio::time::sleep(*duration).await;
                Ok(())
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::NewTransfer { peer, paths } => {
                write!(f, "NewTransfer(peer: {peer}, paths: {paths:?})")
            }
            Action::Download {
                slot,
                file,
                destination,
            } => write!(f, "Download(slot {slot}, file: {file}, dst: {destination})"),
            Action::CancelTransfer { slot } => write!(f, "CancelTransfer(slot {slot})"),
            Action::RejectFile { slot, file } => {
                write!(f, "RejectFile(slot {slot}, file: {file})")
            }
            Action::Stop => write!(f, "Stop"),
            Action::Wait { target, .. } => write!(f, "Wait({target})"),
            Action::WaitRacy { targets, .. } => {
                let entries: Vec<String> = targets.iter().map(Event::to_string).collect();
                write!(f, "WaitRacy([{}])", entries.join(", "))
            }
            Action::ExpectSilence { duration, .. } => {
                write!(f, "ExpectSilence({duration:?})")
            }
            Action::DrainEvents { duration } => write!(f, "DrainEvents({duration:?})"),
            Action::ClearEvents => write!(f, "ClearEvents"),
            Action::Sleep { duration } => write!(f, "Sleep({duration:?})"),
        }
    }
}
