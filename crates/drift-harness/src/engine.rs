//! Engine command capability
//!
//! The transfer engine is external to the harness and opaque: scenarios
//! reach it only through this trait, implemented over whatever foreign
//! interface the engine ships (FFI bindings in production, a mock in this
//! crate's tests). Commands take opaque transfer ids; the slot-to-id
//! translation happens in the action layer.

use async_trait::async_trait;

/// Commands a scenario can issue against one engine instance.
///
/// Every method is possibly-failing; failures are opaque to the harness and
/// surface as [`crate::HarnessError::Engine`].
#[async_trait]
pub trait EngineHandle: Send + Sync {
    /// Queues an outgoing transfer to `peer`, returning the engine's opaque
    /// transfer id.
    async fn new_transfer(&self, peer: &str, paths: &[String]) -> anyhow::Result<String>;

    /// Starts downloading a file of an incoming transfer into `destination`.
    async fn download(
        &self,
        transfer_id: &str,
        file_id: &str,
        destination: &str,
    ) -> anyhow::Result<()>;

    /// Cancels a whole transfer.
    async fn cancel_transfer(&self, transfer_id: &str) -> anyhow::Result<()>;

    /// Rejects a single file of a transfer.
    async fn reject_file(&self, transfer_id: &str, file_id: &str) -> anyhow::Result<()>;

    /// Shuts the engine instance down.
    async fn stop(&self) -> anyhow::Result<()>;
}
