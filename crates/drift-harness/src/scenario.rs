//! Scenario sequencing
//!
//! A scenario is an ordered action list run against one peer. Execution is a
//! single cooperative sequence: suspension happens only inside explicit
//! waits and sleeps, and the first fatal error aborts everything that
//! follows.

use crate::action::Action;
use crate::error::HarnessError;
use crate::peer::Peer;

/// A named, ordered list of actions for one peer.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario name, for logs and failure reports
    pub name: String,
    /// Steps, run strictly in order
    pub actions: Vec<Action>,
}

impl Scenario {
    /// Creates a scenario.
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }

    /// Runs every action in order against `peer`, stopping at the first
    /// failure.
    pub async fn run(&self, peer: &Peer) -> Result<(), HarnessError> {
        tracing::info!(scenario = %self.name, peer = %peer.name(), "scenario starting");

        for (step, action) in self.actions.iter().enumerate() {
            tracing::info!(step, %action, "running action");
            if let Err(error) = action.run(peer).await {
                tracing::error!(scenario = %self.name, step, %action, %error, "scenario failed");
                return Err(error);
            }
        }

        tracing::info!(scenario = %self.name, "scenario finished");
        Ok(())
    }
}
