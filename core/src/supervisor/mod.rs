//! Group supervisor
//!
//! Coordinates a fixed set of managed processes as a single unit of
//! liveness: members are polled in start order on a fixed cadence, and the
//! first observed exit triggers termination of every remaining member.
//!
//! Per supervision session the group moves through
//! `Idle -> Running -> Degraded (one exited) -> Terminating -> Ended`;
//! `Ended` is terminal, there is no restart path. A single exit, whatever
//! the code, is the normal shutdown trigger rather than a supervisor fault.

use crate::process::PollStatus;
use crate::Result;
use schema::PipelineEvent;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub mod adapters;

pub use adapters::*;

/// A process under group supervision: observable liveness plus a
/// termination request. Implemented by real managed children and by mock
/// members in tests.
pub trait Supervised: Send {
    /// Display name for log entries
    fn name(&self) -> &str;

    /// Process ID
    fn pid(&self) -> u32;

    /// Non-blocking liveness check
    fn poll(&mut self) -> Result<PollStatus>;

    /// Request graceful termination; already-exited members are tolerated
    fn terminate(&mut self) -> Result<()>;
}

/// A fixed, ordered group of supervised processes
pub struct ProcessGroup {
    /// Members in start order
    members: Vec<Box<dyn Supervised>>,
    /// Fixed interval between poll ticks
    tick: Duration,
    /// Event broadcaster
    event_tx: broadcast::Sender<PipelineEvent>,
}

impl ProcessGroup {
    /// Create an empty group polling at the given tick interval
    pub fn new(tick: Duration, event_tx: broadcast::Sender<PipelineEvent>) -> Self {
        Self {
            members: Vec::new(),
            tick,
            event_tx,
        }
    }

    /// Append a member; iteration during polling follows insertion order
    pub fn push(&mut self, member: Box<dyn Supervised>) {
        let _ = self.event_tx.send(PipelineEvent::member_started(
            member.name().to_string(),
            member.pid(),
        ));
        self.members.push(member);
    }

    /// Number of supervised members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Poll every member on the fixed cadence until one exits, then send a
    /// termination request to each member exactly once and return.
    ///
    /// If several members have exited by the time a tick runs, only the
    /// first encountered in start order triggers the decision for that
    /// tick, but termination still addresses all members, so the outcome is
    /// independent of iteration order.
    ///
    /// The loop never suspends except for the fixed sleep between ticks;
    /// polling itself is non-blocking.
    pub async fn watch(&mut self) -> Result<()> {
        if self.members.is_empty() {
            debug!("no members to supervise");
            return Ok(());
        }

        info!("supervising {} processes", self.members.len());
        let mut running = true;

        while running {
            for member in &mut self.members {
                if let PollStatus::Exited(exit) = member.poll()? {
                    let _ = self
                        .event_tx
                        .send(PipelineEvent::member_exited(member.name().to_string(), exit));
                    running = false;
                    break;
                }
            }

            if running {
                sleep(self.tick).await;
            }
        }

        info!("terminating remaining processes");
        let _ = self.event_tx.send(PipelineEvent::group_terminating());

        // Exactly one request per member; failures beyond "already gone"
        // are logged, the shutdown still addresses everyone.
        for member in &mut self.members {
            if let Err(e) = member.terminate() {
                warn!("failed to terminate '{}': {}", member.name(), e);
            }
        }

        let _ = self.event_tx.send(PipelineEvent::group_ended());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{ExecutableRef, ProcessSpec};

    fn spec(name: &str) -> ProcessSpec {
        ProcessSpec::new(ExecutableRef::Name(name.to_string()), vec![])
    }

    async fn spawn_member(
        adapter: &MockProcessAdapter,
        name: &str,
        script: MockScript,
    ) -> Box<dyn Supervised> {
        adapter.push_script(script);
        adapter.spawn(&spec(name)).await.unwrap()
    }

    #[tokio::test]
    async fn first_exit_terminates_every_member_exactly_once() {
        let adapter = MockProcessAdapter::new();
        let (event_tx, _event_rx) = broadcast::channel(64);
        let mut group = ProcessGroup::new(Duration::from_millis(5), event_tx);

        group.push(spawn_member(&adapter, "alpha", MockScript::runs_forever()).await);
        group.push(spawn_member(&adapter, "bravo", MockScript::exits_after_polls(3)).await);
        group.push(spawn_member(&adapter, "charlie", MockScript::runs_forever()).await);

        group.watch().await.unwrap();

        // every member received exactly one terminate, in start order
        assert_eq!(adapter.terminations(), vec!["alpha", "bravo", "charlie"]);
        // the loop ended on tick 3: bravo was polled exactly three times
        assert_eq!(adapter.poll_count("bravo"), 3);
    }

    #[tokio::test]
    async fn several_exited_members_still_get_one_terminate_each() {
        let adapter = MockProcessAdapter::new();
        let (event_tx, _event_rx) = broadcast::channel(64);
        let mut group = ProcessGroup::new(Duration::from_millis(5), event_tx);

        group.push(spawn_member(&adapter, "alpha", MockScript::exits_after_polls(1)).await);
        group.push(spawn_member(&adapter, "bravo", MockScript::exits_after_polls(1)).await);
        group.push(spawn_member(&adapter, "charlie", MockScript::runs_forever()).await);

        group.watch().await.unwrap();

        assert_eq!(adapter.terminations(), vec!["alpha", "bravo", "charlie"]);
        // alpha's exit decided the tick; bravo was never polled past it
        assert_eq!(adapter.poll_count("alpha"), 1);
        assert_eq!(adapter.poll_count("bravo"), 0);
    }

    #[tokio::test]
    async fn watch_emits_lifecycle_events() {
        let adapter = MockProcessAdapter::new();
        let (event_tx, mut event_rx) = broadcast::channel(64);
        let mut group = ProcessGroup::new(Duration::from_millis(5), event_tx);

        group.push(spawn_member(&adapter, "alpha", MockScript::exits_after_polls(1)).await);
        group.watch().await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            kinds.push(match event {
                PipelineEvent::MemberStarted { .. } => "started",
                PipelineEvent::MemberExited { .. } => "exited",
                PipelineEvent::GroupTerminating { .. } => "terminating",
                PipelineEvent::GroupEnded { .. } => "ended",
                PipelineEvent::PrepFinished { .. } => "prep",
            });
        }
        assert_eq!(kinds, vec!["started", "exited", "terminating", "ended"]);
    }

    #[tokio::test]
    async fn empty_group_returns_immediately() {
        let (event_tx, _event_rx) = broadcast::channel(8);
        let mut group = ProcessGroup::new(Duration::from_millis(5), event_tx);
        assert!(group.is_empty());
        group.watch().await.unwrap();
    }
}
