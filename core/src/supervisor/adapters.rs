//! Process adapters for abstracting process management
//!
//! The adapter trait decouples the supervisor loop and pipeline assembly
//! from actual OS processes, enabling tests with scripted mock members.

use super::Supervised;
use crate::process::PollStatus;
use crate::Result;
use async_trait::async_trait;
use schema::{ProcessExit, ProcessSpec};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Spawns supervised processes and runs one-shot preparation steps
#[async_trait]
pub trait ProcessAdapter: Send + Sync {
    /// Spawn a new supervised process
    async fn spawn(&self, spec: &ProcessSpec) -> Result<Box<dyn Supervised>>;

    /// Run a process to completion, surfacing but not interpreting its exit
    async fn run_to_completion(&self, spec: &ProcessSpec) -> Result<ProcessExit>;
}

/// Adapter backed by real Unix processes
#[cfg(unix)]
#[derive(Copy, Clone, Debug, Default)]
pub struct UnixProcessAdapter;

#[cfg(unix)]
impl UnixProcessAdapter {
    /// Create a new Unix process adapter
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
#[async_trait]
impl ProcessAdapter for UnixProcessAdapter {
    async fn spawn(&self, spec: &ProcessSpec) -> Result<Box<dyn Supervised>> {
        let child = crate::process::ManagedChild::start(spec)?;
        Ok(Box::new(child))
    }

    async fn run_to_completion(&self, spec: &ProcessSpec) -> Result<ProcessExit> {
        crate::launcher::run_to_completion(spec).await
    }
}

#[cfg(unix)]
impl Supervised for crate::process::ManagedChild {
    fn name(&self) -> &str {
        crate::process::ManagedChild::name(self)
    }

    fn pid(&self) -> u32 {
        crate::process::ManagedChild::pid(self)
    }

    fn poll(&mut self) -> Result<PollStatus> {
        crate::process::ManagedChild::poll(self)
    }

    fn terminate(&mut self) -> Result<()> {
        crate::process::ManagedChild::terminate(self)
    }
}

/// Scripted behavior for one mock member
#[derive(Debug, Clone, Copy)]
pub struct MockScript {
    /// Number of polls after which the member reports an exit; `None`
    /// means it keeps running until terminated
    exit_after_polls: Option<u32>,
    /// Exit reported when the script fires
    exit: ProcessExit,
}

impl MockScript {
    /// A member that never exits on its own
    pub fn runs_forever() -> Self {
        Self {
            exit_after_polls: None,
            exit: ProcessExit::with_code(0),
        }
    }

    /// A member that reports a clean exit on its n-th poll
    pub fn exits_after_polls(n: u32) -> Self {
        Self {
            exit_after_polls: Some(n),
            exit: ProcessExit::with_code(0),
        }
    }

    /// A member that reports the given exit on its n-th poll
    pub fn exits_after_polls_with(n: u32, exit: ProcessExit) -> Self {
        Self {
            exit_after_polls: Some(n),
            exit,
        }
    }
}

impl Default for MockScript {
    fn default() -> Self {
        Self::exits_after_polls(1)
    }
}

/// Shared bookkeeping for all members spawned by one mock adapter
#[derive(Debug, Default)]
struct MockState {
    scripts: VecDeque<MockScript>,
    spawns: Vec<(String, Vec<String>)>,
    runs: Vec<(String, Vec<String>)>,
    terminations: Vec<String>,
    polls: HashMap<String, u32>,
    next_pid: u32,
}

/// Mock process adapter for tests: members follow queued scripts and every
/// spawn, one-shot run, poll, and termination is recorded for assertions.
#[derive(Debug, Clone, Default)]
pub struct MockProcessAdapter {
    state: Arc<Mutex<MockState>>,
}

impl MockProcessAdapter {
    /// Create a mock adapter with no queued scripts; members spawned
    /// without a script exit on their first poll.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the script for the next spawned member
    pub fn push_script(&self, script: MockScript) {
        self.state.lock().unwrap().scripts.push_back(script);
    }

    /// Names and argument lists of spawned members, in spawn order
    pub fn spawned(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().spawns.clone()
    }

    /// Names and argument lists of one-shot runs, in call order
    pub fn completed_runs(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().runs.clone()
    }

    /// Names of members that received a termination request, in order
    pub fn terminations(&self) -> Vec<String> {
        self.state.lock().unwrap().terminations.clone()
    }

    /// How many times the named member was polled
    pub fn poll_count(&self, name: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .polls
            .get(name)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ProcessAdapter for MockProcessAdapter {
    async fn spawn(&self, spec: &ProcessSpec) -> Result<Box<dyn Supervised>> {
        let name = spec.display_name();
        debug!("spawning mock member '{}' {:?}", name, spec.args);

        let mut state = self.state.lock().unwrap();
        let script = state.scripts.pop_front().unwrap_or_default();
        state.next_pid += 1;
        let pid = 1000 + state.next_pid;
        state.spawns.push((name.clone(), spec.args.clone()));

        Ok(Box::new(MockMember {
            name,
            pid,
            polls: 0,
            script,
            exited: None,
            state: Arc::clone(&self.state),
        }))
    }

    async fn run_to_completion(&self, spec: &ProcessSpec) -> Result<ProcessExit> {
        let name = spec.display_name();
        debug!("mock one-shot run '{}' {:?}", name, spec.args);
        self.state
            .lock()
            .unwrap()
            .runs
            .push((name, spec.args.clone()));
        Ok(ProcessExit::with_code(0))
    }
}

/// Mock supervised member following a [`MockScript`]
struct MockMember {
    name: String,
    pid: u32,
    polls: u32,
    script: MockScript,
    exited: Option<ProcessExit>,
    state: Arc<Mutex<MockState>>,
}

impl Supervised for MockMember {
    fn name(&self) -> &str {
        &self.name
    }

    fn pid(&self) -> u32 {
        self.pid
    }

    fn poll(&mut self) -> Result<PollStatus> {
        if let Some(exit) = self.exited {
            return Ok(PollStatus::Exited(exit));
        }

        self.polls += 1;
        *self
            .state
            .lock()
            .unwrap()
            .polls
            .entry(self.name.clone())
            .or_insert(0) += 1;

        if let Some(n) = self.script.exit_after_polls {
            if self.polls >= n {
                self.exited = Some(self.script.exit);
                return Ok(PollStatus::Exited(self.script.exit));
            }
        }
        Ok(PollStatus::Running)
    }

    fn terminate(&mut self) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .terminations
            .push(self.name.clone());
        self.exited.get_or_insert(ProcessExit {
            exit_code: None,
            signal: Some(15),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::ExecutableRef;

    fn spec(name: &str, args: &[&str]) -> ProcessSpec {
        ProcessSpec::new(
            ExecutableRef::Name(name.to_string()),
            args.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn mock_member_follows_its_script() {
        let adapter = MockProcessAdapter::new();
        adapter.push_script(MockScript::exits_after_polls(2));

        let mut member = adapter.spawn(&spec("demo", &[])).await.unwrap();
        assert!(member.poll().unwrap().is_running());
        assert!(!member.poll().unwrap().is_running());
        // cached after first observation
        assert!(!member.poll().unwrap().is_running());
        assert_eq!(adapter.poll_count("demo"), 2);
    }

    #[tokio::test]
    async fn mock_terminate_is_recorded_and_stops_the_member() {
        let adapter = MockProcessAdapter::new();
        adapter.push_script(MockScript::runs_forever());

        let mut member = adapter.spawn(&spec("demo", &[])).await.unwrap();
        assert!(member.poll().unwrap().is_running());

        member.terminate().unwrap();
        assert_eq!(adapter.terminations(), vec!["demo"]);
        match member.poll().unwrap() {
            PollStatus::Exited(exit) => assert_eq!(exit.signal, Some(15)),
            PollStatus::Running => panic!("member should have stopped"),
        }
    }

    #[tokio::test]
    async fn mock_records_one_shot_runs() {
        let adapter = MockProcessAdapter::new();
        adapter
            .run_to_completion(&spec("muxing", &["--duration", "10"]))
            .await
            .unwrap();

        let runs = adapter.completed_runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, "muxing");
        assert_eq!(runs[0].1, vec!["--duration", "10"]);
    }
}
