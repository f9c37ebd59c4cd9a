//! Integration tests for Unix process supervision
//!
//! These tests verify that managed children really live in their own
//! process groups and that a group shutdown reaches every member.

#![cfg(unix)]
#![allow(unsafe_code)] // libc calls for process group checks

use schema::{ExecutableRef, ProcessSpec};
use stagehand_core::process::ManagedChild;
use stagehand_core::supervisor::{MockScript, ProcessAdapter, ProcessGroup, UnixProcessAdapter};
use std::time::Duration;

fn spec(name: &str, args: &[&str]) -> ProcessSpec {
    ProcessSpec::new(
        ExecutableRef::Name(name.to_string()),
        args.iter().map(|s| s.to_string()).collect(),
    )
}

fn process_group_of(pid: u32) -> Option<u32> {
    let pgid = unsafe { libc::getpgid(pid as i32) };
    (pgid != -1).then_some(pgid as u32)
}

fn process_exists(pid: u32) -> bool {
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[tokio::test]
async fn spawned_child_leads_its_own_process_group() {
    let child = ManagedChild::start(&spec("sleep", &["5"])).expect("failed to spawn sleep");

    let own_group = unsafe { libc::getpgrp() } as u32;
    let child_group = process_group_of(child.pid()).expect("failed to read child pgid");

    assert_eq!(child_group, child.pid());
    assert_ne!(child_group, own_group);

    child.terminate().unwrap();
}

#[tokio::test]
async fn concurrent_children_get_distinct_groups() {
    let first = ManagedChild::start(&spec("sleep", &["5"])).unwrap();
    let second = ManagedChild::start(&spec("sleep", &["5"])).unwrap();

    assert_ne!(first.pid(), second.pid());
    assert_ne!(
        process_group_of(first.pid()),
        process_group_of(second.pid())
    );

    first.terminate().unwrap();
    second.terminate().unwrap();
}

#[tokio::test]
async fn first_exit_shuts_down_the_whole_group() {
    let adapter = UnixProcessAdapter::new();
    let (event_tx, _event_rx) = tokio::sync::broadcast::channel(64);
    let mut group = ProcessGroup::new(Duration::from_millis(50), event_tx);

    let long_lived = adapter.spawn(&spec("sleep", &["30"])).await.unwrap();
    let long_lived_pid = long_lived.pid();
    group.push(long_lived);
    group.push(adapter.spawn(&spec("sleep", &["0.2"])).await.unwrap());

    group.watch().await.unwrap();

    // the long-lived member must have been terminated, not left behind
    for _ in 0..100 {
        if !process_exists(long_lived_pid) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("process {} survived the group shutdown", long_lived_pid);
}

#[tokio::test]
async fn real_and_mock_members_share_the_supervised_contract() {
    // the group does not care which adapter produced a member
    let real = UnixProcessAdapter::new();
    let mock = stagehand_core::supervisor::MockProcessAdapter::new();
    mock.push_script(MockScript::exits_after_polls(2));

    let (event_tx, _event_rx) = tokio::sync::broadcast::channel(64);
    let mut group = ProcessGroup::new(Duration::from_millis(20), event_tx);
    group.push(real.spawn(&spec("sleep", &["30"])).await.unwrap());
    group.push(mock.spawn(&spec("mock-member", &[])).await.unwrap());

    group.watch().await.unwrap();
    assert_eq!(mock.terminations(), vec!["mock-member"]);
}
