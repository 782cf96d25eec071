//! Delayed-callback queue
//!
//! Replaces engine coroutines/invokes. Tasks are plain data, ordered by the
//! tick they fall due, then by rank, then by scheduling order. Every task
//! carries an owner which doubles as its cancellation token.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::{PropId, TargetId};

/// Who a scheduled task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskOwner {
    /// Not tied to any session or entity
    World,
    /// Session lifetime (token increments on every start)
    Session(u32),
    Target(TargetId),
    Prop(PropId),
}

/// Deferred work, dispatched by `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Spawner populate (spawn-on-start)
    PopulateProps,
    /// One countdown step
    CountdownTick,
    /// Spawn a target and reschedule
    SpawnTarget,
    /// Lifetime ran out
    ExpireTarget(TargetId),
    /// Break grace period ran out
    RemoveTarget(TargetId),
    /// Teleport a fallen prop back to its anchor
    ResetProp(PropId),
    /// Complete a respawn started by a target contact
    FinishRespawn(PropId),
}

impl Task {
    /// Lower ranks run first among tasks due on the same tick
    ///
    /// The countdown goes first so a session that times out never spawns a
    /// target on its final tick.
    pub fn rank(self) -> u8 {
        match self {
            Task::CountdownTick => 0,
            _ => 1,
        }
    }
}

/// Handle returned by `schedule`, usable with `cancel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskHandle {
    pub due_tick: u64,
    rank: u8,
    seq: u64,
}

#[derive(Debug, Clone)]
struct Scheduled {
    owner: TaskOwner,
    task: Task,
}

/// Ordered queue of pending tasks
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BTreeMap<TaskHandle, Scheduled>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to run on `due_tick`
    pub fn schedule(&mut self, due_tick: u64, owner: TaskOwner, task: Task) -> TaskHandle {
        let handle = TaskHandle {
            due_tick,
            rank: task.rank(),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.insert(handle, Scheduled { owner, task });
        handle
    }

    /// Drop a single task; returns false if it already ran or was cancelled
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.queue.remove(&handle).is_some()
    }

    /// Drop every task belonging to `owner`, returning how many were removed
    pub fn cancel_owner(&mut self, owner: TaskOwner) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, s| s.owner != owner);
        before - self.queue.len()
    }

    /// Take the earliest task due at or before `now`
    pub fn pop_due(&mut self, now: u64) -> Option<(TaskOwner, Task)> {
        let (&handle, _) = self.queue.first_key_value()?;
        if handle.due_tick > now {
            return None;
        }
        self.queue
            .remove(&handle)
            .map(|scheduled| (scheduled.owner, scheduled.task))
    }

    /// Number of pending tasks owned by `owner`
    pub fn pending_for(&self, owner: TaskOwner) -> usize {
        self.queue.values().filter(|s| s.owner == owner).count()
    }

    /// True if `task` is pending for `owner`
    pub fn is_pending(&self, owner: TaskOwner, task: Task) -> bool {
        self.queue
            .values()
            .any(|s| s.owner == owner && s.task == task)
    }

    /// Tick of the next pending task
    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|h| h.due_tick)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
