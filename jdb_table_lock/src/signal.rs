//! Per-request wake signal 单请求唤醒信号
//!
//! Written only under the owning lock's mutex, and the condvar only ever
//! waits on that mutex, so a grantor wakes exactly one waiter.
//! 仅在所属锁的互斥量下写入，条件变量也只配合该互斥量等待，
//! 授权者因此只唤醒一个等待者。

use std::{
  sync::atomic::{AtomicU8, Ordering},
  time::Instant,
};

use parking_lot::{Condvar, MutexGuard};

const PENDING: u8 = 0;
const GRANTED: u8 = 1;
const ABORTED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wake {
  Pending,
  Granted,
  Aborted,
}

#[derive(Debug, Default)]
pub(crate) struct Signal {
  state: AtomicU8,
  cond: Condvar,
}

impl Signal {
  #[inline]
  pub fn arm(&self) {
    self.state.store(PENDING, Ordering::Release);
  }

  #[inline]
  pub fn get(&self) -> Wake {
    match self.state.load(Ordering::Acquire) {
      GRANTED => Wake::Granted,
      ABORTED => Wake::Aborted,
      _ => Wake::Pending,
    }
  }

  #[inline]
  pub fn grant(&self) {
    self.resolve(GRANTED);
  }

  #[inline]
  pub fn abort(&self) {
    self.resolve(ABORTED);
  }

  fn resolve(&self, state: u8) {
    self.state.store(state, Ordering::Release);
    self.cond.notify_one();
  }

  #[inline]
  pub fn wait<T>(&self, guard: &mut MutexGuard<'_, T>) {
    self.cond.wait(guard);
  }

  /// Returns true on timeout 超时返回 true
  #[inline]
  pub fn wait_until<T>(&self, guard: &mut MutexGuard<'_, T>, deadline: Instant) -> bool {
    self.cond.wait_until(guard, deadline).timed_out()
  }
}
