//! Table lock master record 表锁主记录
//!
//! Holds the four queues of one table. The mutex is only held for the
//! non-blocking parts of acquire / release / wake-up; a waiter sleeps on its
//! own request signal.
//! 保存一张表的四个队列。互斥量只在加锁、释放、唤醒的非阻塞部分持有；
//! 等待者在各自请求的信号上休眠。

use std::{sync::Arc, time::Instant};

use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};

use crate::{
  Conf, Error, Level, Result, Stats,
  queue::{Queue, Ticket},
  signal::Wake,
  state::{Admit, State},
};

/// Snapshot of one queue entry 队列条目快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holder {
  pub owner: u64,
  pub level: Level,
}

/// Consistent snapshot of a lock 锁的一致快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Info {
  pub readers: Vec<Holder>,
  pub read_waiters: Vec<Holder>,
  pub writers: Vec<Holder>,
  pub write_waiters: Vec<Holder>,
  pub write_streak: u64,
  pub no_insert_readers: usize,
}

impl Info {
  pub fn is_idle(&self) -> bool {
    self.readers.is_empty()
      && self.read_waiters.is_empty()
      && self.writers.is_empty()
      && self.write_waiters.is_empty()
  }

  #[inline]
  pub fn waiters(&self) -> usize {
    self.read_waiters.len() + self.write_waiters.len()
  }
}

fn holders(queue: &Queue) -> Vec<Holder> {
  queue
    .iter()
    .map(|t| Holder {
      owner: t.owner_id(),
      level: t.level,
    })
    .collect()
}

pub struct Lock {
  id: u64,
  conf: Conf,
  stats: Arc<Stats>,
  state: Mutex<State>,
}

impl std::fmt::Debug for Lock {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Lock").field("id", &self.id).finish()
  }
}

impl Lock {
  pub(crate) fn new(id: u64, conf: Conf, stats: Arc<Stats>) -> Self {
    Self {
      id,
      conf,
      stats,
      state: Mutex::new(State::default()),
    }
  }

  /// Stable identity, also the grouped acquisition order
  /// 稳定标识，也是批量加锁的排序键
  #[inline]
  pub fn id(&self) -> u64 {
    self.id
  }

  #[inline]
  pub fn conf(&self) -> &Conf {
    &self.conf
  }

  pub fn is_idle(&self) -> bool {
    self.state.lock().is_idle()
  }

  pub fn info(&self) -> Info {
    let st = self.state.lock();
    Info {
      readers: holders(&st.read),
      read_waiters: holders(&st.read_wait),
      writers: holders(&st.write),
      write_waiters: holders(&st.write_wait),
      write_streak: st.write_streak,
      no_insert_readers: st.no_insert,
    }
  }

  /// Grant, queue or refuse one ticket. Returns the granted level.
  /// 授权、排队或拒绝一个票据，返回最终授权的级别。
  pub(crate) fn acquire(
    &self,
    mut ticket: Ticket,
    concurrent_insert: Option<bool>,
  ) -> Result<Level> {
    let owner = ticket.owner_id();
    let mut st = self.state.lock();

    let write = ticket.level.is_write();
    let admit = if write {
      if ticket.level == Level::WriteConcurrentInsert && concurrent_insert != Some(true) {
        ticket.level = self.conf.concurrent_insert_fallback;
      }
      st.admit_write(owner, ticket.level)
    } else {
      st.admit_read(owner, ticket.level)
    };

    match admit {
      Admit::Grant => {
        let level = ticket.level;
        if write {
          st.grant_write(ticket);
        } else {
          st.grant_read(ticket);
        }
        self.stats.add_immediate();
        return Ok(level);
      }
      Admit::Abort => return Err(Error::Aborted),
      Admit::Wait => {}
    }

    if st.head_owner() == Some(owner) && ticket.owner.cursors() > 0 {
      warn!(
        "lock {}: owner {owner} would wait on its own cursor for {:?}",
        self.id, ticket.level
      );
      return Err(Error::Deadlock);
    }

    self.wait(st, ticket, write)
  }

  fn wait(&self, mut st: MutexGuard<'_, State>, ticket: Ticket, write: bool) -> Result<Level> {
    let id = ticket.id;
    let level = ticket.level;
    let signal = ticket.signal.clone();
    let deadline = (ticket.owner.cursors() > 0)
      .then(|| Instant::now() + self.conf.wait_timeout);

    debug!(
      "lock {}: owner {} waits for {level:?}",
      self.id,
      ticket.owner_id()
    );
    signal.arm();
    if write {
      st.write_wait.push(ticket);
    } else {
      st.read_wait.push(ticket);
    }
    self.stats.add_waited();

    loop {
      match signal.get() {
        Wake::Granted => return Ok(level),
        Wake::Aborted => return Err(Error::Aborted),
        Wake::Pending => {}
      }
      match deadline {
        None => signal.wait(&mut st),
        Some(at) => {
          if signal.wait_until(&mut st, at) && signal.get() == Wake::Pending {
            let queue = if write {
              &mut st.write_wait
            } else {
              &mut st.read_wait
            };
            queue.remove(id);
            st.wake_up(self.conf.max_write_streak);
            warn!("lock {}: wait for {level:?} timed out", self.id);
            return Err(Error::TimedOut);
          }
        }
      }
    }
  }

  /// Remove an active ticket, run `on_release` then wake waiters.
  /// Returns false when `id` holds nothing.
  /// 移除活跃票据，调用 `on_release` 后唤醒等待者。`id` 未持有锁时返回 false。
  pub(crate) fn release(&self, id: u64, on_release: impl FnOnce(Level)) -> bool {
    let mut st = self.state.lock();
    let Some(ticket) = st.read.remove(id).or_else(|| st.write.remove(id)) else {
      return false;
    };
    on_release(ticket.level);
    if ticket.level == Level::ReadNoInsert {
      st.no_insert = st.no_insert.saturating_sub(1);
    }
    st.wake_up(self.conf.max_write_streak);
    true
  }

  /// Abort every waiter and escalate the active writer to WriteOnly, so new
  /// requests fail until it is released.
  /// 终止所有等待者并把当前写者升级为 WriteOnly，释放前新请求都会失败。
  pub fn abort_all(&self) {
    let mut st = self.state.lock();
    let mut n = 0;
    for ticket in st.read_wait.drain() {
      ticket.signal.abort();
      n += 1;
    }
    for ticket in st.write_wait.drain() {
      ticket.signal.abort();
      n += 1;
    }
    if let Some(writer) = st.write.front_mut() {
      writer.level = Level::WriteOnly;
    }
    info!("lock {}: aborted {n} waiters", self.id);
  }

  /// Abort the waiting requests of one owner (connection kill)
  /// 终止某个连接的等待请求（杀连接）
  pub fn abort_owner(&self, owner: u64) -> bool {
    let mut st = self.state.lock();
    let mut killed = st.read_wait.take(|t| t.owner_id() == owner);
    killed.extend(st.write_wait.take(|t| t.owner_id() == owner));
    let found = !killed.is_empty();
    for ticket in killed {
      ticket.signal.abort();
    }
    st.wake_up(self.conf.max_write_streak);
    if found {
      info!("lock {}: aborted waiters of owner {owner}", self.id);
    }
    found
  }
}
