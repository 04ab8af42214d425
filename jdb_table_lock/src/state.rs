//! Queues and counters guarded by a lock's mutex
//! 由锁互斥量保护的队列与计数器

use crate::{
  Level,
  queue::{Queue, Ticket},
};

/// Admission decision 准入判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admit {
  Grant,
  Wait,
  Abort,
}

#[derive(Debug, Default)]
pub(crate) struct State {
  pub read: Queue,
  pub read_wait: Queue,
  pub write: Queue,
  pub write_wait: Queue,
  /// Writer grants since waiting readers were last drained
  /// 上次放行等待读者以来的写授权次数
  pub write_streak: u64,
  /// Active ReadNoInsert holders 活跃的 ReadNoInsert 持有者数
  pub no_insert: usize,
}

impl State {
  #[inline]
  pub fn is_idle(&self) -> bool {
    self.read.is_empty()
      && self.read_wait.is_empty()
      && self.write.is_empty()
      && self.write_wait.is_empty()
  }

  /// Every active holder belongs to `owner` (and there is one)
  /// 所有活跃持有者都属于 `owner`（且至少有一个）
  fn held_only_by(&self, owner: u64) -> bool {
    (!self.read.is_empty() || !self.write.is_empty())
      && self.read.owned_by(owner)
      && self.write.owned_by(owner)
  }

  /// Owner already holds a write grant, or every grant
  /// 连接已持有写锁，或持有全部授权
  #[inline]
  fn reentrant(&self, owner: u64) -> bool {
    self.write.has_owner(owner) || self.held_only_by(owner)
  }

  /// Write level may join the active readers
  /// 写级别可加入当前活跃读者
  #[inline]
  fn joins_readers(&self, level: Level) -> bool {
    level.shares_read() && (level == Level::WriteAllowRead || self.no_insert == 0)
  }

  /// Waiting writer that readers must yield to
  /// 读者必须让行的等待写者
  #[inline]
  fn urgent_writer(&self) -> bool {
    self
      .write_wait
      .front()
      .is_some_and(|w| w.level > Level::WriteDefault)
  }

  #[inline]
  fn writers_admit(&self, read: Level) -> bool {
    self.write.iter().all(|w| w.level.admits(read))
  }

  pub fn admit_read(&self, owner: u64, level: Level) -> Admit {
    if !self.write.is_empty() {
      if self.write.has_owner(owner) || self.writers_admit(level) {
        return Admit::Grant;
      }
      if self.write.iter().any(|w| w.level == Level::WriteOnly) {
        return Admit::Abort;
      }
      return Admit::Wait;
    }
    if !self.urgent_writer() || self.read.has_owner(owner) {
      return Admit::Grant;
    }
    Admit::Wait
  }

  pub fn admit_write(&self, owner: u64, level: Level) -> Admit {
    if !self.write.is_empty() {
      if self
        .write
        .iter()
        .any(|w| w.level == Level::WriteOnly && w.owner_id() != owner)
      {
        return Admit::Abort;
      }
      if self.write.has_owner(owner)
        || (level == Level::WriteAllowWrite
          && self.write_wait.is_empty()
          && self
            .write
            .iter()
            .all(|w| w.level == Level::WriteAllowWrite)
          && self.joins_readers(level))
      {
        return Admit::Grant;
      }
      return Admit::Wait;
    }
    if self.held_only_by(owner) {
      return Admit::Grant;
    }
    if self.write_wait.is_empty() && (self.read.is_empty() || self.joins_readers(level)) {
      return Admit::Grant;
    }
    Admit::Wait
  }

  pub fn grant_read(&mut self, ticket: Ticket) {
    if ticket.level == Level::ReadNoInsert {
      self.no_insert += 1;
    }
    self.read.push(ticket);
  }

  #[inline]
  pub fn grant_write(&mut self, ticket: Ticket) {
    self.write.push(ticket);
  }

  /// Head of a self-conflict: first active reader, else first active writer
  /// 自冲突检测对象：首个活跃读者，否则首个活跃写者
  #[inline]
  pub fn head_owner(&self) -> Option<u64> {
    self
      .read
      .front()
      .or_else(|| self.write.front())
      .map(Ticket::owner_id)
  }

  /// Move runnable waiters to the active queues after a release
  /// 释放后将可运行的等待者移入活跃队列
  pub fn wake_up(&mut self, max_write_streak: u64) {
    self.grant_reentrant();
    if !self.write.is_empty() {
      return;
    }
    let Some(head) = self.write_wait.front().map(|w| w.level) else {
      self.free_readers();
      return;
    };

    if self.read.is_empty() {
      // Readers above ReadWithSharedLocks go before the writer
      // 高于 ReadWithSharedLocks 的读者先于写者
      let readers_first = self
        .read_wait
        .front()
        .is_some_and(|r| r.level > Level::ReadWithSharedLocks);
      if readers_first || self.starved(max_write_streak) {
        self.free_readers();
        return;
      }
      if self.grant_writers().shares_read() {
        self.free_readers();
      }
    } else if self.joins_readers(head) {
      if self.starved(max_write_streak) {
        self.free_readers();
        return;
      }
      self.grant_writers();
      self.free_readers();
    } else if head <= Level::WriteDefault {
      self.free_readers();
    }
  }

  /// Grant head writers whose owner became the only holder, or already writes
  /// 授权已独占或已持有写锁的连接排在队首的写请求
  fn grant_reentrant(&mut self) {
    while let Some(owner) = self.write_wait.front().map(Ticket::owner_id) {
      if !self.reentrant(owner) {
        break;
      }
      if let Some(ticket) = self.write_wait.pop_front() {
        ticket.signal.grant();
        self.write.push(ticket);
      }
    }
  }

  /// Count one writer grant; true when waiting readers must go first
  /// 计一次写授权；需要先放行等待读者时返回 true
  fn starved(&mut self, max_write_streak: u64) -> bool {
    if self.read_wait.is_empty() {
      self.write_streak = 0;
      return false;
    }
    if self.write_streak >= max_write_streak {
      self.write_streak = 0;
      return true;
    }
    self.write_streak += 1;
    false
  }

  /// Grant the head writer plus consecutive AllowWrite followers
  /// 授权队首写者及紧随的 AllowWrite 写者
  fn grant_writers(&mut self) -> Level {
    let mut last = Level::Unlock;
    while let Some(ticket) = self.write_wait.pop_front() {
      last = ticket.level;
      ticket.signal.grant();
      self.write.push(ticket);
      let chain = last == Level::WriteAllowWrite
        && self
          .write_wait
          .front()
          .is_some_and(|w| w.level == Level::WriteAllowWrite);
      if !chain {
        break;
      }
    }
    last
  }

  /// Grant every waiting reader the active writers admit, or whose owner writes
  /// 授权所有当前写者允许的等待读者，或本连接已持有写锁的读者
  fn free_readers(&mut self) {
    if self.read_wait.is_empty() {
      return;
    }
    let write = &self.write;
    let runnable = self.read_wait.take(|r| {
      write.has_owner(r.owner_id()) || write.iter().all(|w| w.level.admits(r.level))
    });
    for ticket in runnable {
      ticket.signal.grant();
      self.grant_read(ticket);
    }
    if self.read_wait.is_empty() {
      self.write_streak = 0;
    }
  }
}
