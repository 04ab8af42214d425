//! Lock request 锁请求

use std::sync::{
  Arc,
  atomic::{AtomicU64, Ordering},
};

use crate::{
  Error, Level, Lock, Owner, Result,
  queue::Ticket,
  signal::Signal,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Status hooks supplied by the resource owner (the table handle).
/// Release hooks run under the lock's mutex and must not touch the lock.
/// 由资源持有者（表句柄）提供的状态回调。
/// 释放回调在锁互斥量内执行，不得再操作该锁。
pub trait Status {
  fn on_grant(&self) {}

  fn on_write_release(&self) {}

  fn on_read_release(&self) {}

  /// `None`: no concurrent insert support 不支持并发插入
  fn can_concurrent_insert(&self) -> Option<bool> {
    None
  }

  /// Adopt the status of another request on the same lock
  /// 采用同一把锁上另一个请求的状态
  fn copy_from(&self, _src: &Self)
  where
    Self: Sized,
  {
  }
}

impl Status for () {}

impl<T: Status> Status for Arc<T> {
  fn on_grant(&self) {
    (**self).on_grant()
  }

  fn on_write_release(&self) {
    (**self).on_write_release()
  }

  fn on_read_release(&self) {
    (**self).on_read_release()
  }

  fn can_concurrent_insert(&self) -> Option<bool> {
    (**self).can_concurrent_insert()
  }

  fn copy_from(&self, src: &Self) {
    (**self).copy_from(&**src)
  }
}

/// One request for a level on one lock. Released on drop.
/// 对一把锁某个级别的请求，Drop 时释放。
pub struct Request<S: Status = ()> {
  lock: Arc<Lock>,
  id: u64,
  level: Level,
  held: bool,
  signal: Arc<Signal>,
  status: S,
}

impl<S: Status> Request<S> {
  pub fn new(lock: &Arc<Lock>, status: S) -> Self {
    Self {
      lock: lock.clone(),
      id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
      level: Level::Unlock,
      held: false,
      signal: Arc::default(),
      status,
    }
  }

  /// Preset the level used by grouped acquisition
  /// 预设批量加锁使用的级别
  pub fn with_level(mut self, level: Level) -> Self {
    self.level = level;
    self
  }

  #[inline]
  pub fn set_level(&mut self, level: Level) {
    self.level = level;
  }

  #[inline]
  pub fn level(&self) -> Level {
    self.level
  }

  #[inline]
  pub fn is_held(&self) -> bool {
    self.held
  }

  #[inline]
  pub fn lock(&self) -> &Arc<Lock> {
    &self.lock
  }

  #[inline]
  pub fn status(&self) -> &S {
    &self.status
  }

  #[inline]
  pub(crate) fn id(&self) -> u64 {
    self.id
  }

  /// Block until granted, or fail with Aborted / TimedOut / Deadlock.
  /// `Ignore` and `Unlock` grant nothing and return Ok.
  /// 阻塞直到授权，或以 Aborted / TimedOut / Deadlock 失败。
  /// `Ignore` 与 `Unlock` 不加锁，直接返回 Ok。
  pub fn acquire(&mut self, owner: &Arc<Owner>, level: Level) -> Result<()> {
    if self.held {
      return Err(Error::Held);
    }
    self.level = level;
    if matches!(level, Level::Ignore | Level::Unlock) {
      return Ok(());
    }

    let concurrent_insert = if level == Level::WriteConcurrentInsert {
      self.status.can_concurrent_insert()
    } else {
      None
    };
    let ticket = Ticket {
      id: self.id,
      owner: owner.clone(),
      level,
      signal: self.signal.clone(),
    };
    self.level = self.lock.acquire(ticket, concurrent_insert)?;
    self.held = true;
    self.status.on_grant();
    Ok(())
  }

  pub fn release(&mut self) {
    if !self.held {
      return;
    }
    self.held = false;
    let status = &self.status;
    self.lock.release(self.id, |level| {
      if level.is_write() {
        status.on_write_release();
      } else {
        status.on_read_release();
      }
    });
  }
}

impl<S: Status> Drop for Request<S> {
  fn drop(&mut self) {
    self.release();
  }
}
