//! Registry of live table locks 活跃表锁登记表
//!
//! Not on the hot path: used for enumeration, shutdown and killing a
//! connection across every table.
//! 不在热路径上：用于枚举、关闭以及跨表终止连接。

use std::{
  collections::HashMap,
  sync::{
    Arc, Weak,
    atomic::{AtomicU64, Ordering},
  },
};

use log::info;
use parking_lot::Mutex;

use crate::{Conf, Error, Lock, Result};

/// Lock counters shared by a registry
/// 登记表共享的加锁计数
#[derive(Debug, Default)]
pub struct Stats {
  immediate: AtomicU64,
  waited: AtomicU64,
}

impl Stats {
  /// Requests granted without suspending 无需等待即授权的请求数
  #[inline]
  pub fn immediate(&self) -> u64 {
    self.immediate.load(Ordering::Relaxed)
  }

  /// Requests that had to suspend 需要等待的请求数
  #[inline]
  pub fn waited(&self) -> u64 {
    self.waited.load(Ordering::Relaxed)
  }

  #[inline]
  pub(crate) fn add_immediate(&self) {
    self.immediate.fetch_add(1, Ordering::Relaxed);
  }

  #[inline]
  pub(crate) fn add_waited(&self) {
    self.waited.fetch_add(1, Ordering::Relaxed);
  }
}

pub struct Registry {
  conf: Conf,
  stats: Arc<Stats>,
  next_id: AtomicU64,
  locks: Mutex<HashMap<u64, Weak<Lock>>>,
}

impl Registry {
  pub fn new(conf: Conf) -> Self {
    Self {
      conf,
      stats: Arc::default(),
      next_id: AtomicU64::new(1),
      locks: Mutex::new(HashMap::new()),
    }
  }

  #[inline]
  pub fn conf(&self) -> &Conf {
    &self.conf
  }

  #[inline]
  pub fn stats(&self) -> &Stats {
    &self.stats
  }

  /// Create and register a lock 创建并登记锁
  pub fn init_lock(&self) -> Arc<Lock> {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let lock = Arc::new(Lock::new(id, self.conf, self.stats.clone()));
    self.locks.lock().insert(id, Arc::downgrade(&lock));
    lock
  }

  /// Deregister an idle lock 注销空闲锁
  pub fn destroy_lock(&self, lock: &Lock) -> Result<()> {
    if !lock.is_idle() {
      return Err(Error::Busy { id: lock.id() });
    }
    self.locks.lock().remove(&lock.id());
    Ok(())
  }

  /// Live registered locks, ordered by id 按 id 排序的已登记锁
  pub fn locks(&self) -> Vec<Arc<Lock>> {
    let mut map = self.locks.lock();
    map.retain(|_, weak| weak.strong_count() > 0);
    let mut li: Vec<_> = map.values().filter_map(Weak::upgrade).collect();
    li.sort_by_key(|lock| lock.id());
    li
  }

  pub fn len(&self) -> usize {
    self.locks().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Abort every waiting request of `owner` on all locks
  /// 在所有锁上终止 `owner` 的等待请求
  pub fn abort_owner(&self, owner: u64) -> bool {
    let mut found = false;
    for lock in self.locks() {
      found |= lock.abort_owner(owner);
    }
    if found {
      info!("owner {owner} killed");
    }
    found
  }
}

impl Default for Registry {
  fn default() -> Self {
    Self::new(Conf::default())
  }
}
