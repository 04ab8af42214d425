//! Lock owner 锁持有者
//!
//! One per connection, shared by every request the connection issues.
//! 每个连接一个，由该连接的所有请求共享。

use std::sync::{
  Arc,
  atomic::{AtomicU32, Ordering},
};

#[derive(Debug)]
pub struct Owner {
  id: u64,
  cursors: AtomicU32,
}

impl Owner {
  pub fn new(thread_id: u64) -> Arc<Self> {
    Arc::new(Self {
      id: thread_id,
      cursors: AtomicU32::new(0),
    })
  }

  #[inline]
  pub fn id(&self) -> u64 {
    self.id
  }

  /// Open cursors held by this owner 当前打开的游标数
  #[inline]
  pub fn cursors(&self) -> u32 {
    self.cursors.load(Ordering::Acquire)
  }

  pub fn open_cursor(&self) {
    self.cursors.fetch_add(1, Ordering::AcqRel);
  }

  pub fn close_cursor(&self) {
    // Err at zero: count stays zero 为零时返回 Err，计数保持为零
    let _ = self
      .cursors
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
  }
}
