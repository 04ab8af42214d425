//! Grouped acquisition 批量加锁
//!
//! Requests are sorted by lock id, stronger level first on the same lock,
//! so callers locking overlapping tables never wait on each other in a
//! cycle. Either every request is granted or none stays held.
//! 请求按锁 id 排序，同一把锁上较强级别在前，
//! 因此锁定重叠表集合的调用者不会循环等待。要么全部授权，要么全部不持有。

use std::{cmp::Reverse, sync::Arc};

use log::debug;

use crate::{Owner, Request, Result, Status};

/// Acquire all requests at their preset levels. Reorders `li`.
/// 以预设级别获取全部请求，会重排 `li`。
pub fn acquire_all<S: Status>(li: &mut [Request<S>], owner: &Arc<Owner>) -> Result<()> {
  if li.len() > 1 {
    li.sort_by_key(|r| (r.lock().id(), Reverse(r.level())));
  }

  for i in 0..li.len() {
    let level = li[i].level();
    if let Err(e) = li[i].acquire(owner, level) {
      debug!(
        "owner {}: group failed at lock {} with {e}, rollback {i}",
        owner.id(),
        li[i].lock().id()
      );
      release_all(&mut li[..i]);
      return Err(e);
    }
  }

  share_status(li);
  Ok(())
}

pub fn release_all<S: Status>(li: &mut [Request<S>]) {
  for r in li {
    r.release();
  }
}

/// Requests on the same lock adopt one status: the last granted writer's,
/// or the first reader's when there is no writer.
/// 同一把锁上的请求共享一个状态：最后授权的写者，无写者时取第一个读者。
fn share_status<S: Status>(li: &[Request<S>]) {
  for same in li.chunk_by(|a, b| a.lock().id() == b.lock().id()) {
    if same.len() < 2 {
      continue;
    }
    let held = || same.iter().filter(|r| r.is_held());
    let Some(src) = held()
      .filter(|r| r.level().is_write())
      .last()
      .or_else(|| held().next())
    else {
      continue;
    };
    for r in held().filter(|r| r.id() != src.id()) {
      r.status().copy_from(src.status());
    }
  }
}
