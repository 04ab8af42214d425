#![allow(dead_code)]

use std::{
  sync::Arc,
  thread::{self, JoinHandle},
  time::Duration,
};

use jdb_table_lock::{Info, Level, Lock, Owner, Request, Result};

/// Poll until the lock reaches a state 轮询直到锁达到指定状态
pub fn until(lock: &Lock, f: impl Fn(&Info) -> bool) {
  for _ in 0..10_000 {
    if f(&lock.info()) {
      return;
    }
    thread::sleep(Duration::from_millis(1));
  }
  panic!("lock {} stuck: {:?}", lock.id(), lock.info());
}

/// Acquire on a new thread, hold for `hold`, then release
/// 在新线程加锁，持有 `hold` 后释放
pub fn spawn(
  lock: &Arc<Lock>,
  owner: u64,
  level: Level,
  hold: Duration,
) -> JoinHandle<Result<()>> {
  let lock = lock.clone();
  thread::spawn(move || {
    let owner = Owner::new(owner);
    let mut req = Request::new(&lock, ());
    req.acquire(&owner, level)?;
    thread::sleep(hold);
    req.release();
    Ok(())
  })
}
