use std::thread;

use aok::{OK, Void};
use jdb_table_lock::{Conf, Info, Level, Owner, Registry, Request};
use log::info;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

const THREADS: u64 = 8;
const ROUNDS: usize = 300;
const MAX_WRITE_STREAK: u64 = 3;

const LEVELS: [Level; 8] = [
  Level::Read,
  Level::ReadWithSharedLocks,
  Level::ReadNoInsert,
  Level::WriteAllowWrite,
  Level::WriteAllowRead,
  Level::WriteConcurrentInsert,
  Level::WriteDefault,
  Level::Write,
];

/// Holders of different owners must be compatible
/// 不同连接的持有者必须兼容
fn check(info: &Info) {
  for w in &info.writers {
    for r in info.readers.iter().filter(|r| r.owner != w.owner) {
      assert!(w.level.admits(r.level), "{w:?} with reader {r:?}: {info:?}");
    }
    for o in info.writers.iter().filter(|o| o.owner != w.owner) {
      assert!(
        w.level == Level::WriteAllowWrite && o.level == Level::WriteAllowWrite,
        "{w:?} with writer {o:?}: {info:?}"
      );
    }
  }
  assert!(info.write_streak <= MAX_WRITE_STREAK, "{info:?}");
}

#[test]
fn test_mutual_exclusion() -> Void {
  let reg = Registry::new(Conf {
    max_write_streak: MAX_WRITE_STREAK,
    ..Conf::default()
  });
  let lock = reg.init_lock();

  let li: Vec<_> = (0..THREADS)
    .map(|id| {
      let lock = lock.clone();
      thread::spawn(move || -> jdb_table_lock::Result<()> {
        let owner = Owner::new(id);
        let mut req = Request::new(&lock, ());
        for _ in 0..ROUNDS {
          let level = LEVELS[fastrand::usize(..LEVELS.len())];
          req.acquire(&owner, level)?;
          check(&lock.info());
          thread::yield_now();
          req.release();
        }
        Ok(())
      })
    })
    .collect();

  for h in li {
    h.join().unwrap()?;
  }
  assert!(lock.is_idle());
  info!(
    "immediate {} waited {}",
    reg.stats().immediate(),
    reg.stats().waited()
  );
  assert_eq!(
    reg.stats().immediate() + reg.stats().waited(),
    THREADS * ROUNDS as u64
  );
  OK
}
