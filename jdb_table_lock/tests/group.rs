mod util;

use std::{
  sync::{Arc, Barrier},
  thread,
  time::Duration,
};

use aok::{OK, Void};
use jdb_table_lock::{Error, Level, Owner, Registry, Request, Status, acquire_all, release_all};
use parking_lot::Mutex;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

/// Records whose status it adopted 记录采用了谁的状态
#[derive(Debug)]
struct Snap {
  name: &'static str,
  from: Mutex<Option<&'static str>>,
}

impl Snap {
  fn new(name: &'static str) -> Self {
    Self {
      name,
      from: Mutex::new(None),
    }
  }

  fn adopted(&self) -> Option<&'static str> {
    *self.from.lock()
  }
}

impl Status for Snap {
  fn copy_from(&self, src: &Self) {
    *self.from.lock() = Some(src.name);
  }
}

#[test]
fn test_group_order_and_status() -> Void {
  let reg = Registry::default();
  let l1 = reg.init_lock();
  let l2 = reg.init_lock();
  let a = Owner::new(1);

  let mut li = vec![
    Request::new(&l2, Snap::new("r2")).with_level(Level::Read),
    Request::new(&l1, Snap::new("r1")).with_level(Level::Read),
    Request::new(&l1, Snap::new("w1")).with_level(Level::Write),
  ];
  acquire_all(&mut li, &a)?;

  let names: Vec<_> = li.iter().map(|r| r.status().name).collect();
  assert_eq!(names, ["w1", "r1", "r2"]);
  assert!(li.iter().all(|r| r.is_held()));

  assert_eq!(li[0].status().adopted(), None);
  assert_eq!(li[1].status().adopted(), Some("w1"));
  assert_eq!(li[2].status().adopted(), None);

  release_all(&mut li);
  assert!(l1.is_idle());
  assert!(l2.is_idle());
  OK
}

#[test]
fn test_group_rollback() -> Void {
  let reg = Registry::default();
  let l1 = reg.init_lock();
  let l2 = reg.init_lock();

  let mut blocker = Request::new(&l2, ());
  blocker.acquire(&Owner::new(9), Level::Write)?;
  l2.abort_all();

  let a = Owner::new(1);
  let mut li = vec![
    Request::new(&l2, ()).with_level(Level::Read),
    Request::new(&l1, ()).with_level(Level::Write),
  ];
  assert_eq!(acquire_all(&mut li, &a), Err(Error::Aborted));

  assert!(li.iter().all(|r| !r.is_held()));
  assert!(l1.is_idle());
  assert_eq!(l2.info().writers.len(), 1);
  assert!(l2.info().readers.is_empty());
  OK
}

#[test]
fn test_group_ignore() -> Void {
  let reg = Registry::default();
  let lock = reg.init_lock();

  let mut li = vec![
    Request::new(&lock, ()).with_level(Level::Ignore),
    Request::new(&lock, ()).with_level(Level::Read),
  ];
  acquire_all(&mut li, &Owner::new(1))?;
  assert_eq!(li.iter().filter(|r| r.is_held()).count(), 1);
  assert_eq!(lock.info().readers.len(), 1);
  OK
}

/// Crossing groups never wait on each other in a cycle
/// 交叉的批量加锁不会循环等待
#[test]
fn test_group_crossing() -> Void {
  let reg = Registry::default();
  let l1 = reg.init_lock();
  let l2 = reg.init_lock();
  let barrier = Arc::new(Barrier::new(2));

  let run = |id: u64, first: Level, second: Level| {
    let (l1, l2, barrier) = (l1.clone(), l2.clone(), barrier.clone());
    thread::spawn(move || -> jdb_table_lock::Result<()> {
      let owner = Owner::new(id);
      for _ in 0..200 {
        barrier.wait();
        let mut li = vec![
          Request::new(&l1, ()).with_level(first),
          Request::new(&l2, ()).with_level(second),
        ];
        acquire_all(&mut li, &owner)?;
        thread::sleep(Duration::from_micros(50));
        release_all(&mut li);
      }
      Ok(())
    })
  };

  let t1 = run(1, Level::Write, Level::Read);
  let t2 = run(2, Level::Read, Level::Write);
  t1.join().unwrap()?;
  t2.join().unwrap()?;

  assert!(l1.is_idle());
  assert!(l2.is_idle());
  OK
}
