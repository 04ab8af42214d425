//! FIFO queue of lock tickets 锁票据先进先出队列

use std::{collections::VecDeque, sync::Arc};

use crate::{Level, Owner, signal::Signal};

/// One request inside a lock's queues
/// 锁队列中的一个请求
#[derive(Debug)]
pub(crate) struct Ticket {
  pub id: u64,
  pub owner: Arc<Owner>,
  pub level: Level,
  pub signal: Arc<Signal>,
}

impl Ticket {
  #[inline]
  pub fn owner_id(&self) -> u64 {
    self.owner.id()
  }
}

#[derive(Debug, Default)]
pub(crate) struct Queue(VecDeque<Ticket>);

impl Queue {
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  #[inline]
  pub fn front(&self) -> Option<&Ticket> {
    self.0.front()
  }

  #[inline]
  pub fn front_mut(&mut self) -> Option<&mut Ticket> {
    self.0.front_mut()
  }

  #[inline]
  pub fn pop_front(&mut self) -> Option<Ticket> {
    self.0.pop_front()
  }

  #[inline]
  pub fn push(&mut self, ticket: Ticket) {
    self.0.push_back(ticket);
  }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &Ticket> {
    self.0.iter()
  }

  pub fn remove(&mut self, id: u64) -> Option<Ticket> {
    let pos = self.0.iter().position(|t| t.id == id)?;
    self.0.remove(pos)
  }

  #[inline]
  pub fn has_owner(&self, owner: u64) -> bool {
    self.0.iter().any(|t| t.owner_id() == owner)
  }

  #[inline]
  pub fn owned_by(&self, owner: u64) -> bool {
    self.0.iter().all(|t| t.owner_id() == owner)
  }

  /// Remove every ticket matching `f`, keeping order of the rest
  /// 移除所有满足 `f` 的票据，其余保持顺序
  pub fn take(&mut self, mut f: impl FnMut(&Ticket) -> bool) -> Vec<Ticket> {
    let mut taken = Vec::new();
    let mut kept = VecDeque::with_capacity(self.0.len());
    for t in self.0.drain(..) {
      if f(&t) {
        taken.push(t);
      } else {
        kept.push_back(t);
      }
    }
    self.0 = kept;
    taken
  }

  pub fn drain(&mut self) -> impl Iterator<Item = Ticket> + '_ {
    self.0.drain(..)
  }
}
