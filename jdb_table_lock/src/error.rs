use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// Refused or killed while waiting / 被拒绝或等待时被终止
  #[error("lock aborted / 锁请求被终止")]
  Aborted,

  #[error("lock wait timeout / 锁等待超时")]
  TimedOut,

  /// Owner would wait on a table it already holds through an open cursor
  /// 持有游标的连接等待自己已持有的表
  #[error("deadlock on own cursor / 游标自死锁")]
  Deadlock,

  #[error("lock {id} busy / 锁 {id} 仍有请求")]
  Busy { id: u64 },

  #[error("request already held / 请求已持有锁")]
  Held,
}

pub type Result<T> = std::result::Result<T, Error>;
