//! Lock levels / 锁级别
//!
//! Ordered from weakest to strongest. The order is both the compatibility
//! key and the sort key of grouped acquisition.
//! 从弱到强排列。该顺序既用于兼容性判断，也用于批量加锁排序。

/// Lock level / 锁级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Level {
  /// Not a real request, skipped / 非真实请求，跳过
  Ignore,
  #[default]
  Unlock,
  /// Low priority read / 低优先级读
  Read,
  ReadWithSharedLocks,
  /// Read without concurrent inserts / 禁止并发插入的读
  ReadNoInsert,
  /// Write that allows other writers / 允许其他写者的写
  WriteAllowWrite,
  /// Write that allows readers / 允许读者的写
  WriteAllowRead,
  /// Insert mixed with selects / 可与查询并发的插入
  WriteConcurrentInsert,
  WriteDefault,
  /// High priority write / 高优先级写
  Write,
  /// Write that aborts every new request / 终止所有新请求的写
  WriteOnly,
}

impl Level {
  #[inline]
  pub const fn is_read(self) -> bool {
    matches!(
      self,
      Level::Read | Level::ReadWithSharedLocks | Level::ReadNoInsert
    )
  }

  #[inline]
  pub const fn is_write(self) -> bool {
    self as u8 >= Level::WriteAllowWrite as u8
  }

  /// Write level that may run beside readers
  /// 可与读者并存的写级别
  #[inline]
  pub const fn shares_read(self) -> bool {
    matches!(
      self,
      Level::WriteAllowWrite | Level::WriteAllowRead | Level::WriteConcurrentInsert
    )
  }

  /// Whether an active writer at `self` admits a reader at `read`
  /// 当前写级别是否允许 `read` 级别的读者并存
  #[inline]
  pub fn admits(self, read: Level) -> bool {
    match self {
      Level::WriteAllowRead => read.is_read(),
      Level::WriteAllowWrite | Level::WriteConcurrentInsert => {
        read.is_read() && read <= Level::ReadWithSharedLocks
      }
      _ => false,
    }
  }
}
