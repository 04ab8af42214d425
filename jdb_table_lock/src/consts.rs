//! 常量定义 Constants

use std::time::Duration;

use crate::Level;

/// 锁等待超时 Wait timeout for owners holding open cursors
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(50);

/// 连续写授权上限 Writer grant streak bound (disabled)
pub const MAX_WRITE_STREAK: u64 = u64::MAX;

/// 并发插入不可用时的替代级别 Fallback when concurrent insert is unavailable
pub const CONCURRENT_INSERT_FALLBACK: Level = Level::Write;
