//! Lock manager configuration 锁管理器配置

use std::time::Duration;

use crate::{
  Level,
  consts::{CONCURRENT_INSERT_FALLBACK, MAX_WRITE_STREAK, WAIT_TIMEOUT},
};

/// Configuration 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conf {
  /// Only applies to owners with open cursors
  /// 仅对持有游标的连接生效
  pub wait_timeout: Duration,
  /// Consecutive writer grants before waiting readers are drained
  /// 连续授权写锁次数上限，超过后放行等待的读者
  pub max_write_streak: u64,
  /// Must be a write level 必须是写级别
  pub concurrent_insert_fallback: Level,
}

impl Default for Conf {
  fn default() -> Self {
    Self {
      wait_timeout: WAIT_TIMEOUT,
      max_write_streak: MAX_WRITE_STREAK,
      concurrent_insert_fallback: CONCURRENT_INSERT_FALLBACK,
    }
  }
}
