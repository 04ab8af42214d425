#![cfg_attr(docsrs, feature(doc_cfg))]

//! # jdb_table_lock - Table lock manager / 表锁管理器
//!
//! Priority-aware read/write locks shared by connection threads.
//! Writers are favored over readers up to a configurable streak, waiters
//! sleep on their own request signal, and grouped acquisition imposes a
//! total order to avoid circular waits.
//! 连接线程共享的带优先级读写锁。写者优先于读者，连续次数可配置；
//! 等待者在各自请求的信号上休眠；批量加锁按全序获取以避免循环等待。

pub mod conf;
pub mod consts;
pub mod error;
mod group;
mod level;
mod lock;
mod owner;
mod queue;
mod registry;
mod request;
mod signal;
mod state;

pub use conf::Conf;
pub use error::{Error, Result};
pub use group::{acquire_all, release_all};
pub use level::Level;
pub use lock::{Holder, Info, Lock};
pub use owner::Owner;
pub use registry::{Registry, Stats};
pub use request::{Request, Status};
