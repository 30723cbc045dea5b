//! 内存存储

mod accounts;

pub use accounts::{Account, AccountStore};
