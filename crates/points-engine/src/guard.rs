//! 扫码去重闩锁
//!
//! 摄像头帧流会把同一次物理扫码上报多次。闩锁在一次入账结果被 UI 确认前
//! 保持占用，期间到达的扫码事件全部丢弃（不排队、不重试）。
//! 释放只由 UI 的显式确认驱动，没有超时自动释放。

use parking_lot::Mutex;

/// 闩锁状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LatchState {
    #[default]
    Open,
    Held,
}

/// 单槽扫码闩锁，作用域为一个扫码会话
#[derive(Debug, Default)]
pub struct ScanGuard {
    state: Mutex<LatchState>,
}

impl ScanGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open → Held 并返回 true；已占用时返回 false，调用方必须丢弃该事件
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            LatchState::Open => {
                *state = LatchState::Held;
                true
            }
            LatchState::Held => false,
        }
    }

    /// 无条件回到 Open
    pub fn release(&self) {
        *self.state.lock() = LatchState::Open;
    }

    pub fn state(&self) -> LatchState {
        *self.state.lock()
    }

    pub fn is_held(&self) -> bool {
        self.state() == LatchState::Held
    }
}
