use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{AssemblyError, Result};

/// 协作式取消标记。克隆后共享同一个标志位，
/// 在二次复杂度的循环里定期调用 [`CancelToken::check`]。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(AssemblyError::Cancelled)
        } else {
            Ok(())
        }
    }
}
