//! Per-port lock: reentrant, or a no-op for single-threaded use.

use crate::options::LockMode;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

pub(crate) enum PortLock {
    Reentrant(ReentrantMutex<()>),
    Unlocked,
}

/// Held for the duration of one compound port operation.
pub(crate) enum PortLockGuard<'a> {
    Reentrant { _guard: ReentrantMutexGuard<'a, ()> },
    Unlocked,
}

impl PortLock {
    pub(crate) fn new(mode: LockMode) -> Self {
        match mode {
            LockMode::Reentrant => Self::Reentrant(ReentrantMutex::new(())),
            LockMode::Unlocked => Self::Unlocked,
        }
    }

    pub(crate) fn lock(&self) -> PortLockGuard<'_> {
        match self {
            Self::Reentrant(mutex) => PortLockGuard::Reentrant {
                _guard: mutex.lock(),
            },
            Self::Unlocked => PortLockGuard::Unlocked,
        }
    }

    pub(crate) fn mode(&self) -> LockMode {
        match self {
            Self::Reentrant(_) => LockMode::Reentrant,
            Self::Unlocked => LockMode::Unlocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reentrant_lock_nests() {
        let lock = PortLock::new(LockMode::Reentrant);
        let _outer = lock.lock();
        let _inner = lock.lock();
        assert_eq!(lock.mode(), LockMode::Reentrant);
    }

    #[test]
    fn test_unlocked_never_blocks() {
        let lock = PortLock::new(LockMode::Unlocked);
        let _a = lock.lock();
        let _b = lock.lock();
        assert_eq!(lock.mode(), LockMode::Unlocked);
    }
}
