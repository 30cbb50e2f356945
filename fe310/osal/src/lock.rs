//! System lock shared between thread level and the interrupt level.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::context::{IsrContext, ThreadContext};

/// Data guarded by the kernel's exclusive lock.
///
/// The lock is only ever held for the span of a closure, which keeps every
/// acquisition strictly nested and makes it impossible to hold it across a
/// blocking wait. Closures must not re-enter the same `SysLock`.
pub struct SysLock<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> SysLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Thread-level acquisition.
    #[inline]
    pub fn lock<R>(&self, _thread: &ThreadContext, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.inner.borrow_ref_mut(cs)))
    }

    /// Acquisition from inside an interrupt service routine.
    #[inline]
    pub fn lock_from_isr<R>(&self, _isr: &IsrContext, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.inner.borrow_ref_mut(cs)))
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}

impl<T: Default> Default for SysLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn both_levels_see_the_same_state() {
        let lock = SysLock::new(0u32);
        let thread = unsafe { ThreadContext::enter() };
        let isr = unsafe { IsrContext::enter() };

        lock.lock(&thread, |v| *v += 1);
        lock.lock_from_isr(&isr, |v| *v += 10);

        assert_eq!(lock.lock(&thread, |v| *v), 11);
        assert_eq!(lock.into_inner(), 11);
    }

    #[test]
    fn excludes_concurrent_levels() {
        let lock = Arc::new(SysLock::new(0usize));
        let isr_side = Arc::clone(&lock);

        let handle = thread::spawn(move || {
            let isr = unsafe { IsrContext::enter() };
            for _ in 0..1000 {
                isr_side.lock_from_isr(&isr, |v| {
                    let seen = *v;
                    thread::yield_now();
                    *v = seen + 1;
                });
            }
        });

        let thread_ctx = unsafe { ThreadContext::enter() };
        for _ in 0..1000 {
            lock.lock(&thread_ctx, |v| {
                let seen = *v;
                thread::yield_now();
                *v = seen + 1;
            });
        }
        handle.join().unwrap();

        assert_eq!(lock.lock(&thread_ctx, |v| *v), 2000);
    }
}
