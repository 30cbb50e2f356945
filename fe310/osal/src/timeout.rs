//! Bounded waiting for thread-side operations.

/// How long a thread-side call may wait for its queue to make progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Transfer what is possible right now and return.
    #[default]
    Immediate,
    /// Re-check the queue up to this many times before giving up.
    Polls(u32),
    /// Wait until the transfer completes.
    Forever,
}

impl Timeout {
    pub fn poller(self) -> Poller {
        Poller {
            remaining: match self {
                Timeout::Immediate => Some(0),
                Timeout::Polls(n) => Some(n),
                Timeout::Forever => None,
            },
        }
    }
}

/// Wait budget of one blocking call.
#[derive(Debug)]
pub struct Poller {
    remaining: Option<u32>,
}

impl Poller {
    /// Give the other execution level a chance to run. Returns `false`
    /// once the budget is exhausted, without waiting.
    pub fn wait(&mut self) -> bool {
        match &mut self.remaining {
            Some(0) => return false,
            Some(n) => *n -= 1,
            None => {}
        }
        relax();
        true
    }
}

#[cfg(feature = "std")]
fn relax() {
    std::thread::yield_now();
}

#[cfg(not(feature = "std"))]
fn relax() {
    core::hint::spin_loop();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_never_waits() {
        assert!(!Timeout::Immediate.poller().wait());
    }

    #[test]
    fn polls_are_bounded() {
        let mut poller = Timeout::Polls(3).poller();
        assert!(poller.wait());
        assert!(poller.wait());
        assert!(poller.wait());
        assert!(!poller.wait());
    }

    #[test]
    fn forever_keeps_waiting() {
        let mut poller = Timeout::Forever.poller();
        assert!((0..100).all(|_| poller.wait()));
    }
}
