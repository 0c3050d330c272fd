//! Single-flight submission guard.
//!
//! At most one request per form may be outstanding. A second submit while
//! the first is in flight is refused, and the flag is released on every
//! exit path of a submission attempt.

use std::cell::Cell;

/// Per-form reentrancy lock.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    outstanding: Cell<bool>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a submission outstanding; `false` if one already is.
    pub fn begin_submission(&self) -> bool {
        !self.outstanding.replace(true)
    }

    /// Clear the flag unconditionally.
    pub fn end_submission(&self) {
        self.outstanding.set(false);
    }

    pub fn is_outstanding(&self) -> bool {
        self.outstanding.get()
    }

    /// Begin a submission whose end is tied to the returned permit's drop.
    pub fn try_acquire(&self) -> Option<FlightPermit<'_>> {
        self.begin_submission().then(|| FlightPermit { guard: self })
    }
}

/// Proof that a submission is outstanding. Dropping it ends the submission.
#[derive(Debug)]
#[must_use = "the submission ends as soon as the permit is dropped"]
pub struct FlightPermit<'a> {
    guard: &'a SubmissionGuard,
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.guard.end_submission();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused() {
        let guard = SubmissionGuard::new();
        assert!(guard.begin_submission());
        assert!(!guard.begin_submission());
        guard.end_submission();
        assert!(guard.begin_submission());
    }

    #[test]
    fn end_is_unconditional() {
        let guard = SubmissionGuard::new();
        guard.end_submission();
        assert!(!guard.is_outstanding());
    }

    #[test]
    fn permit_releases_on_drop() {
        let guard = SubmissionGuard::new();
        {
            let _permit = guard.try_acquire().expect("free");
            assert!(guard.is_outstanding());
            assert!(guard.try_acquire().is_none());
        }
        assert!(!guard.is_outstanding());
    }

    #[test]
    fn refused_acquire_leaves_outstanding_flag_alone() {
        let guard = SubmissionGuard::new();
        let permit = guard.try_acquire().expect("free");
        assert!(guard.try_acquire().is_none());
        assert!(guard.is_outstanding());
        drop(permit);
        assert!(!guard.is_outstanding());
    }

    #[test]
    fn permit_releases_on_early_return() {
        fn attempt(guard: &SubmissionGuard, fail: bool) -> Result<(), ()> {
            let _permit = guard.try_acquire().ok_or(())?;
            if fail {
                return Err(());
            }
            Ok(())
        }

        let guard = SubmissionGuard::new();
        assert!(attempt(&guard, true).is_err());
        assert!(!guard.is_outstanding());
        assert!(attempt(&guard, false).is_ok());
        assert!(!guard.is_outstanding());
    }
}
