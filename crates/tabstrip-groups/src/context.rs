#![forbid(unsafe_code)]

//! Operation context threaded through internal engine calls.
//!
//! The context replaces instance-level "in progress" flags: each entry point
//! builds one and passes it down, so a nested call can never observe a flag
//! left behind by an unrelated operation.

/// Per-call flags consulted by move classification and bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpContext {
    /// An undo is restoring prior keys. Positional changes are classified as
    /// moves out of the current group.
    pub undoing: bool,
    /// Part of a batch that resyncs and emits once at the end. Positional
    /// changes only update the sequence.
    pub batch: bool,
    /// Re-adding a tab whose closure was undone. Parent-group inheritance
    /// does not apply.
    pub from_undo: bool,
    /// Emit metric records for this operation.
    pub record_metrics: bool,
}

impl Default for OpContext {
    fn default() -> Self {
        Self::user()
    }
}

impl OpContext {
    /// A direct user or API request.
    #[must_use]
    pub const fn user() -> Self {
        Self {
            undoing: false,
            batch: false,
            from_undo: false,
            record_metrics: true,
        }
    }

    #[must_use]
    pub const fn undoing(self, undoing: bool) -> Self {
        Self { undoing, ..self }
    }

    #[must_use]
    pub const fn batch(self) -> Self {
        Self {
            batch: true,
            ..self
        }
    }

    /// Restoring a closed tab: parent inheritance and metrics are skipped.
    #[must_use]
    pub const fn closure_undo() -> Self {
        Self {
            undoing: false,
            batch: false,
            from_undo: true,
            record_metrics: false,
        }
    }

    /// Replaying state at startup: metrics are skipped.
    #[must_use]
    pub const fn restore() -> Self {
        Self {
            record_metrics: false,
            ..Self::user()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_only_touch_their_flag() {
        let ctx = OpContext::user().undoing(true);
        assert!(ctx.undoing);
        assert!(!ctx.batch);
        assert!(ctx.record_metrics);
        let batch = ctx.batch();
        assert!(batch.batch && batch.undoing);
    }

    #[test]
    fn closure_undo_skips_metrics() {
        let ctx = OpContext::closure_undo();
        assert!(ctx.from_undo);
        assert!(!ctx.record_metrics);
    }
}
