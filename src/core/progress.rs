/// How far a simulation has got.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Progress {
    /// Number of intervals dispatched so far.
    pub n_done: usize,

    pub n_total: usize,
}

impl Progress {
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn fraction(self) -> f64 {
        if self.n_total == 0 { 1.0 } else { self.n_done as f64 / self.n_total as f64 }
    }
}

/// Optional progress subscriber, notified every so many intervals and once at the end.
#[derive(Copy, Clone)]
pub struct ProgressReporter<'a> {
    pub every: usize,
    pub callback: &'a (dyn Fn(Progress) + Sync),
}

impl<'a> ProgressReporter<'a> {
    pub const fn new(every: usize, callback: &'a (dyn Fn(Progress) + Sync)) -> Self {
        Self { every, callback }
    }

    pub fn report(&self, n_done: usize, n_total: usize) {
        if n_done == n_total || (self.every != 0 && n_done % self.every == 0) {
            (self.callback)(Progress { n_done, n_total });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_cadence() {
        let reports = Mutex::new(Vec::new());
        let callback = |progress: Progress| reports.lock().unwrap().push(progress.n_done);
        let reporter = ProgressReporter::new(4, &callback);
        for n_done in 1..=10 {
            reporter.report(n_done, 10);
        }
        assert_eq!(*reports.lock().unwrap(), [4, 8, 10]);
    }

    #[test]
    fn test_fraction() {
        assert_eq!(Progress { n_done: 5, n_total: 20 }.fraction(), 0.25);
        assert_eq!(Progress { n_done: 0, n_total: 0 }.fraction(), 1.0);
    }
}
