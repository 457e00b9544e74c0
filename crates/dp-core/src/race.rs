//! Contention probe.
//!
//! [`contend`] releases a batch of threads onto a singleton accessor at the
//! same moment and records which instance each of them got back.  Against
//! [`Singleton`][crate::patterns::singleton::Singleton] every thread must
//! report the same instance; against
//! [`UnsyncSingleton`][crate::patterns::unsync_singleton::UnsyncSingleton]
//! overlapping first calls may leave threads holding different instances.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::thread;

use tracing::{debug, info, warn};

use crate::ensure;
use crate::errors::{Error, Result};
use crate::patterns::singleton::ValueHolder;

/// What a contention run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceReport {
    proposed: Vec<String>,
    observed: Vec<String>,
    distinct_instances: usize,
}

impl RaceReport {
    /// Number of contending threads.
    pub fn threads(&self) -> usize {
        self.proposed.len()
    }

    /// The value each thread asked for, indexed by contender.
    pub fn proposed(&self) -> &[String] {
        &self.proposed
    }

    /// The value each thread read back, indexed by contender.
    pub fn observed(&self) -> &[String] {
        &self.observed
    }

    /// How many different instances (by address) the threads received.
    pub fn distinct_instances(&self) -> usize {
        self.distinct_instances
    }

    /// `true` if all threads shared one instance and read the same value.
    pub fn is_consistent(&self) -> bool {
        self.distinct_instances == 1 && self.observed.windows(2).all(|w| w[0] == w[1])
    }

    /// The shared value, when the run was consistent.
    pub fn winner(&self) -> Option<&str> {
        if self.is_consistent() {
            self.observed.first().map(String::as_str)
        } else {
            None
        }
    }
}

impl fmt::Display for RaceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} threads, {} instance(s)",
            self.threads(),
            self.distinct_instances
        )?;
        match self.winner() {
            Some(winner) => write!(f, ", all observed {winner:?}"),
            None => write!(f, ", observed {:?}", self.observed),
        }
    }
}

/// Upper bound on the number of contenders a single run may start.
pub const MAX_CONTENDERS: usize = 4096;

/// Run `threads` contenders against `access` and report what they saw.
///
/// Contender `i` calls `access` with `"Value{i + 1}"`.  All contenders wait
/// at a start gate until every thread has been spawned, so their first
/// calls overlap as much as the scheduler allows.
///
/// # Errors
///
/// - [`Error::Precondition`] if `threads` is zero or above
///   [`MAX_CONTENDERS`].
/// - [`Error::Spawn`] if a thread cannot be started.
/// - [`Error::WorkerPanicked`] if `access` panics on some thread.
///
/// # Example
/// ```
/// use dp_core::patterns::double_checked::DoubleCheckedCell;
/// use dp_core::patterns::singleton::ValueHolder;
/// use dp_core::race::contend;
///
/// struct Named(String);
/// impl ValueHolder for Named {
///     fn value(&self) -> &str { &self.0 }
/// }
///
/// let cell = DoubleCheckedCell::new();
/// let report = contend(8, |v| cell.get_or_init(|| Named(v.to_owned()))).unwrap();
/// assert!(report.is_consistent());
/// assert_eq!(report.distinct_instances(), 1);
/// ```
pub fn contend<'a, T, F>(threads: usize, access: F) -> Result<RaceReport>
where
    T: ValueHolder + 'a,
    F: Fn(&str) -> &'a T + Sync,
{
    contend_with(
        threads,
        |index| thread::Builder::new().name(format!("contender-{index}")),
        access,
    )
}

/// [`contend`] with a caller-supplied thread builder per contender.
fn contend_with<'a, T, F, B>(threads: usize, builder: B, access: F) -> Result<RaceReport>
where
    T: ValueHolder + 'a,
    F: Fn(&str) -> &'a T + Sync,
    B: Fn(usize) -> thread::Builder,
{
    ensure!(
        threads > 0,
        "at least one contending thread is required, got {threads}"
    );
    ensure!(
        threads <= MAX_CONTENDERS,
        "at most {MAX_CONTENDERS} contending threads are supported, got {threads}"
    );

    let proposed: Vec<String> = (1..=threads).map(|i| format!("Value{i}")).collect();
    let gate = RwLock::new(());

    let outcomes: Vec<(usize, String)> = thread::scope(|scope| {
        // Contenders block on a read lock until this write guard is dropped.
        let start = gate.write().unwrap_or_else(PoisonError::into_inner);

        let mut handles = Vec::with_capacity(threads);
        for (index, value) in proposed.iter().enumerate() {
            let (gate, access) = (&gate, &access);
            let spawned = builder(index).spawn_scoped(scope, move || {
                drop(gate.read().unwrap_or_else(PoisonError::into_inner));
                let instance = access(value);
                (
                    instance as *const T as usize,
                    instance.value().to_owned(),
                )
            });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    warn!(index, error = %source, "failed to spawn contender");
                    // Let the started contenders run, and join them so a
                    // panic among them does not escape the scope.
                    drop(start);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(Error::Spawn { index, source });
                }
            }
        }
        debug!(threads, "all contenders spawned, opening gate");
        drop(start);

        // Join every handle before reporting so no panic is left unobserved.
        let joined: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
        joined
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| outcome.map_err(|_| Error::WorkerPanicked { index }))
            .collect::<Result<Vec<_>>>()
    })?;

    let distinct_instances = outcomes
        .iter()
        .map(|(addr, _)| *addr)
        .collect::<BTreeSet<_>>()
        .len();
    let observed = outcomes.into_iter().map(|(_, value)| value).collect();

    let report = RaceReport {
        proposed,
        observed,
        distinct_instances,
    };
    info!(
        threads,
        distinct_instances,
        consistent = report.is_consistent(),
        "contention probe finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::double_checked::DoubleCheckedCell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Named(String);

    impl ValueHolder for Named {
        fn value(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn zero_threads_rejected() {
        let cell = DoubleCheckedCell::new();
        let err = contend(0, |v| cell.get_or_init(|| Named(v.to_owned()))).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[test]
    fn too_many_threads_rejected() {
        let cell = DoubleCheckedCell::new();
        let err = contend(MAX_CONTENDERS + 1, |v| cell.get_or_init(|| Named(v.to_owned())))
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert!(cell.get().is_none());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn spawn_failure_joins_started_contenders() {
        // No system can map a stack this large, so contender 2 fails to
        // start after contenders 0 and 1, which both panic.
        let builder = |index: usize| {
            let builder = thread::Builder::new();
            if index == 2 {
                builder.stack_size(1 << 62)
            } else {
                builder
            }
        };
        let cell: DoubleCheckedCell<Named> = DoubleCheckedCell::new();
        let err = contend_with(3, builder, |v| {
            if v != "Value3" {
                panic!("contender gave up");
            }
            cell.get_or_init(|| Named(v.to_owned()))
        })
        .unwrap_err();
        assert!(matches!(err, Error::Spawn { index: 2, .. }));
    }

    #[test]
    fn double_checked_cell_is_consistent() {
        let built = AtomicUsize::new(0);
        let cell = DoubleCheckedCell::new();
        let report = contend(32, |v| {
            cell.get_or_init(|| {
                built.fetch_add(1, Ordering::SeqCst);
                Named(v.to_owned())
            })
        })
        .unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(report.threads(), 32);
        assert_eq!(report.distinct_instances(), 1);
        assert!(report.is_consistent());
        let winner = report.winner().unwrap();
        assert!(report.proposed().iter().any(|p| p == winner));
        assert_eq!(cell.get().map(|n| n.0.as_str()), Some(winner));
    }

    #[test]
    fn single_thread_wins_its_own_value() {
        let cell = DoubleCheckedCell::new();
        let report = contend(1, |v| cell.get_or_init(|| Named(v.to_owned()))).unwrap();
        assert_eq!(report.proposed(), ["Value1"]);
        assert_eq!(report.winner(), Some("Value1"));
        assert_eq!(
            report.to_string(),
            "1 threads, 1 instance(s), all observed \"Value1\""
        );
    }

    #[test]
    fn panicking_accessor_reported() {
        let cell: DoubleCheckedCell<Named> = DoubleCheckedCell::new();
        let err = contend(3, |v| {
            if v == "Value2" {
                panic!("contender gave up");
            }
            cell.get_or_init(|| Named(v.to_owned()))
        })
        .unwrap_err();
        assert!(matches!(err, Error::WorkerPanicked { index: 1 }));
    }

    #[test]
    fn inconsistent_report_has_no_winner() {
        let report = RaceReport {
            proposed: vec!["Value1".into(), "Value2".into()],
            observed: vec!["Value1".into(), "Value2".into()],
            distinct_instances: 2,
        };
        assert!(!report.is_consistent());
        assert_eq!(report.winner(), None);
        assert_eq!(
            report.to_string(),
            "2 threads, 2 instance(s), observed [\"Value1\", \"Value2\"]"
        );
    }
}
