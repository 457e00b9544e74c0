//! Concurrent first use of the thread-safe `Singleton`.
//!
//! The contenders below are the first callers in this test binary, so they
//! genuinely race to construct the process-wide instance.

use dp_core::{contend, Singleton};

#[test]
fn test_concurrent_first_use_yields_one_instance() {
    assert!(Singleton::get().is_none());

    let report = contend(64, Singleton::instance).unwrap();

    assert_eq!(report.threads(), 64);
    assert_eq!(report.distinct_instances(), 1);
    assert!(report.is_consistent());

    let winner = report.winner().unwrap();
    assert!(
        report.proposed().iter().any(|p| p == winner),
        "winner {winner:?} was never proposed"
    );

    // The race is over; later callers are ignored.
    assert_eq!(Singleton::instance("after the race").value(), winner);

    // A second probe against the settled instance changes nothing.
    let again = contend(8, Singleton::instance).unwrap();
    assert_eq!(again.winner(), Some(winner));
}
