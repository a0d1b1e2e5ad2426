//! Tests for the violation log

use std::sync::Arc;
use std::thread;

use rwsem_stress::core::{Checker, Expect, Holders, ViolationDetail, ViolationLog};

#[test]
fn test_concurrent_recording_counts_everything() {
    let log = Arc::new(ViolationLog::new(10));
    let mut handles = vec![];

    for i in 0..4 {
        let log = Arc::clone(&log);
        handles.push(thread::spawn(move || {
            let label = format!("read-{i}");
            let checker = Checker::new(&label, &log);
            for _ in 0..100 {
                checker.check(Expect::NoWriter, Holders { readers: 1, writers: 1 });
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(log.count(), 400);
    assert_eq!(log.records().len(), 10);
    assert!(log.truncated());
}

#[test]
fn test_passing_checks_record_nothing() {
    let log = ViolationLog::default();
    let checker = Checker::new("down-0", &log);

    assert!(checker.check(Expect::Downgraded, Holders { readers: 1, writers: 0 }));
    assert!(checker.check_value("writers", 1, 1));

    assert_eq!(log.count(), 0);
    assert!(log.records().is_empty());
    assert!(!log.truncated());
}

#[test]
fn test_report_records_arbitrary_detail() {
    let log = ViolationLog::default();
    Checker::new("controller", &log).report(ViolationDetail::Panicked {
        message: "lock poisoned".into(),
    });

    let records = log.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].to_string(), "controller panicked: lock poisoned");
}
