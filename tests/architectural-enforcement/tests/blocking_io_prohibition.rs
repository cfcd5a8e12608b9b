//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Production code MUST NOT use blocking I/O once the runtime is
//! serving the UI.
//! **Acceptable**: Reading the config file and opening the log file at
//! startup, before the event loop runs.

use architectural_enforcement::{find_violations, report, SOURCE_DIRS};

const STARTUP_CODE: [&str; 2] = ["planner/core/src/config/", "tui/src/main.rs"];

#[test]
fn test_no_blocking_fs_outside_startup() {
    for dir in SOURCE_DIRS {
        report(
            "blocking std::fs outside startup code",
            &find_violations(dir, "fs::", &STARTUP_CODE),
        );
    }
}

#[test]
fn test_no_blocking_network() {
    for dir in SOURCE_DIRS {
        report("std::net in production code", &find_violations(dir, "std::net", &[]));
        report(
            "reqwest::blocking in production code",
            &find_violations(dir, "reqwest::blocking", &[]),
        );
    }
}
