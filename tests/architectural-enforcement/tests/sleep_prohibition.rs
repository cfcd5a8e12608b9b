//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep to wait for something.
//! **Exceptions**: Frame rate limiting in the app loop, the delay before the
//! automatic login after registration, test code.

use architectural_enforcement::{find_violations, report, SOURCE_DIRS};

#[test]
fn test_no_thread_sleep() {
    for dir in SOURCE_DIRS {
        report(
            "std::thread::sleep blocks the runtime",
            &find_violations(dir, "thread::sleep", &[]),
        );
    }
}

#[test]
fn test_async_sleep_only_where_allowed() {
    let allowed = ["tui/src/app.rs", "planner/core/src/controller.rs"];
    for dir in SOURCE_DIRS {
        report(
            "tokio::time::sleep outside frame limiting and the auto-login delay",
            &find_violations(dir, "sleep(", &allowed),
        );
    }
}
