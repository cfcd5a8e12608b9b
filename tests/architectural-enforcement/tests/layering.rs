//! Integration Test: Layering
//!
//! **Policy**: The planner core is headless and talks HTTP only through its
//! gateway. The TUI reaches the backend only through the core. Production
//! code propagates errors instead of unwrapping.

use architectural_enforcement::{find_violations, report, SOURCE_DIRS};

#[test]
fn test_http_stays_in_gateway() {
    report(
        "reqwest used outside the gateway",
        &find_violations("planner/core/src", "reqwest", &["planner/core/src/gateway/"]),
    );
    report(
        "reqwest used by the TUI",
        &find_violations("tui/src", "reqwest", &[]),
    );
}

#[test]
fn test_core_is_headless() {
    for crate_name in ["ratatui", "crossterm"] {
        report(
            "terminal crate used by the planner core",
            &find_violations("planner/core/src", crate_name, &[]),
        );
    }
}

#[test]
fn test_no_unwrap_in_production() {
    for dir in SOURCE_DIRS {
        report(".unwrap() in production code", &find_violations(dir, ".unwrap()", &[]));
        report(".expect( in production code", &find_violations(dir, ".expect(", &[]));
    }
}
