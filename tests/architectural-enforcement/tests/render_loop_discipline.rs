//! Integration Test: Render-Loop Discipline
//!
//! The engine is single-threaded and cooperative: every timer is a
//! deadline against the frame clock, every callback is a buffered event
//! drained on the tick. Blocking the loop or spawning threads would
//! break that model silently.
//!
//! **Policy**: Engine code MUST NOT sleep, spawn threads, or take locks.
//! **Exceptions**: The demo binary may await a frame ticker
//! (`tokio::time::interval`), which yields instead of blocking.

use std::fs;

use walkdir::WalkDir;

/// Patterns that indicate the render loop is being blocked or bypassed.
const FORBIDDEN: [&str; 6] = [
    "std::thread::sleep",
    "thread::spawn",
    "std::sync::Mutex",
    "std::sync::RwLock",
    "parking_lot::",
    "block_on(",
];

#[test]
fn test_engine_never_blocks_the_render_loop() {
    let violations = find_violations();

    if !violations.is_empty() {
        eprintln!("\nBlocking primitives found in engine code:");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nThe engine runs cooperatively on the render tick.");
        eprintln!("Use frame-clock deadlines and buffered channels instead.");

        panic!(
            "Found {} render-loop violation(s). Fix these before merging!",
            violations.len()
        );
    }
}

fn find_violations() -> Vec<String> {
    let root = architectural_enforcement::engine_src_root();
    let mut violations = Vec::new();

    for entry in WalkDir::new(&root).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("rs") {
            continue;
        }

        let source = fs::read_to_string(path).expect("engine source should be readable");
        for (line_number, line) in source.lines().enumerate() {
            for pattern in FORBIDDEN {
                if line.contains(pattern) {
                    violations.push(format!(
                        "{}:{}: {}",
                        path.display(),
                        line_number + 1,
                        line.trim()
                    ));
                }
            }
        }
    }

    violations
}
