//! Integration Test: Single Influence Writer
//!
//! The per-mesh morph-influence array is the only shared mutable
//! resource in the engine. Exactly one component is allowed to write it:
//! the blend state, once per render tick. Every other component stages
//! desired targets and stays out of the live array.
//!
//! **Policy**: `set_influence` may be called only from the blend module.
//! **Exceptions**: The scene module, which declares the trait method and
//! implements it for the test fixture.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

/// The write call every non-blend component must stay away from.
const WRITE_CALL: &str = ".set_influence(";

/// Files allowed to mention the write call.
fn is_allowed(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name == "blend.rs" {
        return true;
    }
    path.components()
        .any(|component| component.as_os_str() == "scene")
}

#[test]
fn test_only_the_blend_state_writes_influences() {
    let root = architectural_enforcement::engine_src_root();
    let mut violations = Vec::new();

    for entry in WalkDir::new(&root).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("rs") || is_allowed(path) {
            continue;
        }

        let source = fs::read_to_string(path).expect("engine source should be readable");
        for (line_number, line) in source.lines().enumerate() {
            if line.contains(WRITE_CALL) {
                violations.push(format!(
                    "{}:{}: {}",
                    path.display(),
                    line_number + 1,
                    line.trim()
                ));
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\nDirect influence writes outside the blend state:");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nStage a target weight instead; the blend state applies it.");

        panic!(
            "Found {} single-writer violation(s). Fix these before merging!",
            violations.len()
        );
    }
}
