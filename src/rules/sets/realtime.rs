use crate::rules::{RuleSpec, Severity};

const OWNER: &str = "rt-audio-guardian";
const ALLOCATION: &str = "resource-allocation-in-realtime-context";
const RELEASE: &str = "resource-release-in-realtime-context";
const BLOCKING: &str = "blocking-primitive-in-realtime-context";
const LOGGING: &str = "logging-in-realtime-context";
const ASSERTION: &str = "assertion-in-realtime-context";
const CONSOLE_IO: &str = "console-io-in-realtime-context";
const REVIEW: &str = "Review for RT-safety compliance";

fn rt(id: &str, pattern: &str, category: &str, what: &str, fix: &str) -> RuleSpec {
    RuleSpec::new(
        id,
        pattern,
        category,
        Severity::Error,
        &format!("RT-safety violation: {}", what),
    )
    .fix(fix)
    .owner(OWNER)
}

/// Reglas para código que corre en el hilo de audio. Ninguna es auto-corregible:
/// los cambios de RT-safety requieren revisión manual.
pub fn rules() -> Vec<RuleSpec> {
    vec![
        rt("rt-malloc", r"\bmalloc\s*\(", ALLOCATION, "Memory allocation in audio thread",
            "Pre-allocate memory in constructor or use lock-free data structures"),
        rt("rt-free", r"\bfree\s*\(", RELEASE, "Memory deallocation in audio thread", REVIEW),
        rt("rt-new", r"\bnew\s+\w+", ALLOCATION, "Dynamic allocation in audio thread",
            "Pre-allocate objects or use object pools"),
        rt("rt-delete", r"\bdelete\s+", RELEASE, "Dynamic deallocation in audio thread", REVIEW),
        rt("rt-vector-construct", r"\bstd::vector\s*<.*>\s*\w+\s*\(", ALLOCATION,
            "Vector construction (potential allocation)",
            "Reserve capacity in constructor or use fixed-size arrays"),
        rt("rt-string-assign", r"\bstd::string\s+\w+\s*=", ALLOCATION,
            "String allocation in audio thread", REVIEW),
        rt("rt-dbg", r"\bDBG\s*\(", LOGGING, "Debug logging in audio thread",
            "Use atomic flags for debugging or move to message thread"),
        rt("rt-jassert", r"\bjassert\s*\(", ASSERTION, "Assertion in audio thread", REVIEW),
        rt("rt-mutex", r"\bstd::mutex", BLOCKING, "Mutex usage (blocking) in audio thread",
            "Use lock-free atomic operations instead"),
        rt("rt-lock-guard", r"\block_guard", BLOCKING, "Lock guard usage in audio thread",
            "Use lock-free atomic operations instead"),
        rt("rt-printf", r"\bprintf\s*\(", CONSOLE_IO, "Printf in audio thread", REVIEW),
        rt("rt-cout", r"\bstd::cout", CONSOLE_IO, "Console output in audio thread", REVIEW),
    ]
}
