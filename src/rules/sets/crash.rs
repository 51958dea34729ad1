use crate::rules::{RuleSpec, Severity};

fn crash(id: &str, pattern: &str, category: &str, description: &str, fix: &str, owner: &str) -> RuleSpec {
    RuleSpec::new(id, pattern, category, Severity::Critical, description)
        .fix(fix)
        .owner(owner)
        .case_insensitive()
}

/// Firmas de fallos en logs de ejecución y volcados de memoria.
pub fn rules() -> Vec<RuleSpec> {
    vec![
        crash("segfault", r"Segmentation fault.*core dumped", "segfault", "Segmentation fault",
            "Check for null pointer dereference or buffer overflow", "rt-audio-guardian"),
        crash("juce-assertion", r"Assertion failed.*juce_", "framework-assertion", "JUCE assertion failed",
            "Check JUCE assertion condition and fix underlying issue", "juce-integration-specialist"),
        crash("stack-overflow", r"Stack overflow.*recursion", "stack-overflow", "Stack overflow",
            "Check for infinite recursion or reduce stack usage", "spectralcanvas-pro-specialist"),
        crash("access-violation", r"Access violation.*0x[0-9a-fA-F]+", "access-violation", "Access violation",
            "Check for null pointer access or use-after-free", "rt-audio-guardian"),
        crash("bad-alloc", r"std::bad_alloc", "memory-exhaustion", "Allocation failure",
            "Reduce memory usage or check for memory leaks", "rt-audio-guardian"),
    ]
}
