use crate::rules::{RuleSpec, Severity};

const MODERNIZE: &str = "Apply modern C++ best practices";

fn hygiene(id: &str, pattern: &str, category: &str, description: &str, fix: &str) -> RuleSpec {
    RuleSpec::new(id, pattern, category, Severity::Warning, description)
        .fix(fix)
        .auto_fixable()
}

pub fn rules() -> Vec<RuleSpec> {
    vec![
        hygiene("cpp-std-max", r"std::max\s*\(\s*\w+\s*,\s*\w+\s*\)\s*;", "macro-conflict",
            "Potential macro conflict with max()",
            "Add #undef max before usage or use parentheses: (std::max)"),
        hygiene("cpp-std-min", r"std::min\s*\(\s*\w+\s*,\s*\w+\s*\)\s*;", "macro-conflict",
            "Potential macro conflict with min()",
            "Add #undef min before usage or use parentheses: (std::min)"),
        hygiene("cpp-empty-virtual-dtor", r"virtual\s+~\w+\s*\(\s*\)\s*\{\s*\}", "defaulted-destructor",
            "Virtual destructor should be = default", "virtual ~ClassName() = default;"),
        hygiene("cpp-raw-array-new", r"new\s+\w+\s*\[.*\]", "raw-array",
            "Prefer std::vector over raw arrays", "std::vector<Type> container(size);"),
        hygiene("cpp-array-delete", r"delete\s*\[\s*\]", "raw-array",
            "Manual array deletion (use RAII)", MODERNIZE),
        hygiene("cpp-memcpy", r"memcpy\s*\(", "unsafe-copy",
            "Prefer std::copy over memcpy", "std::copy(src, src + size, dest);"),
        hygiene("cpp-strcpy", r"strcpy\s*\(", "unsafe-copy",
            "Unsafe string copy (use safe alternatives)", MODERNIZE),
    ]
}
