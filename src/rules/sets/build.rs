use crate::rules::{RuleSpec, Severity};

const BUILD_OWNER: &str = "build-stability-monitor";
const FRAMEWORK_OWNER: &str = "juce-integration-specialist";
const RT_OWNER: &str = "rt-audio-guardian";

fn build(id: &str, pattern: &str, category: &str, description: &str, fix: &str, owner: &str) -> RuleSpec {
    RuleSpec::new(id, pattern, category, Severity::Error, description)
        .fix(fix)
        .owner(owner)
        .case_insensitive()
}

/// Patrones de errores de compilación, enlazado y CMake.
pub fn rules() -> Vec<RuleSpec> {
    vec![
        build("msvc-c2039", r"error C2039.*'(\w+)'.*is not a member of.*juce", "framework-missing-member",
            "Member is not part of the framework API",
            "Update JUCE version or check API documentation for removed/renamed members",
            FRAMEWORK_OWNER),
        build("msvc-c2065", r"error C2065.*'(\w+)'.*undeclared identifier", "undeclared-identifier",
            "Undeclared identifier", "Add missing #include directive or check spelling", BUILD_OWNER),
        build("msvc-c2664", r"error C2664.*cannot convert.*'std::(\w+)'", "type-conversion",
            "Invalid type conversion", "Add explicit type conversion or use correct type",
            "spectralcanvas-pro-specialist"),
        build("msvc-lnk2019", r"error LNK2019.*unresolved external symbol.*'(\w+)'", "unresolved-symbol",
            "Unresolved external symbol",
            "Add missing library to CMake target_link_libraries or implement missing function",
            BUILD_OWNER),
        build("msvc-c1083", r"fatal error C1083.*Cannot open include file.*'(\w+\.h)'", "missing-header",
            "Include file not found",
            "Add missing include directory to CMake or install missing dependency", BUILD_OWNER),
        build("rt-allocation-report", r".*allocation.*audio.*thread", "resource-allocation-in-realtime-context",
            "Allocation reported on the audio thread",
            "Move memory allocation to initialization or use lock-free structures", RT_OWNER),
        build("rt-mutex-report", r".*mutex.*processBlock", "blocking-primitive-in-realtime-context",
            "Mutex reported inside processBlock",
            "Replace mutex with atomic operations or lock-free queue", RT_OWNER),
        build("juce-message-manager", r".*MessageManager.*audio thread", "message-manager-off-thread",
            "MessageManager used from the audio thread",
            "Use MessageManager::callAsync or move to message thread", FRAMEWORK_OWNER),
        build("juce-graphics-context", r".*Graphics::.*without OpenGL context", "graphics-context-missing",
            "Graphics call without a rendering context",
            "Ensure graphics operations are called from message thread", FRAMEWORK_OWNER),
        build("cmake-missing-target", r"CMake Error.*target.*does not exist", "cmake-missing-target",
            "CMake target does not exist",
            "Check CMakeLists.txt for correct target name or add missing target", BUILD_OWNER),
        build("cmake-juce-missing", r"CMake Error.*JUCE.*not found", "cmake-framework-missing",
            "JUCE not found by CMake",
            "Ensure JUCE is properly fetched and configured in CMakeLists.txt", FRAMEWORK_OWNER),
    ]
}
