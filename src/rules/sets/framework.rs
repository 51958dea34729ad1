use crate::rules::{RuleSpec, Severity};

/// Antipatrones propios de JUCE. Son advertencias con corrección mecánica.
pub fn rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new("juce-windows-include", r"#include\s+<windows\.h>", "include-order",
            Severity::Warning, "Include windows.h before JUCE headers")
            .fix("Include windows.h after the JUCE module headers")
            .auto_fixable(),
        RuleSpec::new("juce-using-namespace", r"using namespace juce", "namespace-pollution",
            Severity::Warning, "Avoid \"using namespace juce\" in headers")
            .fix("Qualify names with juce:: instead")
            .auto_fixable(),
        RuleSpec::new("juce-dispatch-loop", r"MessageManager::getInstance\(\)->runDispatchLoop",
            "blocking-message-loop", Severity::Warning, "Blocking message loop call")
            .auto_fixable(),
        RuleSpec::new("juce-zero-timer", r"Timer::startTimer\s*\(\s*0\s*\)", "zero-interval-timer",
            Severity::Warning, "Zero-interval timer (performance issue)")
            .auto_fixable(),
        RuleSpec::new("juce-unbounded-draw", r"Graphics::drawImageAt.*without bounds",
            "unbounded-image-draw", Severity::Warning, "Unbounded image drawing")
            .auto_fixable(),
    ]
}
