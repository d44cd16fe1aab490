//! macOS accessibility permission checks.

use core_foundation::base::TCFType;
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::string::CFString;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXIsProcessTrustedWithOptions(options: CFDictionaryRef) -> bool;
}

/// Whether this process may post synthetic input.
pub fn has_accessibility_access() -> bool {
    unsafe { AXIsProcessTrusted() }
}

/// Check access, asking the system to show its permission prompt if missing.
pub fn ensure_accessibility_access() -> bool {
    if has_accessibility_access() {
        return true;
    }

    tracing::warn!("Accessibility permission not granted, showing system prompt");
    let key = CFString::from_static_string("AXTrustedCheckOptionPrompt");
    let value = CFBoolean::true_value();
    let options = CFDictionary::from_CFType_pairs(&[(key.as_CFType(), value.as_CFType())]);
    unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_accessibility_access() {
        // This test just verifies the function doesn't panic
        // The actual result depends on system permissions
        let _result = has_accessibility_access();
    }
}
