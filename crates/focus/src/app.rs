use serde::{Deserialize, Serialize};

/// A running application as seen by the window server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppInfo {
    /// Process id.
    pub pid: i32,

    /// Bundle ID (e.g., "com.apple.TextEdit"); absent for bare executables.
    #[serde(default)]
    pub bundle_id: Option<String>,

    /// Display name (e.g., "TextEdit").
    #[serde(default)]
    pub name: Option<String>,
}

impl AppInfo {
    pub fn new(pid: i32) -> Self {
        Self {
            pid,
            bundle_id: None,
            name: None,
        }
    }

    pub fn with_bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = Some(bundle_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Best human-readable identifier: name, then bundle id, then pid.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.bundle_id.clone())
            .unwrap_or_else(|| format!("pid {}", self.pid))
    }
}

impl std::fmt::Display for AppInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}
