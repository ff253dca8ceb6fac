//! Caller classification.
//!
//! A caller is a `BrowserViewer` when its `User-Agent` looks like a browser
//! and does not name a known subscription tool. Everything else, including
//! an absent identity, is a `ToolClient`. This is a heuristic.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static BROWSER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mozilla|chrome|safari|edge|opera").expect("browser pattern is valid")
});

static TOOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)clash|shadowrocket|quantumult|stash|surge|v2ray|sing-box")
        .expect("tool pattern is valid")
});

/// Who is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerClass {
    /// Subscription client; gets the raw resource.
    ToolClient,
    /// Interactive browser; gets the preview page unless `raw=true`.
    BrowserViewer,
}

impl CallerClass {
    pub fn classify(identity: &str) -> Self {
        if BROWSER_PATTERN.is_match(identity) && !TOOL_PATTERN.is_match(identity) {
            CallerClass::BrowserViewer
        } else {
            CallerClass::ToolClient
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallerClass::ToolClient => "tool",
            CallerClass::BrowserViewer => "browser",
        }
    }
}

impl fmt::Display for CallerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a viewer wants to preview. Only picks the spoofed identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatSelection {
    #[default]
    Clash,
    SingBox,
    Base64,
    Default,
}

impl FormatSelection {
    /// Read the `format` parameter; absent or unknown values select `Clash`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("singbox") | Some("sing-box") => FormatSelection::SingBox,
            Some("base64") => FormatSelection::Base64,
            Some("default") => FormatSelection::Default,
            _ => FormatSelection::Clash,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormatSelection::Clash => "clash",
            FormatSelection::SingBox => "singbox",
            FormatSelection::Base64 => "base64",
            FormatSelection::Default => "default",
        }
    }
}

impl fmt::Display for FormatSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
