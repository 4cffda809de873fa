use crate::scrapers::scripts;
use anyhow::Result;
use serde_json::Value;
use std::thread;
use std::time::Duration;

/// How long `navigate` waits before handing the page back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavWait {
    /// Load event plus a quiet period for late XHRs
    NetworkIdle,
    DomContentLoaded,
    Load,
    /// Return as soon as navigation was issued
    None,
}

impl NavWait {
    pub fn label(&self) -> &'static str {
        match self {
            NavWait::NetworkIdle => "networkidle",
            NavWait::DomContentLoaded => "domcontentloaded",
            NavWait::Load => "load",
            NavWait::None => "none",
        }
    }
}

/// Everything the harvesters need from a live browser page.
///
/// The harvesters only talk to this trait, so a scripted fake can stand
/// in for Chrome in tests. Methods with a default body are expressed as
/// small scripts run through `eval`.
pub trait PageDriver {
    fn navigate(&self, url: &str, wait: NavWait, timeout: Duration) -> Result<()>;

    fn current_url(&self) -> Result<String>;

    /// Serialized DOM of the whole document
    fn html(&self) -> Result<String>;

    fn eval(&self, script: &str) -> Result<Value>;

    fn press_key(&self, key: &str) -> Result<()>;

    /// Replace the content of an input with `text`
    fn fill(&self, selector: &str, text: &str) -> Result<()>;

    /// Wait until `selector` matches; `Ok(false)` on timeout
    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool>;

    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }

    fn count(&self, selector: &str) -> Result<usize> {
        let value = self.eval(&scripts::count(selector))?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    fn click_first(&self, selector: &str) -> Result<bool> {
        let value = self.eval(&scripts::click_first(selector))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn click_with_text(&self, selector: &str, text: &str) -> Result<bool> {
        let value = self.eval(&scripts::click_with_text(selector, text))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn hover_nth(&self, selector: &str, index: usize) -> Result<bool> {
        let value = self.eval(&scripts::hover_nth(selector, index))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Index of the first selector in `selectors` that matches anything
    fn first_present(&self, selectors: &[&str]) -> Result<Option<usize>> {
        let value = self.eval(&scripts::first_present(selectors))?;
        Ok(value
            .as_i64()
            .filter(|idx| *idx >= 0)
            .map(|idx| idx as usize))
    }
}
