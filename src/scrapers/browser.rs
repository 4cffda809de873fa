use crate::config::BrowserConfig;
use crate::scrapers::scripts;
use crate::scrapers::traits::{NavWait, PageDriver};
use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const IDLE_QUIET_PERIOD: Duration = Duration::from_millis(1500);

/// A single Chrome tab reused for every navigation of a run
pub struct ChromePage {
    // Dropping the browser kills the Chrome process, so it lives as long as the tab.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromePage {
    /// Launch Chrome and open the tab all work happens in
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        info!(headless = config.headless, "Launching Chrome...");

        let proxy_server = config.proxy.as_ref().map(|p| p.server());
        let args: Vec<&OsStr> = [
            "--disable-blink-features=AutomationControlled",
            "--disable-dev-shm-usage",
            "--no-first-run",
            "--no-default-browser-check",
            "--disable-extensions",
        ]
        .iter()
        .map(|arg| OsStr::new(*arg))
        .collect();

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some(config.window_size))
            .proxy_server(proxy_server.as_deref())
            .ignore_certificate_errors(true)
            .idle_browser_timeout(Duration::from_secs(900))
            .args(args)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        if let Some(proxy) = config.proxy.as_ref().filter(|p| p.has_credentials()) {
            debug!("Answering proxy auth challenges for {}", proxy.server());
            tab.enable_fetch(None, Some(true))
                .context("Failed to enable request interception for proxy auth")?;
            tab.authenticate(proxy.username.clone(), proxy.password.clone())
                .context("Failed to register proxy credentials")?;
        }

        if let Some(agent) = &config.user_agent {
            tab.set_user_agent(agent, Some("en-US,en;q=0.9"), None)
                .context("Failed to set user agent")?;
        }

        if !config.extra_headers.is_empty() {
            let headers: HashMap<&str, &str> = config
                .extra_headers
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            tab.set_extra_http_headers(headers)
                .context("Failed to set extra HTTP headers")?;
        }

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    fn wait_ready_state(&self, done: impl Fn(&str) -> bool, deadline: Instant) -> Result<()> {
        loop {
            let state = self
                .tab
                .evaluate(scripts::READY_STATE, false)
                .ok()
                .and_then(|r| r.value)
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();

            if done(&state) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(anyhow!("Timed out waiting for document (state '{}')", state));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl PageDriver for ChromePage {
    fn navigate(&self, url: &str, wait: NavWait, timeout: Duration) -> Result<()> {
        debug!("Navigating to {} (wait: {})", url, wait.label());
        let deadline = Instant::now() + timeout;

        self.tab.set_default_timeout(timeout);
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Navigation to {} failed", url))?;

        match wait {
            NavWait::None => {}
            NavWait::DomContentLoaded => {
                self.wait_ready_state(|s| s == "interactive" || s == "complete", deadline)?;
            }
            NavWait::Load => {
                self.tab
                    .wait_until_navigated()
                    .with_context(|| format!("Page load failed for {}", url))?;
            }
            NavWait::NetworkIdle => {
                self.tab
                    .wait_until_navigated()
                    .with_context(|| format!("Page load failed for {}", url))?;
                self.wait_ready_state(|s| s == "complete", deadline)?;
                thread::sleep(IDLE_QUIET_PERIOD);
            }
        }

        Ok(())
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    fn html(&self) -> Result<String> {
        self.tab.get_content().context("Failed to read page HTML")
    }

    fn eval(&self, script: &str) -> Result<Value> {
        let result = self
            .tab
            .evaluate(script, false)
            .context("Script evaluation failed")?;
        Ok(result.value.unwrap_or(Value::Null))
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.tab
            .press_key(key)
            .with_context(|| format!("Failed to press {}", key))?;
        Ok(())
    }

    fn fill(&self, selector: &str, text: &str) -> Result<()> {
        let focused = self.eval(&scripts::clear_and_focus(selector))?;
        if !focused.as_bool().unwrap_or(false) {
            return Err(anyhow!("Input {} not found", selector));
        }
        self.tab
            .type_str(text)
            .with_context(|| format!("Failed to type into {}", selector))?;
        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool> {
        match self.tab.wait_for_element_with_custom_timeout(selector, timeout) {
            Ok(_) => Ok(true),
            Err(e) => {
                debug!("{} did not appear within {:?}: {}", selector, timeout, e);
                Ok(false)
            }
        }
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(true) {
            warn!("Failed to close tab cleanly: {}", e);
        }
    }
}
