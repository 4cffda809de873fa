//! Scripted stand-in for a browser page.

use crate::scrapers::traits::{NavWait, PageDriver};
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

#[derive(Default)]
pub struct FakePage {
    url: RefCell<String>,
    html: RefCell<VecDeque<String>>,
    counts: RefCell<HashMap<String, VecDeque<usize>>>,
    present: RefCell<HashSet<String>>,
    text_buttons: RefCell<HashSet<String>>,
    failing_urls: RefCell<HashSet<String>>,
    fail_waits: RefCell<HashSet<&'static str>>,
    scripts: RefCell<Vec<String>>,
    answers: RefCell<Vec<(String, Value)>>,
    failing_scripts: RefCell<Vec<String>>,
    keys: RefCell<Vec<String>>,
    clicks: RefCell<Vec<String>>,
    navigations: RefCell<Vec<(String, NavWait)>>,
    fills: RefCell<Vec<(String, String)>>,
    paused: Cell<u64>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// HTML snapshots returned by successive `html()` calls; the last one repeats
    pub fn push_html(&self, html: impl Into<String>) {
        self.html.borrow_mut().push_back(html.into());
    }

    /// Values returned by successive `count(selector)` calls; the last one repeats
    pub fn set_count_sequence(&self, selector: &str, counts: &[usize]) {
        self.counts
            .borrow_mut()
            .insert(selector.to_string(), counts.iter().copied().collect());
    }

    /// Make `selector` match for `wait_for`, `click_first` and `first_present`
    pub fn add_present(&self, selector: &str) {
        self.present.borrow_mut().insert(selector.to_string());
    }

    /// Make `click_with_text(_, text)` succeed
    pub fn add_text_button(&self, text: &str) {
        self.text_buttons.borrow_mut().insert(text.to_lowercase());
    }

    /// `eval` returns `value` for scripts containing `needle`; otherwise null
    pub fn answer_script(&self, needle: &str, value: Value) {
        self.answers
            .borrow_mut()
            .push((needle.to_string(), value));
    }

    /// `eval` errors for scripts containing `needle`
    pub fn fail_script(&self, needle: &str) {
        self.failing_scripts.borrow_mut().push(needle.to_string());
    }

    pub fn fail_navigation(&self, url: &str) {
        self.failing_urls.borrow_mut().insert(url.to_string());
    }

    pub fn fail_wait(&self, wait: NavWait) {
        self.fail_waits.borrow_mut().insert(wait.label());
    }

    pub fn scripts_matching(&self, needle: &str) -> usize {
        self.scripts
            .borrow()
            .iter()
            .filter(|s| s.contains(needle))
            .count()
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.borrow().clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.borrow().clone()
    }

    pub fn navigations(&self) -> Vec<(String, NavWait)> {
        self.navigations.borrow().clone()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.fills.borrow().clone()
    }

    pub fn paused_ms_total(&self) -> u64 {
        self.paused.get()
    }
}

impl PageDriver for FakePage {
    fn navigate(&self, url: &str, wait: NavWait, _timeout: Duration) -> Result<()> {
        self.navigations
            .borrow_mut()
            .push((url.to_string(), wait));
        if self.failing_urls.borrow().contains(url) || self.fail_waits.borrow().contains(wait.label()) {
            return Err(anyhow!("net::ERR_CONNECTION_REFUSED at {}", url));
        }
        *self.url.borrow_mut() = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.url.borrow().clone())
    }

    fn html(&self) -> Result<String> {
        let mut html = self.html.borrow_mut();
        if html.len() > 1 {
            return html.pop_front().ok_or_else(|| anyhow!("no html"));
        }
        html.front().cloned().ok_or_else(|| anyhow!("no html"))
    }

    fn eval(&self, script: &str) -> Result<Value> {
        self.scripts.borrow_mut().push(script.to_string());
        if self
            .failing_scripts
            .borrow()
            .iter()
            .any(|needle| script.contains(needle.as_str()))
        {
            return Err(anyhow!("script threw: {}", script));
        }
        let answer = self
            .answers
            .borrow()
            .iter()
            .find(|(needle, _)| script.contains(needle.as_str()))
            .map(|(_, value)| value.clone());
        Ok(answer.unwrap_or(Value::Null))
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.keys.borrow_mut().push(key.to_string());
        Ok(())
    }

    fn fill(&self, selector: &str, text: &str) -> Result<()> {
        self.fills
            .borrow_mut()
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(self.present.borrow().contains(selector))
    }

    fn pause(&self, duration: Duration) {
        self.paused
            .set(self.paused.get() + duration.as_millis() as u64);
    }

    fn count(&self, selector: &str) -> Result<usize> {
        let mut counts = self.counts.borrow_mut();
        match counts.get_mut(selector) {
            Some(seq) if seq.len() > 1 => Ok(seq.pop_front().unwrap_or(0)),
            Some(seq) => Ok(seq.front().copied().unwrap_or(0)),
            None => Ok(usize::from(self.present.borrow().contains(selector))),
        }
    }

    fn click_first(&self, selector: &str) -> Result<bool> {
        let hit = self.present.borrow().contains(selector);
        if hit {
            self.clicks.borrow_mut().push(selector.to_string());
        }
        Ok(hit)
    }

    fn click_with_text(&self, selector: &str, text: &str) -> Result<bool> {
        let hit = self.text_buttons.borrow().contains(&text.to_lowercase());
        if hit {
            self.clicks.borrow_mut().push(format!("{} >> {}", selector, text));
        }
        Ok(hit)
    }

    fn hover_nth(&self, _selector: &str, _index: usize) -> Result<bool> {
        Ok(true)
    }

    fn first_present(&self, selectors: &[&str]) -> Result<Option<usize>> {
        let present = self.present.borrow();
        Ok(selectors.iter().position(|s| present.contains(*s)))
    }
}
