//! Scroll-until-nothing-new loop shared by the listing, review and image
//! harvesters.
//!
//! A [`RevealPlan`] is a table of interactions: `steps` are cycled through
//! while the count keeps moving, `escalations` are tried one at a time once
//! the count has stalled. Any progress sends the next stall back to the
//! first escalation; stalling with the table used up ends the loop.

use crate::scrapers::scripts::{self, Container};
use crate::scrapers::traits::PageDriver;
use anyhow::Result;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One scripted way of nudging the page into loading more content
#[derive(Debug, Clone, Copy)]
pub enum Interaction {
    /// Wheel event plus scroll on the container; `jitter` widens the delta randomly
    Wheel { delta: i64, jitter: (i64, i64) },
    /// Press each key in `keys` in turn, `times` rounds
    Keys {
        keys: &'static [&'static str],
        times: usize,
        gap_ms: u64,
    },
    ContainerToBottom,
    ContainerBy(i64),
    ContainerByViewport,
    WindowBy(i64),
    WindowToBottom,
    /// Click the first selector in the list that matches anything
    ClickFirst(&'static [&'static str]),
    HoverFirst(&'static str),
    /// Hover each of the first `limit` matches and wheel a growing distance after each
    HoverAndWheel {
        selector: &'static str,
        limit: usize,
        base: i64,
        step: i64,
    },
    /// `times` wheel steps of `start + i * step`; with `watch` set the burst
    /// ends early once that selector matches more elements than before
    WheelBurst {
        start: i64,
        step: i64,
        times: usize,
        gap_ms: u64,
        watch: Option<&'static str>,
    },
    Wait(u64),
    Sequence(&'static [Step]),
}

/// An interaction followed by a settle pause
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub action: Interaction,
    pub settle_ms: u64,
}

impl Step {
    pub const fn new(action: Interaction, settle_ms: u64) -> Self {
        Self { action, settle_ms }
    }
}

impl Interaction {
    /// Run against `container` (the scrollable element, or the document when `None`)
    pub fn apply<P: PageDriver + ?Sized>(&self, page: &P, container: Option<Container>) -> Result<()> {
        match *self {
            Interaction::Wheel { delta, jitter } => {
                let delta = if jitter.0 < jitter.1 {
                    delta + rand::thread_rng().gen_range(jitter.0..=jitter.1)
                } else {
                    delta
                };
                page.eval(&scripts::wheel(container, delta))?;
            }
            Interaction::Keys { keys, times, gap_ms } => {
                for _ in 0..times {
                    for key in keys {
                        page.press_key(key)?;
                        page.pause(Duration::from_millis(gap_ms));
                    }
                }
            }
            Interaction::ContainerToBottom => {
                page.eval(&scripts::scroll_to_bottom(container))?;
            }
            Interaction::ContainerBy(delta) => {
                page.eval(&scripts::scroll_by(container, delta))?;
            }
            Interaction::ContainerByViewport => {
                page.eval(&scripts::scroll_by_viewport(container))?;
            }
            Interaction::WindowBy(delta) => {
                page.eval(&scripts::window_scroll_by(delta))?;
            }
            Interaction::WindowToBottom => {
                page.eval(scripts::WINDOW_TO_BOTTOM)?;
            }
            Interaction::ClickFirst(selectors) => {
                if let Some(idx) = page.first_present(selectors)? {
                    debug!("Clicking {}", selectors[idx]);
                    page.click_first(selectors[idx])?;
                }
            }
            Interaction::HoverFirst(selector) => {
                page.hover_nth(selector, 0)?;
            }
            Interaction::HoverAndWheel {
                selector,
                limit,
                base,
                step,
            } => {
                let visible = page.count(selector)?.min(limit);
                for i in 0..visible {
                    if !page.hover_nth(selector, i).unwrap_or(false) {
                        continue;
                    }
                    page.pause(Duration::from_millis(500));
                    page.eval(&scripts::wheel(container, base + step * i as i64))?;
                    page.pause(Duration::from_millis(1200));
                }
            }
            Interaction::WheelBurst {
                start,
                step,
                times,
                gap_ms,
                watch,
            } => {
                let before = match watch {
                    Some(sel) => page.count(sel)?,
                    None => 0,
                };
                for i in 0..times {
                    page.eval(&scripts::wheel(container, start + step * i as i64))?;
                    page.pause(Duration::from_millis(gap_ms));
                    if let Some(sel) = watch {
                        let now = page.count(sel)?;
                        if now > before {
                            info!("Mid-scroll progress detected: {} elements", now);
                            break;
                        }
                    }
                }
            }
            Interaction::Wait(ms) => page.pause(Duration::from_millis(ms)),
            Interaction::Sequence(steps) => {
                for step in steps {
                    step.run(page, container)?;
                }
            }
        }
        Ok(())
    }
}

impl Step {
    pub fn run<P: PageDriver + ?Sized>(&self, page: &P, container: Option<Container>) -> Result<()> {
        self.action.apply(page, container)?;
        if self.settle_ms > 0 {
            page.pause(Duration::from_millis(self.settle_ms));
        }
        Ok(())
    }
}

/// Stop after `rounds` polls without a new high, but only once more than `min_count` are visible
#[derive(Debug, Clone, Copy)]
pub struct Plateau {
    pub rounds: usize,
    pub min_count: usize,
}

/// Declarative description of one reveal loop
#[derive(Debug, Clone)]
pub struct RevealPlan {
    pub container: Option<Container>,
    pub steps: &'static [Step],
    pub steps_per_round: usize,
    pub escalations: &'static [Step],
    /// Unchanged polls in a row before escalating (or giving up)
    pub stale_limit: usize,
    pub max_rounds: usize,
    /// Stop as soon as the count goes past this
    pub cap: Option<usize>,
    /// Rounds at the start in which an empty page only waits
    pub empty_grace: usize,
    pub empty_wait_ms: u64,
    pub plateau: Option<Plateau>,
    /// Fallback interaction when a step fails
    pub on_error: Option<Step>,
}

impl Default for RevealPlan {
    fn default() -> Self {
        Self {
            container: None,
            steps: &[],
            steps_per_round: 1,
            escalations: &[],
            stale_limit: 3,
            max_rounds: 30,
            cap: None,
            empty_grace: 0,
            empty_wait_ms: 5000,
            plateau: None,
            on_error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Nothing new after every escalation
    Exhausted,
    CapReached,
    Plateau,
    RoundLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealReport {
    pub rounds: usize,
    pub count: usize,
    pub escalations_used: usize,
    pub reason: StopReason,
}

/// Drive `plan` until the count returned by `poll` stops growing.
///
/// `poll` is called at the top of every round; for listing pages it counts
/// visible links, for harvesters it returns the number of unique records
/// collected so far. A failing poll is logged and counts as an unchanged
/// round.
pub fn reveal<P, F>(page: &P, plan: &RevealPlan, mut poll: F) -> RevealReport
where
    P: PageDriver + ?Sized,
    F: FnMut(&P) -> Result<usize>,
{
    let mut last = 0usize;
    let mut highest = 0usize;
    let mut since_highest = 0usize;
    let mut stale = 0usize;
    let mut escalation = 0usize;
    let mut used = 0usize;
    let mut cursor = 0usize;

    let report = |rounds, count, escalations_used, reason| RevealReport {
        rounds,
        count,
        escalations_used,
        reason,
    };

    for round in 1..=plan.max_rounds {
        let count = match poll(page) {
            Ok(count) => count,
            Err(e) => {
                warn!("Round {}: count failed: {:#}", round, e);
                last
            }
        };
        debug!("Round {}: {} found", round, count);

        if let Some(cap) = plan.cap {
            if count > cap {
                info!("Collected {}, past the cap of {}", count, cap);
                return report(round, count, used, StopReason::CapReached);
            }
        }

        if count == 0 && round <= plan.empty_grace {
            debug!("Nothing loaded yet, waiting longer...");
            page.pause(Duration::from_millis(plan.empty_wait_ms));
            continue;
        }

        if count > highest {
            highest = count;
            since_highest = 0;
        } else {
            since_highest += 1;
        }

        if count == last {
            stale += 1;
            debug!("No new results (consecutive: {})", stale);
        } else {
            stale = 0;
            escalation = 0;
        }
        last = count;

        if stale >= plan.stale_limit {
            match plan.escalations.get(escalation) {
                Some(step) => {
                    info!("Stalled at {}, trying escalation {}", count, escalation + 1);
                    run_step(page, plan, step);
                    escalation += 1;
                    used += 1;
                    stale = 0;
                }
                None => {
                    info!("No new results after {} rounds - done at {}", plan.stale_limit, count);
                    return report(round, count, used, StopReason::Exhausted);
                }
            }
        } else if !plan.steps.is_empty() {
            for _ in 0..plan.steps_per_round.max(1) {
                let step = &plan.steps[cursor % plan.steps.len()];
                run_step(page, plan, step);
                cursor += 1;
            }
        }

        if let Some(plateau) = plan.plateau {
            if since_highest >= plateau.rounds && count > plateau.min_count {
                info!(
                    "Stopping: no new high for {} rounds (highest {})",
                    since_highest, highest
                );
                return report(round, count, used, StopReason::Plateau);
            }
        }
    }

    let count = poll(page).unwrap_or(last);
    report(plan.max_rounds, count, used, StopReason::RoundLimit)
}

fn run_step<P: PageDriver + ?Sized>(page: &P, plan: &RevealPlan, step: &Step) {
    if let Err(e) = step.run(page, plan.container) {
        warn!("Interaction {:?} failed: {:#}", step.action, e);
        if let Some(fallback) = &plan.on_error {
            if let Err(e) = fallback.run(page, plan.container) {
                debug!("Fallback interaction failed too: {:#}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::testing::FakePage;
    use std::cell::Cell;

    static SCROLL: &[Step] = &[Step::new(Interaction::ContainerToBottom, 100)];
    static KEYS: &[Step] = &[Step::new(
        Interaction::Keys {
            keys: &["End", "PageDown"],
            times: 2,
            gap_ms: 10,
        },
        0,
    )];

    fn plan() -> RevealPlan {
        RevealPlan {
            container: Some(Container::new("div.feed")),
            steps: SCROLL,
            stale_limit: 2,
            max_rounds: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_stops_after_stale_streak() {
        let page = FakePage::new();
        let counts = [3, 6, 9, 9, 9, 9, 9];
        let i = Cell::new(0);
        let report = reveal(&page, &plan(), |_| {
            let c = counts[i.get().min(counts.len() - 1)];
            i.set(i.get() + 1);
            Ok(c)
        });

        assert_eq!(report.reason, StopReason::Exhausted);
        assert_eq!(report.count, 9);
        assert_eq!(report.rounds, 5);
        assert_eq!(page.scripts_matching("scrollHeight"), 4);
    }

    #[test]
    fn test_escalations_run_before_giving_up() {
        let page = FakePage::new();
        let plan = RevealPlan {
            escalations: KEYS,
            ..plan()
        };
        let report = reveal(&page, &plan, |_| Ok(4));

        assert_eq!(report.reason, StopReason::Exhausted);
        assert_eq!(report.escalations_used, 1);
        assert_eq!(page.keys(), vec!["End", "PageDown", "End", "PageDown"]);
    }

    #[test]
    fn test_cap_stops_once_exceeded() {
        let page = FakePage::new();
        let plan = RevealPlan {
            cap: Some(12),
            ..plan()
        };
        let n = Cell::new(0);
        let report = reveal(&page, &plan, |_| {
            n.set(n.get() + 4);
            Ok(n.get())
        });

        assert_eq!(report.reason, StopReason::CapReached);
        assert_eq!(report.count, 16);
        assert_eq!(report.rounds, 4);
    }

    #[test]
    fn test_round_limit_polls_once_more() {
        let page = FakePage::new();
        let plan = RevealPlan {
            max_rounds: 3,
            ..plan()
        };
        let n = Cell::new(0);
        let report = reveal(&page, &plan, |_| {
            n.set(n.get() + 1);
            Ok(n.get())
        });

        assert_eq!(report.reason, StopReason::RoundLimit);
        assert_eq!(report.count, 4);
    }

    #[test]
    fn test_empty_grace_only_waits() {
        let page = FakePage::new();
        let plan = RevealPlan {
            empty_grace: 2,
            empty_wait_ms: 5000,
            ..plan()
        };
        let counts = [0, 0, 5, 5, 5];
        let i = Cell::new(0);
        let report = reveal(&page, &plan, |_| {
            let c = counts[i.get().min(counts.len() - 1)];
            i.set(i.get() + 1);
            Ok(c)
        });

        assert_eq!(report.count, 5);
        assert!(page.paused_ms_total() >= 10_000);
        assert_eq!(report.reason, StopReason::Exhausted);
    }

    #[test]
    fn test_plateau_requires_minimum() {
        let page = FakePage::new();
        let plan = RevealPlan {
            stale_limit: 100,
            plateau: Some(Plateau {
                rounds: 3,
                min_count: 10,
            }),
            ..plan()
        };
        let report = reveal(&page, &plan, |_| Ok(12));
        assert_eq!(report.reason, StopReason::Plateau);
        assert_eq!(report.rounds, 4);

        let report = reveal(&page, &RevealPlan { max_rounds: 6, ..plan }, |_| Ok(8));
        assert_eq!(report.reason, StopReason::RoundLimit);
    }

    #[test]
    fn test_failing_poll_counts_as_stale() {
        let page = FakePage::new();
        let calls = Cell::new(0);
        let report = reveal(&page, &plan(), |_| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Ok(2)
            } else {
                Err(anyhow::anyhow!("detached"))
            }
        });
        assert_eq!(report.reason, StopReason::Exhausted);
        assert_eq!(report.count, 2);
    }

    #[test]
    fn test_burst_stops_on_progress() {
        let page = FakePage::new();
        page.set_count_sequence("a.place", &[3, 3, 5]);
        let burst = Interaction::WheelBurst {
            start: 3000,
            step: 500,
            times: 10,
            gap_ms: 0,
            watch: Some("a.place"),
        };
        burst.apply(&page, None).unwrap();
        assert_eq!(page.scripts_matching("WheelEvent"), 2);
    }
}
