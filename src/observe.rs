//! Viewport watchers driven by geometry and scroll events.
//!
//! Nothing here touches a real document. Hosts feed element rectangles and scroll offsets
//! in, and get back [`Effect`]s to apply. All watchers can be disconnected; a disconnected
//! watcher ignores every input.

use crate::foundation::{
    core::{MarginEdge, Rect, RootMargin},
    error::{FolioError, FolioResult},
};

/// Class added to an element once the reveal watcher has seen it.
pub const REVEALED_CLASS: &str = "animated";
pub const NAV_INDICATOR_LEFT: &str = "--nav-indicator-left";
pub const NAV_INDICATOR_WIDTH: &str = "--nav-indicator-width";

/// A change the host must apply to its document.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum Effect {
    AddClass { id: String, class: String },
    /// Mark the nav link with this href active and every other link inactive.
    SetActiveLink { href: String },
    SetCssVar { name: String, value: String },
    SetNavStyle(NavStyle),
    /// Smooth-scroll the element into view, aligned to its top.
    ScrollIntoView { id: String },
    ScheduleTimer { timer: TimerId, delay_ms: u64 },
    /// Recompute the background projection for a new surface size.
    ResizeSurface {
        width: f64,
        height: f64,
        pixel_ratio: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum TimerId {
    InitialActiveSection,
}

/// One target's state as reported by an [`IntersectionObserver`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct IntersectionEntry {
    pub target: String,
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Intersection of `target` with `root` grown/shrunk by `margin`.
    pub fn compute(target_id: &str, target: Rect, root: Rect, margin: RootMargin) -> Self {
        let root = margin.apply(root);
        let is_intersecting = target.x0 <= root.x1
            && target.x1 >= root.x0
            && target.y0 <= root.y1
            && target.y1 >= root.y0
            && root.width() >= 0.0
            && root.height() >= 0.0;

        let area = target.area();
        let ratio = if !is_intersecting {
            0.0
        } else if area <= 0.0 {
            1.0
        } else {
            (target.intersect(root).area() / area).clamp(0.0, 1.0)
        };

        Self {
            target: target_id.to_string(),
            ratio,
            is_intersecting,
        }
    }
}

/// Reports a target only when it crosses one of the thresholds, plus once on first sight.
#[derive(Clone, Debug)]
pub struct IntersectionObserver {
    margin: RootMargin,
    thresholds: Vec<f64>, // sorted ascending
    targets: Vec<(String, Option<i32>)>,
    connected: bool,
}

impl IntersectionObserver {
    pub fn new(margin: RootMargin, mut thresholds: Vec<f64>) -> Self {
        thresholds.sort_by(f64::total_cmp);
        Self {
            margin,
            thresholds,
            targets: Vec::new(),
            connected: true,
        }
    }

    pub fn observe(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.connected && !self.targets.iter().any(|(t, _)| *t == id) {
            self.targets.push((id, None));
        }
    }

    pub fn unobserve(&mut self, id: &str) {
        self.targets.retain(|(t, _)| t != id);
    }

    pub fn disconnect(&mut self) {
        self.targets.clear();
        self.connected = false;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Recompute every observed target against `root`. `rect_of` yields the current
    /// bounding box of a target, or `None` when it is not laid out.
    pub fn check(
        &mut self,
        root: Rect,
        rect_of: &dyn Fn(&str) -> Option<Rect>,
    ) -> Vec<IntersectionEntry> {
        let mut out = Vec::new();
        for (id, last) in &mut self.targets {
            let Some(rect) = rect_of(id) else {
                continue;
            };
            let entry = IntersectionEntry::compute(id, rect, root, self.margin);
            let bucket = if entry.is_intersecting {
                self.thresholds.iter().filter(|t| **t <= entry.ratio).count() as i32
            } else {
                -1
            };
            if *last != Some(bucket) {
                *last = Some(bucket);
                out.push(entry);
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RevealOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin {
                bottom: MarginEdge::Px(-50.0),
                ..RootMargin::ZERO
            },
        }
    }
}

impl RevealOptions {
    pub fn validate(&self) -> FolioResult<()> {
        validate_fraction("reveal threshold", self.threshold)
    }
}

/// Adds [`REVEALED_CLASS`] to each observed element the first time enough of it is visible.
#[derive(Clone, Debug)]
pub struct RevealWatcher {
    observer: IntersectionObserver,
    threshold: f64,
    revealed: Vec<String>,
}

impl RevealWatcher {
    pub fn new(opts: &RevealOptions) -> Self {
        Self {
            observer: IntersectionObserver::new(opts.root_margin, vec![opts.threshold]),
            threshold: opts.threshold,
            revealed: Vec::new(),
        }
    }

    pub fn observe_all(&mut self, ids: impl IntoIterator<Item = String>) {
        for id in ids {
            self.observer.observe(id);
        }
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.revealed.iter().any(|r| r == id)
    }

    pub fn disconnect(&mut self) {
        self.observer.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.observer.is_connected()
    }

    pub fn check(&mut self, root: Rect, rect_of: &dyn Fn(&str) -> Option<Rect>) -> Vec<Effect> {
        let entries = self.observer.check(root, rect_of);
        self.apply(&entries)
    }

    /// Apply entries reported by an external observer.
    pub fn apply(&mut self, entries: &[IntersectionEntry]) -> Vec<Effect> {
        if !self.observer.is_connected() {
            return Vec::new();
        }
        let mut effects = Vec::new();
        for entry in entries {
            if !entry.is_intersecting || entry.ratio < self.threshold {
                continue;
            }
            if self.is_revealed(&entry.target) {
                continue;
            }
            self.observer.unobserve(&entry.target);
            self.revealed.push(entry.target.clone());
            effects.push(Effect::AddClass {
                id: entry.target.clone(),
                class: REVEALED_CLASS.to_string(),
            });
        }
        effects
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SectionOptions {
    /// A section must be visible above this ratio to become active.
    pub min_ratio: f64,
    pub root_margin: RootMargin,
    /// Delay of the one-time initial pass after load.
    pub initial_delay_ms: u64,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            min_ratio: 0.25,
            root_margin: RootMargin {
                top: MarginEdge::Px(-80.0),
                bottom: MarginEdge::Percent(-60.0),
                ..RootMargin::ZERO
            },
            initial_delay_ms: 100,
        }
    }
}

impl SectionOptions {
    pub fn validate(&self) -> FolioResult<()> {
        validate_fraction("section min_ratio", self.min_ratio)
    }
}

/// A navigation link and its laid-out position inside the nav bar.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NavLink {
    pub href: String,
    pub offset_left: f64,
    pub width: f64,
}

impl NavLink {
    pub fn section(&self) -> Option<&str> {
        anchor_target(&self.href)
    }
}

/// Tracks the most prominent section and mirrors it into the nav bar.
#[derive(Clone, Debug)]
pub struct ActiveSectionWatcher {
    observer: IntersectionObserver,
    min_ratio: f64,
    links: Vec<NavLink>,
    active: Option<String>,
    initial_pass_done: bool,
}

impl ActiveSectionWatcher {
    /// Observes the section behind every `#fragment` link.
    pub fn new(opts: &SectionOptions, links: Vec<NavLink>) -> Self {
        let mut observer = IntersectionObserver::new(opts.root_margin, vec![opts.min_ratio]);
        for link in &links {
            if let Some(section) = link.section() {
                observer.observe(section);
            }
        }
        Self {
            observer,
            min_ratio: opts.min_ratio,
            links,
            active: None,
            initial_pass_done: false,
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn disconnect(&mut self) {
        self.observer.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.observer.is_connected()
    }

    pub fn check(&mut self, root: Rect, rect_of: &dyn Fn(&str) -> Option<Rect>) -> Vec<Effect> {
        let entries = self.observer.check(root, rect_of);
        self.apply(&entries)
    }

    pub fn apply(&mut self, entries: &[IntersectionEntry]) -> Vec<Effect> {
        if !self.observer.is_connected() {
            return Vec::new();
        }
        let mut effects = Vec::new();
        for entry in entries {
            if entry.is_intersecting && entry.ratio > self.min_ratio {
                effects.extend(self.activate(&entry.target));
            }
        }
        effects
    }

    /// One-time pass covering the time before the first intersection report: the first
    /// section whose top edge lies in the upper half of the viewport becomes active.
    pub fn initial_pass(
        &mut self,
        section_tops: &[(String, f64)],
        viewport_height: f64,
    ) -> Vec<Effect> {
        if self.initial_pass_done || !self.observer.is_connected() {
            return Vec::new();
        }
        self.initial_pass_done = true;
        let half = viewport_height / 2.0;
        match section_tops
            .iter()
            .find(|(_, top)| *top >= 0.0 && *top < half)
        {
            Some((section, _)) => self.activate(section),
            None => Vec::new(),
        }
    }

    fn activate(&mut self, section: &str) -> Vec<Effect> {
        if self.active.as_deref() == Some(section) {
            return Vec::new();
        }
        let Some(link) = self.links.iter().find(|l| l.section() == Some(section)) else {
            return Vec::new();
        };
        self.active = Some(section.to_string());
        vec![
            Effect::SetActiveLink {
                href: link.href.clone(),
            },
            Effect::SetCssVar {
                name: NAV_INDICATOR_LEFT.to_string(),
                value: format!("{}px", link.offset_left),
            },
            Effect::SetCssVar {
                name: NAV_INDICATOR_WIDTH.to_string(),
                value: format!("{}px", link.width),
            },
        ]
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NavOptions {
    /// Scroll offset in px past which the nav bar switches to its solid style.
    pub scroll_threshold: f64,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self {
            scroll_threshold: 100.0,
        }
    }
}

impl NavOptions {
    pub fn validate(&self) -> FolioResult<()> {
        if !(self.scroll_threshold >= 0.0 && self.scroll_threshold.is_finite()) {
            return Err(FolioError::validation("nav scroll_threshold must be >= 0"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct NavStyle {
    pub background: &'static str,
    pub box_shadow: &'static str,
}

impl NavStyle {
    pub const TOP: Self = Self {
        background: "rgba(10, 14, 39, 0.7)",
        box_shadow: "none",
    };
    pub const SCROLLED: Self = Self {
        background: "rgba(10, 14, 39, 0.95)",
        box_shadow: "0 4px 20px rgba(0, 0, 0, 0.3)",
    };
}

/// Two-state nav bar style; no hysteresis around the threshold.
#[derive(Clone, Debug)]
pub struct NavScroll {
    threshold: f64,
    scrolled: Option<bool>,
    connected: bool,
}

impl NavScroll {
    pub fn new(opts: &NavOptions) -> Self {
        Self {
            threshold: opts.scroll_threshold,
            scrolled: None,
            connected: true,
        }
    }

    /// Style to apply after scrolling to `y`, only when it differs from the current one.
    pub fn on_scroll(&mut self, y: f64) -> Option<Effect> {
        if !self.connected {
            return None;
        }
        let scrolled = y > self.threshold;
        if self.scrolled == Some(scrolled) {
            return None;
        }
        self.scrolled = Some(scrolled);
        Some(Effect::SetNavStyle(if scrolled {
            NavStyle::SCROLLED
        } else {
            NavStyle::TOP
        }))
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

/// Section id a same-page link points at (`"#about"` → `"about"`).
pub fn anchor_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|s| !s.is_empty())
}

fn validate_fraction(what: &str, v: f64) -> FolioResult<()> {
    if !(0.0..=1.0).contains(&v) {
        return Err(FolioError::validation(format!("{what} must be in [0, 1]")));
    }
    Ok(())
}
