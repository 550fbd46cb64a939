//! One page load, start to finish.
//!
//! A [`Session`] owns the view model, the rendered page, the watchers and the background
//! scene. The host pushes [`HostEvent`]s in one at a time and applies the returned
//! [`Effect`]s. [`Session::unload`] tears everything down.

use std::path::Path;

use crate::{
    background::Scene,
    config::SiteConfig,
    foundation::{
        core::{Point, Rect, Viewport},
        error::{FolioError, FolioResult},
    },
    observe::{
        ActiveSectionWatcher, Effect, IntersectionEntry, NavLink, NavScroll, RevealWatcher,
        TimerId, anchor_target,
    },
    page::Page,
    render::{RenderContext, Renderer},
    resume::load_resume,
    transform::{TransformReport, transform},
    view::Portfolio,
};

/// Input from the host environment.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    Scroll { y: f64 },
    /// Pointer position in client pixels.
    PointerMove { x: f64, y: f64 },
    Resize {
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
    },
    /// Current bounding boxes of laid-out elements, in viewport coordinates.
    Layout { rects: Vec<(String, Rect)> },
    /// Entries from a host-side reveal observer.
    RevealEntries(Vec<IntersectionEntry>),
    /// Entries from a host-side section observer.
    SectionEntries(Vec<IntersectionEntry>),
    /// A timer scheduled through [`Effect::ScheduleTimer`] fired. `section_tops` holds each
    /// section's top edge relative to the viewport.
    Timer {
        timer: TimerId,
        section_tops: Vec<(String, f64)>,
    },
    /// The display is ready for the next background frame.
    Frame,
    Click { href: String },
}

/// What [`Session::unload`] released.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Teardown {
    pub revealed: usize,
    pub active_section: Option<String>,
    pub frames: u64,
}

pub struct Session {
    view: Portfolio,
    page: Page,
    reveal: RevealWatcher,
    sections: ActiveSectionWatcher,
    nav: NavScroll,
    scene: Scene,
    viewport: Viewport,
    initial_delay_ms: u64,
}

impl Session {
    /// Render `view` into `page` and start every watcher. The returned effects size the
    /// background surface and schedule the initial active-section pass.
    #[tracing::instrument(skip_all)]
    pub fn mount(
        view: Portfolio,
        mut page: Page,
        ctx: RenderContext,
        config: &SiteConfig,
        nav_links: Vec<NavLink>,
        viewport: Viewport,
    ) -> FolioResult<(Self, Vec<Effect>)> {
        config.validate()?;
        Renderer::new(ctx).render(&view, &mut page)?;

        let mut reveal = RevealWatcher::new(&config.reveal);
        let targets = page.reveal_targets();
        tracing::debug!(targets = targets.len(), "observing reveal targets");
        reveal.observe_all(targets);

        let scene = Scene::new(&config.background, viewport)?;
        let effects = vec![
            resize_effect(viewport),
            Effect::ScheduleTimer {
                timer: TimerId::InitialActiveSection,
                delay_ms: config.sections.initial_delay_ms,
            },
        ];

        let session = Self {
            view,
            page,
            reveal,
            sections: ActiveSectionWatcher::new(&config.sections, nav_links),
            nav: NavScroll::new(&config.nav),
            scene,
            viewport,
            initial_delay_ms: config.sections.initial_delay_ms,
        };
        Ok((session, effects))
    }

    pub fn view(&self) -> &Portfolio {
        &self.view
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn active_section(&self) -> Option<&str> {
        self.sections.active()
    }

    pub fn initial_delay_ms(&self) -> u64 {
        self.initial_delay_ms
    }

    /// Process one host event. Class changes are mirrored into the owned page as well as
    /// returned.
    pub fn handle(&mut self, event: HostEvent) -> Vec<Effect> {
        let effects = match event {
            HostEvent::Scroll { y } => {
                self.scene.set_scroll(y);
                self.nav.on_scroll(y).into_iter().collect()
            }
            HostEvent::PointerMove { x, y } => {
                let p = self.viewport.normalize_pointer(Point::new(x, y));
                self.scene.set_pointer(p);
                Vec::new()
            }
            HostEvent::Resize {
                width,
                height,
                device_pixel_ratio,
            } => match Viewport::new(width, height, device_pixel_ratio) {
                Ok(viewport) => {
                    self.viewport = viewport;
                    self.scene.resize(viewport);
                    vec![resize_effect(viewport)]
                }
                Err(err) => {
                    tracing::warn!(%err, "ignoring resize");
                    Vec::new()
                }
            },
            HostEvent::Layout { rects } => {
                let rect_of = |id: &str| rects.iter().find(|(r, _)| r == id).map(|(_, b)| *b);
                let root = self.viewport.rect();
                let mut effects = self.reveal.check(root, &rect_of);
                effects.extend(self.sections.check(root, &rect_of));
                effects
            }
            HostEvent::RevealEntries(entries) => self.reveal.apply(&entries),
            HostEvent::SectionEntries(entries) => self.sections.apply(&entries),
            HostEvent::Timer {
                timer: TimerId::InitialActiveSection,
                section_tops,
            } => self
                .sections
                .initial_pass(&section_tops, self.viewport.height),
            HostEvent::Frame => {
                self.scene.advance();
                Vec::new()
            }
            HostEvent::Click { href } => match anchor_target(&href) {
                Some(id) => vec![Effect::ScrollIntoView { id: id.to_string() }],
                None => Vec::new(),
            },
        };

        for effect in &effects {
            if let Effect::AddClass { id, class } = effect
                && let Some(el) = self.page.element_mut(id)
            {
                el.add_class(class);
            }
        }
        effects
    }

    /// Disconnect both watchers and stop the frame loop.
    #[tracing::instrument(skip_all)]
    pub fn unload(mut self) -> Teardown {
        self.reveal.disconnect();
        self.sections.disconnect();
        self.nav.disconnect();
        self.scene.stop();
        let teardown = Teardown {
            revealed: self
                .page
                .reveal_targets()
                .iter()
                .filter(|id| self.reveal.is_revealed(id))
                .count(),
            active_section: self.sections.active().map(str::to_string),
            frames: self.scene.frame(),
        };
        tracing::debug!(?teardown, "session unloaded");
        teardown
    }
}

fn resize_effect(viewport: Viewport) -> Effect {
    Effect::ResizeSurface {
        width: viewport.width,
        height: viewport.height,
        pixel_ratio: viewport.capped_pixel_ratio(),
    }
}

/// Outcome of [`boot`].
pub enum Boot {
    Ready {
        session: Box<Session>,
        effects: Vec<Effect>,
        report: TransformReport,
    },
    /// The résumé could not be loaded; `page` shows the fallback text.
    Fallback { page: Page, error: FolioError },
}

/// Load the résumé at `source` and mount a session on `page`. Load and parse failures
/// switch the page to its fallback text instead of failing; anything else is an error.
#[tracing::instrument(skip(page, ctx, config, nav_links))]
pub fn boot(
    source: &Path,
    mut page: Page,
    ctx: RenderContext,
    config: &SiteConfig,
    nav_links: Vec<NavLink>,
    viewport: Viewport,
) -> FolioResult<Boot> {
    let resume = match load_resume(source) {
        Ok(r) => r,
        Err(error) if error.is_load_failure() => {
            tracing::error!(%error, "cannot load résumé");
            page.show_load_error()?;
            return Ok(Boot::Fallback { page, error });
        }
        Err(error) => return Err(error),
    };

    let transformed = transform(&resume, &config.transform)?;
    let (session, effects) =
        Session::mount(transformed.view, page, ctx, config, nav_links, viewport)?;
    Ok(Boot::Ready {
        session: Box::new(session),
        effects,
        report: transformed.report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        observe::{NavStyle, REVEALED_CLASS},
        page,
        render::RenderOptions,
        view::{Degree, Experience, Personal},
    };

    fn view() -> Portfolio {
        Portfolio {
            personal: Personal {
                name: "Ada".to_string(),
                ..Personal::default()
            },
            degrees: vec![Degree {
                institution: "MIT".to_string(),
                degree: "BSc in CS".to_string(),
                year: "2015/2019".to_string(),
                ..Degree::default()
            }],
            experience: vec![Experience {
                company: "Acme".to_string(),
                role: "Engineer".to_string(),
                period: "Jan 2020 - Present".to_string(),
                achievements: vec![],
            }],
            ..Portfolio::default()
        }
    }

    fn links() -> Vec<NavLink> {
        vec![
            NavLink {
                href: "#about".to_string(),
                offset_left: 10.0,
                width: 60.0,
            },
            NavLink {
                href: "#projects".to_string(),
                offset_left: 80.0,
                width: 70.0,
            },
        ]
    }

    fn mounted() -> (Session, Vec<Effect>) {
        Session::mount(
            view(),
            Page::standard(),
            RenderContext::new(2026, RenderOptions::default()),
            &SiteConfig::default(),
            links(),
            Viewport::new(1000.0, 800.0, 1.0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn mount_renders_and_schedules_initial_pass() {
        let (session, effects) = mounted();
        assert_eq!(
            session.page().slot(page::HERO_NAME).unwrap().text_content(),
            "Ada"
        );
        assert!(effects.contains(&Effect::ScheduleTimer {
            timer: TimerId::InitialActiveSection,
            delay_ms: 100,
        }));
    }

    #[test]
    fn layout_reveals_cards_once() {
        let (mut session, _) = mounted();
        let visible = Rect::new(0.0, 100.0, 300.0, 300.0);
        let layout = HostEvent::Layout {
            rects: vec![("degrees-card-0".to_string(), visible)],
        };

        let effects = session.handle(layout.clone());
        assert_eq!(
            effects,
            vec![Effect::AddClass {
                id: "degrees-card-0".to_string(),
                class: REVEALED_CLASS.to_string(),
            }]
        );
        assert!(
            session
                .page()
                .element("degrees-card-0")
                .unwrap()
                .has_class(REVEALED_CLASS)
        );
        assert!(session.handle(layout).is_empty());
    }

    #[test]
    fn scroll_toggles_nav_and_moves_camera() {
        let (mut session, _) = mounted();
        assert_eq!(
            session.handle(HostEvent::Scroll { y: 150.0 }),
            vec![Effect::SetNavStyle(NavStyle::SCROLLED)]
        );
        assert!(session.handle(HostEvent::Scroll { y: 160.0 }).is_empty());
        session.handle(HostEvent::Frame);
        assert!((session.scene().camera().position.y - 1.6).abs() < 1e-5);
    }

    #[test]
    fn timer_runs_initial_pass() {
        let (mut session, _) = mounted();
        let effects = session.handle(HostEvent::Timer {
            timer: TimerId::InitialActiveSection,
            section_tops: vec![
                ("about".to_string(), -500.0),
                ("projects".to_string(), 120.0),
            ],
        });
        assert_eq!(
            effects[0],
            Effect::SetActiveLink {
                href: "#projects".to_string()
            }
        );
        assert_eq!(session.active_section(), Some("projects"));
    }

    #[test]
    fn anchor_clicks_scroll_and_others_do_not() {
        let (mut session, _) = mounted();
        assert_eq!(
            session.handle(HostEvent::Click {
                href: "#about".to_string()
            }),
            vec![Effect::ScrollIntoView {
                id: "about".to_string()
            }]
        );
        assert!(
            session
                .handle(HostEvent::Click {
                    href: "https://example.com".to_string()
                })
                .is_empty()
        );
    }

    #[test]
    fn resize_emits_capped_pixel_ratio() {
        let (mut session, _) = mounted();
        let effects = session.handle(HostEvent::Resize {
            width: 640.0,
            height: 480.0,
            device_pixel_ratio: 3.0,
        });
        assert_eq!(
            effects,
            vec![Effect::ResizeSurface {
                width: 640.0,
                height: 480.0,
                pixel_ratio: 2.0,
            }]
        );
        assert!(
            session
                .handle(HostEvent::Resize {
                    width: -1.0,
                    height: 480.0,
                    device_pixel_ratio: 1.0,
                })
                .is_empty()
        );
    }

    #[test]
    fn unload_reports_and_stops() {
        let (mut session, _) = mounted();
        session.handle(HostEvent::Frame);
        session.handle(HostEvent::RevealEntries(vec![IntersectionEntry {
            target: "experience-card-0".to_string(),
            ratio: 0.5,
            is_intersecting: true,
        }]));
        let teardown = session.unload();
        assert_eq!(
            teardown,
            Teardown {
                revealed: 1,
                active_section: None,
                frames: 1,
            }
        );
    }

    #[test]
    fn boot_falls_back_on_missing_resume() {
        let boot = boot(
            Path::new("/nonexistent/folio/resume.json"),
            Page::standard(),
            RenderContext::new(2026, RenderOptions::default()),
            &SiteConfig::default(),
            Vec::new(),
            Viewport::default(),
        )
        .unwrap();
        let Boot::Fallback { page: fallback, error } = boot else {
            panic!("expected fallback");
        };
        assert!(matches!(error, FolioError::Load(_)));
        assert_eq!(
            fallback.slot(page::HERO_NAME).unwrap().text_content(),
            page::LOAD_ERROR_TITLE
        );
        assert!(fallback.slot(page::DEGREES).unwrap().children.is_empty());
    }
}
