//! folio turns a JSON résumé into a single-page portfolio.
//!
//! The pipeline is load-oriented:
//!
//! - Load a [`Resume`] and [`transform`] it into a [`Portfolio`] view model
//! - [`Renderer::render`] the view model into the [`Page`] slots, then [`template::inject`]
//!   the page into the host HTML
//! - Drive the live page through a [`Session`]: reveal, active-section and nav watchers plus
//!   the animated [`background`]
//!
//! The same résumé also feeds the LaTeX [`cv`] generator.
#![forbid(unsafe_code)]

mod foundation;

pub mod background;
pub mod config;
pub mod cv;
pub mod dates;
pub mod dom;
pub mod observe;
pub mod page;
pub mod poster;
pub mod render;
pub mod resume;
pub mod session;
pub mod template;
pub mod transform;
pub mod view;

pub use crate::foundation::core::{MarginEdge, Point, Rect, RootMargin, Vec3, Viewport};
pub use crate::foundation::error::{FolioError, FolioResult};

pub use crate::background::{BackgroundOptions, Scene};
pub use crate::config::SiteConfig;
pub use crate::observe::{Effect, NavLink};
pub use crate::page::Page;
pub use crate::poster::{Poster, PosterSettings, render_frame};
pub use crate::render::{RenderContext, RenderOptions, Renderer};
pub use crate::resume::{DEFAULT_RESUME_PATH, Resume, load_resume, parse_resume};
pub use crate::session::{Boot, HostEvent, Session, Teardown, boot};
pub use crate::transform::{TransformOptions, TransformReport, Transformed, transform};
pub use crate::view::Portfolio;
