use chrono::Datelike as _;

use crate::{
    dom::{Element, safe_url},
    foundation::error::{FolioError, FolioResult},
    page::{self, Page, REVEAL_CLASS},
    view::{Degree, DegreeCard, Experience, Personal, Portfolio, ProjectEntry, SkillGroup},
};

/// Slots the renderer writes; all must exist before anything is touched.
const RENDERED_SLOTS: [&str; 12] = [
    page::HERO_NAME,
    page::HERO_TAGLINE,
    page::ABOUT_BIO,
    page::SOCIAL_LINKS,
    page::DEGREES,
    page::SKILLS,
    page::EXPERIENCE,
    page::PROJECTS,
    page::FOOTER_NAME,
    page::CURRENT_YEAR,
    page::PROFILE_PICTURE,
    page::CV_DOWNLOAD,
];

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Extra animation delay per card, in seconds.
    pub stagger_secs: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { stagger_secs: 0.1 }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> FolioResult<()> {
        if !(self.stagger_secs >= 0.0 && self.stagger_secs.is_finite()) {
            return Err(FolioError::validation("render stagger_secs must be >= 0"));
        }
        Ok(())
    }
}

/// Everything a render pass needs besides the view model. Built once per load.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderContext {
    pub current_year: i32,
    pub options: RenderOptions,
}

impl RenderContext {
    pub fn new(current_year: i32, options: RenderOptions) -> Self {
        Self {
            current_year,
            options,
        }
    }

    /// Context stamped with the local calendar year.
    pub fn now(options: RenderOptions) -> Self {
        Self::new(chrono::Local::now().year(), options)
    }
}

pub struct Renderer {
    ctx: RenderContext,
}

impl Renderer {
    pub fn new(ctx: RenderContext) -> Self {
        Self { ctx }
    }

    /// Replace the contents of every slot from `view`. Re-running rebuilds each slot from
    /// scratch. A missing slot fails before any slot is modified.
    #[tracing::instrument(skip_all)]
    pub fn render(&self, view: &Portfolio, page: &mut Page) -> FolioResult<()> {
        for id in RENDERED_SLOTS {
            page.slot(id)?;
        }

        let personal = &view.personal;
        page.slot_mut(page::HERO_NAME)?.set_text(personal.name.as_str());
        page.slot_mut(page::HERO_TAGLINE)?
            .set_text(personal.tagline.as_str());
        page.slot_mut(page::ABOUT_BIO)?.set_text(personal.bio.as_str());
        page.slot_mut(page::FOOTER_NAME)?.set_text(personal.name.as_str());
        page.slot_mut(page::CURRENT_YEAR)?
            .set_text(self.ctx.current_year.to_string());

        render_social_links(personal, page.slot_mut(page::SOCIAL_LINKS)?);
        render_profile_picture(personal, page.slot_mut(page::PROFILE_PICTURE)?);
        render_cv_link(personal, page.slot_mut(page::CV_DOWNLOAD)?);

        let stagger = self.ctx.options.stagger_secs;

        let degrees = page.slot_mut(page::DEGREES)?;
        degrees.clear();
        let mut cards = Stagger::new("degrees", stagger);
        for card in view.degree_cards() {
            let el = match card {
                DegreeCard::Group { key, members } => group_card(key, &members),
                DegreeCard::Single(d) => degree_card(d),
            };
            degrees.append(cards.next(el));
        }

        let skills = page.slot_mut(page::SKILLS)?;
        skills.clear();
        let mut cards = Stagger::new("skills", stagger);
        for group in &view.skills {
            skills.append(cards.next(skill_card(group)));
        }

        let experience = page.slot_mut(page::EXPERIENCE)?;
        experience.clear();
        let mut cards = Stagger::new("experience", stagger);
        for exp in &view.experience {
            experience.append(cards.next(experience_card(exp)));
        }

        let projects = page.slot_mut(page::PROJECTS)?;
        projects.clear();
        let mut cards = Stagger::new("projects", stagger);
        for project in &view.projects {
            projects.append(cards.next(project_card(project)));
        }

        tracing::debug!(reveal_targets = page.reveal_targets().len(), "page populated");
        Ok(())
    }
}

/// Numbers the cards of one section and hands out increasing animation delays.
struct Stagger<'a> {
    section: &'a str,
    step_secs: f64,
    next: usize,
}

impl<'a> Stagger<'a> {
    fn new(section: &'a str, step_secs: f64) -> Self {
        Self {
            section,
            step_secs,
            next: 0,
        }
    }

    fn next(&mut self, el: Element) -> Element {
        let n = self.next;
        self.next += 1;
        let ms = (n as f64 * self.step_secs * 1000.0).round();
        el.id(format!("{}-card-{n}", self.section))
            .class(REVEAL_CLASS)
            .style("animation-delay", format!("{}s", ms / 1000.0))
    }
}

fn render_social_links(personal: &Personal, slot: &mut Element) {
    slot.clear();
    if !personal.email.trim().is_empty() {
        slot.append(
            Element::new("a")
                .href(&format!("mailto:{}", personal.email.trim()))
                .class("social-link")
                .text("📧 Email"),
        );
    }
    if let Some(url) = &personal.github {
        slot.append(external_link(url, "social-link").text("🔗 GitHub"));
    }
    if let Some(url) = &personal.linkedin {
        slot.append(external_link(url, "social-link").text("💼 LinkedIn"));
    }
}

fn render_profile_picture(personal: &Personal, slot: &mut Element) {
    slot.clear();
    let Some(src) = personal.profile_picture.as_deref().and_then(safe_url) else {
        return;
    };
    slot.append(
        Element::new("img")
            .attr("src", src)
            .attr("alt", personal.name.as_str())
            .class("profile-picture-img"),
    );
}

fn render_cv_link(personal: &Personal, slot: &mut Element) {
    match personal.cv.as_deref().and_then(safe_url) {
        Some(href) => {
            slot.set_attr("href", href);
            slot.set_attr("download", "");
            slot.remove_attr("hidden");
        }
        None => {
            slot.remove_attr("href");
            slot.remove_attr("download");
            slot.set_attr("hidden", "");
        }
    }
}

fn external_link(url: &str, class: &str) -> Element {
    Element::new("a")
        .href(url)
        .attr("target", "_blank")
        .attr("rel", "noopener noreferrer")
        .class(class)
}

fn degree_card(d: &Degree) -> Element {
    let mut card = Element::new("div")
        .class("glass-card degree-card")
        .child(Element::new("h3").class("degree-institution").text(d.institution.as_str()))
        .child(Element::new("p").class("degree-title").text(d.degree.as_str()))
        .child(Element::new("p").class("degree-year").text(d.year.as_str()));
    if let Some(grade) = &d.grade {
        card = card.child(Element::new("p").class("degree-grade").text(format!("GPA {grade}")));
    }
    card.child(
        Element::new("p")
            .class("degree-description")
            .text(d.description.as_str()),
    )
}

/// One card for all members of a program; the heading comes from the primary member.
fn group_card(key: &str, members: &[&Degree]) -> Element {
    let lead = members
        .iter()
        .find(|d| d.is_primary())
        .or_else(|| members.first())
        .copied();

    let mut card = Element::new("div")
        .class("glass-card degree-card degree-group")
        .attr("data-group", key);
    if let Some(lead) = lead {
        card = card
            .child(Element::new("h3").class("degree-title").text(lead.degree.as_str()))
            .child(Element::new("p").class("degree-year").text(lead.year.as_str()))
            .child(
                Element::new("p")
                    .class("degree-description")
                    .text(lead.description.as_str()),
            );
    }

    card.children(members.iter().map(|d| {
        let mut entry = Element::new("div").class("degree-entry");
        if d.is_primary() {
            entry.add_class("primary");
        }
        entry = entry
            .child(Element::new("h4").class("degree-institution").text(d.institution.as_str()))
            .child(Element::new("p").class("degree-title").text(d.degree.as_str()));
        if let Some(grade) = &d.grade {
            entry = entry.child(Element::new("p").class("degree-grade").text(format!("GPA {grade}")));
        }
        entry
    }))
}

fn skill_card(group: &SkillGroup) -> Element {
    Element::new("div")
        .class("glass-card skill-card")
        .child(Element::new("h3").class("skill-category").text(group.category.as_str()))
        .child(
            Element::new("div").class("skill-tags").children(
                group
                    .skills
                    .iter()
                    .map(|s| Element::new("span").class("skill-tag").text(s.as_str())),
            ),
        )
}

fn experience_card(exp: &Experience) -> Element {
    Element::new("div")
        .class("glass-card experience-card")
        .child(
            Element::new("div")
                .class("experience-header")
                .child(Element::new("h3").class("experience-company").text(exp.company.as_str()))
                .child(Element::new("p").class("experience-role").text(exp.role.as_str()))
                .child(Element::new("p").class("experience-period").text(exp.period.as_str())),
        )
        .child(
            Element::new("ul").class("experience-achievements").children(
                exp.achievements
                    .iter()
                    .map(|a| Element::new("li").text(a.as_str())),
            ),
        )
}

fn project_card(project: &ProjectEntry) -> Element {
    let mut card = Element::new("div")
        .class("glass-card project-card")
        .child(Element::new("h3").class("project-name").text(project.name.as_str()))
        .child(
            Element::new("p")
                .class("project-description")
                .text(project.description.as_str()),
        )
        .child(
            Element::new("div").class("project-tech").children(
                project
                    .technologies
                    .iter()
                    .map(|t| Element::new("span").class("tech-tag").text(t.as_str())),
            ),
        );
    if !project.link.trim().is_empty() {
        card = card.child(external_link(&project.link, "project-link").text("View Project →"));
    }
    card
}
