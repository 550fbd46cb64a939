//! The host document as the renderer sees it: a fixed set of named slots.

use crate::{
    dom::Element,
    foundation::error::{FolioError, FolioResult},
};

pub const HERO_NAME: &str = "hero-name";
pub const HERO_TAGLINE: &str = "hero-tagline";
pub const ABOUT_BIO: &str = "about-bio";
pub const SOCIAL_LINKS: &str = "social-links";
pub const DEGREES: &str = "degrees-container";
pub const SKILLS: &str = "skills-container";
pub const EXPERIENCE: &str = "experience-container";
pub const PROJECTS: &str = "projects-container";
pub const FOOTER_NAME: &str = "footer-name";
pub const CURRENT_YEAR: &str = "current-year";
pub const PROFILE_PICTURE: &str = "profile-picture";
pub const CV_DOWNLOAD: &str = "cv-download";

/// Class marking elements the reveal watcher should fade in.
pub const REVEAL_CLASS: &str = "animate-on-scroll";

pub const LOAD_ERROR_TITLE: &str = "Loading Error";
pub const LOAD_ERROR_HINT: &str = "Please check resume.json";

/// Collection containers; never touched by the load-error fallback.
pub const COLLECTION_SLOTS: [&str; 4] = [DEGREES, SKILLS, EXPERIENCE, PROJECTS];

/// Slots whose content belongs to the host template; only their attributes are rendered.
pub const ATTRIBUTE_SLOTS: [&str; 1] = [CV_DOWNLOAD];

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    slots: Vec<Element>, // declaration order, unique ids
}

impl Page {
    /// Slots declared by an arbitrary host document. Every element must carry a unique id.
    pub fn with_slots(slots: impl IntoIterator<Item = Element>) -> FolioResult<Self> {
        let slots: Vec<Element> = slots.into_iter().collect();
        for (i, el) in slots.iter().enumerate() {
            let Some(id) = el.get_id() else {
                return Err(FolioError::validation(format!(
                    "slot <{}> at position {i} has no id",
                    el.tag
                )));
            };
            if slots[..i].iter().any(|o| o.get_id() == Some(id)) {
                return Err(FolioError::validation(format!("duplicate slot id '{id}'")));
            }
        }
        Ok(Self { slots })
    }

    /// The slot set of the stock portfolio template.
    pub fn standard() -> Self {
        Self {
            slots: vec![
                Element::new("h1").id(HERO_NAME),
                Element::new("p").id(HERO_TAGLINE),
                Element::new("p").id(ABOUT_BIO),
                Element::new("div").id(SOCIAL_LINKS),
                Element::new("div").id(DEGREES),
                Element::new("div").id(SKILLS),
                Element::new("div").id(EXPERIENCE),
                Element::new("div").id(PROJECTS),
                Element::new("span").id(FOOTER_NAME),
                Element::new("span").id(CURRENT_YEAR),
                Element::new("div").id(PROFILE_PICTURE),
                Element::new("a").id(CV_DOWNLOAD).attr("hidden", ""),
            ],
        }
    }

    pub fn slots(&self) -> &[Element] {
        &self.slots
    }

    pub fn slot(&self, id: &str) -> FolioResult<&Element> {
        self.slots
            .iter()
            .find(|s| s.get_id() == Some(id))
            .ok_or_else(|| missing_slot(id))
    }

    pub fn slot_mut(&mut self, id: &str) -> FolioResult<&mut Element> {
        self.slots
            .iter_mut()
            .find(|s| s.get_id() == Some(id))
            .ok_or_else(|| missing_slot(id))
    }

    /// Any element with `id`, searching inside every slot.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.slots
            .iter()
            .find_map(|s| s.find(&|e: &Element| e.get_id() == Some(id)))
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.slots
            .iter_mut()
            .find_map(|s| s.find_mut(&|e: &Element| e.get_id() == Some(id)))
    }

    /// Ids of every element carrying the reveal marker, in document order.
    pub fn reveal_targets(&self) -> Vec<String> {
        let mut found = Vec::new();
        for slot in &self.slots {
            slot.find_all(&|e: &Element| e.has_class(REVEAL_CLASS), &mut found);
        }
        found
            .into_iter()
            .filter_map(|e| e.get_id().map(str::to_string))
            .collect()
    }

    /// Fixed replacement text after a load or parse failure. Collections stay untouched.
    pub fn show_load_error(&mut self) -> FolioResult<()> {
        self.slot_mut(HERO_NAME)?.set_text(LOAD_ERROR_TITLE);
        self.slot_mut(HERO_TAGLINE)?.set_text(LOAD_ERROR_HINT);
        Ok(())
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::standard()
    }
}

fn missing_slot(id: &str) -> FolioError {
    FolioError::render(format!("host document has no slot '#{id}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_page_has_every_slot() {
        let page = Page::standard();
        for id in [
            HERO_NAME,
            HERO_TAGLINE,
            ABOUT_BIO,
            SOCIAL_LINKS,
            DEGREES,
            SKILLS,
            EXPERIENCE,
            PROJECTS,
            FOOTER_NAME,
            CURRENT_YEAR,
            PROFILE_PICTURE,
            CV_DOWNLOAD,
        ] {
            assert!(page.slot(id).is_ok(), "missing {id}");
        }
    }

    #[test]
    fn missing_slot_is_render_error() {
        let page = Page::with_slots([Element::new("h1").id(HERO_NAME)]).unwrap();
        assert!(matches!(page.slot(DEGREES), Err(FolioError::Render(_))));
    }

    #[test]
    fn with_slots_rejects_duplicates_and_anonymous() {
        assert!(Page::with_slots([Element::new("div")]).is_err());
        assert!(
            Page::with_slots([Element::new("div").id("a"), Element::new("p").id("a")]).is_err()
        );
    }

    #[test]
    fn load_error_touches_only_hero() {
        let mut page = Page::standard();
        page.show_load_error().unwrap();
        assert_eq!(page.slot(HERO_NAME).unwrap().text_content(), LOAD_ERROR_TITLE);
        assert_eq!(page.slot(HERO_TAGLINE).unwrap().text_content(), LOAD_ERROR_HINT);
        for id in COLLECTION_SLOTS {
            assert!(page.slot(id).unwrap().children.is_empty());
        }
    }
}
