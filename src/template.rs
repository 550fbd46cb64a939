//! Writes a rendered [`Page`] into a host HTML template.
//!
//! The template is streamed through `lol_html`; every element whose id matches a slot has
//! its content replaced by the slot's serialised children and its managed attributes
//! synchronised. Attribute-only slots keep the template's own content. The rest of the
//! document passes through untouched.

use std::{borrow::Cow, cell::RefCell};

use lol_html::{
    ElementContentHandlers, HtmlRewriter, Selector, Settings, html_content::ContentType,
};

use crate::{
    dom::Element,
    foundation::error::{FolioError, FolioResult},
    page::{ATTRIBUTE_SLOTS, Page},
};

/// Attributes the renderer may add to or remove from a slot element.
const MANAGED_ATTRS: [&str; 3] = ["href", "download", "hidden"];

/// Inject every slot of `page` into `template_html`. Fails when the template lacks a slot.
#[tracing::instrument(skip_all, fields(slots = page.slots().len()))]
pub fn inject(template_html: &str, page: &Page) -> FolioResult<String> {
    for slot in page.slots() {
        for (name, value) in &slot.attrs {
            if value.contains('"') {
                return Err(FolioError::render(format!(
                    "attribute '{name}' of slot '#{}' contains a double quote",
                    slot.get_id().unwrap_or_default()
                )));
            }
        }
    }

    let found: RefCell<Vec<&str>> = RefCell::new(Vec::new());
    let mut handlers = Vec::with_capacity(page.slots().len());
    for slot in page.slots() {
        let Some(id) = slot.get_id() else {
            continue;
        };
        let selector: Selector = format!("#{id}")
            .parse()
            .map_err(|e| FolioError::render(format!("slot id '{id}' is not a selector: {e}")))?;
        let found = &found;
        let content = (!ATTRIBUTE_SLOTS.contains(&id)).then(|| slot.inner_html());
        let handler = ElementContentHandlers::default().element(
            move |el: &mut lol_html::html_content::Element<'_, '_>| -> lol_html::HandlerResult {
                found.borrow_mut().push(id);
                if let Some(content) = &content {
                    el.set_inner_content(content, ContentType::Html);
                }
                sync_attributes(el, slot)?;
                Ok(())
            },
        );
        handlers.push((Cow::Owned(selector), handler));
    }

    let mut output = Vec::with_capacity(template_html.len());
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            ..Settings::default()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );
    rewriter
        .write(template_html.as_bytes())
        .map_err(|e| FolioError::render(format!("template rewrite: {e}")))?;
    rewriter
        .end()
        .map_err(|e| FolioError::render(format!("template rewrite: {e}")))?;

    let found = found.into_inner();
    let missing: Vec<&str> = page
        .slots()
        .iter()
        .filter_map(Element::get_id)
        .filter(|id| !found.contains(id))
        .collect();
    if !missing.is_empty() {
        return Err(FolioError::render(format!(
            "template has no element for slot(s): {}",
            missing.join(", ")
        )));
    }

    String::from_utf8(output).map_err(|e| FolioError::render(format!("template output: {e}")))
}

fn sync_attributes(
    el: &mut lol_html::html_content::Element<'_, '_>,
    slot: &Element,
) -> Result<(), lol_html::errors::AttributeNameError> {
    for (name, value) in &slot.attrs {
        if name != "id" {
            el.set_attribute(name, value)?;
        }
    }
    for name in MANAGED_ATTRS {
        if slot.get_attr(name).is_none() {
            el.remove_attribute(name);
        }
    }
    if !slot.classes.is_empty() {
        el.set_attribute("class", &slot.class_attr())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{self, COLLECTION_SLOTS};

    const TEMPLATE: &str = r##"<!DOCTYPE html>
<html><head><title>Portfolio</title></head><body>
<nav class="nav"><a href="#about">About</a></nav>
<h1 id="hero-name">placeholder</h1>
<p id="hero-tagline"></p>
<p id="about-bio"></p>
<div id="social-links"></div>
<div id="profile-picture"></div>
<a id="cv-download" class="btn" hidden>Download CV</a>
<div id="degrees-container"></div>
<div id="skills-container"></div>
<div id="experience-container"></div>
<div id="projects-container"></div>
<footer><span id="footer-name"></span> <span id="current-year"></span></footer>
</body></html>"##;

    #[test]
    fn slots_replace_placeholder_content() {
        let mut page = Page::standard();
        page.slot_mut(page::HERO_NAME)
            .unwrap()
            .set_text("<b>Ada</b> & co");
        let html = inject(TEMPLATE, &page).unwrap();
        assert!(html.contains(r#"<h1 id="hero-name">&lt;b&gt;Ada&lt;/b&gt; &amp; co</h1>"#));
        assert!(!html.contains("placeholder"));
        assert!(html.contains(r##"<nav class="nav"><a href="#about">About</a></nav>"##));
    }

    #[test]
    fn cv_link_is_unhidden_with_href() {
        let mut page = Page::standard();
        let cv = page.slot_mut(page::CV_DOWNLOAD).unwrap();
        cv.remove_attr("hidden");
        cv.set_attr("href", "cv.pdf");
        cv.set_attr("download", "");
        let html = inject(TEMPLATE, &page).unwrap();
        let start = html.find(r#"id="cv-download""#).unwrap();
        let tag = &html[start..start + html[start..].find('>').unwrap()];
        assert!(tag.contains(r#"href="cv.pdf""#));
        assert!(!tag.contains("hidden"));
        let anchor = &html[start..start + html[start..].find("</a>").unwrap()];
        assert!(anchor.ends_with(">Download CV"));
    }

    #[test]
    fn hidden_cv_link_stays_hidden() {
        let html = inject(TEMPLATE, &Page::standard()).unwrap();
        let start = html.find(r#"id="cv-download""#).unwrap();
        let tag = &html[start..start + html[start..].find('>').unwrap()];
        assert!(tag.contains("hidden"));
        assert!(!tag.contains("href"));
    }

    #[test]
    fn template_missing_a_slot_is_an_error() {
        let template = TEMPLATE.replace(r#"<div id="skills-container"></div>"#, "");
        let err = inject(&template, &Page::standard()).unwrap_err();
        assert!(matches!(err, FolioError::Render(_)));
        assert!(err.to_string().contains(COLLECTION_SLOTS[1]));
    }

    #[test]
    fn quoted_attribute_values_are_refused() {
        let mut page = Page::standard();
        page.slot_mut(page::CV_DOWNLOAD)
            .unwrap()
            .set_attr("href", r#"cv.pdf" onclick="x"#);
        assert!(inject(TEMPLATE, &page).is_err());
    }
}
