//! Structured element tree.
//!
//! Content is never assembled from markup strings: every field value ends up either in a
//! [`Node::Text`] or in an attribute value, and [`Element::to_html`] escapes both on the way
//! out. A résumé containing `<script>` renders as the literal text `<script>`.

use std::fmt::Write as _;

/// Elements serialised without a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Element(el) => el.write_html(out),
            Self::Text(t) => escape_text_into(t, out),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>, // insertion order, unique names
    pub classes: Vec<String>,
    pub styles: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            classes: Vec::new(),
            styles: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Add each whitespace-separated class in `classes`.
    pub fn class(mut self, classes: &str) -> Self {
        for c in classes.split_whitespace() {
            self.add_class(c);
        }
        self
    }

    pub fn style(mut self, prop: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_style(prop, value);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::text(text));
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children.into_iter().map(Node::Element));
        self
    }

    /// `href` for external links; unsafe schemes are dropped instead of written.
    pub fn href(self, url: &str) -> Self {
        match safe_url(url) {
            Some(url) => self.attr("href", url),
            None => {
                tracing::warn!(url, "refusing unsafe link target");
                self
            }
        }
    }

    pub fn get_id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn get_style(&self, prop: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, prop: impl Into<String>, value: impl Into<String>) {
        let prop = prop.into();
        let value = value.into();
        match self.styles.iter_mut().find(|(p, _)| *p == prop) {
            Some((_, v)) => *v = value,
            None => self.styles.push((prop, value)),
        }
    }

    /// Drop every child.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn append(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(Node::text(text));
    }

    /// Concatenated text of the whole subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Depth-first search of this element and its descendants.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find(pred))
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| match c {
            Node::Element(el) => el.find_mut(pred),
            Node::Text(_) => None,
        })
    }

    /// Every element in the subtree (self included) matching `pred`, in document order.
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if pred(self) {
            out.push(self);
        }
        for c in self.child_elements() {
            c.find_all(pred, out);
        }
    }

    /// Serialise this element and its subtree.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Serialise only the children (the `innerHTML` of this element).
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for c in &self.children {
            c.write_html(&mut out);
        }
        out
    }

    /// `class` attribute value as it is written out.
    pub fn class_attr(&self) -> String {
        self.classes.join(" ")
    }

    /// `style` attribute value as it is written out.
    pub fn style_attr(&self) -> String {
        let mut s = String::new();
        for (i, (p, v)) in self.styles.iter().enumerate() {
            if i > 0 {
                s.push(' ');
            }
            let _ = write!(s, "{p}: {v};");
        }
        s
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            write_attr(out, name, value);
        }
        if !self.classes.is_empty() {
            write_attr(out, "class", &self.class_attr());
        }
        if !self.styles.is_empty() {
            write_attr(out, "style", &self.style_attr());
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        for c in &self.children {
            c.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_attr_into(value, out);
    out.push('"');
}

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_text_into(s, &mut out);
    out
}

fn escape_text_into(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_attr_into(s, &mut out);
    out
}

fn escape_attr_into(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// `url` unless it uses a scheme that executes code when followed.
pub fn safe_url(url: &str) -> Option<&str> {
    let trimmed = url.trim();
    let scheme: String = trimmed
        .chars()
        .take_while(|c| *c != ':')
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    let has_scheme = trimmed.contains(':') && !scheme.contains('/');
    if has_scheme && matches!(scheme.as_str(), "javascript" | "vbscript" | "data") {
        return None;
    }
    Some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_escaped() {
        let el = Element::new("p").text("<script>alert('x')</script> & co");
        assert_eq!(
            el.to_html(),
            "<p>&lt;script&gt;alert('x')&lt;/script&gt; &amp; co</p>"
        );
    }

    #[test]
    fn attributes_are_escaped_and_ordered() {
        let el = Element::new("a")
            .attr("href", "https://x/?a=1&b=\"2\"")
            .class("social-link  external")
            .style("animation-delay", "0.2s");
        assert_eq!(
            el.to_html(),
            "<a href=\"https://x/?a=1&amp;b=&quot;2&quot;\" class=\"social-link external\" style=\"animation-delay: 0.2s;\"></a>"
        );
    }

    #[test]
    fn void_tags_have_no_close() {
        let el = Element::new("img").attr("src", "me.jpg");
        assert_eq!(el.to_html(), "<img src=\"me.jpg\">");
    }

    #[test]
    fn set_text_replaces_children() {
        let mut el = Element::new("div").child(Element::new("span").text("old"));
        el.set_text("<b>new</b>");
        assert_eq!(el.children.len(), 1);
        assert_eq!(el.inner_html(), "&lt;b&gt;new&lt;/b&gt;");
        assert_eq!(el.text_content(), "<b>new</b>");
    }

    #[test]
    fn set_attr_and_class_are_unique() {
        let mut el = Element::new("a").attr("href", "a").class("x");
        el.set_attr("href", "b");
        el.add_class("x");
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.get_attr("href"), Some("b"));
        assert_eq!(el.classes, vec!["x"]);
        el.remove_class("x");
        assert!(!el.has_class("x"));
    }

    #[test]
    fn find_walks_descendants() {
        let el = Element::new("div").child(
            Element::new("ul").child(Element::new("li").id("deep").text("hit")),
        );
        let found = el.find(&|e: &Element| e.get_id() == Some("deep")).unwrap();
        assert_eq!(found.text_content(), "hit");

        let mut all = Vec::new();
        el.find_all(&|e: &Element| e.tag == "li" || e.tag == "ul", &mut all);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn unsafe_urls_are_refused() {
        assert_eq!(safe_url("javascript:alert(1)"), None);
        assert_eq!(safe_url("  JavaScript:alert(1)"), None);
        assert_eq!(safe_url("java\tscript:alert(1)"), None);
        assert_eq!(safe_url("data:text/html,hi"), None);
        assert_eq!(safe_url("https://example.com"), Some("https://example.com"));
        assert_eq!(safe_url("mailto:me@example.com"), Some("mailto:me@example.com"));
        assert_eq!(safe_url("cv/cv.pdf"), Some("cv/cv.pdf"));

        let a = Element::new("a").href("javascript:alert(1)");
        assert_eq!(a.get_attr("href"), None);
    }
}
