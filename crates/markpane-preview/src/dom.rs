//! Rendered preview HTML as a mutable DOM
//!
//! The rendered markdown is parsed with html5ever into an `RcDom`; the
//! `<body>` element is the preview container. [`Element`] wraps element
//! handles with the few DOM operations activation needs.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, parse_document, serialize, Attribute, LocalName, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::error::Result;

/// The element rendered markdown is inserted into.
pub struct Container {
    dom: RcDom,
    body: Handle,
}

impl Container {
    /// Parse rendered HTML as the content of a fresh container.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let body = find_element(&dom.document, "body").unwrap_or_else(|| dom.document.clone());
        Self { dom, body }
    }

    pub fn root(&self) -> Element {
        Element(self.body.clone())
    }

    /// Direct child elements of the container.
    pub fn children(&self) -> Vec<Element> {
        self.root().children()
    }

    /// Every element below the container, in document order.
    pub fn descendants(&self) -> Vec<Element> {
        self.root().descendants()
    }

    /// Serialize the container's content back to HTML.
    pub fn to_html(&self) -> Result<String> {
        let mut output = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        serialize(&mut output, &SerializableHandle::from(self.body.clone()), opts)?;
        Ok(String::from_utf8(output)?)
    }

    pub fn document(&self) -> &RcDom {
        &self.dom
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("children", &self.children().len())
            .finish()
    }
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data {
        if &*name.local == tag {
            return Some(handle.clone());
        }
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

/// An element node. Equality and hashing follow node identity.
#[derive(Clone)]
pub struct Element(Handle);

impl Element {
    /// Wrap `handle` if it is an element node.
    pub fn from_handle(handle: Handle) -> Option<Self> {
        matches!(handle.data, NodeData::Element { .. }).then_some(Self(handle))
    }

    pub fn handle(&self) -> &Handle {
        &self.0
    }

    /// Lowercase tag name.
    pub fn tag(&self) -> &str {
        match &self.0.data {
            NodeData::Element { name, .. } => &*name.local,
            _ => "",
        }
    }

    fn attrs(&self) -> Option<&RefCell<Vec<Attribute>>> {
        match &self.0.data {
            NodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.attrs()?
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.to_string())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        let Some(attrs) = self.attrs() else {
            return;
        };
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|attr| &*attr.name.local == name) {
            Some(attr) => attr.value = value.into(),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(name)),
                value: value.into(),
            }),
        }
    }

    /// Remove `name`, returning its value.
    pub fn remove_attr(&self, name: &str) -> Option<String> {
        let mut attrs = self.attrs()?.borrow_mut();
        let index = attrs.iter().position(|attr| &*attr.name.local == name)?;
        Some(attrs.remove(index).value.to_string())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attr("class", &classes);
    }

    pub fn remove_class(&self, class: &str) {
        let Some(existing) = self.attr("class") else {
            return;
        };
        let remaining: Vec<&str> = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect();
        self.set_attr("class", &remaining.join(" "));
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.0, &mut text);
        text
    }

    pub fn children(&self) -> Vec<Element> {
        self.0
            .children
            .borrow()
            .iter()
            .cloned()
            .filter_map(Element::from_handle)
            .collect()
    }

    /// Every element below this one, in document order.
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        collect_elements(&self.0, &mut out);
        out
    }

    pub fn parent(&self) -> Option<Element> {
        let weak = self.0.parent.take();
        let parent = weak.as_ref().and_then(|weak| weak.upgrade());
        self.0.parent.set(weak);
        parent.and_then(Element::from_handle)
    }

    /// Closest element before this one under the same parent.
    pub fn previous_element_sibling(&self) -> Option<Element> {
        let siblings = self.parent()?.children();
        let index = siblings.iter().position(|sibling| sibling == self)?;
        siblings[..index].last().cloned()
    }
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

fn collect_elements(handle: &Handle, out: &mut Vec<Element>) {
    for child in handle.children.borrow().iter() {
        if let Some(element) = Element::from_handle(child.clone()) {
            out.push(element);
        }
        collect_elements(child, out);
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag())?;
        if let Some(attrs) = self.attrs() {
            for attr in attrs.borrow().iter() {
                write!(f, " {}=\"{}\"", &*attr.name.local, &*attr.value)?;
            }
        }
        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_content_only() {
        let container = Container::parse("<p class=\"a\">x</p><div><span>y</span></div>");
        assert_eq!(container.root().tag(), "body");
        assert_eq!(container.children().len(), 2);
        let tags: Vec<_> = container.descendants().iter().map(|e| e.tag().to_owned()).collect();
        assert_eq!(tags, ["p", "div", "span"]);
        assert_eq!(
            container.to_html().unwrap(),
            "<p class=\"a\">x</p><div><span>y</span></div>"
        );
    }

    #[test]
    fn test_attribute_editing() {
        let container = Container::parse("<img data-src=\"a.png\">");
        let img = &container.children()[0];

        assert_eq!(img.attr("data-src").as_deref(), Some("a.png"));
        assert_eq!(img.remove_attr("data-src").as_deref(), Some("a.png"));
        assert!(!img.has_attr("data-src"));
        assert_eq!(img.remove_attr("data-src"), None);

        img.set_attr("src", "a.png");
        img.set_attr("src", "b.png");
        assert_eq!(container.to_html().unwrap(), "<img src=\"b.png\">");
    }

    #[test]
    fn test_classes() {
        let container = Container::parse("<button class=\"copy-button\">Copy</button>");
        let button = &container.children()[0];

        button.add_class("copied");
        button.add_class("copied");
        assert_eq!(button.attr("class").as_deref(), Some("copy-button copied"));
        assert!(button.has_class("copied"));

        button.remove_class("copied");
        assert!(!button.has_class("copied"));
        assert!(button.has_class("copy-button"));
    }

    #[test]
    fn test_text_and_siblings() {
        let container =
            Container::parse("<div><pre><code>let a = 1;\n&lt;b&gt;</code></pre><button>Copy</button></div>");
        let button = container
            .descendants()
            .into_iter()
            .find(|e| e.tag() == "button")
            .unwrap();

        let pre = button.previous_element_sibling().unwrap();
        assert_eq!(pre.tag(), "pre");
        assert_eq!(pre.text_content(), "let a = 1;\n<b>");
        assert_eq!(button.parent().unwrap().tag(), "div");
        assert!(pre.previous_element_sibling().is_none());
    }

    #[test]
    fn test_identity() {
        let container = Container::parse("<p>a</p><p>a</p>");
        let children = container.children();
        assert_ne!(children[0], children[1]);
        assert_eq!(children[0], container.children()[0]);
    }
}
