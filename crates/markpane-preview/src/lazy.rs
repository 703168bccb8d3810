//! Proximity-triggered activation of deferred resources
//!
//! A [`ProximityObserver`] tracks elements carrying `data-src`. Whenever the
//! host reports a new viewport, elements whose box intersects the viewport
//! grown by the root margin are promoted once: `data-src` moves to `src`
//! and the element stops being observed.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use markpane_parser::attrs::DATA_SRC;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dom::Element;
use crate::error::{PreviewError, Result};

/// One or more intersection ratios at which an element counts as near.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Single(f64),
    List(Vec<f64>),
}

impl Threshold {
    pub fn values(&self) -> &[f64] {
        match self {
            Threshold::Single(value) => std::slice::from_ref(value),
            Threshold::List(values) => values,
        }
    }

    /// The smallest ratio that triggers activation; 0 for an empty list.
    pub fn trigger_ratio(&self) -> f64 {
        self.values()
            .iter()
            .copied()
            .reduce(f64::min)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Single(0.0)
    }
}

/// Options for lazy loading; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyLoadOptions {
    /// CSS margin shorthand applied around the viewport.
    pub root_margin: String,
    pub threshold: Threshold,
}

impl Default for LazyLoadOptions {
    fn default() -> Self {
        Self {
            root_margin: "0px 0px 200px 0px".to_owned(),
            threshold: Threshold::default(),
        }
    }
}

impl LazyLoadOptions {
    pub fn validate(&self) -> Result<()> {
        self.root_margin.parse::<RootMargin>()?;
        if let Some(bad) = self
            .threshold
            .values()
            .iter()
            .find(|value| !(0.0..=1.0).contains(*value))
        {
            return Err(PreviewError::InvalidThreshold(*bad));
        }
        Ok(())
    }
}

/// Axis-aligned box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Overlap with `other`, including edge contact. `None` when disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right >= x && bottom >= y).then(|| Rect::new(x, y, right - x, bottom - y))
    }

    fn grow(&self, margin: &RootMargin) -> Rect {
        let top = margin.top.resolve(self.height);
        let right = margin.right.resolve(self.width);
        let bottom = margin.bottom.resolve(self.height);
        let left = margin.left.resolve(self.width);
        Rect::new(
            self.x - left,
            self.y - top,
            self.width + left + right,
            self.height + top + bottom,
        )
    }
}

/// Where elements are laid out, as measured by the host.
pub trait Layout {
    /// Bounding box of `element`, or `None` if it is not rendered.
    fn rect(&self, element: &Element) -> Option<Rect>;
}

impl<F> Layout for F
where
    F: Fn(&Element) -> Option<Rect>,
{
    fn rect(&self, element: &Element) -> Option<Rect> {
        self(element)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    fn resolve(self, basis: f64) -> f64 {
        match self {
            Length::Px(px) => px,
            Length::Percent(percent) => basis * percent / 100.0,
        }
    }
}

impl FromStr for Length {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let number = |n: &str| n.parse::<f64>().ok().filter(|n| n.is_finite()).ok_or(());
        if let Some(px) = s.strip_suffix("px") {
            return number(px).map(Length::Px);
        }
        if let Some(percent) = s.strip_suffix('%') {
            return number(percent).map(Length::Percent);
        }
        // A bare zero is the only unitless length.
        match number(s) {
            Ok(n) if n == 0.0 => Ok(Length::Px(0.0)),
            _ => Err(()),
        }
    }
}

/// Parsed `root_margin`, CSS shorthand order (top, right, bottom, left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Default for RootMargin {
    fn default() -> Self {
        let zero = Length::Px(0.0);
        Self {
            top: zero,
            right: zero,
            bottom: zero,
            left: zero,
        }
    }
}

impl FromStr for RootMargin {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PreviewError::InvalidRootMargin(s.to_owned());
        let parts = s
            .split_whitespace()
            .map(|part| part.parse::<Length>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        let (top, right, bottom, left) = match parts.as_slice() {
            [] => return Ok(RootMargin::default()),
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => return Err(invalid()),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

/// Per-element activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Pending,
    Activated,
}

/// Move `data-src` to `src`. Does nothing when `data-src` is already gone,
/// so an element is promoted at most once whoever triggers it.
pub fn promote(element: &Element) -> bool {
    match element.remove_attr(DATA_SRC) {
        Some(src) => {
            element.set_attr("src", &src);
            true
        }
        None => false,
    }
}

/// Shared observer for every deferred element of one activation.
pub struct ProximityObserver {
    margin: RootMargin,
    threshold: f64,
    targets: HashMap<Element, TargetState>,
    order: Vec<Element>,
    connected: bool,
}

impl ProximityObserver {
    pub fn new(options: &LazyLoadOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            margin: options.root_margin.parse()?,
            threshold: options.threshold.trigger_ratio(),
            targets: HashMap::new(),
            order: Vec::new(),
            connected: true,
        })
    }

    /// Start observing `element`. Returns false if it is already tracked or
    /// the observer is disconnected.
    pub fn observe(&mut self, element: Element) -> bool {
        if !self.connected || self.targets.contains_key(&element) {
            return false;
        }
        self.targets.insert(element.clone(), TargetState::Pending);
        self.order.push(element);
        true
    }

    pub fn state(&self, element: &Element) -> Option<TargetState> {
        self.targets.get(element).copied()
    }

    /// Elements still waiting for activation, in observation order.
    pub fn pending(&self) -> Vec<Element> {
        self.order
            .iter()
            .filter(|element| self.state(element) == Some(TargetState::Pending))
            .cloned()
            .collect()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_near(&self, viewport: &Rect, rect: &Rect) -> bool {
        let root = viewport.grow(&self.margin);
        let Some(overlap) = rect.intersection(&root) else {
            return false;
        };
        let ratio = if rect.area() > 0.0 {
            overlap.area() / rect.area()
        } else {
            1.0
        };
        ratio >= self.threshold
    }

    /// Activate every pending element near `viewport`. Returns the elements
    /// promoted by this call.
    pub fn update(&mut self, viewport: Rect, layout: &dyn Layout) -> Vec<Element> {
        if !self.connected {
            return Vec::new();
        }
        let near: Vec<Element> = self
            .pending()
            .into_iter()
            .filter(|element| {
                layout
                    .rect(element)
                    .is_some_and(|rect| self.is_near(&viewport, &rect))
            })
            .collect();

        near.into_iter()
            .filter(|element| self.trigger(element))
            .collect()
    }

    /// Deliver a proximity callback for `element`.
    ///
    /// Returns true if the element was pending and got promoted. After
    /// [`disconnect`](Self::disconnect) this never touches the DOM.
    pub fn trigger(&mut self, element: &Element) -> bool {
        if !self.connected {
            trace!(?element, "proximity callback after disconnect ignored");
            return false;
        }
        let Some(state) = self.targets.get_mut(element) else {
            return false;
        };
        if *state == TargetState::Activated {
            return false;
        }

        *state = TargetState::Activated;
        self.order.retain(|observed| observed != element);
        let promoted = promote(element);
        debug!(?element, promoted, "deferred resource activated");
        promoted
    }

    /// Stop observing everything. Idempotent.
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        self.targets.clear();
        self.order.clear();
    }
}

impl fmt::Debug for ProximityObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProximityObserver")
            .field("margin", &self.margin)
            .field("threshold", &self.threshold)
            .field("pending", &self.order.len())
            .field("connected", &self.connected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Container;

    fn images(container: &Container) -> Vec<Element> {
        container
            .descendants()
            .into_iter()
            .filter(|e| e.has_attr(DATA_SRC))
            .collect()
    }

    /// Lays out every element as a 100px tall block, stacked by position.
    fn stacked(elements: Vec<Element>) -> impl Fn(&Element) -> Option<Rect> {
        move |element| {
            let index = elements.iter().position(|e| e == element)?;
            Some(Rect::new(0.0, index as f64 * 1000.0, 100.0, 100.0))
        }
    }

    #[test]
    fn test_root_margin_shorthand() {
        let margin: RootMargin = "0px 0px 200px 0px".parse().unwrap();
        assert_eq!(margin.bottom, Length::Px(200.0));
        assert_eq!(margin.top, Length::Px(0.0));

        let margin: RootMargin = "10% 5px".parse().unwrap();
        assert_eq!(margin.top, Length::Percent(10.0));
        assert_eq!(margin.left, Length::Px(5.0));

        assert_eq!("0".parse::<RootMargin>().unwrap(), RootMargin::default());
        assert_eq!("".parse::<RootMargin>().unwrap(), RootMargin::default());
    }

    #[test]
    fn test_root_margin_rejects_garbage() {
        for bad in ["10", "10em", "1px 2px 3px 4px 5px", "px", "NaNpx"] {
            assert!(
                matches!(bad.parse::<RootMargin>(), Err(PreviewError::InvalidRootMargin(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_options_validation() {
        assert!(LazyLoadOptions::default().validate().is_ok());

        let options = LazyLoadOptions {
            threshold: Threshold::List(vec![0.0, 1.5]),
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(PreviewError::InvalidThreshold(t)) if t == 1.5));
    }

    #[test]
    fn test_threshold_accepts_number_or_list() {
        let options: LazyLoadOptions = serde_json::from_str(r#"{"threshold": 0.5}"#).unwrap();
        assert_eq!(options.threshold, Threshold::Single(0.5));
        assert_eq!(options.root_margin, "0px 0px 200px 0px");

        let options: LazyLoadOptions =
            serde_json::from_str(r#"{"threshold": [0.25, 0.75], "unknown": true}"#).unwrap();
        assert_eq!(options.threshold.trigger_ratio(), 0.25);
    }

    #[test]
    fn test_intersection_counts_edge_contact() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersection(&Rect::new(10.0, 0.0, 5.0, 5.0)).is_some());
        assert!(a.intersection(&Rect::new(11.0, 0.0, 5.0, 5.0)).is_none());
    }

    #[test]
    fn test_update_promotes_near_elements_once() {
        let container = Container::parse(
            "<img data-src=\"a.png\"><img data-src=\"b.png\"><img data-src=\"c.png\">",
        );
        let targets = images(&container);
        let layout = stacked(targets.clone());

        let mut observer = ProximityObserver::new(&LazyLoadOptions::default()).unwrap();
        for target in &targets {
            assert!(observer.observe(target.clone()));
        }
        assert!(!observer.observe(targets[0].clone()));

        // Viewport 0..800 plus the 200px bottom margin reaches y = 1000.
        let viewport = Rect::new(0.0, 0.0, 1280.0, 800.0);
        let promoted = observer.update(viewport, &layout);
        assert_eq!(promoted, targets[..2].to_vec());
        assert_eq!(targets[0].attr("src").as_deref(), Some("a.png"));
        assert!(!targets[0].has_attr(DATA_SRC));
        assert!(targets[2].has_attr(DATA_SRC));

        assert!(observer.update(viewport, &layout).is_empty());
        assert_eq!(observer.pending(), vec![targets[2].clone()]);
        assert_eq!(observer.state(&targets[0]), Some(TargetState::Activated));
    }

    #[test]
    fn test_threshold_requires_visible_share() {
        let container = Container::parse("<img data-src=\"a.png\">");
        let target = images(&container).remove(0);
        let options = LazyLoadOptions {
            root_margin: "0px".to_owned(),
            threshold: Threshold::Single(0.5),
        };
        let mut observer = ProximityObserver::new(&options).unwrap();
        observer.observe(target.clone());

        let layout = |_: &Element| Some(Rect::new(0.0, 70.0, 100.0, 100.0));
        assert!(observer.update(Rect::new(0.0, 0.0, 100.0, 100.0), &layout).is_empty());
        assert_eq!(observer.update(Rect::new(0.0, 30.0, 100.0, 100.0), &layout), vec![target]);
    }

    #[test]
    fn test_disconnect_stops_promotion() {
        let container = Container::parse("<img data-src=\"a.png\">");
        let target = images(&container).remove(0);

        let mut observer = ProximityObserver::new(&LazyLoadOptions::default()).unwrap();
        observer.observe(target.clone());
        observer.disconnect();
        observer.disconnect();

        assert!(!observer.trigger(&target));
        assert!(target.has_attr(DATA_SRC));
        assert!(!observer.observe(target));
    }

    #[test]
    fn test_promote_is_one_shot() {
        let container = Container::parse("<video data-src=\"v.mp4\"></video>");
        let video = &container.children()[0];
        assert!(promote(video));
        assert!(!promote(video));
        assert_eq!(video.attr("src").as_deref(), Some("v.mp4"));
    }
}
