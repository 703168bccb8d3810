//! Activation of a rendered preview container
//!
//! [`activate`] scans the container once and installs everything the
//! rendered markdown needs at runtime: the proximity observer for deferred
//! media and the copy button handlers. The returned [`Activation`] must be
//! torn down before the container's content is removed or replaced.

use std::time::Instant;

use markpane_parser::attrs::{COPY_BUTTON_CLASS, DATA_SRC};
use tracing::{debug, warn};

use crate::copy::{Clipboard, CopyButtons};
use crate::dom::{Container, Element};
use crate::error::Result;
use crate::lazy::{Layout, LazyLoadOptions, ProximityObserver, Rect};
use crate::sync::SourceMap;

/// Handlers installed on one container.
#[derive(Debug)]
pub struct Activation {
    observer: ProximityObserver,
    copy: CopyButtons,
    active: bool,
}

/// Scan `container` and install lazy loading and copy handlers.
pub fn activate(container: &Container, options: &LazyLoadOptions) -> Result<Activation> {
    let mut observer = ProximityObserver::new(options)?;
    let mut copy = CopyButtons::new();

    let mut deferred = 0;
    for element in container.descendants() {
        if element.has_class(COPY_BUTTON_CLASS) {
            copy.attach(&element);
        }
        if element.has_attr(DATA_SRC) && observer.observe(element) {
            deferred += 1;
        }
    }

    debug!(deferred, copy_buttons = copy.len(), "preview activated");
    Ok(Activation {
        observer,
        copy,
        active: true,
    })
}

impl Activation {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deferred elements not activated yet.
    pub fn pending(&self) -> Vec<Element> {
        self.observer.pending()
    }

    pub fn copy_buttons(&self) -> usize {
        self.copy.len()
    }

    /// Report the current viewport; activates what came close to it.
    pub fn update(&mut self, viewport: Rect, layout: &dyn Layout) -> Vec<Element> {
        self.observer.update(viewport, layout)
    }

    /// Proximity callback for a single element.
    pub fn trigger(&mut self, element: &Element) -> bool {
        self.observer.trigger(element)
    }

    pub fn click(
        &mut self,
        button: &Element,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Result<bool> {
        self.copy.click(button, clipboard, now)
    }

    pub fn expire_feedback(&mut self, now: Instant) {
        self.copy.expire_feedback(now);
    }

    /// Disconnect the observer and remove the click handlers. Idempotent.
    pub fn teardown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.observer.disconnect();
        self.copy.detach_all();
        debug!("preview activation torn down");
    }
}

impl Drop for Activation {
    fn drop(&mut self) {
        if self.active {
            warn!("preview activation dropped without teardown");
            self.teardown();
        }
    }
}

/// A container together with its current activation.
///
/// Replacing the content tears the previous activation down before the new
/// content is scanned, so no handler outlives the markup it was installed
/// on.
#[derive(Debug)]
pub struct Preview {
    options: LazyLoadOptions,
    container: Container,
    activation: Option<Activation>,
    source_map: SourceMap,
}

impl Preview {
    pub fn new(options: LazyLoadOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            container: Container::parse(""),
            activation: None,
            source_map: SourceMap::default(),
        })
    }

    /// Replace the rendered content and activate it.
    pub fn set_html(&mut self, html: &str) -> Result<()> {
        if let Some(mut previous) = self.activation.take() {
            previous.teardown();
        }
        self.container = Container::parse(html);
        self.source_map = SourceMap::from_container(&self.container);
        self.activation = Some(activate(&self.container, &self.options)?);
        Ok(())
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn activation_mut(&mut self) -> Option<&mut Activation> {
        self.activation.as_mut()
    }

    /// Tear down the current activation, e.g. when the preview unmounts.
    pub fn close(&mut self) {
        if let Some(mut activation) = self.activation.take() {
            activation.teardown();
        }
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        self.close();
    }
}
