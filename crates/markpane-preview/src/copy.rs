//! Copy buttons on fenced code blocks
//!
//! Each `.copy-button` is wired to the `<pre>` right before it. A click
//! writes the code's text to the clipboard and flags the button with
//! `copied` (or `copy-failed`) until the feedback expires.

use std::time::{Duration, Instant};

use markpane_parser::attrs::COPY_BUTTON_CLASS;
use tracing::{debug, warn};

use crate::dom::Element;
use crate::error::Result;

pub const COPIED_CLASS: &str = "copied";
pub const FAILED_CLASS: &str = "copy-failed";

/// How long click feedback stays on a button.
pub const FEEDBACK: Duration = Duration::from_secs(2);

/// The host's system clipboard.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// In-memory clipboard, for hosts without one and for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_owned());
        Ok(())
    }
}

#[derive(Debug)]
struct Handler {
    button: Element,
    code: Element,
    feedback_until: Option<Instant>,
}

/// Click handlers installed on the copy buttons of one container.
#[derive(Debug, Default)]
pub struct CopyButtons {
    handlers: Vec<Handler>,
}

impl CopyButtons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire `button` to its code block. Returns false if it is not a copy
    /// button, has no adjacent code, or is already wired.
    pub fn attach(&mut self, button: &Element) -> bool {
        if !button.has_class(COPY_BUTTON_CLASS) || self.is_wired(button) {
            return false;
        }
        let Some(code) = button
            .previous_element_sibling()
            .filter(|sibling| sibling.tag() == "pre")
        else {
            debug!(?button, "copy button without a code block");
            return false;
        };

        self.handlers.push(Handler {
            button: button.clone(),
            code,
            feedback_until: None,
        });
        true
    }

    pub fn is_wired(&self, button: &Element) -> bool {
        self.handlers.iter().any(|handler| &handler.button == button)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the click handler of `button`.
    ///
    /// Returns `Ok(false)` when no handler is installed on it. A clipboard
    /// failure still leaves `copy-failed` feedback on the button.
    pub fn click(
        &mut self,
        button: &Element,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Result<bool> {
        let Some(handler) = self.handlers.iter_mut().find(|h| &h.button == button) else {
            return Ok(false);
        };

        let result = clipboard.write_text(&handler.code.text_content());
        let (shown, hidden) = match &result {
            Ok(()) => (COPIED_CLASS, FAILED_CLASS),
            Err(err) => {
                warn!(error = %err, "copy to clipboard failed");
                (FAILED_CLASS, COPIED_CLASS)
            }
        };
        handler.button.remove_class(hidden);
        handler.button.add_class(shown);
        handler.feedback_until = Some(now + FEEDBACK);

        result.map(|()| true)
    }

    /// Clear feedback whose time is up.
    pub fn expire_feedback(&mut self, now: Instant) {
        for handler in &mut self.handlers {
            if handler.feedback_until.is_some_and(|until| until <= now) {
                clear_feedback(&handler.button);
                handler.feedback_until = None;
            }
        }
    }

    /// Remove every handler, clearing leftover feedback.
    pub fn detach_all(&mut self) {
        for handler in self.handlers.drain(..) {
            if handler.feedback_until.is_some() {
                clear_feedback(&handler.button);
            }
        }
    }
}

fn clear_feedback(button: &Element) {
    button.remove_class(COPIED_CLASS);
    button.remove_class(FAILED_CLASS);
}
