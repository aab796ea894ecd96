//! Display targets
//!
//! The engine never renders. It writes one formatted string per frame into a
//! [`DisplayTarget`] owned by the host, and may read the current string back
//! once at configure time to continue from whatever is already shown.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// A host text element that receives formatted frame values
pub trait DisplayTarget {
    fn set_text(&mut self, text: &str);

    /// Currently displayed text, if the host can report it
    fn text(&self) -> Option<String> {
        None
    }
}

impl<D: DisplayTarget + ?Sized> DisplayTarget for Box<D> {
    fn set_text(&mut self, text: &str) {
        (**self).set_text(text)
    }

    fn text(&self) -> Option<String> {
        (**self).text()
    }
}

impl<D: DisplayTarget + ?Sized> DisplayTarget for Rc<RefCell<D>> {
    fn set_text(&mut self, text: &str) {
        self.borrow_mut().set_text(text)
    }

    fn text(&self) -> Option<String> {
        self.borrow().text()
    }
}

impl<D: DisplayTarget + ?Sized> DisplayTarget for Arc<Mutex<D>> {
    fn set_text(&mut self, text: &str) {
        match self.lock() {
            Ok(mut target) => target.set_text(text),
            Err(_) => tracing::warn!("display target lock poisoned, dropping update"),
        }
    }

    fn text(&self) -> Option<String> {
        self.lock().ok().and_then(|target| target.text())
    }
}

/// In-memory text element that keeps every update it receives
#[derive(Clone, Debug, Default)]
pub struct Label {
    text: String,
    history: Vec<String>,
}

/// A label shared between the host and an engine
pub type SharedLabel = Rc<RefCell<Label>>;

impl Label {
    pub fn new() -> Self {
        Self::default()
    }

    /// A label already showing `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            history: Vec::new(),
        }
    }

    pub fn shared() -> SharedLabel {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Every string written since creation, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl DisplayTarget for Label {
    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.history.push(text.to_string());
    }

    fn text(&self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text.clone())
        }
    }
}

/// Resolves display targets by path, relative to some host scope
pub trait TargetScope<T> {
    fn find(&self, path: &str) -> Option<T>;
}

/// How a configure call names its target
#[derive(Clone, Debug)]
pub enum TargetRef<T> {
    /// Looked up in the engine's [`TargetScope`]
    Path(String),
    /// Used directly
    Handle(T),
}

impl<T> From<&str> for TargetRef<T> {
    fn from(path: &str) -> Self {
        TargetRef::Path(path.to_string())
    }
}

/// Path-keyed table of target handles
#[derive(Clone, Debug)]
pub struct TargetRegistry<T> {
    entries: FxHashMap<String, T>,
}

impl<T> TargetRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Register a handle under `path`, returning any handle it replaces
    pub fn insert(&mut self, path: impl Into<String>, target: T) -> Option<T> {
        self.entries.insert(normalize_path(&path.into()).to_string(), target)
    }

    pub fn remove(&mut self, path: &str) -> Option<T> {
        self.entries.remove(normalize_path(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for TargetRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TargetScope<T> for TargetRegistry<T> {
    fn find(&self, path: &str) -> Option<T> {
        self.entries.get(normalize_path(path)).cloned()
    }
}

/// Paths are relative: leading and trailing `/` are ignored
fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}
