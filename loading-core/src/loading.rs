use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

use serde_json::Value;

use crate::{
    dom::{self, Node},
    error::{Error, Result},
    options::type_name,
    Classes, Options,
};

pub(crate) type Instances<N> = RefCell<HashMap<<N as Node>::Id, Loading<N>>>;

struct Inner<N: Node> {
    element: N,
    classes: Rc<Classes>,
    active: Cell<bool>,
    released: Cell<bool>,
    /// Registry the instance was created through
    instances: Option<Weak<Instances<N>>>,
}

/// A spinner bound to a root element.
///
/// The active state is canonical; the element carries the [`stop`](Classes::stop) class exactly
/// when the spinner is inactive.
///
/// Cloning yields another handle to the same instance, and handles compare equal when they refer
/// to the same instance.
///
/// Once [released](Self::release) the instance is dead: mutating methods return
/// [`Error::Released`] without touching the DOM.
pub struct Loading<N: Node> {
    inner: Rc<Inner<N>>,
}

impl<N: Node> Clone for Loading<N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<N: Node> PartialEq for Loading<N> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<N: Node> Eq for Loading<N> {}

impl<N: Node> fmt::Debug for Loading<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loading")
            .field("element", &self.inner.element.id())
            .field("active", &self.inner.active.get())
            .field("released", &self.inner.released.get())
            .finish()
    }
}

impl<N: Node> Loading<N> {
    /// Creates a new spinner for `element` with the default class names.
    ///
    /// Fails if `element` is missing or is not an element node. Unlike
    /// [`Registry::create`](crate::Registry::create) this always creates a new instance.
    pub fn new(element: impl Into<Option<N>>, options: Options) -> Result<Self> {
        Self::with_classes(element, options, Classes::default())
    }

    pub fn with_classes(
        element: impl Into<Option<N>>,
        options: Options,
        classes: Classes,
    ) -> Result<Self> {
        let loading = Self::build(element.into(), options, Rc::new(classes), None)?;
        loading.sync();
        Ok(loading)
    }

    /// Validates the element and creates the instance without touching the DOM
    pub(crate) fn build(
        element: Option<N>,
        options: Options,
        classes: Rc<Classes>,
        instances: Option<Weak<Instances<N>>>,
    ) -> Result<Self> {
        let element = element.ok_or(Error::MissingElement)?;
        if !dom::is_element(&element) {
            return Err(Error::InvalidElement(element.node_type()));
        }

        let active = options.resolve_active();
        tracing::debug!(element = ?element.id(), active, "Creating spinner");

        Ok(Self {
            inner: Rc::new(Inner {
                element,
                classes,
                active: Cell::new(active),
                released: Cell::new(false),
                instances,
            }),
        })
    }

    /// Returns the root element
    pub fn element(&self) -> &N {
        &self.inner.element
    }

    pub fn classes(&self) -> &Classes {
        &self.inner.classes
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.get()
    }

    /// Sets the active state and returns the instance for chaining
    pub fn set(&self, active: bool) -> Result<&Self> {
        self.ensure_live()?;

        if self.inner.active.replace(active) != active {
            tracing::debug!(element = ?self.inner.element.id(), active, "Changed state");
        }

        self.sync();
        Ok(self)
    }

    /// Sets the state from a host supplied value.
    ///
    /// Only booleans are accepted; `null` stands for a missing argument. The state is left
    /// unchanged on error.
    pub fn set_value(&self, value: &Value) -> Result<&Self> {
        match value {
            Value::Bool(active) => self.set(*active),
            other => Err(Error::InvalidStateArgument {
                found: type_name(other),
            }),
        }
    }

    pub fn toggle(&self) -> Result<&Self> {
        self.set(!self.is_active())
    }

    /// Stops the spinner
    pub fn end(&self) -> Result<&Self> {
        self.set(false)
    }

    /// Removes the root element from its parent.
    ///
    /// Does nothing if the element is already detached.
    pub fn delete_element(&self) {
        let element = &self.inner.element;

        match element.parent() {
            Some(parent) => {
                parent.remove_child(element);
                tracing::debug!(element = ?element.id(), "Removed spinner element");
            }
            None => tracing::trace!(element = ?element.id(), "Spinner element already detached"),
        }
    }

    /// Notifies the spinner that an animation on its element has finished.
    ///
    /// Deletes the element once the end animation of a stopped spinner has run. Returns `true` if
    /// the element was deleted.
    pub fn handle_animation_end(&self, animation_name: &str) -> bool {
        if self.is_active() || animation_name != self.inner.classes.end_animation {
            return false;
        }

        self.delete_element();
        true
    }

    /// Deregisters the instance and removes its element from the DOM.
    ///
    /// Releasing more than once does nothing.
    pub fn release(&self) {
        if self.inner.released.replace(true) {
            return;
        }

        let id = self.inner.element.id();
        if let Some(instances) = self.inner.instances.as_ref().and_then(Weak::upgrade) {
            let removed = {
                let mut instances = instances.borrow_mut();
                // A stale handle must not deregister its successor
                if instances.get(&id).is_some_and(|current| current == self) {
                    instances.remove(&id)
                } else {
                    None
                }
            };

            if removed.is_some() {
                tracing::debug!(element = ?id, "Deregistered spinner");
            }
        }

        self.delete_element();
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_released() {
            tracing::warn!(element = ?self.inner.element.id(), "Spinner has been released");
            return Err(Error::Released);
        }

        Ok(())
    }

    /// Reflects the active state onto the element and its overlay
    pub(crate) fn sync(&self) {
        let stopped = !self.is_active();
        let element = &self.inner.element;
        let classes = &self.inner.classes;

        tracing::trace!(element = ?element.id(), stopped, "Syncing classes");
        element.toggle_class(&classes.stop, stopped);

        if let Some(overlay) = element
            .parent()
            .filter(|parent| parent.contains_class(&classes.overlay))
        {
            overlay.toggle_class(&classes.overlay_stop, stopped);
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::{
        dom::{Document, NodeRef},
        template::{overlay_markup, LOADING_HTML},
        test_util::init_tracing,
    };

    fn stop_class() -> String {
        Classes::default().stop
    }

    fn spinner() -> Loading<NodeRef> {
        init_tracing();
        Loading::new(Document::new().create_element("div"), Options::default()).unwrap()
    }

    /// Mounts the spinner template within a wrapper attached to the body
    fn mounted() -> (Document, NodeRef, Loading<NodeRef>) {
        init_tracing();
        let document = Document::new();
        let wrapper = document.create_element("div");
        wrapper.set_inner_html(LOADING_HTML).unwrap();
        document.body().append_child(&wrapper).unwrap();

        let element = document.query_selector("data-loading").unwrap();
        let loading = Loading::new(element, Options::default()).unwrap();
        (document, wrapper, loading)
    }

    #[test]
    fn requires_element() {
        assert!(matches!(
            Loading::<NodeRef>::new(None, Options::default()),
            Err(Error::MissingElement)
        ));
    }

    #[test]
    fn rejects_non_elements() {
        let document = Document::new();

        assert!(matches!(
            Loading::new(document.create_text_node(""), Options::default()),
            Err(Error::InvalidElement(dom::NodeType::Text))
        ));
        assert!(matches!(
            Loading::new(document.root(), Options::default()),
            Err(Error::InvalidElement(dom::NodeType::Document))
        ));
    }

    #[test]
    fn defaults_to_active() {
        let loading = spinner();

        assert!(loading.is_active());
        assert!(!loading.element().contains_class(&stop_class()));
    }

    #[test]
    fn accepts_options() {
        let loading =
            Loading::new(Document::new().create_element("div"), Options::new(false)).unwrap();

        assert!(!loading.is_active());
        assert!(loading.element().contains_class(&stop_class()));
    }

    #[test]
    fn set_state() {
        let loading = spinner();

        loading.set(true).unwrap();
        assert!(loading.is_active());
        loading.set(false).unwrap();
        assert!(!loading.is_active());
    }

    #[test]
    fn set_returns_self() {
        let loading = spinner();

        assert_eq!(loading.set(true).unwrap(), &loading);
        assert!(!loading.set(false).unwrap().toggle().unwrap().end().unwrap().is_active());
    }

    #[test]
    fn set_syncs_stop_class() {
        let loading = spinner();
        let stop = stop_class();

        loading.set(false).unwrap();
        assert!(loading.element().contains_class(&stop), "Class for stopped state");

        loading.set(false).unwrap();
        assert!(loading.element().contains_class(&stop));

        loading.set(true).unwrap();
        assert!(!loading.element().contains_class(&stop), "Class for started state");

        loading.set(true).unwrap();
        assert!(!loading.element().contains_class(&stop));
    }

    #[test]
    fn set_value_requires_boolean() {
        let loading = spinner();

        assert!(matches!(
            loading.set_value(&Value::Null),
            Err(Error::InvalidStateArgument { found: "null" })
        ));
        assert!(matches!(
            loading.set_value(&json!("true")),
            Err(Error::InvalidStateArgument { found: "a string" })
        ));
        assert!(matches!(
            loading.set_value(&json!(0)),
            Err(Error::InvalidStateArgument { .. })
        ));

        assert!(loading.is_active());
        assert!(!loading.element().contains_class(&stop_class()));

        loading.set_value(&json!(false)).unwrap();
        assert!(!loading.is_active());
    }

    #[test]
    fn toggle() {
        let loading = spinner();

        loading.toggle().unwrap();
        assert!(!loading.is_active());
        assert!(loading.element().contains_class(&stop_class()));

        loading.toggle().unwrap();
        assert!(loading.is_active());
        assert!(!loading.element().contains_class(&stop_class()));
    }

    #[test]
    fn end() {
        let (_document, wrapper, loading) = mounted();

        loading.end().unwrap();
        assert!(!loading.is_active());

        loading.end().unwrap();
        assert!(!loading.is_active());
        assert!(loading.element().contains_class(&stop_class()));

        loading.release();
        wrapper.parent().unwrap().remove_child(&wrapper);
    }

    #[test]
    fn delete_element() {
        let (document, wrapper, loading) = mounted();

        loading.delete_element();
        assert!(document.query_selector("data-loading").is_none());
        assert!(dom::query(&wrapper, "data-loading").is_none());
        assert_eq!(loading.element().parent(), None);

        loading.delete_element();

        loading.release();
        assert!(document.body().remove_child(&wrapper));
    }

    #[test]
    fn delete_detached() {
        let loading = spinner();

        loading.delete_element();
        loading.release();
        loading.release();
        assert!(loading.is_released());
    }

    #[test]
    fn release_removes_element() {
        let (document, _wrapper, loading) = mounted();

        loading.release();
        assert!(document.query_selector("data-loading").is_none());
    }

    #[test]
    fn released_rejects_mutation() {
        let loading = spinner();
        loading.set(false).unwrap();
        loading.release();

        assert!(matches!(loading.set(true), Err(Error::Released)));
        assert!(matches!(loading.toggle(), Err(Error::Released)));
        assert!(matches!(loading.end(), Err(Error::Released)));
        assert!(matches!(loading.set_value(&json!(true)), Err(Error::Released)));

        assert!(!loading.is_active());
        assert!(loading.element().contains_class(&stop_class()));
    }

    #[test]
    fn overlay_mirrors_state() {
        init_tracing();
        let classes = Classes::default();
        let document = Document::new();
        document
            .body()
            .set_inner_html(&overlay_markup(&classes))
            .unwrap();

        let element = document.query_selector(&classes.selector_init).unwrap();
        let overlay = element.parent().unwrap();

        let loading = Loading::new(element, Options::new(false)).unwrap();
        assert!(overlay.contains_class(&classes.overlay_stop));

        loading.set(true).unwrap();
        assert!(!overlay.contains_class(&classes.overlay_stop));
    }

    #[test]
    fn animation_end_deletes_stopped() {
        let (document, _wrapper, loading) = mounted();

        assert!(!loading.handle_animation_end("rotate-end-p2"));
        assert!(document.query_selector("data-loading").is_some());

        loading.end().unwrap();
        assert!(!loading.handle_animation_end("rotate"));
        assert!(document.query_selector("data-loading").is_some());

        assert!(loading.handle_animation_end("rotate-end-p2"));
        assert!(document.query_selector("data-loading").is_none());
    }

    #[test]
    fn custom_classes() {
        let classes = Classes::with_prefix("cds");
        let loading = Loading::with_classes(
            Document::new().create_element("div"),
            Options::new(false),
            classes,
        )
        .unwrap();

        assert!(loading.element().contains_class("cds--loading--stop"));
        assert!(!loading.element().contains_class(&stop_class()));
    }

    #[test]
    fn handles_share_state() {
        let loading = spinner();
        let other = loading.clone();

        other.end().unwrap();
        assert_eq!(loading, other);
        assert!(!loading.is_active());

        let distinct = spinner();
        assert_ne!(loading, distinct);
    }
}
