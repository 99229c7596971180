use std::{collections::hash_map::Entry, fmt, rc::Rc};

use crate::{
    dom::{self, Node, NodeType},
    error::{Error, Result},
    loading::Instances,
    Classes, Loading, Options,
};

/// Keeps at most one live [`Loading`] per element.
///
/// Instances created through the registry deregister themselves when released, after which
/// [`create`](Self::create) produces a new instance for the same element.
pub struct Registry<N: Node> {
    instances: Rc<Instances<N>>,
    classes: Rc<Classes>,
}

impl<N: Node> fmt::Debug for Registry<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("instances", &self.len())
            .field("classes", &self.classes)
            .finish()
    }
}

impl<N: Node> Default for Registry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node> Registry<N> {
    pub fn new() -> Self {
        Self::with_classes(Classes::default())
    }

    /// Creates a registry whose instances use `classes`
    pub fn with_classes(classes: Classes) -> Self {
        Self {
            instances: Default::default(),
            classes: Rc::new(classes),
        }
    }

    pub fn classes(&self) -> &Classes {
        &self.classes
    }

    /// Returns the live instance for `element`, or creates one.
    ///
    /// `options` only apply when a new instance is created.
    pub fn create(&self, element: impl Into<Option<N>>, options: Options) -> Result<Loading<N>> {
        let element = element.into().ok_or(Error::MissingElement)?;

        if let Some(existing) = self.get(&element) {
            tracing::debug!(element = ?element.id(), "Reusing spinner");
            return Ok(existing);
        }

        let loading = Loading::build(
            Some(element),
            options,
            self.classes.clone(),
            Some(Rc::downgrade(&self.instances)),
        )?;

        // Registered before the DOM is touched, so a host callback re-entering `create` observes
        // this instance
        match self.instances.borrow_mut().entry(loading.element().id()) {
            Entry::Occupied(slot) => return Ok(slot.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(loading.clone());
            }
        }

        loading.sync();
        Ok(loading)
    }

    /// Returns the live instance bound to `element`
    pub fn get(&self, element: &N) -> Option<Loading<N>> {
        self.instances.borrow().get(&element.id()).cloned()
    }

    pub fn contains(&self, element: &N) -> bool {
        self.instances.borrow().contains_key(&element.id())
    }

    pub fn len(&self) -> usize {
        self.instances.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.borrow().is_empty()
    }

    /// Creates instances for every spinner element within `target`.
    ///
    /// If `target` is itself a spinner element only that element is initialized.
    pub fn init(&self, target: &N, options: Options) -> Result<Vec<Loading<N>>> {
        let attribute = &self.classes.selector_init;

        match target.node_type() {
            NodeType::Element if dom::is_element(target) && target.has_attribute(attribute) => {
                Ok(vec![self.create(target.clone(), options)?])
            }
            NodeType::Element | NodeType::Document | NodeType::DocumentFragment => {
                let found = dom::query_all(target, attribute);
                tracing::debug!(count = found.len(), "Initializing spinners");

                found
                    .into_iter()
                    .map(|element| self.create(element, options))
                    .collect()
            }
            node_type => Err(Error::InvalidElement(node_type)),
        }
    }

    /// Releases all live instances
    pub fn release_all(&self) {
        let instances = self
            .instances
            .borrow()
            .values()
            .cloned()
            .collect::<Vec<_>>();

        for loading in instances {
            loading.release();
        }
    }
}
