//! A loading spinner widget bound to a DOM element.
//!
//! The DOM is abstracted by the [`dom::Node`] trait. [`dom::Document`] is an in-memory
//! implementation suitable for tests and headless rendering.

mod classes;
pub mod dom;
mod error;
mod loading;
mod options;
mod registry;
pub mod template;

pub use classes::*;
pub use error::*;
pub use loading::*;
pub use options::*;
pub use registry::*;

#[cfg(test)]
pub(crate) mod test_util {
    use tracing_subscriber::prelude::*;
    use tracing_tree::HierarchicalLayer;

    /// Installs a subscriber for the test. Subsequent calls do nothing.
    pub fn init_tracing() {
        let _ = tracing_subscriber::registry()
            .with(
                HierarchicalLayer::new(4)
                    .with_thread_ids(false)
                    .with_indent_lines(true),
            )
            .try_init();
    }
}
