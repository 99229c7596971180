use loading_core::{
    dom::{Document, Node, NodeRef},
    template, Loading, Options, Registry,
};
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};
use tracing_tree::HierarchicalLayer;

#[tracing::instrument(level = "info", skip(loading))]
fn report(label: &str, loading: &Loading<NodeRef>) {
    tracing::info!(
        active = loading.is_active(),
        stopped = loading.element().contains_class(&loading.classes().stop),
        attached = loading.element().parent().is_some(),
        "{label}"
    );
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            HierarchicalLayer::new(4)
                .with_thread_ids(false)
                .with_indent_lines(false)
                .with_verbose_entry(true)
                .with_verbose_exit(true),
        )
        .init();

    let registry = Registry::new();
    let document = Document::new();
    let body = document.body();

    let page = format!(
        "{}<main>{}</main>",
        template::overlay_markup(registry.classes()),
        template::LOADING_HTML
    );
    body.set_inner_html(&page)?;

    let options = Options::from_value(&json!({ "active": true }))?;
    let spinners = registry.init(&document.root(), options)?;
    tracing::info!("Initialized {} spinners", spinners.len());

    for loading in &spinners {
        report("initialized", loading);
    }

    let [overlay, plain] = spinners.as_slice() else {
        anyhow::bail!("Expected two spinners, found {}", spinners.len());
    };

    overlay.toggle()?;
    report("toggled", overlay);

    overlay.set_value(&json!(true))?;
    report("restarted", overlay);

    if let Err(err) = overlay.set_value(&json!("false")) {
        tracing::warn!("Rejected state: {err}");
    }

    overlay.end()?;
    overlay.handle_animation_end(&registry.classes().end_animation);
    report("finished", overlay);

    let again = registry.create(plain.element().clone(), Options::new(false))?;
    anyhow::ensure!(&again == plain, "Expected the live spinner to be reused");

    registry.release_all();
    tracing::info!(
        remaining = registry.len(),
        markup = document.query_selector("data-loading").is_some(),
        "Released spinners"
    );

    Ok(())
}
