//! Public-facing crate root – re-exports + one-shot helper.

pub mod cli;
pub mod core;
pub mod render;

use std::sync::Arc;

pub use self::core::{
    config::{DispatchConfig, ParseOptions},
    data::{TypedTable, parse_typed},
    discovery::{Document, RenderTarget, collect_resources, discover},
    dispatch::{Dispatcher, NodeReport, NodeState},
    error::{AppError, DrawError, NodeError},
    fetch::{Fetcher, SourceFetcher},
    loader::RegistryLoader,
    parser::{RawTable, parse},
    registry::{Mount, RenderOptions, Renderer, RendererRegistry},
};

pub use render::{RenderStyle, builtin_registry, register_builtin};

/// Render every target in `doc` with the built-in renderers, fetching
/// sources relative to the document's base. `on_report` sees each node as
/// it finishes.
pub async fn render_document(
    doc: &Document,
    style: RenderStyle,
    config: DispatchConfig,
    on_report: impl FnMut(&NodeReport),
) -> Result<Vec<NodeReport>, AppError> {
    let targets = doc.discover();
    let resources = collect_resources(&targets);

    let registry = Arc::new(builtin_registry(style));
    let loader = Arc::new(RegistryLoader::new(Arc::clone(&registry)));
    let fetcher = Arc::new(SourceFetcher::new(&config, doc.base().cloned())?);

    let dispatcher = Dispatcher::new(registry, loader, fetcher, config);
    let handle = dispatcher.spawn(targets, &resources).await?;
    Ok(handle.join(on_report).await)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn renders_a_document_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::File::create(dir.path().join("parts.csv"))
            .unwrap()
            .write_all(b"part,qty:number\r\nbolt,12\r\nnut,3")
            .unwrap();
        let page = dir.path().join("page.html");
        std::fs::write(
            &page,
            r#"<div id="t" data-csv-props='{"csvSrc":"parts.csv","csvGvType":"text.Table","csvGvPackage":"text"}'></div>
               <div data-csv-props='{"csvSrc":"missing.csv","csvGvType":"text.Table","csvGvPackage":"text"}'></div>"#,
        )
        .unwrap();

        let doc = Document::open(&page).unwrap();
        let mut seen = 0;
        let reports = render_document(
            &doc,
            RenderStyle { color: false },
            DispatchConfig::default(),
            |_| seen += 1,
        )
        .await
        .unwrap();

        assert_eq!(seen, 2);
        let ok = reports.iter().find(|r| r.is_rendered()).unwrap();
        assert_eq!(ok.mount.id.as_deref(), Some("t"));
        assert!(ok.output.contains("│ bolt │  12 │"));
        let failed = reports.iter().find(|r| !r.is_rendered()).unwrap();
        assert!(failed.output.starts_with("⚠ node[1]"));
    }
}
