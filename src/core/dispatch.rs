//! Two-phase render dispatch.
//!
//! 1. **Load**: one `ResourceLoader::load` call for the whole resource set;
//!    nothing is fetched until its readiness signal opens.
//! 2. **Ready**: every target runs as its own task
//!    `Discovered → Fetching → Parsed → Resolved → Rendered`, or ends in
//!    `Failed`. Failures stay with their node; reports arrive in completion
//!    order, not discovery order.

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
    time::Duration,
};

use tokio::{
    sync::watch,
    task::{self, JoinSet},
};
use tracing::{debug, error, info};

use crate::core::{
    config::DispatchConfig,
    data::parse_typed,
    discovery::{MountPoint, RenderNodeConfig, RenderTarget, ResourceSet},
    error::{DispatchError, FetchError, NodeError},
    fetch::Fetcher,
    loader::ResourceLoader,
    registry::{Mount, RendererRegistry},
};

/// Where a node's pipeline currently is.
#[derive(Debug)]
pub enum NodeState {
    Discovered,
    Fetching,
    Parsed,
    Resolved,
    Rendered,
    Failed(NodeError),
}

impl NodeState {
    const fn label(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Fetching => "fetching",
            Self::Parsed => "parsed",
            Self::Resolved => "resolved",
            Self::Rendered => "rendered",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "failed: {e}"),
            s => f.write_str(s.label()),
        }
    }
}

/// Final outcome of one node.
#[derive(Debug)]
pub struct NodeReport {
    pub mount: MountPoint,
    pub state: NodeState,
    /// What the mount surface shows: the drawing, or an error marker.
    pub output: String,
}

impl NodeReport {
    #[inline]
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self.state, NodeState::Rendered)
    }

    #[must_use]
    pub fn error(&self) -> Option<&NodeError> {
        match &self.state {
            NodeState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Per-node cancellation, shareable across tasks.
#[derive(Debug, Clone, Default)]
pub struct Canceller {
    nodes: Arc<Vec<(usize, watch::Sender<bool>)>>,
}

impl Canceller {
    /// Cancel the node with document index `index`. False if no such node.
    pub fn cancel(&self, index: usize) -> bool {
        let hit = self.nodes.iter().find(|(i, _)| *i == index);
        if let Some((_, tx)) = hit {
            tx.send_replace(true);
        }
        hit.is_some()
    }

    pub fn cancel_all(&self) {
        for (_, tx) in self.nodes.iter() {
            tx.send_replace(true);
        }
    }
}

/// Running ready phase.
pub struct RunHandle {
    tasks: JoinSet<NodeReport>,
    mounts: HashMap<task::Id, MountPoint>,
    canceller: Canceller,
}

impl RunHandle {
    #[must_use]
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    pub fn cancel(&self, index: usize) -> bool {
        self.canceller.cancel(index)
    }

    pub fn cancel_all(&self) {
        self.canceller.cancel_all();
    }

    /// Wait for every node; `on_report` sees each report as it completes.
    pub async fn join(mut self, mut on_report: impl FnMut(&NodeReport)) -> Vec<NodeReport> {
        let mut reports = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(report) => {
                    on_report(&report);
                    reports.push(report);
                }
                Err(e) => {
                    let Some(point) = self.mounts.remove(&e.id()) else {
                        error!(error = %e, "unknown render task aborted");
                        continue;
                    };
                    let report = aborted(point, e);
                    on_report(&report);
                    reports.push(report);
                }
            }
        }
        reports
    }
}

pub struct Dispatcher {
    registry: Arc<RendererRegistry>,
    loader: Arc<dyn ResourceLoader>,
    fetcher: Arc<dyn Fetcher>,
    config: DispatchConfig,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        registry: Arc<RendererRegistry>,
        loader: Arc<dyn ResourceLoader>,
        fetcher: Arc<dyn Fetcher>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            loader,
            fetcher,
            config,
        }
    }

    /// Load phase, then start one task per target.
    pub async fn spawn(
        &self,
        targets: Vec<RenderTarget>,
        resources: &ResourceSet,
    ) -> Result<RunHandle, DispatchError> {
        info!(packages = resources.len(), "loading renderer packages");
        self.loader.load(resources).wait().await?;
        info!(targets = targets.len(), "renderer packages ready, dispatching");

        let mut tasks = JoinSet::new();
        let mut mounts = HashMap::with_capacity(targets.len());
        let mut cancels = Vec::with_capacity(targets.len());
        for target in targets {
            let (tx, rx) = watch::channel(false);
            cancels.push((target.mount.index, tx));
            let node = NodeTask {
                registry: Arc::clone(&self.registry),
                fetcher: Arc::clone(&self.fetcher),
                timeout: self.config.fetch_timeout,
                target,
            };
            let point = node.target.mount.clone();
            mounts.insert(tasks.spawn(node.run(rx)).id(), point);
        }
        Ok(RunHandle {
            tasks,
            mounts,
            canceller: Canceller {
                nodes: Arc::new(cancels),
            },
        })
    }

    /// `spawn` + `join`, reports in completion order.
    pub async fn run(
        &self,
        targets: Vec<RenderTarget>,
        resources: &ResourceSet,
    ) -> Result<Vec<NodeReport>, DispatchError> {
        Ok(self.spawn(targets, resources).await?.join(|_| {}).await)
    }
}

struct NodeTask {
    registry: Arc<RendererRegistry>,
    fetcher: Arc<dyn Fetcher>,
    timeout: Duration,
    target: RenderTarget,
}

impl NodeTask {
    async fn run(self, cancel: watch::Receiver<bool>) -> NodeReport {
        let mount = Mount::new(self.target.mount.clone());
        let mut state = NodeState::Discovered;

        let outcome = tokio::select! {
            r = self.pipeline(&self.target.config, &mount, &mut state) => r,
            () = cancelled(cancel) => Err(NodeError::Cancelled),
        };

        let point = mount.point;
        match outcome {
            Ok(()) => {
                info!(node = %point, "rendered");
                NodeReport {
                    mount: point,
                    state: NodeState::Rendered,
                    output: mount.surface.contents(),
                }
            }
            Err(e) => {
                error!(node = %point, stage = state.label(), error = %e, "render target failed");
                let marker = format!("⚠ {point}: {e}");
                mount.surface.paint(marker.clone());
                NodeReport {
                    mount: point,
                    state: NodeState::Failed(e),
                    output: marker,
                }
            }
        }
    }

    async fn pipeline(
        &self,
        config: &RenderNodeConfig,
        mount: &Mount,
        state: &mut NodeState,
    ) -> Result<(), NodeError> {
        advance(state, NodeState::Fetching, &mount.point);
        let text = tokio::time::timeout(self.timeout, self.fetcher.fetch(&config.src))
            .await
            .map_err(|_| FetchError::TimedOut(self.timeout))??;

        let table = parse_typed(&text, &config.parse);
        advance(state, NodeState::Parsed, &mount.point);

        let mut renderer = self.registry.resolve(&config.renderer, mount.clone())?;
        advance(state, NodeState::Resolved, &mount.point);

        catch_unwind(AssertUnwindSafe(|| renderer.draw(&table, &config.options)))
            .map_err(|p| NodeError::Panicked(panic_message(p.as_ref())))??;
        Ok(())
    }
}

/// Report for a task that died outside the guarded draw call.
fn aborted(point: MountPoint, e: task::JoinError) -> NodeReport {
    let error = if e.is_panic() {
        NodeError::Panicked(panic_message(e.into_panic().as_ref()))
    } else {
        NodeError::Cancelled
    };
    error!(node = %point, error = %error, "render task aborted");
    NodeReport {
        output: format!("⚠ {point}: {error}"),
        mount: point,
        state: NodeState::Failed(error),
    }
}

fn advance(state: &mut NodeState, next: NodeState, node: &MountPoint) {
    debug!(node = %node, from = state.label(), to = next.label(), "node state");
    *state = next;
}

/// Resolves once the flag turns true; never if the sender goes away first.
async fn cancelled(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::core::{
        data::TypedTable,
        error::{DrawError, LoadError, ResolveError},
        fetch::MemoryFetcher,
        loader::{Ready, RegistryLoader},
        registry::{RenderOptions, Renderer},
    };

    /// Paints `<rows>x<cols> <title option>`.
    struct Summary(Mount);

    impl Renderer for Summary {
        fn draw(&mut self, table: &TypedTable, options: &RenderOptions) -> Result<(), DrawError> {
            let title = options.get("title").and_then(|v| v.as_str()).unwrap_or("");
            self.0
                .surface
                .paint(format!("{}x{} {title}", table.rows.len(), table.width()));
            Ok(())
        }
    }

    struct Broken;

    impl Renderer for Broken {
        fn draw(&mut self, _: &TypedTable, options: &RenderOptions) -> Result<(), DrawError> {
            if options.contains_key("panic") {
                panic!("boom");
            }
            Err(DrawError::EmptyData)
        }
    }

    fn registry() -> Arc<RendererRegistry> {
        let mut reg = RendererRegistry::new();
        reg.register("t.Summary", Summary);
        reg.register("t.Broken", |_: Mount| Broken);
        Arc::new(reg)
    }

    fn target(index: usize, props: serde_json::Value) -> RenderTarget {
        let serde_json::Value::Object(map) = props else {
            panic!("props must be an object");
        };
        RenderTarget {
            mount: MountPoint { index, id: Some(format!("n{index}")) },
            config: RenderNodeConfig::from_map(map).unwrap(),
        }
    }

    fn dispatcher(fetcher: impl Fetcher + 'static) -> Dispatcher {
        let reg = registry();
        Dispatcher::new(
            Arc::clone(&reg),
            Arc::new(RegistryLoader::new(reg)),
            Arc::new(fetcher),
            DispatchConfig::default().fetch_timeout(Duration::from_millis(200)),
        )
    }

    fn by_index(reports: &[NodeReport], index: usize) -> &NodeReport {
        reports.iter().find(|r| r.mount.index == index).unwrap()
    }

    #[tokio::test]
    async fn failed_fetch_does_not_block_siblings() {
        let fetcher = MemoryFetcher::new().with("good.csv", "a:number,b\r\n1,x\r\n2,y\r\n");
        let targets = vec![
            target(0, json!({"csvSrc": "missing.csv", "csvGvType": "t.Summary"})),
            target(1, json!({"csvSrc": "good.csv", "csvGvType": "t.Summary", "title": "ok"})),
        ];
        let reports = dispatcher(fetcher)
            .run(targets, &ResourceSet::default())
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        let good = by_index(&reports, 1);
        assert!(good.is_rendered());
        assert_eq!(good.output, "2x2 ok");

        let bad = by_index(&reports, 0);
        assert!(matches!(bad.error(), Some(NodeError::Fetch(FetchError::NotFound(_)))));
        assert!(bad.output.starts_with("⚠ #n0"));
    }

    #[tokio::test]
    async fn resolution_and_draw_failures_are_isolated() {
        let fetcher = MemoryFetcher::new().with("a.csv", "x\r\n1");
        let targets = vec![
            target(0, json!({"csvSrc": "a.csv", "csvGvType": "t.Nope"})),
            target(1, json!({"csvSrc": "a.csv", "csvGvType": "t.Broken"})),
            target(2, json!({"csvSrc": "a.csv", "csvGvType": "t.Broken", "panic": true})),
            target(3, json!({"csvSrc": "a.csv", "csvGvType": "t.Summary"})),
        ];
        let reports = dispatcher(fetcher)
            .run(targets, &ResourceSet::default())
            .await
            .unwrap();

        assert!(matches!(
            by_index(&reports, 0).error(),
            Some(NodeError::Resolve(ResolveError::NotFound { name })) if name == "t.Nope"
        ));
        assert!(matches!(
            by_index(&reports, 1).error(),
            Some(NodeError::Draw(DrawError::EmptyData))
        ));
        assert!(matches!(
            by_index(&reports, 2).error(),
            Some(NodeError::Panicked(m)) if m == "boom"
        ));
        assert!(by_index(&reports, 3).is_rendered());
    }

    #[tokio::test]
    async fn unknown_package_stops_before_any_fetch() {
        struct CountingFetcher(Mutex<usize>);

        #[async_trait]
        impl Fetcher for CountingFetcher {
            async fn fetch(&self, _: &str) -> Result<String, FetchError> {
                *self.0.lock().unwrap() += 1;
                Ok(String::new())
            }
        }

        let fetcher = Arc::new(CountingFetcher(Mutex::new(0)));
        let reg = registry();
        let d = Dispatcher::new(
            Arc::clone(&reg),
            Arc::new(RegistryLoader::new(reg)),
            fetcher.clone(),
            DispatchConfig::default(),
        );
        let targets = vec![target(0, json!({"csvSrc": "a", "csvGvType": "t.Summary", "csvGvPackage": "vendor"}))];
        let resources = crate::core::discovery::collect_resources(&targets);
        let err = d.run(targets, &resources).await.unwrap_err();

        assert!(matches!(err, DispatchError::Load(LoadError::UnknownPackage(p)) if p == "vendor"));
        assert_eq!(*fetcher.0.lock().unwrap(), 0);
    }

    /// Answers after a per-locator delay.
    struct SlowFetcher;

    #[async_trait]
    impl Fetcher for SlowFetcher {
        async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
            let ms: u64 = locator.parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(format!("v:number\r\n{ms}"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reports_arrive_in_completion_order() {
        let targets = vec![
            target(0, json!({"csvSrc": "150", "csvGvType": "t.Summary"})),
            target(1, json!({"csvSrc": "10", "csvGvType": "t.Summary"})),
            target(2, json!({"csvSrc": "80", "csvGvType": "t.Summary"})),
        ];
        let order = dispatcher(SlowFetcher)
            .run(targets, &ResourceSet::default())
            .await
            .unwrap()
            .iter()
            .map(|r| r.mount.index)
            .collect::<Vec<_>>();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out_alone() {
        let targets = vec![
            target(0, json!({"csvSrc": "5000", "csvGvType": "t.Summary"})),
            target(1, json!({"csvSrc": "5", "csvGvType": "t.Summary"})),
        ];
        let reports = dispatcher(SlowFetcher)
            .run(targets, &ResourceSet::default())
            .await
            .unwrap();
        assert!(matches!(
            by_index(&reports, 0).error(),
            Some(NodeError::Fetch(FetchError::TimedOut(_)))
        ));
        assert!(by_index(&reports, 1).is_rendered());
    }

    #[tokio::test(start_paused = true)]
    async fn single_node_can_be_cancelled() {
        let d = Dispatcher::new(
            registry(),
            Arc::new(NoopLoader),
            Arc::new(SlowFetcher),
            DispatchConfig::default().fetch_timeout(Duration::from_secs(60)),
        );
        let targets = vec![
            target(0, json!({"csvSrc": "30000", "csvGvType": "t.Summary"})),
            target(1, json!({"csvSrc": "5", "csvGvType": "t.Summary"})),
        ];
        let handle = d.spawn(targets, &ResourceSet::default()).await.unwrap();
        assert!(handle.cancel(0));
        assert!(!handle.cancel(7));

        let mut seen = Vec::new();
        let reports = handle.join(|r| seen.push(r.mount.index)).await;
        assert!(matches!(by_index(&reports, 0).error(), Some(NodeError::Cancelled)));
        assert!(by_index(&reports, 1).is_rendered());
        assert_eq!(seen.len(), 2);
    }

    struct PanickingFetcher;

    #[async_trait]
    impl Fetcher for PanickingFetcher {
        async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
            if locator == "bad" {
                panic!("fetcher exploded");
            }
            Ok("x\r\n1".to_owned())
        }
    }

    #[tokio::test]
    async fn panicking_fetch_still_reports_its_node() {
        let targets = vec![
            target(0, json!({"csvSrc": "bad", "csvGvType": "t.Summary"})),
            target(1, json!({"csvSrc": "good", "csvGvType": "t.Summary"})),
        ];
        let mut seen = Vec::new();
        let reports = dispatcher(PanickingFetcher)
            .spawn(targets, &ResourceSet::default())
            .await
            .unwrap()
            .join(|r| seen.push(r.mount.index))
            .await;

        assert_eq!(reports.len(), 2);
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1]);
        let bad = by_index(&reports, 0);
        assert!(matches!(bad.error(), Some(NodeError::Panicked(m)) if m == "fetcher exploded"));
        assert!(bad.output.starts_with("⚠ #n0"));
        assert!(by_index(&reports, 1).is_rendered());
    }

    struct NoopLoader;

    impl ResourceLoader for NoopLoader {
        fn load(&self, _: &ResourceSet) -> Ready {
            Ready::resolved(Ok(()))
        }
    }

    #[tokio::test]
    async fn node_parse_options_are_honoured() {
        let fetcher = MemoryFetcher::new().with("semi.csv", "a:number;b\n1;x\n");
        let targets = vec![target(
            0,
            json!({
                "csvSrc": "semi.csv",
                "csvGvType": "t.Summary",
                "csvOptions": {"fieldSeparator": ";", "recordSeparator": "\n"}
            }),
        )];
        let reports = dispatcher(fetcher)
            .run(targets, &ResourceSet::default())
            .await
            .unwrap();
        assert_eq!(reports[0].output, "1x2 ");
    }
}
