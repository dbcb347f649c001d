//! Renderer package loading with an explicit, one-shot readiness signal.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::info;

use crate::core::{discovery::ResourceSet, error::LoadError, registry::RendererRegistry};

/// Resolves once the loader has prepared every requested package.
#[derive(Debug)]
pub struct Ready(oneshot::Receiver<Result<(), LoadError>>);

/// Sending half of [`Ready`]; consumed by the single `open` call.
#[derive(Debug)]
pub struct ReadySignal(oneshot::Sender<Result<(), LoadError>>);

impl Ready {
    #[must_use]
    pub fn channel() -> (ReadySignal, Ready) {
        let (tx, rx) = oneshot::channel();
        (ReadySignal(tx), Ready(rx))
    }

    /// A signal that is already open with `result`.
    #[must_use]
    pub fn resolved(result: Result<(), LoadError>) -> Self {
        let (signal, ready) = Self::channel();
        signal.open(result);
        ready
    }

    pub async fn wait(self) -> Result<(), LoadError> {
        self.0.await.unwrap_or(Err(LoadError::SignalDropped))
    }
}

impl ReadySignal {
    pub fn open(self, result: Result<(), LoadError>) {
        // The dispatcher may have given up waiting; nothing to report then.
        let _ = self.0.send(result);
    }
}

/// Prepares renderer packages. Called exactly once per run.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, resources: &ResourceSet) -> Ready;
}

/// Packages are namespaces of the in-process registry, so loading is a
/// membership check.
#[derive(Debug, Clone)]
pub struct RegistryLoader {
    registry: Arc<RendererRegistry>,
}

impl RegistryLoader {
    #[must_use]
    pub fn new(registry: Arc<RendererRegistry>) -> Self {
        Self { registry }
    }
}

impl ResourceLoader for RegistryLoader {
    fn load(&self, resources: &ResourceSet) -> Ready {
        let missing = resources
            .as_slice()
            .iter()
            .find(|p| !self.registry.has_package(p));
        let result = match missing {
            Some(p) => Err(LoadError::UnknownPackage(p.clone())),
            None => {
                info!(packages = ?resources.as_slice(), "renderer packages ready");
                Ok(())
            }
        };
        Ready::resolved(result)
    }
}
