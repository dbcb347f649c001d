//! Renderer registry: explicit dotted name → factory map, filled at startup.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use serde_json::{Map, Value};

use crate::core::{
    data::TypedTable,
    discovery::MountPoint,
    error::{DrawError, ResolveError},
};

/// The node's full configuration object, forwarded verbatim.
pub type RenderOptions = Map<String, Value>;

/// Shared text canvas a renderer paints into.
#[derive(Debug, Clone, Default)]
pub struct Surface(Arc<Mutex<String>>);

impl Surface {
    /// Replace the surface contents.
    pub fn paint(&self, text: impl Into<String>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = text.into();
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// A mount point plus its surface. Handed to a renderer at construction.
#[derive(Debug, Clone)]
pub struct Mount {
    pub point: MountPoint,
    pub surface: Surface,
}

impl Mount {
    #[must_use]
    pub fn new(point: MountPoint) -> Self {
        Self {
            point,
            surface: Surface::default(),
        }
    }
}

/// Draw contract every renderer implements.
pub trait Renderer: Send {
    fn draw(&mut self, table: &TypedTable, options: &RenderOptions) -> Result<(), DrawError>;
}

pub type RendererFactory = Arc<dyn Fn(Mount) -> Box<dyn Renderer> + Send + Sync>;

#[derive(Clone, Default)]
pub struct RendererRegistry {
    factories: BTreeMap<String, RendererFactory>,
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl RendererRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under a dotted name such as `braille.LineChart`.
    pub fn register<F, R>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(Mount) -> R + Send + Sync + 'static,
        R: Renderer + 'static,
    {
        let factory: RendererFactory =
            Arc::new(move |m| Box::new(factory(m)) as Box<dyn Renderer>);
        self.factories.insert(name.into(), factory);
        self
    }

    /// Construct the renderer named `name` bound to `mount`.
    pub fn resolve(&self, name: &str, mount: Mount) -> Result<Box<dyn Renderer>, ResolveError> {
        let factory = self.factories.get(name).ok_or_else(|| ResolveError::NotFound {
            name: name.to_owned(),
        })?;
        Ok(factory(mount))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Is at least one renderer registered under `package.`?
    #[must_use]
    pub fn has_package(&self, package: &str) -> bool {
        self.factories
            .keys()
            .any(|name| name.rsplit_once('.').is_some_and(|(p, _)| p == package))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
