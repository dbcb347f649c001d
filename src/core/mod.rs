//! Parsing, discovery and dispatch: everything that is not drawing.

pub mod bounds;
pub mod color;
pub mod config;
pub mod constants;
pub mod data;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod parser;
pub mod registry;

// re-export frequently-used items for convenience
pub use color::{AnsiCode, ColorError, colorize};
pub use config::{DispatchConfig, ParseOptions, ParseOptionsBuilder};
pub use data::{CellValue, ColumnSpec, ColumnType, TypedTable, parse_typed};
pub use discovery::{Document, MountPoint, RenderTarget, ResourceSet, collect_resources, discover};
pub use dispatch::{Dispatcher, NodeReport, NodeState, RunHandle};
pub use error::{AppError, DrawError, FetchError, NodeError};
pub use fetch::{Fetcher, MemoryFetcher, SourceFetcher};
pub use loader::{RegistryLoader, ResourceLoader};
pub use parser::{RawTable, parse};
pub use registry::{Mount, RenderOptions, Renderer, RendererRegistry, Surface};
