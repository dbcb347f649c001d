//! Render target discovery.
//!
//! Walks an HTML document once and collects every element carrying a
//! `data-csv-props` JSON object. A node with unreadable configuration is
//! skipped with a warning; only an unreadable document fails the scan.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use scraper::{ElementRef, Html};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::core::{
    config::{ParseOptions, ParseOptionsSpec},
    constants::{KEY_PACKAGE, KEY_PARSE_OPTIONS, KEY_RENDERER, KEY_SRC, PROPS_ATTRIBUTE},
    error::{ConfigError, DiscoveryError},
    registry::RenderOptions,
};

/// Where a node's output goes: document-order index plus the element `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MountPoint {
    pub index: usize,
    pub id: Option<String>,
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "#{id}"),
            None => write!(f, "node[{}]", self.index),
        }
    }
}

/// Typed view over one node's configuration object.
///
/// `options` keeps the whole object, recognised keys included, so it can
/// be handed to the renderer untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNodeConfig {
    pub src: String,
    pub renderer: String,
    pub package: Option<String>,
    pub parse: ParseOptions,
    pub options: RenderOptions,
}

impl RenderNodeConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Self::from_map(map),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    pub fn from_map(options: Map<String, Value>) -> Result<Self, ConfigError> {
        let string = |key: &'static str| options.get(key).and_then(Value::as_str).map(str::to_owned);

        let src = string(KEY_SRC).ok_or(ConfigError::MissingField(KEY_SRC))?;
        let renderer = string(KEY_RENDERER).ok_or(ConfigError::MissingField(KEY_RENDERER))?;
        let package = string(KEY_PACKAGE);
        let parse = match options.get(KEY_PARSE_OPTIONS) {
            Some(v) => serde_json::from_value::<ParseOptionsSpec>(v.clone())?.try_into()?,
            None => ParseOptions::default(),
        };

        Ok(Self {
            src,
            renderer,
            package,
            parse,
            options,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    pub mount: MountPoint,
    pub config: RenderNodeConfig,
}

/// Deduplicated renderer packages, first-seen order. Built once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet(Vec<String>);

impl ResourceSet {
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut out: Vec<String> = Vec::new();
        for s in iter {
            let s = s.into();
            if !out.contains(&s) {
                out.push(s);
            }
        }
        Self(out)
    }
}

/// Packages cited by `targets`; nodes without one contribute nothing.
#[must_use]
pub fn collect_resources(targets: &[RenderTarget]) -> ResourceSet {
    targets
        .iter()
        .filter_map(|t| t.config.package.as_deref())
        .collect()
}

/// Scan `html` for render targets in document order.
#[must_use]
pub fn discover(html: &str) -> Vec<RenderTarget> {
    let doc = Html::parse_document(html);
    let mut targets = Vec::new();

    let tagged = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|el| el.value().attr(PROPS_ATTRIBUTE).map(|props| (el, props)));

    for (index, (el, props)) in tagged.enumerate() {
        let mount = MountPoint {
            index,
            id: el.value().id().map(str::to_owned),
        };
        match RenderNodeConfig::from_json(props) {
            Ok(config) => {
                debug!(node = %mount, renderer = %config.renderer, "discovered render target");
                targets.push(RenderTarget { mount, config });
            }
            Err(e) => warn!(node = %mount, error = %e, "skipping node with unreadable configuration"),
        }
    }
    targets
}

/// A loaded document plus the base that relative `csvSrc` values resolve against.
#[derive(Debug, Clone)]
pub struct Document {
    html: String,
    base: Option<Url>,
}

impl Document {
    #[must_use]
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            base: None,
        }
    }

    pub fn open(path: &Path) -> Result<Self, DiscoveryError> {
        let unreadable = |source| DiscoveryError::Unreadable {
            path: path.to_path_buf(),
            source,
        };
        let html = std::fs::read_to_string(path).map_err(unreadable)?;
        let dir = path
            .canonicalize()
            .map_err(unreadable)?
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);
        Ok(Self {
            html,
            base: Url::from_directory_path(dir).ok(),
        })
    }

    #[must_use]
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    #[inline]
    #[must_use]
    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    #[must_use]
    pub fn discover(&self) -> Vec<RenderTarget> {
        discover(&self.html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div id="sales" data-csv-props='{"csvSrc":"sales.csv","csvGvType":"braille.LineChart","csvGvPackage":"braille","title":"Sales"}'></div>
        <div data-csv-props='{not json'></div>
        <section>
          <span id="t" data-csv-props='{"csvSrc":"t.csv","csvGvType":"text.Table","csvOptions":{"fieldSeparator":";"}}'></span>
        </section>
        <div data-csv-props='{"csvSrc":"x.csv"}'></div>
        <div data-csv-props='[1,2]'></div>
        <p>no props here</p>
    </body></html>"#;

    #[test]
    fn finds_targets_and_skips_broken_nodes() {
        let targets = discover(PAGE);
        assert_eq!(targets.len(), 2);

        assert_eq!(targets[0].mount, MountPoint { index: 0, id: Some("sales".into()) });
        assert_eq!(targets[0].config.src, "sales.csv");
        assert_eq!(targets[0].config.package.as_deref(), Some("braille"));
        assert_eq!(targets[0].config.options["title"], "Sales");
        assert_eq!(targets[0].config.options["csvSrc"], "sales.csv");

        assert_eq!(targets[1].mount.index, 2);
        assert_eq!(targets[1].config.renderer, "text.Table");
        assert_eq!(targets[1].config.parse.field_separator, ';');
        assert!(targets[1].config.package.is_none());
    }

    #[test]
    fn config_errors_are_typed() {
        assert!(matches!(RenderNodeConfig::from_json("[]"), Err(ConfigError::NotAnObject)));
        assert!(matches!(
            RenderNodeConfig::from_json(r#"{"csvGvType":"a.B"}"#),
            Err(ConfigError::MissingField("csvSrc"))
        ));
        assert!(matches!(
            RenderNodeConfig::from_json(r#"{"csvSrc":"a","csvGvType":"a.B","csvOptions":{"quoteChar":"ab"}}"#),
            Err(ConfigError::NotSingleChar { .. })
        ));
        assert!(matches!(RenderNodeConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    fn target(package: Option<&str>) -> RenderTarget {
        let mut map = Map::new();
        map.insert(KEY_SRC.into(), "a.csv".into());
        map.insert(KEY_RENDERER.into(), "p.R".into());
        if let Some(p) = package {
            map.insert(KEY_PACKAGE.into(), p.into());
        }
        RenderTarget {
            mount: MountPoint { index: 0, id: None },
            config: RenderNodeConfig::from_map(map).unwrap(),
        }
    }

    #[test]
    fn resources_are_deduplicated_in_first_seen_order() {
        let targets = [
            target(Some("charts")),
            target(None),
            target(Some("charts")),
            target(Some("tables")),
        ];
        let set = collect_resources(&targets);
        assert_eq!(set.as_slice(), ["charts", "tables"]);
    }

    #[test]
    fn unreadable_document_is_fatal() {
        let err = Document::open(Path::new("/definitely/not/here.html"));
        assert!(matches!(err, Err(DiscoveryError::Unreadable { .. })));
    }

    #[test]
    fn opened_document_resolves_against_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, PAGE).unwrap();
        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.discover().len(), 2);
        let base = doc.base().unwrap();
        assert_eq!(base.scheme(), "file");
        assert!(base.path().ends_with('/'));
    }
}
