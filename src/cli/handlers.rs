use std::{
    io::{self, IsTerminal, Read, Write},
    path::Path,
    time::Duration,
};

use tracing::info;
use url::Url;

use crate::{
    core::{
        config::{DispatchConfig, ParseOptions},
        data::TypedTable,
        discovery::Document,
        dispatch::NodeReport,
        error::{AppError, FetchError},
        fetch::{Fetcher, SourceFetcher},
        parser::parse,
    },
    render::{RenderStyle, builtin_registry},
    render_document,
};

use super::parse::{ParseArgs, RenderArgs};

pub fn render(a: RenderArgs) -> Result<(), AppError> {
    let mut config = DispatchConfig::default();
    if let Some(ms) = a.timeout_ms {
        config = config.fetch_timeout(Duration::from_millis(ms));
    }
    let style = RenderStyle {
        color: !a.no_color && io::stdout().is_terminal(),
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let RenderArgs { document, base, .. } = a;
    let reports = rt.block_on(async {
        let mut doc = open_document(&document, &config).await?;
        if let Some(base) = base {
            doc = doc.with_base(base);
        }
        render_document(&doc, style, config, print_report).await
    })?;

    let failed = reports.iter().filter(|r| !r.is_rendered()).count();
    info!(total = reports.len(), failed, "run complete");
    if failed > 0 {
        return Err(AppError::NodesFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

async fn open_document(location: &str, config: &DispatchConfig) -> Result<Document, AppError> {
    match Url::parse(location) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            let fetcher = SourceFetcher::new(config, None)?;
            fetch_document(&fetcher, url, config.fetch_timeout).await
        }
        _ => Ok(Document::open(Path::new(location))?),
    }
}

/// Remote documents get the same deadline as their data sources.
async fn fetch_document(
    fetcher: &dyn Fetcher,
    url: Url,
    timeout: Duration,
) -> Result<Document, AppError> {
    let html = tokio::time::timeout(timeout, fetcher.fetch(url.as_str()))
        .await
        .map_err(|_| FetchError::TimedOut(timeout))??;
    Ok(Document::from_html(html).with_base(url))
}

fn print_report(report: &NodeReport) {
    let mut out = io::stdout().lock();
    let _ = write!(out, "{}", report.output);
    if !report.output.ends_with('\n') {
        let _ = writeln!(out);
    }
}

pub fn parse_table(a: &ParseArgs) -> Result<(), AppError> {
    let text = if a.file.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&a.file)?
    };
    let options = parse_options(a)?;

    let raw = parse(&text, &options);
    let json = if a.raw {
        serde_json::to_string_pretty(raw.rows())?
    } else {
        serde_json::to_string_pretty(&TypedTable::build(raw))?
    };
    println!("{json}");
    Ok(())
}

fn parse_options(a: &ParseArgs) -> Result<ParseOptions, AppError> {
    let mut b = ParseOptions::builder()
        .strip_header(a.strip_header && a.raw)
        .trim_fields(a.trim);
    if let Some(c) = a.field_sep {
        b = b.field_separator(c);
    }
    if let Some(s) = &a.record_sep {
        b = b.record_separator(unescape(s));
    }
    if let Some(c) = a.quote {
        b = b.quote_char(c);
    }
    Ok(b.build()?)
}

/// Expand `\r`, `\n` and `\t` escapes typed on a shell line.
fn unescape(s: &str) -> String {
    s.replace("\\r", "\r").replace("\\n", "\n").replace("\\t", "\t")
}

/// Print every name the built-in registry resolves.
pub fn renderers() {
    let registry = builtin_registry(RenderStyle::default());
    for name in registry.names() {
        println!("{name}");
    }
}
