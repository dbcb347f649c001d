//! A collection of constants.

/// Attribute scanned for per-node render configuration.
pub const PROPS_ATTRIBUTE: &str = "data-csv-props";

/// Node configuration key holding the data source locator.
pub const KEY_SRC: &str = "csvSrc";
/// Node configuration key holding the dotted renderer name.
pub const KEY_RENDERER: &str = "csvGvType";
/// Node configuration key holding the renderer package.
pub const KEY_PACKAGE: &str = "csvGvPackage";
/// Node configuration key holding parser overrides.
pub const KEY_PARSE_OPTIONS: &str = "csvOptions";

pub const DEFAULT_FIELD_SEPARATOR: char = ',';
pub const DEFAULT_RECORD_SEPARATOR: &str = "\r\n";
pub const DEFAULT_QUOTE_CHAR: char = '"';

/// Seconds before a single data source fetch is abandoned.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// The left and right border characters
pub const BORDER_WIDTH: usize = 2;
/// One character of space between y axis labels and the plotted data
pub const LABEL_GUTTER: usize = 1;

/// Graph must be at least 7 characters tall
pub const MIN_GRAPH_HEIGHT: usize = 7;
/// Graph must be at least 14 characters wide
pub const MIN_GRAPH_WIDTH: usize = 14;

/// Largest graph a node may ask for, in characters
pub const MAX_GRAPH_WIDTH: usize = 1024;
pub const MAX_GRAPH_HEIGHT: usize = 256;

/// Braille has 2 horizontal dots and four vertical dots that can be either off or on
pub const BRAILLE_HORIZONTAL_RESOLUTION: usize = 2;
/// Braille has 2 horizontal dots and four vertical dots that can be either off or on
pub const BRAILLE_VERTICAL_RESOLUTION: usize = 4;

/// Chart height in characters when a node does not set `height`.
pub const DEFAULT_CHART_HEIGHT: usize = 12;

/// Numbers are rounded to the first decimal place.
///
/// 14.832 becomes 14.8
pub const DECIMAL_PRECISION: usize = 1;
