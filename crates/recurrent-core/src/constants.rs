/// Product identifier stamped on outbound calendars unless configured otherwise.
pub const PRODUCT_NAME: &str = "Recurrent";
pub const DEFAULT_PRODID: &str =
    const_str::concat!("-//", PRODUCT_NAME, "//", PRODUCT_NAME, " Engine//EN");

/// Default cap on occurrences materialized for a single window.
pub const DEFAULT_MAX_INSTANCES: u32 = 1000;

/// Default number of consecutive empty periods tolerated before expansion stops.
pub const DEFAULT_MAX_EMPTY_PERIODS: u32 = 10_000;

pub const CONFIG_FILE_NAME: &str = "config.toml";
