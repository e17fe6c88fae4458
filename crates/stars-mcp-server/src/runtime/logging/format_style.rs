use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Log output format style. Maps to a format from tracing-subscriber.
/// See the [tracing_subscriber::fmt documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/fmt/format/index.html) for more info.
pub enum FormatStyle {
    #[default]
    /// The default format. Uses the full format from tracing-subscriber that emits
    /// human-readable, single-line logs.
    Full,
    /// Uses the compact format from tracing-subscriber optimized for short line lengths.
    Compact,
    /// Uses the json format from tracing-subscriber that outputs newline-delimited json logs.
    Json,
    /// Uses the pretty format from tracing-subscriber that emits excessively pretty, multi-line
    /// logs optimized for human readability.
    Pretty,
}
