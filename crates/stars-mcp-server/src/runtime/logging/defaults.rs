use tracing::Level;

use super::LogRotationKind;
use super::format_style::FormatStyle;

pub(super) const fn log_level() -> Level {
    Level::INFO
}

pub(super) const fn default_rotation() -> LogRotationKind {
    LogRotationKind::Hourly
}

pub(super) const fn default_format() -> FormatStyle {
    FormatStyle::Full
}
