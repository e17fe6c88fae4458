use schemars::JsonSchema;
use serde::Deserialize;
use tracing_appender::rolling::Rotation;

/// How often a new log file is started
#[derive(Debug, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq)]
pub enum LogRotationKind {
    #[serde(alias = "minutely", alias = "MINUTELY")]
    Minutely,
    #[serde(alias = "hourly", alias = "HOURLY")]
    Hourly,
    #[serde(alias = "daily", alias = "DAILY")]
    Daily,
    #[serde(alias = "never", alias = "NEVER")]
    Never,
}

impl From<LogRotationKind> for Rotation {
    fn from(value: LogRotationKind) -> Self {
        match value {
            LogRotationKind::Minutely => Rotation::MINUTELY,
            LogRotationKind::Hourly => Rotation::HOURLY,
            LogRotationKind::Daily => Rotation::DAILY,
            LogRotationKind::Never => Rotation::NEVER,
        }
    }
}
