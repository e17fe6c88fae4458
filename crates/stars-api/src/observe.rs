//! Observability hooks
//!
//! Components that report noteworthy events take an [`Observer`] instead of logging directly,
//! so tests can assert on exactly what was reported.

use std::fmt;

/// Receives structured events from the adapter and its collaborators
pub trait Observer: Send + Sync {
    fn warn(&self, event: &str, fields: &[(&str, &dyn fmt::Display)]);

    fn info(&self, event: &str, fields: &[(&str, &dyn fmt::Display)]);
}

/// Forwards events to `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn warn(&self, event: &str, fields: &[(&str, &dyn fmt::Display)]) {
        tracing::warn!(event, "{}", Fields(fields));
    }

    fn info(&self, event: &str, fields: &[(&str, &dyn fmt::Display)]) {
        tracing::info!(event, "{}", Fields(fields));
    }
}

struct Fields<'a>(&'a [(&'a str, &'a dyn fmt::Display)]);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (name, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::fmt;

    use parking_lot::Mutex;

    use super::Observer;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) struct Recorded {
        pub(crate) level: &'static str,
        pub(crate) event: String,
        pub(crate) fields: Vec<(String, String)>,
    }

    impl Recorded {
        pub(crate) fn field(&self, name: &str) -> Option<&str> {
            self.fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        }
    }

    /// Keeps every event in memory
    #[derive(Debug, Default)]
    pub(crate) struct RecordingObserver {
        events: Mutex<Vec<Recorded>>,
    }

    impl RecordingObserver {
        pub(crate) fn warnings(&self) -> Vec<Recorded> {
            self.events
                .lock()
                .iter()
                .filter(|e| e.level == "warn")
                .cloned()
                .collect()
        }

        fn record(&self, level: &'static str, event: &str, fields: &[(&str, &dyn fmt::Display)]) {
            self.events.lock().push(Recorded {
                level,
                event: event.to_string(),
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            });
        }
    }

    impl Observer for RecordingObserver {
        fn warn(&self, event: &str, fields: &[(&str, &dyn fmt::Display)]) {
            self.record("warn", event, fields);
        }

        fn info(&self, event: &str, fields: &[(&str, &dyn fmt::Display)]) {
            self.record("info", event, fields);
        }
    }
}
