//! Observability for the validator
//!
//! - Structured events through `tracing` (the binary installs the subscriber)
//! - Lock-free outcome counters
//!
//! # Usage
//!
//! ```ignore
//! use scim_schema::observability::{log_event, log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event(Event::ConfigLoaded);
//! log_event_with_fields(Event::SchemasLoaded, &[("count", "2")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_validations_accepted();
//! ```

use std::fmt;

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event. Rejections are logged at WARN, everything else at INFO.
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with key/value fields, rendered as `k=v` pairs in
/// the order given.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let fields = Fields(fields);
    if event.is_rejection() {
        tracing::warn!(event = %event, fields = %fields);
    } else {
        tracing::info!(event = %event, fields = %fields);
    }
}

struct Fields<'a>(&'a [(&'a str, &'a str)]);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_log_event() {
        // no subscriber installed; must not panic
        log_event(Event::ConfigLoaded);
        log_event(Event::PatchRejected);
    }

    #[test]
    fn test_fields_render_in_order() {
        let fields = [("schema", "urn:x"), ("path", "userName")];
        assert_eq!(Fields(&fields).to_string(), "schema=urn:x path=userName");
        assert_eq!(Fields(&[]).to_string(), "");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_rejection_logged_at_warn_with_fields() {
        let out = capture(|| {
            log_event_with_fields(
                Event::ResourceRejected,
                &[("schema", "urn:x"), ("scim_type", "invalidValue")],
            )
        });
        assert!(out.contains("WARN"));
        assert!(out.contains("RESOURCE_REJECTED"));
        assert!(out.contains("schema=urn:x scim_type=invalidValue"));
    }

    #[test]
    fn test_lifecycle_logged_at_info() {
        let out = capture(|| log_event_with_fields(Event::SchemasLoaded, &[("count", "2")]));
        assert!(out.contains("INFO"));
        assert!(out.contains("SCHEMAS_LOADED"));
        assert!(out.contains("count=2"));
    }
}
