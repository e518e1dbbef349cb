//! One-line rendering of `tracing` events for the capture layer.
//!
//! A rendered event keeps its level and target separately; everything else is
//! flattened into a single line: the message first, then structured fields
//! such as `action="screenshot"` or `kind=CaptureTrigger`.

use std::fmt::{Debug, Write};

use tracing::{
    Event,
    field::{Field, Visit},
};

/// A `tracing` event flattened to strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLog {
    /// Level name, e.g. `WARN`.
    pub level: String,
    /// Emitting target, usually the module path.
    pub target: String,
    /// Message followed by `key=value` fields.
    pub message: String,
}

/// Collects the message and the remaining fields of one event.
#[derive(Default)]
struct LineBuilder {
    /// The `message` field.
    message: Option<String>,
    /// `key=value` pairs in recording order.
    fields: Vec<String>,
}

impl LineBuilder {
    /// Store `rendered` as the message or as a `name=rendered` pair.
    fn push(&mut self, field: &Field, rendered: String) {
        if field.name() == "message" {
            self.message = Some(rendered);
        } else {
            let mut pair = String::new();
            let _ignored = write!(pair, "{}={rendered}", field.name());
            self.fields.push(pair);
        }
    }

    /// Join message and fields with single spaces.
    fn finish(self) -> String {
        self.message
            .into_iter()
            .chain(self.fields)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Visit for LineBuilder {
    fn record_str(&mut self, field: &Field, value: &str) {
        let rendered = if field.name() == "message" {
            value.to_string()
        } else {
            format!("{value:?}")
        };
        self.push(field, rendered);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.push(field, format!("{value:?}"));
    }
}

/// Flatten `event` into a [`RenderedLog`].
pub fn render_event(event: &Event<'_>) -> RenderedLog {
    let meta = event.metadata();
    let mut line = LineBuilder::default();
    event.record(&mut line);
    RenderedLog {
        level: meta.level().to_string(),
        target: meta.target().to_string(),
        message: line.finish(),
    }
}
