use tracing::{Span, field};

use super::TraceId;

/// Root span for a user action. `role` and `user_id` are filled in later by
/// [`annotate_span`] once the session is known.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id.as_str(),
        role = field::Empty,
        user_id = field::Empty
    )
}

/// Child span; inherits `trace_id` from its parent.
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!(
        "child",
        name = %name,
        role = field::Empty,
        user_id = field::Empty
    )
}

pub fn annotate_span(role: &str, user_id: Option<&str>) {
    let span = Span::current();
    span.record("role", field::display(role));
    if let Some(uid) = user_id {
        span.record("user_id", field::display(uid));
    }
}
