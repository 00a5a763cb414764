//! Spans used by the connector.

use tracing::{info_span, Span};

/// Span wrapping one action invocation.
pub fn action_span(identifier: &str) -> Span {
    info_span!("action", id = %identifier)
}

/// Span wrapping one notification feed during a poll.
pub fn feed_span(feed: &str, limit: u32) -> Span {
    info_span!("feed", name = %feed, limit = limit)
}

/// Span wrapping one IronAPI request.
pub fn request_span(endpoint: &str) -> Span {
    info_span!("ironapi", endpoint = %endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_construct_without_subscriber() {
        let _a = action_span("on_poll").entered();
        let _f = feed_span("alert", 10);
        let _r = request_span("/Login");
    }
}
