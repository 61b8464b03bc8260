//! Where shader compile/link diagnostics go.

use std::cell::RefCell;

/// Receives human-readable diagnostics from the renderer.
pub trait DiagnosticSink {
    fn report(&self, message: &str);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn report(&self, message: &str) {
        (**self).report(message)
    }
}

/// Forwards diagnostics to the `log` facade under the `raylab::shader` target.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, message: &str) {
        log::info!(target: "raylab::shader", "{message}");
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: RefCell<Vec<String>>,
}

impl MemorySink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::default();
        sink.report("first");
        sink.report("second");
        assert_eq!(sink.messages(), vec!["first", "second"]);
    }

    #[test]
    fn reference_forwards() {
        fn forward(sink: impl DiagnosticSink) {
            sink.report("via ref");
        }

        let sink = MemorySink::default();
        forward(&sink);
        assert_eq!(sink.messages(), vec!["via ref"]);
    }
}
