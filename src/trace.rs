// Presentation sink.
//
// The decoder reports what it reads as a stream of grouped events, in
// document order and in lockstep with value construction. Consumers turn
// that stream into something human-readable. The returned value tree never
// depends on the sink.

use std::io::{self, Write};

/// Receiver for decode trace events.
///
/// Events always nest: every `begin_group` is matched by one `end_group`,
/// with any number of leaves and nested groups in between.
pub trait PresentationSink {
    fn begin_group(&mut self, label: &str);
    fn leaf(&mut self, text: &str);
    fn end_group(&mut self);
}

impl<S: PresentationSink + ?Sized> PresentationSink for &mut S {
    fn begin_group(&mut self, label: &str) {
        (**self).begin_group(label);
    }

    fn leaf(&mut self, text: &str) {
        (**self).leaf(text);
    }

    fn end_group(&mut self) {
        (**self).end_group();
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl PresentationSink for NoopSink {
    fn begin_group(&mut self, _label: &str) {}
    fn leaf(&mut self, _text: &str) {}
    fn end_group(&mut self) {}
}

/// One recorded trace event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Begin(String),
    Leaf(String),
    End,
}

/// Sink that records events for later inspection.
#[derive(Debug, Default, Clone)]
pub struct TraceCollector {
    events: Vec<TraceEvent>,
    depth: usize,
    max_depth: usize,
}

impl TraceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    /// True when every group that was opened has been closed.
    pub fn is_balanced(&self) -> bool {
        self.depth == 0
    }

    /// Deepest group nesting seen.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Leaf texts in order, ignoring grouping.
    pub fn leaves(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Leaf(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PresentationSink for TraceCollector {
    fn begin_group(&mut self, label: &str) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.events.push(TraceEvent::Begin(label.to_owned()));
    }

    fn leaf(&mut self, text: &str) {
        self.events.push(TraceEvent::Leaf(text.to_owned()));
    }

    fn end_group(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.events.push(TraceEvent::End);
    }
}

/// Renders events as an indented outline, two spaces per level.
///
/// Write errors are latched: the first one stops further output and is
/// returned by [`IndentRenderer::finish`].
pub struct IndentRenderer<W: Write> {
    out: W,
    depth: usize,
    error: Option<io::Error>,
}

impl<W: Write> IndentRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            depth: 0,
            error: None,
        }
    }

    fn line(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        let indent = self.depth * 2;
        if let Err(e) = writeln!(self.out, "{:indent$}{text}", "") {
            self.error = Some(e);
        }
    }

    /// Flush and hand back the writer, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> PresentationSink for IndentRenderer<W> {
    fn begin_group(&mut self, label: &str) {
        self.line(label);
        self.depth += 1;
    }

    fn leaf(&mut self, text: &str) {
        self.line(text);
    }

    fn end_group(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit<S: PresentationSink>(sink: &mut S) {
        sink.begin_group("Pair");
        sink.leaf("Int32: 1");
        sink.begin_group("ArrayList (0)");
        sink.end_group();
        sink.end_group();
    }

    #[test]
    fn collector_records_in_order() {
        let mut c = TraceCollector::new();
        emit(&mut c);
        assert!(c.is_balanced());
        assert_eq!(c.max_depth(), 2);
        assert_eq!(
            c.events(),
            &[
                TraceEvent::Begin("Pair".into()),
                TraceEvent::Leaf("Int32: 1".into()),
                TraceEvent::Begin("ArrayList (0)".into()),
                TraceEvent::End,
                TraceEvent::End,
            ]
        );
        assert_eq!(c.leaves(), ["Int32: 1"]);
    }

    #[test]
    fn renderer_indents_groups() {
        let mut r = IndentRenderer::new(Vec::new());
        emit(&mut r);
        r.leaf("Null");
        let out = String::from_utf8(r.finish().unwrap()).unwrap();
        assert_eq!(out, "Pair\n  Int32: 1\n  ArrayList (0)\nNull\n");
    }

    #[test]
    fn sink_through_mut_ref() {
        let mut c = TraceCollector::new();
        {
            let mut by_ref = &mut c;
            emit(&mut by_ref);
        }
        assert_eq!(c.events().len(), 5);
    }
}
