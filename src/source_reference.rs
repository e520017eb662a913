use std::sync::Arc;

use miette::{NamedSource, SourceCode};

#[derive(Debug)]
struct SourceReferenceInner {
    source: String,
    named_source: NamedSource,
}

/// Cheaply clonable handle on the program text, attached to every diagnostic.
#[derive(Clone, Debug)]
pub struct SourceReference(Arc<SourceReferenceInner>);

impl SourceReference {
    pub fn new(name: String, source: String) -> Self {
        SourceReference(Arc::new(SourceReferenceInner {
            named_source: NamedSource::new(name, source.clone()),
            source,
        }))
    }
    /// Joins several inputs with newlines into a single program, as the
    /// command line does when it is handed more than one file.
    pub fn concatenate<'a>(name: String, sources: impl IntoIterator<Item = &'a str>) -> Self {
        let source = sources.into_iter().collect::<Vec<_>>().join("\n");
        Self::new(name, source)
    }
    pub fn source(&self) -> &str {
        &self.inner().source
    }
    /// 1-based line number of a byte offset.
    pub fn line_of(&self, offset: usize) -> usize {
        let source = self.source();
        let end = offset.min(source.len());
        source.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
    }
    fn inner(&self) -> &SourceReferenceInner {
        self.0.as_ref()
    }
}

impl SourceCode for SourceReference {
    fn read_span<'a>(
        &'a self,
        span: &miette::SourceSpan,
        context_lines_before: usize,
        context_lines_after: usize,
    ) -> Result<Box<dyn miette::SpanContents<'a> + 'a>, miette::MietteError> {
        self.inner()
            .named_source
            .read_span(span, context_lines_before, context_lines_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn concatenates_with_newlines() {
        let reference = SourceReference::concatenate("<files>".into(), ["int x = 1;", "print x;"]);
        assert_eq!(reference.source(), "int x = 1;\nprint x;");
        assert_eq!(reference.line_of(0), 1);
        assert_eq!(reference.line_of(11), 2);
    }
}
