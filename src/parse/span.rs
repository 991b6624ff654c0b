use super::Input;

/// A slice of parser input, delimited by two positions of the same stream.
#[derive(Debug, Clone)]
pub struct Span<I: Input> {
    begin: I,
    end: I,
}

impl<I: Input + Copy> Copy for Span<I> {}

impl<I: Input> Span<I> {
    /// Creates a new [`Span`] over the input between `begin` and `end`.
    pub fn new(start: I, end: I) -> Self {
        Self { begin: start, end }
    }

    /// Gets the start position of the [`Span`].
    pub fn start(&self) -> &I {
        &self.begin
    }

    /// Gets the end position of the [`Span`].
    pub fn end(&self) -> &I {
        &self.end
    }

    /// Checks if the [`Span`] is empty.
    pub fn is_empty(&self) -> bool {
        self.begin.pos_eq(&self.end)
    }
}

impl<I: Input> Input for Span<I> {
    type Symbol = I::Symbol;

    fn next(&mut self) -> Option<Self::Symbol> {
        if self.begin.pos_eq(&self.end) {
            None
        } else {
            self.begin.next()
        }
    }

    fn pos_eq(&self, other: &Self) -> bool {
        self.begin.pos_eq(&other.begin)
    }
}

impl<'a> From<Span<&'a str>> for &'a str {
    fn from(span: Span<&'a str>) -> &'a str {
        &span.start()[..(span.start().len() - span.end().len())]
    }
}
