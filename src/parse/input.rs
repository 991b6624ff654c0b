/// A parsable symbol stream.
///
/// [`Input`] is essentially an [`Iterator`] that can be cloned and whose
/// clones can be compared for positional equality. Parsers backtrack by
/// keeping a clone of the input they were handed.
pub trait Input: Clone {
    /// The symbol type this input provides a stream of.
    type Symbol;

    /// Gets the next symbol in the stream.
    ///
    /// [`None`] indicates that the end of the input has been reached.
    fn next(&mut self) -> Option<Self::Symbol>;

    /// Returns `true` if both inputs are at the same position of the stream.
    fn pos_eq(&self, other: &Self) -> bool;

    /// Advances the stream by a given number of symbols, returning how many
    /// symbols were actually skipped.
    fn advance_by(&mut self, count: usize) -> usize {
        for idx in 0..count {
            let Some(_) = self.next() else {
                return idx;
            };
        }
        count
    }

    /// Returns `true` if the stream is at the end of input.
    fn is_empty(&self) -> bool {
        self.clone().next().is_none()
    }
}

/// Trait for types that can be directly converted into an [`Input`] type.
///
/// [`Parse::parse`](super::Parse::parse) accepts any [`IntoInput`], so a
/// `&String` read from a UCD file can be handed to a parser directly.
pub trait IntoInput {
    /// The symbol type of the [`Input`] this type will convert to.
    type Symbol;

    /// The [`Input`] this type will convert to.
    type Input: Input<Symbol = Self::Symbol>;

    /// Convert to an [`Input`] type.
    fn into_input(self) -> Self::Input;
}

impl Input for &str {
    type Symbol = char;

    fn next(&mut self) -> Option<Self::Symbol> {
        let mut chars = self.chars();
        let ret = chars.next();
        *self = chars.as_str();
        ret
    }

    fn pos_eq(&self, other: &Self) -> bool {
        self.as_ptr() == other.as_ptr()
    }

    fn advance_by(&mut self, count: usize) -> usize {
        let mut chars = self.chars();
        let mut skipped = 0;
        while skipped < count && chars.next().is_some() {
            skipped += 1;
        }
        *self = chars.as_str();
        skipped
    }

    fn is_empty(&self) -> bool {
        str::is_empty(*self)
    }
}

impl<I: Input> IntoInput for I {
    type Symbol = <I as Input>::Symbol;
    type Input = I;

    fn into_input(self) -> Self::Input {
        self
    }
}

impl<'a> IntoInput for &'a String {
    type Symbol = char;
    type Input = &'a str;

    fn into_input(self) -> Self::Input {
        self.as_str()
    }
}
