//! Parser-combinator core shared by every text format in the crate.
//!
//! UCD source lines, the `# Lu | Ll` subset comments in the alias file, the
//! range lists of the derived artifact and the `\p{...}` patterns handed to
//! the oracle are all parsed with the building blocks defined here.
//!
//! A parser is any type implementing [`Parse`]. Plain functions of the shape
//! `fn(I) -> PResult<T, I, E>` implement [`Parse`] automatically, so most
//! parsers in this crate are ordinary functions glued together with the
//! combinators in [`basic`] and the character parsers in [`text`].
//!
//! ```
//! use ucd_tables::parse::{basic::separated_pair, text::{self, TextInput}, Parse, Success};
//!
//! fn ratio<I: TextInput>(input: I) -> text::PResult<(u32, u32), I> {
//!     separated_pair(text::dec_u32, text::verbatim("/"), text::dec_u32).parse(input)
//! }
//!
//! assert!(matches!(ratio.parse("3/4 rest"), Ok(Success((3, 4), " rest"))));
//! ```

mod input;
mod span;

pub mod basic;
pub mod text;

pub use input::*;
pub use span::*;

/// A parsing error.
pub trait Error<I: Input>: Sized {
    /// Creates an error representing the need for more input.
    fn need_more_input(pos: I) -> Self;

    /// Creates an error representing that the end of input was expected but not reached.
    fn expected_eof(pos: I) -> Self;

    /// Creates an error representing that the input is unparsable.
    fn invalid_input(pos: I) -> Self;

    /// Gets the input position where the error occured.
    fn position(&self) -> &I;
}

/// A parsing error descriptor that can be combined with an input position to
/// build a parsing error.
///
/// Fallible combinators such as [`Parse::try_map`] take closures returning an
/// [`ErrorSeed`] so the closure does not have to track input positions.
pub trait ErrorSeed<I: Input, E: Error<I>> {
    /// Combines this error seed with input to create a parsing error.
    fn into_error(self, pos: I) -> E;
}

/// Type returned by a parser when parsing succeeds: the parsed value and the
/// remaining unparsed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success<T, I>(
    /// The parsed value
    pub T,
    /// The remaining unparsed input
    pub I,
);

/// Type returned by a parser when parsing fails.
///
/// The input member always has the same position as the input originally
/// provided to the parser, while the error may point further into the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure<E, I>(
    /// The parsing error
    pub E,
    /// The input that failed to parse
    pub I,
);

/// The [`Result`] type returned by a parser.
pub type PResult<T, I, E> = Result<Success<T, I>, Failure<E, I>>;

/// Trait implemented by all parsers.
pub trait Parse<I: Input> {
    /// The value type that is produced by the parser on success.
    type Parsed: Sized;

    /// The error type that is produced by the parser on failure.
    type Error: Error<I>;

    /// Parses the provided input.
    fn parse<N>(&self, input: N) -> PResult<Self::Parsed, I, Self::Error>
    where
        N: IntoInput<Input = I>;

    /// Creates a parser whose parsed result is transformed.
    ///
    /// See also [`basic::map`].
    #[inline]
    fn map<F, R>(self, map_fn: F) -> impl Parse<I, Parsed = R, Error = Self::Error>
    where
        Self: Sized,
        F: Fn(Self::Parsed) -> R,
    {
        basic::map(self, map_fn)
    }

    /// Creates a parser whose parsed result is fallibly transformed.
    ///
    /// When `map_fn` returns an [`Err`], the contained [`ErrorSeed`] is turned
    /// into a parsing error positioned at the start of the input.
    ///
    /// See also [`basic::try_map`].
    #[inline]
    fn try_map<F, R, S>(self, map_fn: F) -> impl Parse<I, Parsed = R, Error = Self::Error>
    where
        Self: Sized,
        S: ErrorSeed<I, Self::Error>,
        F: Fn(Self::Parsed) -> Result<R, S>,
    {
        basic::try_map(self, map_fn)
    }

    /// Creates a parser that replaces the parsed result with a fixed value.
    #[inline]
    fn with_value<T>(self, value: T) -> impl Parse<I, Parsed = T, Error = Self::Error>
    where
        Self: Sized,
        T: Clone,
    {
        basic::with_value(self, value)
    }

    /// Creates a parser that fails when `verify_fn` rejects the parsed value.
    #[inline]
    fn verify<F>(self, verify_fn: F) -> impl Parse<I, Parsed = Self::Parsed, Error = Self::Error>
    where
        Self: Sized,
        F: Fn(&Self::Parsed) -> bool,
    {
        basic::verify(self, verify_fn)
    }

    /// Creates a parser that never fails, producing [`None`] instead.
    #[inline]
    fn opt(self) -> impl Parse<I, Parsed = Option<Self::Parsed>, Error = Self::Error>
    where
        Self: Sized,
    {
        basic::opt(self)
    }

    /// Creates a parser that applies `self` zero or more times and collects
    /// the results.
    #[inline]
    fn collect_many0<C>(self) -> impl Parse<I, Parsed = C, Error = Self::Error>
    where
        Self: Sized,
        C: FromIterator<Self::Parsed>,
    {
        basic::collect_many0(self)
    }

    /// Creates a parser that requires `self` to consume all of its input.
    #[inline]
    fn complete(self) -> impl Parse<I, Parsed = Self::Parsed, Error = Self::Error>
    where
        Self: Sized,
    {
        basic::complete(self)
    }
}

impl<F, T, I, E> Parse<I> for F
where
    F: Fn(I) -> PResult<T, I, E>,
    I: Input,
    E: Error<I>,
{
    type Parsed = T;
    type Error = E;

    fn parse<N>(&self, input: N) -> PResult<T, I, E>
    where
        N: IntoInput<Input = I>,
    {
        (*self)(input.into_input())
    }
}

impl<T, I: Input> Success<T, I> {
    /// Transforms the parsed value, keeping the remaining input.
    pub fn map<F, R>(self, map_fn: F) -> Success<R, I>
    where
        F: FnOnce(T) -> R,
    {
        let Success(val, rem) = self;
        Success(map_fn(val), rem)
    }
}

mod sealed {
    use super::{Error, Input, PResult};

    pub trait Sealed {}

    impl<T, I: Input, E: Error<I>> Sealed for PResult<T, I, E> {}
}

/// Additional convenience methods for [`PResult`].
pub trait PResultExt: sealed::Sealed {
    type Parsed;
    type Error: Error<Self::Input>;
    type Input: Input;

    fn map_parsed<F, R>(self, map_fn: F) -> PResult<R, Self::Input, Self::Error>
    where
        F: FnOnce(Self::Parsed) -> R;
}

impl<T, I: Input, E: Error<I>> PResultExt for PResult<T, I, E> {
    type Parsed = T;
    type Error = E;
    type Input = I;

    fn map_parsed<F, R>(self, map_fn: F) -> PResult<R, I, E>
    where
        F: FnOnce(Self::Parsed) -> R,
    {
        self.map(move |succ| succ.map(map_fn))
    }
}
