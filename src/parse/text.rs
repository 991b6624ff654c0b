//! Character-level parsers over `char` streams.
//!
//! Every UCD file, the alias comments, the artifact and oracle patterns are
//! plain text, so these parsers only ever see already decoded `char`s.

use super::{
    basic::pop, Error as PError, ErrorSeed, Failure, Input, IntoInput, Parse, Span, Success,
};
use core::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    NeedMoreInput,
    ExpectedEof,
    InvalidInput,
    /// A numeric field does not fit in a `u32`.
    Overflow,
}

/// Parsing error for text inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error<I: Input> {
    kind: ErrorKind,
    pos: I,
}

pub type PResult<T, I> = super::PResult<T, I, Error<I>>;

/// Any [`Input`] producing `char`s.
pub trait TextInput: Input<Symbol = char> {}

impl<I: Input<Symbol = char>> TextInput for I {}

impl<I: Input> Error<I> {
    pub const fn new(kind: ErrorKind, pos: I) -> Self {
        Self { kind, pos }
    }

    pub const fn overflow(pos: I) -> Self {
        Self::new(ErrorKind::Overflow, pos)
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl<I: Input> PError<I> for Error<I> {
    fn need_more_input(pos: I) -> Self {
        Self::new(ErrorKind::NeedMoreInput, pos)
    }

    fn expected_eof(pos: I) -> Self {
        Self::new(ErrorKind::ExpectedEof, pos)
    }

    fn invalid_input(pos: I) -> Self {
        Self::new(ErrorKind::InvalidInput, pos)
    }

    fn position(&self) -> &I {
        &self.pos
    }
}

impl<I: Input> ErrorSeed<I, Error<I>> for ErrorKind {
    fn into_error(self, pos: I) -> Error<I> {
        Error::new(self, pos)
    }
}

pub fn char<I: TextInput>(input: I) -> PResult<char, I> {
    pop(input)
}

#[derive(Debug, Clone)]
struct VerbatimParser<P, I>(P, PhantomData<fn() -> I>)
where
    P: AsRef<str>,
    I: TextInput;

impl<P, I> Parse<I> for VerbatimParser<P, I>
where
    P: AsRef<str>,
    I: TextInput,
{
    type Parsed = Span<I>;
    type Error = Error<I>;

    fn parse<N>(&self, input: N) -> PResult<Self::Parsed, I>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        let mut rem = input.clone();

        for ex in self.0.as_ref().chars() {
            let tmp = rem.clone();
            match char(rem) {
                Ok(Success(ch, new_rem)) => {
                    if ch != ex {
                        return Err(Failure(Error::invalid_input(tmp), input));
                    }
                    rem = new_rem;
                }
                Err(Failure(err, _)) => {
                    return Err(Failure(err, input));
                }
            }
        }

        Ok(Success(Span::new(input, rem.clone()), rem))
    }
}

/// Creates a parser matching `pattern` exactly.
#[inline]
pub const fn verbatim<P, I>(pattern: P) -> impl Parse<I, Parsed = Span<I>, Error = Error<I>>
where
    P: AsRef<str>,
    I: TextInput,
{
    VerbatimParser(pattern, PhantomData)
}

#[derive(Debug, Clone)]
struct TakeWhileParser<F, I>(F, bool, PhantomData<fn() -> I>)
where
    F: Fn(char) -> bool,
    I: TextInput;

impl<F, I> Parse<I> for TakeWhileParser<F, I>
where
    F: Fn(char) -> bool,
    I: TextInput,
{
    type Parsed = Span<I>;
    type Error = Error<I>;

    fn parse<N>(&self, input: N) -> PResult<Self::Parsed, I>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        let mut rem = input.clone();
        loop {
            let mut next = rem.clone();
            match next.next() {
                Some(ch) if (self.0)(ch) => rem = next,
                _ => break,
            }
        }
        if self.1 && rem.pos_eq(&input) {
            return Err(Failure(Error::invalid_input(input.clone()), input));
        }
        Ok(Success(Span::new(input, rem.clone()), rem))
    }
}

/// Creates a parser for the longest (possibly empty) run of `char`s accepted
/// by `predicate`.
#[inline]
pub const fn take_while0<F, I>(predicate: F) -> impl Parse<I, Parsed = Span<I>, Error = Error<I>>
where
    F: Fn(char) -> bool,
    I: TextInput,
{
    TakeWhileParser(predicate, false, PhantomData)
}

/// Like [`take_while0`], but fails on an empty run.
#[inline]
pub const fn take_while1<F, I>(predicate: F) -> impl Parse<I, Parsed = Span<I>, Error = Error<I>>
where
    F: Fn(char) -> bool,
    I: TextInput,
{
    TakeWhileParser(predicate, true, PhantomData)
}

/// Skips spaces and tabs.
pub fn space0<I: TextInput>(input: I) -> PResult<(), I> {
    take_while0(|ch| ch == ' ' || ch == '\t')
        .with_value(())
        .parse(input)
}

fn digits<I: TextInput>(input: I, radix: u32) -> PResult<u32, I> {
    let mut rem = input.clone();
    let mut value: u32 = 0;
    let mut any = false;
    loop {
        let mut next = rem.clone();
        let Some(digit) = next.next().and_then(|ch| ch.to_digit(radix)) else {
            break;
        };
        value = match value.checked_mul(radix).and_then(|v| v.checked_add(digit)) {
            Some(value) => value,
            None => return Err(Failure(Error::overflow(input.clone()), input)),
        };
        any = true;
        rem = next;
    }
    if !any {
        return Err(Failure(Error::invalid_input(input.clone()), input));
    }
    Ok(Success(value, rem))
}

/// Parses an unsigned hexadecimal number, either case.
///
/// ```
/// # use ucd_tables::parse::{text, Success};
/// assert!(matches!(text::hex_u32("1F600;"), Ok(Success(0x1F600, ";"))));
/// ```
pub fn hex_u32<I: TextInput>(input: I) -> PResult<u32, I> {
    digits(input, 16)
}

/// Parses an unsigned decimal number.
pub fn dec_u32<I: TextInput>(input: I) -> PResult<u32, I> {
    digits(input, 10)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn verbatim_matches_prefix_only() {
        let Success(span, rem) = verbatim("..").parse("..005A").unwrap();
        assert_eq!(<&str>::from(span), "..");
        assert_eq!(rem, "005A");

        let Failure(err, rem) = verbatim("..").parse(".X").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(rem, ".X");
    }

    #[test]
    fn hex_stops_at_non_digit() {
        assert_eq!(hex_u32("0041..005A").unwrap(), Success(0x41, "..005A"));
        assert_eq!(hex_u32("10ffff").unwrap(), Success(0x10FFFF, ""));
        assert_eq!(
            hex_u32("zz").unwrap_err().0.kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn numbers_overflow() {
        let Failure(err, rem) = hex_u32("123456789").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        assert_eq!(rem, "123456789");
        assert_eq!(dec_u32("4294967295").unwrap(), Success(u32::MAX, ""));
        assert_eq!(dec_u32("4294967296").unwrap_err().0.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn take_while_variants() {
        let field = take_while0(|ch| ch != ';');
        let Success(span, rem) = field.parse("Lu ; x").unwrap();
        assert_eq!(<&str>::from(span), "Lu ");
        assert_eq!(rem, "; x");

        let Success(span, _) = field.parse(";").unwrap();
        assert!(span.is_empty());
        assert!(take_while1(|ch: char| ch != ';').parse(";").is_err());
    }

    #[test]
    fn space0_skips_tabs() {
        assert_eq!(space0(" \t x").unwrap(), Success((), "x"));
        assert_eq!(space0("x").unwrap(), Success((), "x"));
    }
}
