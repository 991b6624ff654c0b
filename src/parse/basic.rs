//! Generic parser and combinator building blocks.
//!
//! Everything in this module works for any combination of input and error
//! types. Most combinators that take a parser and produce a transformed parser
//! are also available as methods on the [`Parse`] trait.

use super::{
    Error, ErrorSeed, Failure, Input, IntoInput, PResult, PResultExt, Parse, Success,
};
use core::marker::PhantomData;

#[derive(Debug, Clone)]
struct MapParser<P, F, R, I>(P, F, PhantomData<fn() -> (R, I)>)
where
    P: Parse<I>,
    I: Input,
    F: Fn(P::Parsed) -> R;

impl<P, F, R, I> Parse<I> for MapParser<P, F, R, I>
where
    P: Parse<I>,
    I: Input,
    F: Fn(P::Parsed) -> R,
{
    type Parsed = R;
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<R, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        self.0.parse(input).map_parsed(&self.1)
    }
}

/// Creates a parser whose parsed result is transformed by `map_fn`.
///
/// See also [`Parse::map`].
#[inline]
pub const fn map<P, F, R, I>(parser: P, map_fn: F) -> impl Parse<I, Parsed = R, Error = P::Error>
where
    P: Parse<I>,
    I: Input,
    F: Fn(P::Parsed) -> R,
{
    MapParser(parser, map_fn, PhantomData)
}

#[derive(Debug, Clone)]
struct TryMapParser<P, F, R, S, I>(P, F, PhantomData<fn() -> (R, S, I)>)
where
    P: Parse<I>,
    I: Input,
    S: ErrorSeed<I, P::Error>,
    F: Fn(P::Parsed) -> Result<R, S>;

impl<P, F, R, S, I> Parse<I> for TryMapParser<P, F, R, S, I>
where
    P: Parse<I>,
    I: Input,
    S: ErrorSeed<I, P::Error>,
    F: Fn(P::Parsed) -> Result<R, S>,
{
    type Parsed = R;
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<R, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        match self.0.parse(input.clone()).map_parsed(&self.1) {
            Ok(Success(Ok(val), rem)) => Ok(Success(val, rem)),
            Ok(Success(Err(seed), _)) => Err(Failure(seed.into_error(input.clone()), input)),
            Err(Failure(err, _)) => Err(Failure(err, input)),
        }
    }
}

/// Creates a parser whose parsed result is fallibly transformed by `try_map_fn`.
///
/// See also [`Parse::try_map`].
#[inline]
pub const fn try_map<P, F, R, S, I>(
    parser: P,
    try_map_fn: F,
) -> impl Parse<I, Parsed = R, Error = P::Error>
where
    P: Parse<I>,
    I: Input,
    S: ErrorSeed<I, P::Error>,
    F: Fn(P::Parsed) -> Result<R, S>,
{
    TryMapParser(parser, try_map_fn, PhantomData)
}

#[derive(Debug, Clone)]
struct WithValueParser<P, T, I>(P, T, PhantomData<fn() -> I>)
where
    P: Parse<I>,
    I: Input,
    T: Clone;

impl<P, T, I> Parse<I> for WithValueParser<P, T, I>
where
    P: Parse<I>,
    I: Input,
    T: Clone,
{
    type Parsed = T;
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<T, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        self.0.parse(input).map_parsed(|_| self.1.clone())
    }
}

#[inline]
pub const fn with_value<P, T, I>(parser: P, value: T) -> impl Parse<I, Parsed = T, Error = P::Error>
where
    P: Parse<I>,
    I: Input,
    T: Clone,
{
    WithValueParser(parser, value, PhantomData)
}

#[derive(Debug, Clone)]
struct VerifyParser<P, F, I>(P, F, PhantomData<fn() -> I>)
where
    P: Parse<I>,
    I: Input,
    F: Fn(&P::Parsed) -> bool;

impl<P, F, I> Parse<I> for VerifyParser<P, F, I>
where
    P: Parse<I>,
    I: Input,
    F: Fn(&P::Parsed) -> bool,
{
    type Parsed = P::Parsed;
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<Self::Parsed, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        match self.0.parse(input.clone()) {
            Ok(Success(val, rem)) if (self.1)(&val) => Ok(Success(val, rem)),
            Ok(_) => Err(Failure(Error::invalid_input(input.clone()), input)),
            Err(Failure(e, _)) => Err(Failure(e, input)),
        }
    }
}

#[inline]
pub const fn verify<P, F, I>(
    parser: P,
    verify_fn: F,
) -> impl Parse<I, Parsed = P::Parsed, Error = P::Error>
where
    P: Parse<I>,
    I: Input,
    F: Fn(&P::Parsed) -> bool,
{
    VerifyParser(parser, verify_fn, PhantomData)
}

#[derive(Debug, Clone)]
struct OptParser<P, I>(P, PhantomData<fn() -> I>)
where
    P: Parse<I>,
    I: Input;

impl<P, I> Parse<I> for OptParser<P, I>
where
    P: Parse<I>,
    I: Input,
{
    type Parsed = Option<P::Parsed>;
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<Self::Parsed, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        match self.0.parse(input) {
            Ok(Success(val, rem)) => Ok(Success(Some(val), rem)),
            Err(Failure(_, rem)) => Ok(Success(None, rem)),
        }
    }
}

#[inline]
pub const fn opt<P, I>(parser: P) -> impl Parse<I, Parsed = Option<P::Parsed>, Error = P::Error>
where
    P: Parse<I>,
    I: Input,
{
    OptParser(parser, PhantomData)
}

struct Many0Iter<'a, P, I>(&'a P, &'a mut I)
where
    P: Parse<I>,
    I: Input;

impl<'a, P, I> Iterator for Many0Iter<'a, P, I>
where
    P: Parse<I>,
    I: Input,
{
    type Item = P::Parsed;

    fn next(&mut self) -> Option<Self::Item> {
        match self.0.parse(self.1.clone()) {
            Ok(Success(ret, rem)) => {
                *self.1 = rem;
                Some(ret)
            }
            Err(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
struct CollectMany0Parser<P, C, I>(P, PhantomData<fn() -> (C, I)>)
where
    P: Parse<I>,
    I: Input,
    C: FromIterator<P::Parsed>;

impl<P, C, I> Parse<I> for CollectMany0Parser<P, C, I>
where
    P: Parse<I>,
    I: Input,
    C: FromIterator<P::Parsed>,
{
    type Parsed = C;
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<C, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let mut input = input.into_input();
        let ret = C::from_iter(Many0Iter(&self.0, &mut input));
        let _ = Many0Iter(&self.0, &mut input).count();
        Ok(Success(ret, input))
    }
}

/// Creates a parser that applies `parser` until it fails and collects every
/// parsed value. Never fails itself.
#[inline]
pub const fn collect_many0<P, C, I>(parser: P) -> impl Parse<I, Parsed = C, Error = P::Error>
where
    P: Parse<I>,
    I: Input,
    C: FromIterator<P::Parsed>,
{
    CollectMany0Parser(parser, PhantomData)
}

#[derive(Debug, Clone)]
struct CompleteParser<P, I>(P, PhantomData<fn() -> I>)
where
    P: Parse<I>,
    I: Input;

impl<P, I> Parse<I> for CompleteParser<P, I>
where
    P: Parse<I>,
    I: Input,
{
    type Parsed = P::Parsed;
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<Self::Parsed, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        let Success(val, rem) = self.0.parse(input.clone())?;
        if rem.is_empty() {
            Ok(Success(val, rem))
        } else {
            Err(Failure(Error::expected_eof(rem), input))
        }
    }
}

#[inline]
pub const fn complete<P, I>(parser: P) -> impl Parse<I, Parsed = P::Parsed, Error = P::Error>
where
    P: Parse<I>,
    I: Input,
{
    CompleteParser(parser, PhantomData)
}

#[derive(Debug, Clone)]
struct PrefixParser<P, Q, I>(P, Q, PhantomData<fn() -> I>)
where
    P: Parse<I>,
    Q: Parse<I, Error = P::Error>,
    I: Input;

impl<P, Q, I> Parse<I> for PrefixParser<P, Q, I>
where
    P: Parse<I>,
    Q: Parse<I, Error = P::Error>,
    I: Input,
{
    type Parsed = Q::Parsed;
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<Self::Parsed, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        match self.0.parse(input.clone()) {
            Ok(Success(_, rem)) => match self.1.parse(rem) {
                Ok(Success(val, rem)) => Ok(Success(val, rem)),
                Err(Failure(e, _)) => Err(Failure(e, input)),
            },
            Err(Failure(e, _)) => Err(Failure(e, input)),
        }
    }
}

/// Creates a parser that applies `prefix` then `parser`, keeping only the
/// result of `parser`.
#[inline]
pub const fn prefix<P, Q, I>(
    prefix: P,
    parser: Q,
) -> impl Parse<I, Parsed = Q::Parsed, Error = P::Error>
where
    P: Parse<I>,
    Q: Parse<I, Error = P::Error>,
    I: Input,
{
    PrefixParser(prefix, parser, PhantomData)
}

#[derive(Debug, Clone)]
struct DelimitedParser<P, Q, S, I>(P, Q, S, PhantomData<fn() -> I>)
where
    P: Parse<I>,
    Q: Parse<I, Error = P::Error>,
    S: Parse<I, Error = P::Error>,
    I: Input;

impl<P, Q, S, I> Parse<I> for DelimitedParser<P, Q, S, I>
where
    P: Parse<I>,
    Q: Parse<I, Error = P::Error>,
    S: Parse<I, Error = P::Error>,
    I: Input,
{
    type Parsed = Q::Parsed;
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<Self::Parsed, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        let rem = match self.0.parse(input.clone()) {
            Ok(Success(_, rem)) => rem,
            Err(Failure(e, _)) => return Err(Failure(e, input)),
        };
        let (val, rem) = match self.1.parse(rem) {
            Ok(Success(val, rem)) => (val, rem),
            Err(Failure(e, _)) => return Err(Failure(e, input)),
        };
        match self.2.parse(rem) {
            Ok(Success(_, rem)) => Ok(Success(val, rem)),
            Err(Failure(e, _)) => Err(Failure(e, input)),
        }
    }
}

/// Creates a parser that applies `prefix`, `parser` and `suffix` in order,
/// keeping only the result of `parser`.
#[inline]
pub const fn delimited<P, Q, S, I>(
    prefix: P,
    parser: Q,
    suffix: S,
) -> impl Parse<I, Parsed = Q::Parsed, Error = P::Error>
where
    P: Parse<I>,
    Q: Parse<I, Error = P::Error>,
    S: Parse<I, Error = P::Error>,
    I: Input,
{
    DelimitedParser(prefix, parser, suffix, PhantomData)
}

#[derive(Debug, Clone)]
struct SeparatedParser<P, S, Q, I>(P, S, Q, PhantomData<fn() -> I>)
where
    P: Parse<I>,
    S: Parse<I, Error = P::Error>,
    Q: Parse<I, Error = P::Error>,
    I: Input;

impl<P, S, Q, I> Parse<I> for SeparatedParser<P, S, Q, I>
where
    P: Parse<I>,
    S: Parse<I, Error = P::Error>,
    Q: Parse<I, Error = P::Error>,
    I: Input,
{
    type Parsed = (P::Parsed, Q::Parsed);
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<Self::Parsed, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        let (first, rem) = match self.0.parse(input.clone()) {
            Ok(Success(val, rem)) => (val, rem),
            Err(Failure(e, _)) => return Err(Failure(e, input)),
        };
        let rem = match self.1.parse(rem) {
            Ok(Success(_, rem)) => rem,
            Err(Failure(e, _)) => return Err(Failure(e, input)),
        };
        match self.2.parse(rem) {
            Ok(Success(second, rem)) => Ok(Success((first, second), rem)),
            Err(Failure(e, _)) => Err(Failure(e, input)),
        }
    }
}

/// Creates a parser for two values around a separator, discarding the separator.
#[inline]
pub const fn separated_pair<P, S, Q, I>(
    first: P,
    separator: S,
    second: Q,
) -> impl Parse<I, Parsed = (P::Parsed, Q::Parsed), Error = P::Error>
where
    P: Parse<I>,
    S: Parse<I, Error = P::Error>,
    Q: Parse<I, Error = P::Error>,
    I: Input,
{
    SeparatedParser(first, separator, second, PhantomData)
}

#[derive(Debug, Clone)]
struct PairParser<P, Q, I>(P, Q, PhantomData<fn() -> I>)
where
    P: Parse<I>,
    Q: Parse<I, Error = P::Error>,
    I: Input;

impl<P, Q, I> Parse<I> for PairParser<P, Q, I>
where
    P: Parse<I>,
    Q: Parse<I, Error = P::Error>,
    I: Input,
{
    type Parsed = (P::Parsed, Q::Parsed);
    type Error = P::Error;

    fn parse<N>(&self, input: N) -> PResult<Self::Parsed, I, Self::Error>
    where
        N: IntoInput<Input = I>,
    {
        let input = input.into_input();
        match self.0.parse(input.clone()) {
            Ok(Success(first, rem)) => match self.1.parse(rem) {
                Ok(Success(second, rem)) => Ok(Success((first, second), rem)),
                Err(Failure(e, _)) => Err(Failure(e, input)),
            },
            Err(Failure(e, _)) => Err(Failure(e, input)),
        }
    }
}

#[inline]
pub const fn pair<P, Q, I>(
    first: P,
    second: Q,
) -> impl Parse<I, Parsed = (P::Parsed, Q::Parsed), Error = P::Error>
where
    P: Parse<I>,
    Q: Parse<I, Error = P::Error>,
    I: Input,
{
    PairParser(first, second, PhantomData)
}

pub fn pop<I: Input, E: Error<I>>(mut input: I) -> PResult<I::Symbol, I, E> {
    if let Some(symb) = input.next() {
        Ok(Success(symb, input))
    } else {
        Err(Failure(E::need_more_input(input.clone()), input))
    }
}

pub fn remaining<I: Input, E: Error<I>>(mut input: I) -> PResult<I, I, E> {
    let ret = input.clone();
    input.advance_by(usize::MAX);
    Ok(Success(ret, input))
}
