//! Low level parsing helpers shared by the readers.
//!
//! All readers work on the complete file contents in memory. [`Input`] is a
//! cursor into that data which remembers the absolute offset, so that every
//! error can point to the bytes that caused it.

use std::{fmt, ops};

use failure::Fail;


pub(crate) struct Input<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Input<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// The absolute position of the cursor.
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Makes sure that at least `num_bytes` bytes are left.
    pub(crate) fn prepare(&self, num_bytes: usize) -> Result<(), Error> {
        if self.len() < num_bytes {
            Err(Error::UnexpectedEof(self.data.len()))
        } else {
            Ok(())
        }
    }

    pub(crate) fn consume(&mut self, num_bytes: usize) {
        debug_assert!(num_bytes <= self.len());
        self.offset += num_bytes;
    }

    pub(crate) fn spanned_data(&self, num_bytes: usize) -> SpannedData<'a> {
        SpannedData {
            data: &self.data[self.offset..self.offset + num_bytes],
            span: Span::new(self.offset, self.offset + num_bytes),
        }
    }

    pub(crate) fn skip(&mut self, num_bytes: usize) -> Result<(), Error> {
        self.prepare(num_bytes)?;
        self.consume(num_bytes);

        Ok(())
    }

    /// Skips bytes until `stopper` says stop or the end of the input is
    /// reached.
    pub(crate) fn skip_until(&mut self, stopper: impl Stopper) {
        while !self.is_eof() && !stopper.should_stop(self[0]) {
            self.consume(1);
        }
    }

    pub(crate) fn with_bytes<F, O>(&mut self, num_bytes: usize, func: F) -> Result<O, Error>
    where
        F: FnOnce(SpannedData<'a>) -> Result<O, Error>,
    {
        self.prepare(num_bytes)?;
        let out = func(self.spanned_data(num_bytes))?;
        self.consume(num_bytes);

        Ok(out)
    }

    /// Passes all bytes up to (excluding) the first byte at which `stopper`
    /// says stop to `func` and consumes them. The end of the input stops as
    /// well. At most `max_len` bytes are looked at.
    pub(crate) fn take_until<F, O>(
        &mut self,
        max_len: usize,
        stopper: impl Stopper,
        func: F,
    ) -> Result<O, Error>
    where
        F: FnOnce(SpannedData<'a>) -> Result<O, Error>,
    {
        let pos = self.iter()
            .take(max_len + 1)
            .position(|&b| stopper.should_stop(b))
            .unwrap_or(self.len());

        if pos > max_len {
            return Err(Error::LookAheadTooBig(self.offset));
        }

        let out = func(self.spanned_data(pos))?;
        self.consume(pos);

        Ok(out)
    }

    pub(crate) fn assert_eof(&self) -> Result<(), Error> {
        if !self.is_eof() {
            Err(Error::UnexpectedAdditionalData(self.offset))
        } else {
            Ok(())
        }
    }

    pub(crate) fn expect_tag(&mut self, tag: &[u8]) -> Result<(), Error> {
        let len = tag.len().min(self.len());
        if self[..len] != *tag {
            // Show a bit more than the tag itself to make the error useful.
            let shown = self.spanned_data((tag.len() + 10).min(self.len()));
            let msg = format!(
                "expected {}, found {}",
                debug_fmt_bytes(tag),
                debug_fmt_bytes(shown.data),
            );
            return Err(shown.error(msg));
        }

        self.skip(tag.len())
    }

    pub(crate) fn is_next(&self, expected: &[u8]) -> bool {
        self.starts_with(expected)
    }
}

impl ops::Deref for Input<'_> {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data[self.offset..]
    }
}


#[derive(Debug)]
pub(crate) struct SpannedData<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) span: Span,
}

impl<'a> SpannedData<'a> {
    pub(crate) fn error(&self, msg: impl Into<String>) -> Error {
        Error::Custom(msg.into(), self.span)
    }

    pub(crate) fn assert_ascii(&self) -> Result<&'a str, Error> {
        if !self.data.is_ascii() {
            return Err(Error::NotAscii(self.span));
        }

        // ASCII is always valid UTF-8.
        std::str::from_utf8(self.data).map_err(|_| Error::NotAscii(self.span))
    }

    /// Parses the data as `T` via `FromStr`.
    pub(crate) fn parse<T>(&self, what: &str) -> Result<T, Error>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        self.assert_ascii()?
            .parse::<T>()
            .map_err(|e| self.error(format!("invalid {} literal: {}", what, e)))
    }
}

/// A byte range in the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    lo: usize,
    hi: usize,
}

impl Span {
    pub fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    pub fn lo(&self) -> usize {
        self.lo
    }

    pub fn hi(&self) -> usize {
        self.hi
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.lo, self.hi)
    }
}

/// Everything that can go wrong while parsing a mesh file.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "unexpected EOF while parsing (at {})", _0)]
    UnexpectedEof(usize),

    #[fail(display = "expected EOF, but additional data was found (at {})", _0)]
    UnexpectedAdditionalData(usize),

    #[fail(display = "unexpected non-ASCII data at {}", _0)]
    NotAscii(Span),

    #[fail(
        display = "parsing lookahead got too big at {} (due to a really degenerated \
            file or a parser bug)",
        _0
    )]
    LookAheadTooBig(usize),

    #[fail(display = "{} (at {})", _0, _1)]
    Custom(String, Span),
}

impl Error {
    /// The span in the input this error refers to, if any.
    pub fn span(&self) -> Option<Span> {
        match *self {
            Error::UnexpectedEof(at) => Some(Span::new(at, at)),
            Error::UnexpectedAdditionalData(at) => Some(Span::new(at, at + 1)),
            Error::NotAscii(span) | Error::Custom(_, span) => Some(span),
            Error::LookAheadTooBig(_) => None,
        }
    }
}


macro_rules! gen_endian_parser {
    ($name:ident, $ty:ident, $method:ident, $endian:ident) => {
        pub(crate) fn $name(input: &mut Input<'_>) -> Result<$ty, Error> {
            use byteorder::ByteOrder;

            input.with_bytes(std::mem::size_of::<$ty>(), |sd| {
                Ok(byteorder::$endian::$method(sd.data))
            })
        }
    }
}

pub(crate) fn u8_we(input: &mut Input<'_>) -> Result<u8, Error> {
    input.with_bytes(1, |sd| Ok(sd.data[0]))
}
pub(crate) fn i8_we(input: &mut Input<'_>) -> Result<i8, Error> {
    input.with_bytes(1, |sd| Ok(sd.data[0] as i8))
}

gen_endian_parser!(u16_le, u16, read_u16, LittleEndian);
gen_endian_parser!(u32_le, u32, read_u32, LittleEndian);
gen_endian_parser!(i16_le, i16, read_i16, LittleEndian);
gen_endian_parser!(i32_le, i32, read_i32, LittleEndian);
gen_endian_parser!(f32_le, f32, read_f32, LittleEndian);
gen_endian_parser!(f64_le, f64, read_f64, LittleEndian);

gen_endian_parser!(u16_be, u16, read_u16, BigEndian);
gen_endian_parser!(u32_be, u32, read_u32, BigEndian);
gen_endian_parser!(i16_be, i16, read_i16, BigEndian);
gen_endian_parser!(i32_be, i32, read_i32, BigEndian);
gen_endian_parser!(f32_be, f32, read_f32, BigEndian);
gen_endian_parser!(f64_be, f64, read_f64, BigEndian);


/// Formats bytes as string if they are valid UTF-8, as byte list otherwise.
pub fn debug_fmt_bytes(data: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(data) {
        format!("{:?}", s)
    } else {
        format!("{:?}", data)
    }
}

pub(crate) trait Stopper {
    fn should_stop(&self, byte: u8) -> bool;
}

impl Stopper for u8 {
    fn should_stop(&self, byte: u8) -> bool {
        byte == *self
    }
}

impl<F: Fn(u8) -> bool> Stopper for F {
    fn should_stop(&self, byte: u8) -> bool {
        self(byte)
    }
}

pub(crate) fn is_inline_whitespace(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\r'
}

/// Skips spaces, tabs and carriage returns.
pub(crate) fn opt_whitespace(input: &mut Input<'_>) {
    input.skip_until(|b| !is_inline_whitespace(b));
}

/// Requires at least one whitespace character and skips all that follow.
pub(crate) fn whitespace(input: &mut Input<'_>) -> Result<(), Error> {
    if input.is_eof() || !is_inline_whitespace(input[0]) {
        let len = input.len().min(10);
        let found = input.spanned_data(len);
        let msg = format!("expected whitespace, found {}", debug_fmt_bytes(found.data));
        return Err(found.error(msg));
    }

    opt_whitespace(input);
    Ok(())
}

/// Requires a `\n` linebreak with optional whitespace before it (this also
/// accepts `\r\n`). Blank lines after it are skipped as well.
pub(crate) fn linebreak(input: &mut Input<'_>) -> Result<(), Error> {
    opt_whitespace(input);
    input.expect_tag(b"\n")?;
    input.skip_until(|b| !is_inline_whitespace(b) && b != b'\n');
    Ok(())
}

/// A single token: everything up to the next whitespace or linebreak.
pub(crate) fn token<'a>(input: &mut Input<'a>) -> Result<SpannedData<'a>, Error> {
    input.take_until(1024, |b| is_inline_whitespace(b) || b == b'\n', |sd| Ok(sd))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_until_stops_at_eof() {
        let mut input = Input::new(b"12.5");
        let v: f32 = token(&mut input).unwrap().parse("float").unwrap();
        assert_eq!(v, 12.5);
        assert!(input.is_eof());
    }

    #[test]
    fn expect_tag_mismatch_has_span() {
        let mut input = Input::new(b"  facet");
        opt_whitespace(&mut input);
        let err = input.expect_tag(b"vertex").unwrap_err();
        assert_eq!(err.span(), Some(Span::new(2, 7)));
    }

    #[test]
    fn linebreak_accepts_crlf_and_blank_lines() {
        let mut input = Input::new(b" \r\n\n  \nnext");
        linebreak(&mut input).unwrap();
        assert!(input.is_next(b"next"));
    }

    #[test]
    fn binary_primitives() {
        let data = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0xff];
        let mut input = Input::new(&data);
        assert_eq!(u32_le(&mut input).unwrap(), 1);
        assert_eq!(u32_be(&mut input).unwrap(), 2);
        assert_eq!(i8_we(&mut input).unwrap(), -1);
        match u8_we(&mut input) {
            Err(Error::UnexpectedEof(9)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
