//! implements a parser for responses in the beanstalkd TCP protocol.
use std::fmt;

use crate::types::protocol::BeanstalkResponse;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParsingError {
    BadFormat,
    UnknownResponse,
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::BadFormat => "bad format",
            Self::UnknownResponse => "unknown response",
        })
    }
}

/// The longest tube name the broker accepts.
const MAX_TUBE_NAME_LEN: usize = 200;

/// Checks a tube name against the broker's naming rules: 1 to 200 bytes drawn
/// from letters, digits and `+/;.$_()-`, where `-` can't come first.
pub fn is_valid_tube_name(name: &[u8]) -> bool {
    fn char_is_name_safe(c: u8, is_first: bool) -> bool {
        match c {
            b'a'..=b'z' => true,
            b'A'..=b'Z' => true,
            b'0'..=b'9' => true,
            b'+' | b'/' | b';' | b'.' | b'$' | b'_' | b'(' | b')' => true,
            b'-' => !is_first, // - is only name safe outside first position
            _ => false,
        }
    }

    !name.is_empty()
        && name.len() <= MAX_TUBE_NAME_LEN
        && name
            .iter()
            .enumerate()
            .all(|(i, c)| char_is_name_safe(*c, i == 0))
}

/// Provides a custom, minimal, zero-copy parser of byte slices.
struct ParseState<'a> {
    from: &'a [u8],
}

impl ParseState<'_> {
    /// Asserts there's no more input to take, returning `result` if so, and a
    /// `BadFormat` error otherwise.
    fn expect_done_and<R>(&self, result: R) -> Result<R, ParsingError> {
        if self.from.is_empty() {
            Ok(result)
        } else {
            Err(ParsingError::BadFormat)
        }
    }

    /// Consumes from the input, expecting a token of non-zero length.
    fn expect_next_token(&mut self) -> Result<&[u8], ParsingError> {
        let token = self.next_token().ok_or(ParsingError::BadFormat)?;

        if token.is_empty() {
            Err(ParsingError::BadFormat)
        } else {
            Ok(token)
        }
    }

    /// Consumes from the input, expecting a space then a u32.
    fn expect_next_u32(&mut self) -> Result<u32, ParsingError> {
        let r = self.expect_next_u64()?;

        u32::try_from(r).map_err(|_| ParsingError::BadFormat)
    }

    /// Consumes from the input, expecting a space then a u64.
    fn expect_next_u64(&mut self) -> Result<u64, ParsingError> {
        self.expect_space()?;

        let token = self.expect_next_token()?;

        let mut r = 0u64;
        for v in token {
            match v {
                b'0'..=b'9' => {
                    r = r
                        .checked_mul(10)
                        .ok_or(ParsingError::BadFormat)?
                        .checked_add((*v - b'0') as u64)
                        .ok_or(ParsingError::BadFormat)?
                },
                _ => return Err(ParsingError::BadFormat),
            };
        }

        Ok(r)
    }

    /// Consumes from the input, expecting a space then a tube name.
    fn expect_next_name(&mut self) -> Result<Vec<u8>, ParsingError> {
        self.expect_space()?;

        let token = self.expect_next_token()?;

        if is_valid_tube_name(token) {
            Ok(token.to_vec())
        } else {
            Err(ParsingError::BadFormat)
        }
    }

    /// Consumes a space.
    fn expect_space(&mut self) -> Result<(), ParsingError> {
        match self.from.first() {
            Some(b' ') => {
                self.from = &self.from[1..];
                Ok(())
            },
            _ => Err(ParsingError::BadFormat),
        }
    }

    /// Consumes from this ParseState until reaching a space byte or the end of
    /// the input. It returns None at the end of the input. On consecutive space
    /// bytes, it returns a zero-length slice.
    fn next_token(&mut self) -> Option<&[u8]> {
        if self.from.is_empty() {
            return None;
        }

        let idx = self
            .from
            .iter()
            .position(|c| *c == b' ')
            .unwrap_or(self.from.len());

        let token = &self.from[..idx];
        self.from = &self.from[idx..];

        Some(token)
    }
}

impl<'a> From<&'a [u8]> for ParseState<'a> {
    fn from(from: &'a [u8]) -> Self {
        ParseState { from }
    }
}

// Parsing is implemented to fulfil the TryFrom trait. The input is a single
// response line with its CRLF already removed; any data block that follows
// (for `RESERVED` and `OK`) is read separately by length.
impl TryFrom<&[u8]> for BeanstalkResponse {
    type Error = ParsingError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        use BeanstalkResponse::*;

        let mut ps: ParseState = value.into();

        let resp = match ps.expect_next_token()? {
            // <resp>
            b"BAD_FORMAT" => BadFormat,
            b"DEADLINE_SOON" => DeadlineSoon,
            b"DELETED" => Deleted,
            b"DRAINING" => Draining,
            b"EXPECTED_CRLF" => ExpectedCRLF,
            b"INTERNAL_ERROR" => InternalError,
            b"JOB_TOO_BIG" => JobTooBig,
            b"NOT_FOUND" => NotFound,
            b"NOT_IGNORED" => NotIgnored,
            b"OUT_OF_MEMORY" => OutOfMemory,
            b"TIMED_OUT" => TimedOut,
            b"UNKNOWN_COMMAND" => UnknownCommand,

            // <resp> <id>
            b"BURIED" => BuriedId {
                id: ps.expect_next_u64()?,
            },
            b"INSERTED" => Inserted {
                id: ps.expect_next_u64()?,
            },

            // <resp> <count>
            b"WATCHING" => Watching {
                count: ps.expect_next_u32()?,
            },

            // <resp> <n_bytes>
            b"OK" => OkData {
                n_bytes: ps.expect_next_u32()?,
            },

            // <resp> <tube>
            b"USING" => Using {
                tube: ps.expect_next_name()?,
            },

            // <resp> <id> <n_bytes>
            b"RESERVED" => Reserved {
                id: ps.expect_next_u64()?,
                n_bytes: ps.expect_next_u32()?,
            },

            _ => return Err(ParsingError::UnknownResponse),
        };

        ps.expect_done_and(resp)
    }
}
