//! Static description of a single protocol operation.
//!
//! Descriptors are plain data: they say how arguments are rendered onto the wire, how many
//! bytes make up the reply and how the reply should be interpreted. The session never
//! special-cases an operation, everything it needs to know lives here.

use core::time::Duration;

use crate::response::Status;

/// ASCII control byte the legacy alignment query consists of
pub const ACK: u8 = 0x06;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationDescriptor {
    /// Stable identifier callers use to look the operation up
    pub name: &'static str,
    pub wire: Wire,
    pub params: &'static [ParamSlot],
    pub response: ResponseKind,
    pub value: ValueKind,
    pub policy: CallPolicy,
}

impl OperationDescriptor {
    pub const fn command(name: &'static str, mnemonic: &'static str) -> Self {
        OperationDescriptor {
            name,
            wire: Wire::Command(mnemonic),
            params: &[],
            response: ResponseKind::None,
            value: ValueKind::None,
            policy: CallPolicy::DEFAULT,
        }
    }

    pub const fn control(name: &'static str, byte: u8) -> Self {
        OperationDescriptor {
            wire: Wire::Control(byte),
            ..Self::command(name, "")
        }
    }

    pub const fn params(mut self, params: &'static [ParamSlot]) -> Self {
        self.params = params;
        self
    }

    pub const fn replies(mut self, response: ResponseKind, value: ValueKind) -> Self {
        self.response = response;
        self.value = value;
        self
    }

    /// Waits up to `timeout` for the reply instead of the session default
    pub const fn patient(mut self, timeout: Duration) -> Self {
        self.policy.timeout = Some(timeout);
        self
    }

    /// Never resend the frame after a timeout
    pub const fn no_retry(mut self) -> Self {
        self.policy.retry = false;
        self
    }
}

/// How the operation appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wire {
    /// `:` + mnemonic + encoded arguments + `#`
    Command(&'static str),
    /// A single unframed control byte
    Control(u8),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSlot {
    pub name: &'static str,
    pub encoding: ParamEncoding,
}

impl ParamSlot {
    pub const fn new(name: &'static str, encoding: ParamEncoding) -> Self {
        ParamSlot { name, encoding }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEncoding {
    /// One ASCII digit
    Digit { range: Range },
    /// Zero padded integer, natural width when `width` is `None`
    Integer {
        width: Option<u8>,
        signed: bool,
        range: Range,
        unit: Option<char>,
    },
    /// Fixed point number, `width` counts digits and the decimal point but not the sign
    Decimal {
        width: u8,
        precision: u8,
        signed: bool,
        range: Range,
    },
    /// `sDD*MM` or `sDD*MM:SS`
    Angle {
        degree_digits: u8,
        signed: bool,
        allow_seconds: bool,
        max_degrees: u16,
    },
    /// `HH:MM:SS` or `HH:MM.T`
    Time { allow_tenths: bool },
    /// `MM/DD/YY`
    Date,
    Text { max_len: u8, padded: bool },
    /// `GPDCO` object class selection, one letter per position in either case
    ObjectClasses,
}

impl ParamEncoding {
    pub const fn digit(min: u8, max: u8) -> Self {
        ParamEncoding::Digit {
            range: Range::inclusive(min as f64, max as f64),
        }
    }

    pub const fn unsigned(width: u8, max: u32) -> Self {
        ParamEncoding::Integer {
            width: Some(width),
            signed: false,
            range: Range::inclusive(0.0, max as f64),
            unit: None,
        }
    }

    pub const fn decimal(width: u8, precision: u8, range: Range) -> Self {
        ParamEncoding::Decimal {
            width,
            precision,
            signed: false,
            range,
        }
    }

    pub const fn signed_decimal(width: u8, precision: u8, range: Range) -> Self {
        ParamEncoding::Decimal {
            width,
            precision,
            signed: true,
            range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

/// Validity predicate for a numeric parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: Limit,
    pub max: Limit,
}

impl Range {
    pub const fn inclusive(min: f64, max: f64) -> Self {
        Range {
            min: Limit::Inclusive(min),
            max: Limit::Inclusive(max),
        }
    }

    pub const fn positive(max: f64) -> Self {
        Range {
            min: Limit::Exclusive(0.0),
            max: Limit::Inclusive(max),
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        let above = match self.min {
            Limit::Unbounded => true,
            Limit::Inclusive(min) => v >= min,
            Limit::Exclusive(min) => v > min,
        };
        let below = match self.max {
            Limit::Unbounded => true,
            Limit::Inclusive(max) => v <= max,
            Limit::Exclusive(max) => v < max,
        };
        !v.is_nan() && above && below
    }
}

/// Where the reply to an operation ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Nothing follows the command
    None,
    /// Exactly one byte, no terminator
    SingleByte,
    /// One status character followed by `#`
    SingleDigit,
    /// Anything up to the first `#`
    Delimited,
    /// One status character, sent alone when it is `bare`, otherwise followed by a message
    /// spanning `frames` terminators. Only the first frame is kept
    DigitOrMessage { bare: u8, frames: u8 },
    /// Up to the first `#`, expected to match one of the templates
    FixedFormat(FormatPattern),
}

/// Protocol style templates a fixed format reply is checked against.
///
/// `s` is a sign, `D H M S T N Y d y` are digits, `m` is a letter and everything else is
/// literal, except `*` which also matches the degree glyph (0xDF) Autostar firmware sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPattern(pub &'static [&'static str]);

const DEGREE_GLYPH: u8 = 0xDF;

impl FormatPattern {
    pub fn matches(&self, payload: &[u8]) -> bool {
        self.0.iter().any(|t| template_matches(t.as_bytes(), payload))
    }
}

fn template_matches(template: &[u8], payload: &[u8]) -> bool {
    template.len() == payload.len()
        && template.iter().zip(payload).all(|(t, b)| match t {
            b's' => *b == b'+' || *b == b'-',
            b'D' | b'H' | b'M' | b'S' | b'T' | b'N' | b'Y' | b'd' | b'y' => b.is_ascii_digit(),
            b'm' => b.is_ascii_alphabetic(),
            b'*' => *b == b'*' || *b == DEGREE_GLYPH,
            lit => lit == b,
        })
}

/// Value type the decoder interprets the payload as
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    None,
    Status(StatusTable),
    /// Status character followed by a free text message
    StatusWithMessage(StatusTable),
    Integer,
    Decimal,
    Angle,
    Time,
    Date,
    Text,
}

pub type StatusTable = &'static [(&'static str, Status)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// Overrides the session read timeout
    pub timeout: Option<Duration>,
    /// Resend the frame once when the reply times out
    pub retry: bool,
}

impl CallPolicy {
    pub const DEFAULT: CallPolicy = CallPolicy {
        timeout: None,
        retry: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_predicates() {
        let flash = Range::inclusive(0.0, 9.0);
        assert!(flash.contains(0.0));
        assert!(flash.contains(9.0));
        assert!(!flash.contains(15.0));

        let rate = Range::positive(99.9);
        assert!(!rate.contains(0.0));
        assert!(rate.contains(0.1));
        assert!(!rate.contains(f64::NAN));

        let guide = Range {
            min: Limit::Inclusive(0.0),
            max: Limit::Exclusive(15.0),
        };
        assert!(guide.contains(14.9));
        assert!(!guide.contains(15.0));
    }

    #[test]
    fn templates() {
        let dec = FormatPattern(&["sDD*MM", "sDD*MM'SS"]);
        assert!(dec.matches(b"+45*30"));
        assert!(dec.matches(b"-05*10'59"));
        assert!(dec.matches(&[b'+', b'4', b'5', 0xDF, b'3', b'0']));
        assert!(!dec.matches(b"45*30"));
        assert!(!dec.matches(b"+45*3"));

        let fw_date = FormatPattern(&["mmm dd yyyy"]);
        assert!(fw_date.matches(b"Oct 18 2026"));
        assert!(!fw_date.matches(b"18 Oct 2026"));
    }
}
