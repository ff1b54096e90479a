use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    descriptor::{OperationDescriptor, ParamEncoding, ParamSlot, Range, Wire},
    error::{Error, Result},
    response::{CalendarDate, Sexagesimal, SubMinute},
};

/// Exact byte sequence written for one invocation
pub type Frame = Bytes;

/// Argument value supplied for one parameter slot
#[derive(PartialEq, Debug, Clone)]
pub enum Arg {
    Int(i64),
    Float(f64),
    Text(String),
    Sexagesimal(Sexagesimal),
    Date(CalendarDate),
}

impl From<u8> for Arg {
    fn from(v: u8) -> Self {
        Arg::Int(v.into())
    }
}

impl From<u16> for Arg {
    fn from(v: u16) -> Self {
        Arg::Int(v.into())
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Int(v.into())
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Text(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Text(v)
    }
}

impl From<Sexagesimal> for Arg {
    fn from(v: Sexagesimal) -> Self {
        Arg::Sexagesimal(v)
    }
}

impl From<CalendarDate> for Arg {
    fn from(v: CalendarDate) -> Self {
        Arg::Date(v)
    }
}

/// Renders an invocation into the bytes sent to the mount. Nothing is produced unless every
/// argument passes its slot's predicate.
pub fn encode(desc: &OperationDescriptor, args: &[Arg]) -> Result<Frame> {
    if args.len() != desc.params.len() {
        return Err(Error::InvalidArgument {
            operation: desc.name,
            param: "arguments",
            reason: format!("expected {} argument(s), got {}", desc.params.len(), args.len()),
        });
    }

    let frame = match desc.wire {
        Wire::Control(byte) => Bytes::copy_from_slice(&[byte]),
        Wire::Command(mnemonic) => {
            let mut dst = BytesMut::with_capacity(mnemonic.len() + 16);
            dst.put_u8(b':');
            dst.put_slice(mnemonic.as_bytes());
            for (slot, arg) in desc.params.iter().zip(args) {
                let field = encode_param(slot, arg).map_err(|reason| Error::InvalidArgument {
                    operation: desc.name,
                    param: slot.name,
                    reason,
                })?;
                dst.put_slice(field.as_bytes());
            }
            dst.put_u8(b'#');
            dst.freeze()
        }
    };
    log::trace!("Encoded {}: {:?}", desc.name, frame);
    Ok(frame)
}

type FieldResult = core::result::Result<String, String>;

fn encode_param(slot: &ParamSlot, arg: &Arg) -> FieldResult {
    use ParamEncoding::*;
    match (slot.encoding, arg) {
        (Digit { range }, Arg::Int(n)) => {
            check_range(&range, *n as f64)?;
            if !(0..=9).contains(n) {
                return Err(format!("{} is not a single digit", n));
            }
            Ok(n.to_string())
        }
        (
            Integer {
                width,
                signed,
                range,
                unit,
            },
            Arg::Int(n),
        ) => {
            check_range(&range, *n as f64)?;
            if !signed && *n < 0 {
                return Err(format!("{} must not be negative", n));
            }
            let digits = n.unsigned_abs().to_string();
            let mut field = sign_prefix(signed, *n < 0);
            match width.map(usize::from) {
                Some(w) if digits.len() > w => {
                    return Err(format!("{} does not fit in {} digit(s)", n, w))
                }
                Some(w) => field.push_str(&format!("{:0>w$}", digits, w = w)),
                None => field.push_str(&digits),
            }
            if let Some(u) = unit {
                field.push(u);
            }
            Ok(field)
        }
        (decimal @ Decimal { .. }, Arg::Int(n)) => encode_decimal(decimal, *n as f64),
        (decimal @ Decimal { .. }, Arg::Float(v)) => encode_decimal(decimal, *v),
        (
            Angle {
                degree_digits,
                signed,
                allow_seconds,
                max_degrees,
            },
            Arg::Sexagesimal(a),
        ) => {
            if a.negative && !signed {
                return Err("angle must not be negative".to_string());
            }
            if a.minutes >= 60 {
                return Err(format!("{} minutes is out of range", a.minutes));
            }
            if a.to_decimal().abs() > max_degrees as f64 {
                return Err(format!("{} exceeds {} degrees", a, max_degrees));
            }
            let mut field = sign_prefix(signed, a.negative);
            field.push_str(&format!(
                "{:0w$}*{:02}",
                a.whole,
                a.minutes,
                w = degree_digits as usize
            ));
            match a.fraction {
                SubMinute::None => {}
                SubMinute::Seconds(s) if allow_seconds && s < 60 => {
                    field.push_str(&format!(":{:02}", s))
                }
                SubMinute::Seconds(s) if allow_seconds => {
                    return Err(format!("{} seconds is out of range", s))
                }
                _ => return Err("angle only accepts degrees and minutes".to_string()),
            }
            Ok(field)
        }
        (Time { allow_tenths }, Arg::Sexagesimal(t)) => {
            if t.negative || t.whole >= 24 || t.minutes >= 60 {
                return Err(format!("{} is not a time of day", t));
            }
            match t.fraction {
                SubMinute::Seconds(s) if s < 60 => {
                    Ok(format!("{:02}:{:02}:{:02}", t.whole, t.minutes, s))
                }
                SubMinute::None => Ok(format!("{:02}:{:02}:00", t.whole, t.minutes)),
                SubMinute::Tenths(d) if allow_tenths && d < 10 => {
                    Ok(format!("{:02}:{:02}.{}", t.whole, t.minutes, d))
                }
                _ => Err(format!("{} is not a valid time for this field", t)),
            }
        }
        (Date, Arg::Date(d)) => {
            if !(1..=12).contains(&d.month) || !(1..=31).contains(&d.day) || d.year > 99 {
                return Err(format!("{} is not a calendar date", d));
            }
            Ok(d.to_string())
        }
        (Text { max_len, padded }, Arg::Text(s)) => {
            if let Some(c) = s.chars().find(|c| !(' '..='~').contains(c) || *c == '#') {
                return Err(format!("{:?} cannot be sent in a text field", c));
            }
            let max_len = max_len as usize;
            if s.len() > max_len {
                return Err(format!("longer than {} characters", max_len));
            }
            if padded {
                Ok(format!("{:<w$}", s, w = max_len))
            } else {
                Ok(s.clone())
            }
        }
        (ObjectClasses, Arg::Text(s)) => {
            let valid = s.len() == 5
                && s.chars()
                    .zip("GPDCO".chars())
                    .all(|(c, class)| c.eq_ignore_ascii_case(&class));
            if valid {
                Ok(s.clone())
            } else {
                Err(format!("{:?} is not a GPDCO selection string", s))
            }
        }
        (encoding, arg) => Err(format!("{:?} cannot be encoded as {:?}", arg, encoding)),
    }
}

fn encode_decimal(encoding: ParamEncoding, v: f64) -> FieldResult {
    let (width, precision, signed, range) = match encoding {
        ParamEncoding::Decimal {
            width,
            precision,
            signed,
            range,
        } => (width, precision, signed, range),
        other => return Err(format!("{:?} is not a decimal field", other)),
    };
    if !v.is_finite() {
        return Err(format!("{} is not a finite number", v));
    }
    check_range(&range, v)?;
    if !signed && v < 0.0 {
        return Err(format!("{} must not be negative", v));
    }
    let (w, p) = (width as usize, precision as usize);
    let body = format!("{:0w$.p$}", v.abs(), w = w, p = p);
    if body.len() > w {
        return Err(format!("{} does not fit in {} characters", v, w));
    }
    Ok(sign_prefix(signed, v < 0.0) + &body)
}

fn check_range(range: &Range, v: f64) -> core::result::Result<(), String> {
    if range.contains(v) {
        Ok(())
    } else {
        Err(format!("{} is out of range", v))
    }
}

fn sign_prefix(signed: bool, negative: bool) -> String {
    match (signed, negative) {
        (false, _) => String::new(),
        (true, false) => "+".to_string(),
        (true, true) => "-".to_string(),
    }
}
