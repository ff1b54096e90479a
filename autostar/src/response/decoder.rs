use bytes::Bytes;
use nom::{combinator::all_consuming, IResult};

use super::{parser, RawResponse, Response, Status};
use crate::{
    descriptor::{OperationDescriptor, ResponseKind, StatusTable, ValueKind},
    error::{Error, Result},
};

/// Interprets a framed reply as the value type declared by `desc`
pub fn decode(desc: &OperationDescriptor, raw: &RawResponse) -> Result<Response> {
    let payload = &raw.payload;
    if desc.response == ResponseKind::SingleDigit && payload.len() != 1 {
        return Err(violation(desc, payload));
    }
    match desc.value {
        ValueKind::None => Ok(Response::Done),
        ValueKind::Status(table) => lookup(table, payload)
            .map(Response::Status)
            .ok_or_else(|| violation(desc, payload)),
        ValueKind::StatusWithMessage(table) => {
            let code = payload.get(..1).ok_or_else(|| violation(desc, payload))?;
            let status = lookup(table, code).ok_or_else(|| violation(desc, payload))?;
            Ok(Response::StatusMessage(
                status,
                text(&payload[1..]).trim().to_string(),
            ))
        }
        ValueKind::Integer => parse(desc, payload, parser::integer, "not an integer")
            .map(Response::Integer),
        ValueKind::Decimal => {
            parse(desc, payload, parser::decimal, "not a number").map(Response::Decimal)
        }
        ValueKind::Angle => {
            parse(desc, payload, parser::angle, "not an angle").map(Response::Angle)
        }
        ValueKind::Time => parse(desc, payload, parser::time, "not a time").map(Response::Time),
        ValueKind::Date => parse(desc, payload, parser::date, "not a date").map(Response::Date),
        ValueKind::Text => Ok(Response::Text(text(payload))),
    }
}

fn lookup(table: StatusTable, code: &[u8]) -> Option<Status> {
    table
        .iter()
        .find(|(c, _)| c.as_bytes() == code)
        .map(|(_, status)| *status)
}

fn parse<'a, T, F>(
    desc: &OperationDescriptor,
    payload: &'a Bytes,
    parser: F,
    reason: &'static str,
) -> Result<T>
where
    F: FnMut(&'a [u8]) -> IResult<&'a [u8], T>,
{
    all_consuming(parser)(&payload[..])
        .map(|(_, v)| v)
        .map_err(|_| Error::DecodeError {
            operation: desc.name,
            reason,
            raw: payload.clone(),
        })
}

/// Handbox text is single byte, 0xDF is its degree glyph
fn text(payload: &[u8]) -> String {
    payload
        .iter()
        .map(|&b| match b {
            0xDF => '°',
            b => b as char,
        })
        .collect()
}

fn violation(desc: &OperationDescriptor, payload: &Bytes) -> Error {
    Error::ProtocolViolation {
        operation: desc.name,
        raw: payload.clone(),
    }
}
