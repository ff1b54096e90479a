use bytes::{BufMut, Bytes, BytesMut};
use std::time::{Duration, Instant};

use crate::{
    descriptor::ResponseKind,
    io_adapter::{LinkError, Transport},
};

pub(crate) const TERMINATOR: u8 = b'#';

/// Bytes belonging to one reply, terminator already stripped
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct RawResponse {
    pub payload: Bytes,
    /// Whether a fixed format payload matched one of its templates
    pub conforms: bool,
}

impl RawResponse {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        RawResponse {
            payload: payload.into(),
            conforms: true,
        }
    }

    fn empty() -> Self {
        Self::new(Bytes::new())
    }
}

#[derive(Debug)]
pub(crate) enum FrameError {
    TimedOut,
    /// Ceiling reached before a terminator showed up
    Overrun(Bytes),
    Link(std::io::Error),
}

impl From<LinkError> for FrameError {
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::TimedOut => FrameError::TimedOut,
            LinkError::Io(e) => FrameError::Link(e),
        }
    }
}

/// Consumes exactly the bytes of one reply, as dictated by `kind`, within `timeout`.
///
/// Partially read bytes are dropped on failure, nothing is carried over to the next
/// exchange.
pub(crate) fn read_response<T>(
    link: &mut T,
    kind: &ResponseKind,
    timeout: Duration,
    ceiling: usize,
) -> Result<RawResponse, FrameError>
where
    T: Transport + ?Sized,
{
    let deadline = Instant::now() + timeout;
    match kind {
        ResponseKind::None => Ok(RawResponse::empty()),
        ResponseKind::SingleByte => {
            let b = next_byte(link, deadline)?;
            Ok(RawResponse::new(Bytes::copy_from_slice(&[b])))
        }
        ResponseKind::SingleDigit | ResponseKind::Delimited => {
            read_delimited(link, deadline, ceiling, BytesMut::with_capacity(16))
                .map(RawResponse::new)
        }
        ResponseKind::DigitOrMessage { bare, frames } => {
            let first = next_byte(link, deadline)?;
            if first == *bare {
                return Ok(RawResponse::new(Bytes::copy_from_slice(&[first])));
            }
            if first == TERMINATOR {
                return Ok(RawResponse::empty());
            }
            let mut buf = BytesMut::with_capacity(32);
            buf.put_u8(first);
            let payload = read_delimited(link, deadline, ceiling, buf)?;
            for _ in 1..*frames {
                let trailer = read_delimited(link, deadline, ceiling, BytesMut::new())?;
                log::trace!("Dropped trailing frame {:?}", trailer);
            }
            Ok(RawResponse::new(payload))
        }
        ResponseKind::FixedFormat(pattern) => {
            let payload = read_delimited(link, deadline, ceiling, BytesMut::with_capacity(16))?;
            let conforms = pattern.matches(&payload);
            if !conforms {
                log::warn!(
                    "Reply {:?} does not match any of {:?}",
                    payload,
                    pattern.0
                );
            }
            Ok(RawResponse { payload, conforms })
        }
    }
}

fn read_delimited<T>(
    link: &mut T,
    deadline: Instant,
    ceiling: usize,
    mut buf: BytesMut,
) -> Result<Bytes, FrameError>
where
    T: Transport + ?Sized,
{
    loop {
        let b = next_byte(link, deadline)?;
        if b == TERMINATOR {
            log::trace!("Framed reply {:?}", buf);
            return Ok(buf.freeze());
        }
        if buf.len() >= ceiling {
            return Err(FrameError::Overrun(buf.freeze()));
        }
        buf.put_u8(b);
    }
}

fn next_byte<T>(link: &mut T, deadline: Instant) -> Result<u8, FrameError>
where
    T: Transport + ?Sized,
{
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(FrameError::TimedOut);
    }
    Ok(link.read_byte(remaining)?)
}
