use parking_lot::{Mutex, MutexGuard};
use scopeguard::guard;
use std::sync::Arc;

use crate::{
    catalog::Catalog,
    command::{encode, Arg, Frame},
    config::SessionConfig,
    descriptor::OperationDescriptor,
    error::{Error, Result},
    io_adapter::Transport,
    response::{
        decoder::decode,
        framer::{read_response, FrameError},
        RawResponse, Response,
    },
};

/// Owns the link to one mount and runs one exchange at a time over it.
///
/// `invoke` may be called from several threads. Callers queue on the link in arrival order
/// and each holds it from the first byte written until its reply is framed or given up on.
/// Encoding happens before and decoding after the link is held.
pub struct Session<IO: Transport> {
    link: Mutex<IO>,
    catalog: Arc<Catalog>,
    config: SessionConfig,
}

impl<IO: Transport> Session<IO> {
    pub fn new(io: IO) -> Self {
        Self::with_config(io, SessionConfig::default())
    }

    pub fn with_config(io: IO, config: SessionConfig) -> Self {
        Self::with_catalog(io, Catalog::standard(), config)
    }

    pub fn with_catalog(io: IO, catalog: Arc<Catalog>, config: SessionConfig) -> Self {
        log::debug!(
            "Session opened with {} operations, {:?}",
            catalog.len(),
            config
        );
        Session {
            link: Mutex::new(io),
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Ends the session and hands the transport back
    pub fn close(self) -> IO {
        log::debug!("Session closed");
        self.link.into_inner()
    }

    /// Looks `name` up in the catalog and runs it
    pub fn invoke(&self, name: &str, args: &[Arg]) -> Result<Response> {
        let desc = *self
            .catalog
            .get(name)
            .ok_or_else(|| Error::UnsupportedOperation(name.to_string()))?;
        self.invoke_descriptor(&desc, args)
    }

    pub fn invoke_descriptor(&self, desc: &OperationDescriptor, args: &[Arg]) -> Result<Response> {
        let frame = encode(desc, args)?;
        let raw = self.exchange(desc, &frame)?;
        decode(desc, &raw)
    }

    fn exchange(&self, desc: &OperationDescriptor, frame: &Frame) -> Result<RawResponse> {
        let timeout = desc.policy.timeout.unwrap_or(self.config.read_timeout);
        let attempts = if self.config.retry_on_timeout && desc.policy.retry {
            2
        } else {
            1
        };

        let mut link = guard(self.link.lock(), |l| MutexGuard::unlock_fair(l));
        let mut attempt = 1;
        loop {
            link.discard_input()?;
            log::trace!("{} -> {:?}", desc.name, frame);
            link.write_all(frame)?;
            let reply = read_response(
                &mut **link,
                &desc.response,
                timeout,
                self.config.max_response_len,
            );
            match reply {
                Ok(raw) => {
                    log::trace!("{} <- {:?}", desc.name, raw.payload);
                    return Ok(raw);
                }
                Err(FrameError::TimedOut) if attempt < attempts => {
                    log::warn!("No reply to {} within {:?}, resending", desc.name, timeout);
                    attempt += 1;
                }
                Err(FrameError::TimedOut) => {
                    return Err(Error::Timeout {
                        operation: desc.name,
                        attempts: attempt,
                    })
                }
                Err(FrameError::Overrun(raw)) => {
                    return Err(Error::ProtocolViolation {
                        operation: desc.name,
                        raw,
                    })
                }
                Err(FrameError::Link(e)) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{io_adapter::LinkError, response::Status};
    use claims::*;
    use core::time::Duration;
    use std::collections::VecDeque;

    /// Records writes, replays `replies` one per written frame
    #[derive(Default)]
    struct Echo {
        written: Vec<Vec<u8>>,
        replies: VecDeque<Vec<u8>>,
        pending: VecDeque<u8>,
        discards: usize,
    }

    impl Transport for Echo {
        fn write_all(&mut self, buf: &[u8]) -> core::result::Result<(), LinkError> {
            self.written.push(buf.to_vec());
            if let Some(reply) = self.replies.pop_front() {
                self.pending.extend(reply);
            }
            Ok(())
        }

        fn read_byte(&mut self, _timeout: Duration) -> core::result::Result<u8, LinkError> {
            self.pending.pop_front().ok_or(LinkError::TimedOut)
        }

        fn discard_input(&mut self) -> core::result::Result<(), LinkError> {
            self.discards += 1;
            self.pending.clear();
            Ok(())
        }
    }

    fn echo(replies: &[&[u8]]) -> Echo {
        Echo {
            replies: replies.iter().map(|r| r.to_vec()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn unknown_operation() {
        let session = Session::new(echo(&[]));
        assert_matches!(
            session.invoke("warp_drive", &[]),
            Err(Error::UnsupportedOperation(name)) if name == "warp_drive"
        );
        assert!(session.close().written.is_empty());
    }

    #[test]
    fn stale_input_is_discarded_before_each_write() {
        let mut link = echo(&[b"1#"]);
        link.pending.extend(b" #");
        let session = Session::new(link);
        assert_ok_eq!(
            session.invoke("set_site_name_1", &["Home".into()]),
            Response::Status(Status::Accepted)
        );
        assert_eq!(session.close().discards, 1);
    }

    #[test]
    fn retry_can_be_disabled() {
        let config = SessionConfig {
            retry_on_timeout: false,
            ..Default::default()
        };
        let session = Session::with_config(echo(&[]), config);
        assert_matches!(
            session.invoke("get_ra", &[]),
            Err(Error::Timeout { attempts: 1, .. })
        );
        assert_eq!(session.close().written.len(), 1);

        let session = Session::new(echo(&[]));
        assert_matches!(
            session.invoke("gps_update_time", &[]),
            Err(Error::Timeout { attempts: 1, .. })
        );
    }

    #[test]
    fn transport_opens_its_own_session() {
        let config = SessionConfig {
            retry_on_timeout: false,
            ..Default::default()
        };
        let session = echo(&[b"1#"]).open_session(config);
        assert!(!session.config().retry_on_timeout);
        assert_ok_eq!(
            session.invoke("set_site_name_1", &["Home".into()]),
            Response::Status(Status::Accepted)
        );
        assert_eq!(session.close().written, vec![b":SMHome#".to_vec()]);
    }

    #[test]
    fn runaway_reply_is_a_protocol_violation() {
        let config = SessionConfig {
            max_response_len: 4,
            ..Default::default()
        };
        let session = Session::with_config(echo(&[b"HELP TEXT#"]), config);
        let err = session.invoke("help_first", &[]).unwrap_err();
        assert_matches!(err, Error::ProtocolViolation { operation: "help_first", .. });
        assert_eq!(err.raw_reply().map(|r| r.len()), Some(4));
    }
}
