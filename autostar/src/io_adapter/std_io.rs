use super::{LinkError, Transport};
use core::time::Duration;
use std::io::{ErrorKind, Read, Write};

/// Adapts any blocking `Read + Write` stream.
///
/// The stream's own read timeout bounds each `read_byte`, the requested timeout cannot be
/// applied to a generic stream. A stream that reports end of file is treated as silent.
/// Discarding input reads until the stream times out, so the stream needs a read timeout
/// or a non-blocking mode.
pub struct StdIoAdapter<IO: Read + Write> {
    io: IO,
}

impl<IO: Read + Write> Transport for StdIoAdapter<IO> {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), LinkError> {
        self.io.write_all(buf)?;
        self.io.flush()?;
        Ok(())
    }

    fn read_byte(&mut self, _timeout: Duration) -> Result<u8, LinkError> {
        let mut byte = [0u8; 1];
        loop {
            match self.io.read(&mut byte) {
                Ok(0) => return Err(LinkError::TimedOut),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Err(LinkError::TimedOut)
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn discard_input(&mut self) -> Result<(), LinkError> {
        let mut buf = [0u8; 64];
        let mut dropped = 0;
        loop {
            match self.io.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => dropped += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => break,
                Err(e) => return Err(e.into()),
            }
        }
        if dropped > 0 {
            log::debug!("Discarded {} stale byte(s)", dropped);
        }
        Ok(())
    }
}

impl<IO: Read + Write> StdIoAdapter<IO> {
    pub fn new(io: IO) -> Self {
        StdIoAdapter { io }
    }

    pub fn into_inner(self) -> IO {
        self.io
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;
    use std::io::Cursor;

    /// In-memory duplex stream: reads come from `input`, writes land in `output`
    struct Loopback {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Read for Loopback {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Loopback {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn reads_until_exhausted() {
        let mut link = StdIoAdapter::new(Loopback {
            input: Cursor::new(b"1#".to_vec()),
            output: Vec::new(),
        });
        let t = Duration::from_millis(10);
        assert_ok_eq!(link.read_byte(t), b'1');
        assert_ok_eq!(link.read_byte(t), b'#');
        assert_matches!(link.read_byte(t), Err(LinkError::TimedOut));
    }

    #[test]
    fn discard_drains_pending_input() {
        let mut link = StdIoAdapter::new(Loopback {
            input: Cursor::new(b"FG#05:35:17#".to_vec()),
            output: Vec::new(),
        });
        assert_ok!(link.discard_input());
        assert_matches!(
            link.read_byte(Duration::from_millis(10)),
            Err(LinkError::TimedOut)
        );
        assert_ok!(link.discard_input());
    }

    #[test]
    fn writes_whole_frame() {
        let mut link = StdIoAdapter::new(Loopback {
            input: Cursor::new(Vec::new()),
            output: Vec::new(),
        });
        assert_ok!(link.write_all(b":GR#"));
        assert_eq!(link.into_inner().output, b":GR#");
    }
}
