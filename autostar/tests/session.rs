use autostar::{
    Arg, Error, LinkError, Response, Session, SessionConfig, Sexagesimal, Status, StdIoAdapter,
    SubMinute,
};
use claims::*;
use mockall::{predicate::*, Sequence};
use pretty_assertions::assert_eq;
use std::{
    collections::VecDeque,
    io::{self, Read, Write},
    sync::Arc,
    thread,
    time::Duration,
};
use utilities::{Event, MockLink, ScriptedMount};

#[test]
fn no_reply_operations_consume_nothing() {
    let mount = ScriptedMount::new().reply(b":Q#", b"1#");
    let session = Session::new(mount.clone());
    for name in ["halt", "focus_stop", "slew_rate_max"] {
        assert_ok_eq!(session.invoke(name, &[]), Response::Done);
    }
    assert_eq!(mount.bytes_read(), 0);
    assert_eq!(
        mount.writes(),
        vec![b":Q#".to_vec(), b":FQ#".to_vec(), b":RS#".to_vec()]
    );
}

#[test]
fn no_reply_operations_never_read() {
    let mut link = MockLink::new();
    link.expect_discard_input().times(1).returning(|| Ok(()));
    link.expect_write_all()
        .with(eq(&b":Me#"[..]))
        .times(1)
        .returning(|_| Ok(()));
    link.expect_read_byte().never();
    let session = Session::new(link);
    assert_ok_eq!(session.invoke("move_east", &[]), Response::Done);
}

#[test]
fn delimited_reply_is_stripped_of_terminator() {
    let mount = ScriptedMount::new().reply(b":LI#", b"M31 EX GAL#");
    let session = Session::new(mount);
    assert_ok_eq!(
        session.invoke("get_object_info", &[]),
        Response::Text("M31 EX GAL".to_string())
    );
}

#[test]
fn missing_terminator_times_out() {
    let mount = ScriptedMount::new().reply(b":LI#", b"M31 EX GAL");
    let session = Session::new(mount.clone());
    assert_matches!(
        session.invoke("get_object_info", &[]),
        Err(Error::Timeout {
            operation: "get_object_info",
            attempts: 2
        })
    );
}

#[test]
fn alignment_query_reads_a_single_byte() {
    let mount = ScriptedMount::new().reply(&[0x06], b"A");
    let session = Session::new(mount.clone());
    assert_ok_eq!(
        session.invoke("alignment_query", &[]),
        Response::Status(Status::AltAzMode)
    );
    assert_eq!(mount.events(), vec![Event::Write(vec![0x06]), Event::Read(b'A')]);

    let session = Session::new(ScriptedMount::new().reply(&[0x06], b"Z"));
    let err = session.invoke("alignment_query", &[]).unwrap_err();
    assert_matches!(err, Error::ProtocolViolation { .. });
    assert_eq!(err.raw_reply().map(|r| r.to_vec()), Some(b"Z".to_vec()));
}

#[test]
fn slew_rate_and_acknowledgement() {
    let mount = ScriptedMount::new().reply(b":T060.100#", b"1#");
    let session = Session::new(mount.clone());
    assert_ok_eq!(session.invoke("set_slew_rate_ra", &[12.5.into()]), Response::Done);
    assert_ok_eq!(
        session.invoke("set_manual_tracking_rate", &[60.1.into()]),
        Response::Status(Status::Accepted)
    );
    let writes = mount.writes();
    assert_eq!(writes[0], b":RA12.5#".to_vec());
    assert!(writes[0].windows(4).any(|w| w == b"12.5"));
}

#[test]
fn invalid_argument_writes_nothing() {
    let mut link = MockLink::new();
    link.expect_discard_input().never();
    link.expect_write_all().never();
    link.expect_read_byte().never();
    let session = Session::new(link);
    assert_matches!(
        session.invoke("set_reticule_flash_rate", &[15u8.into()]),
        Err(Error::InvalidArgument {
            operation: "set_reticule_flash_rate",
            param: "rate",
            ..
        })
    );
}

#[test]
fn unknown_operation_writes_nothing() {
    let mount = ScriptedMount::new();
    let session = Session::new(mount.clone());
    assert_matches!(
        session.invoke("engage_hyperdrive", &[]),
        Err(Error::UnsupportedOperation(_))
    );
    assert!(mount.events().is_empty());
}

#[test]
fn timeout_is_retried_once_with_the_same_frame() {
    let mount = ScriptedMount::new().reply(b":GR#", b"05:35:17#").ignore_next(1);
    let session = Session::new(mount.clone());
    assert_ok_eq!(
        session.invoke("get_ra", &[]),
        Response::Time(Sexagesimal::hms(5, 35, 17))
    );
    assert_eq!(mount.writes(), vec![b":GR#".to_vec(), b":GR#".to_vec()]);

    let silent = ScriptedMount::new();
    let session = Session::new(silent.clone());
    assert_matches!(
        session.invoke("get_ra", &[]),
        Err(Error::Timeout { attempts: 2, .. })
    );
    assert_eq!(silent.writes(), vec![b":GR#".to_vec(), b":GR#".to_vec()]);
}

#[test]
fn retry_resends_through_the_transport() {
    let mut seq = Sequence::new();
    let mut link = MockLink::new();
    for reply in [Err(LinkError::TimedOut), Ok(b'1')] {
        let mut reply = Some(reply);
        link.expect_discard_input()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        link.expect_write_all()
            .with(eq(&b":Sw4#"[..]))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        link.expect_read_byte()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| reply.take().unwrap_or(Err(LinkError::TimedOut)));
    }
    link.expect_read_byte()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(b'#'));
    let session = Session::new(link);
    assert_ok_eq!(
        session.invoke("set_max_slew_rate", &[4u8.into()]),
        Response::Status(Status::Accepted)
    );
}

#[test]
fn decode_errors_are_not_retried() {
    let mount = ScriptedMount::new().reply(b":GD#", b"north#");
    let session = Session::new(mount.clone());
    assert_matches!(
        session.invoke("get_declination", &[]),
        Err(Error::DecodeError { .. })
    );
    assert_eq!(mount.writes().len(), 1);
}

#[test]
fn link_failures_surface_as_io_errors() {
    let mut link = MockLink::new();
    link.expect_discard_input().returning(|| Ok(()));
    link.expect_write_all().returning(|_| {
        Err(LinkError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "unplugged",
        )))
    });
    let session = Session::new(link);
    assert_matches!(session.invoke("get_ra", &[]), Err(Error::IOError(_)));
}

#[test]
fn concurrent_invocations_never_interleave() {
    let mount = ScriptedMount::new()
        .reply(b":GR#", b"05:35:17#")
        .reply(b":GD#", b"+45*30:15#")
        .reply(b":GVP#", b"Autostar#")
        .with_latency(Duration::from_millis(1));
    let session = Arc::new(Session::new(mount.clone()));

    let handles: Vec<_> = ["get_ra", "get_declination", "get_product_name"]
        .into_iter()
        .map(|name| {
            let session = session.clone();
            thread::spawn(move || {
                for _ in 0..5 {
                    assert_ok!(session.invoke(name, &[]));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // Every write is followed by its complete reply before the next write
    let events = mount.events();
    let mut exchanges = 0;
    let mut i = 0;
    while i < events.len() {
        let frame = match &events[i] {
            Event::Write(frame) => frame.clone(),
            Event::Read(b) => panic!("read {:?} outside of an exchange", *b as char),
        };
        let expected: &[u8] = match &frame[..] {
            b":GR#" => b"05:35:17#",
            b":GD#" => b"+45*30:15#",
            b":GVP#" => b"Autostar#",
            other => panic!("unexpected frame {:?}", other),
        };
        let reply: Vec<u8> = events[i + 1..i + 1 + expected.len()]
            .iter()
            .map(|e| match e {
                Event::Read(b) => *b,
                Event::Write(w) => panic!("{:?} written mid reply", w),
            })
            .collect();
        assert_eq!(reply, expected);
        i += 1 + expected.len();
        exchanges += 1;
    }
    assert_eq!(exchanges, 15);
}

#[test]
fn per_operation_policy_overrides_session_defaults() {
    let config = SessionConfig {
        read_timeout: Duration::from_millis(10),
        ..Default::default()
    };
    let mount = ScriptedMount::new();
    let session = Session::with_config(mount.clone(), config);
    assert_matches!(
        session.invoke("align_auto", &[]),
        Err(Error::Timeout { attempts: 1, .. })
    );
    assert_eq!(mount.writes(), vec![b":Aa#".to_vec()]);
}

#[test]
fn typed_arguments_reach_the_wire() {
    let mount = ScriptedMount::new()
        .reply(b":Sr05:35:17#", b"1#")
        .reply(b":Sd-05*23#", b"0#");
    let session = Session::new(mount);
    assert_ok_eq!(
        session.invoke("set_target_ra", &[Arg::from(Sexagesimal::hms(5, 35, 17))]),
        Response::Status(Status::Accepted)
    );
    assert_ok_eq!(
        session.invoke(
            "set_target_declination",
            &[Sexagesimal::new(true, 5, 23, SubMinute::None).into()]
        ),
        Response::Status(Status::Rejected)
    );
}

/// Serial-like byte stream: every flushed frame queues the next canned reply, reads time
/// out once nothing is buffered
struct LineStream {
    replies: VecDeque<Vec<u8>>,
    input: VecDeque<u8>,
}

impl LineStream {
    fn new(replies: &[&[u8]]) -> Self {
        LineStream {
            replies: replies.iter().map(|r| r.to_vec()).collect(),
            input: VecDeque::new(),
        }
    }
}

impl Read for LineStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.input.is_empty() {
            return Err(io::ErrorKind::TimedOut.into());
        }
        let n = buf.len().min(self.input.len());
        for (slot, b) in buf.iter_mut().zip(self.input.drain(..n)) {
            *slot = b;
        }
        Ok(n)
    }
}

impl Write for LineStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(reply) = self.replies.pop_front() {
            self.input.extend(reply);
        }
        Ok(())
    }
}

#[test]
fn leftover_bytes_do_not_leak_into_the_next_reply() {
    let config = SessionConfig {
        max_response_len: 4,
        ..Default::default()
    };
    let link = StdIoAdapter::new(LineStream::new(&[b"ABCDEFG#", b"05:35:17#"]));
    let session = Session::with_config(link, config);

    let err = session.invoke("help_first", &[]).unwrap_err();
    assert_matches!(err, Error::ProtocolViolation { operation: "help_first", .. });
    assert_eq!(err.raw_reply().map(|r| &r[..]), Some(&b"ABCD"[..]));

    assert_ok_eq!(
        session.invoke("get_ra", &[]),
        Response::Time(Sexagesimal::hms(5, 35, 17))
    );
}

#[test]
fn waiting_callers_are_served_in_arrival_order() {
    let mount = ScriptedMount::new()
        .reply(b":GR#", b"05:35:17#")
        .reply(b":GD#", b"+45*30:15#")
        .reply(b":GVP#", b"Autostar#");
    let session = Arc::new(Session::new(mount.clone()));

    // The first caller holds the link while its write is stalled
    let stall = mount.stall();
    let first = {
        let session = session.clone();
        thread::spawn(move || session.invoke("get_ra", &[]))
    };
    mount.wait_for_blocked_writer();

    let mut waiters = Vec::new();
    for name in ["get_declination", "get_product_name"] {
        let session = session.clone();
        waiters.push(thread::spawn(move || session.invoke(name, &[])));
        // Let the waiter park on the link before the next one arrives
        thread::sleep(Duration::from_millis(50));
    }
    drop(stall);

    assert_ok!(first.join().unwrap());
    for w in waiters {
        assert_ok!(w.join().unwrap());
    }
    assert_eq!(
        mount.writes(),
        vec![b":GR#".to_vec(), b":GD#".to_vec(), b":GVP#".to_vec()]
    );
}
