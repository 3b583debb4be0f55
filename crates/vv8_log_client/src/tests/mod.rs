use std::{io::Cursor, net::TcpStream};

use crate::{
    LogClient,
    config::{ClientConfig, ENV_LOG_HOST, ENV_LOG_PORT, Endpoint},
    error::{LogClientError, SocketOp},
    message::{self, LogName, UploadMessage},
    probe,
    resolver::{Resolve, StaticResolver, SystemResolver},
    session::{SessionState, UploadSession},
};

use fixtures::{LogSink, MockTransport, RecordingResolver, Throttled, refused_addr};


const DEMO_NAME: &str = "logfile.test.log";
const DEMO_BODY: &[u8] = b"hello, world!\nthis is a log\n\nwith lines\n\nand\nstuff...\n";

fn client_for(candidates: Vec<std::net::SocketAddr>) -> LogClient<StaticResolver> {
    LogClient::with_resolver(ClientConfig::default(), StaticResolver(candidates))
}

#[test]
fn probe_sends_greeting_then_fin() {
    crate::vv8_tracing::init();
    let sink = LogSink::start();
    let sent = client_for(vec![sink.addr()]).probe().unwrap();

    let received = sink.received();
    assert_eq!(received, probe::greeting(std::process::id()).into_bytes());
    assert_eq!(sent, received.len());
}

#[test]
fn upload_happy_path() {
    crate::vv8_tracing::init();
    let sink = LogSink::start();
    let addr = sink.addr();
    let report = client_for(vec![addr]).upload(DEMO_NAME, DEMO_BODY).unwrap();

    let received = sink.received();
    assert_eq!(&received[..4], &[0x00u8, 0x00, 0x00, 0x10]);
    assert_eq!(&received[4..20], DEMO_NAME.as_bytes());
    assert_eq!(&received[20..], DEMO_BODY);
    assert_eq!(report.peer, Some(addr));
    assert_eq!(report.body_bytes, DEMO_BODY.len() as u64);
    assert_eq!(report.total_bytes(), received.len() as u64);
}

#[test]
fn upload_of_empty_body() {
    crate::vv8_tracing::init();
    let sink = LogSink::start();
    let report = client_for(vec![sink.addr()]).upload("empty.log", &b""[..]).unwrap();

    assert_eq!(sink.received(), b"\x00\x00\x00\x09empty.log");
    assert_eq!(report.body_bytes, 0);
}

#[test]
fn resolution_failure_never_connects() {
    crate::vv8_tracing::init();
    let endpoint = Endpoint::new("no-such-host.invalid", "5580").unwrap();
    let err = SystemResolver.resolve(&endpoint).unwrap_err();
    assert!(matches!(err, LogClientError::Resolve { .. }));
    assert!(err.to_string().starts_with("getaddrinfo: "));
    assert!(err.is_connect_failure());
}

#[test]
fn connect_falls_back_to_next_candidate() {
    crate::vv8_tracing::init();
    let sink = LogSink::start();
    let client = client_for(vec![refused_addr(), sink.addr()]);

    let stream = client.connect().unwrap();
    assert_eq!(stream.peer_addr().unwrap(), sink.addr());
    drop(stream);
    assert!(sink.received().is_empty());

    let sink = LogSink::start();
    let report = client_for(vec![refused_addr(), refused_addr(), sink.addr()])
        .upload(DEMO_NAME, DEMO_BODY)
        .unwrap();
    assert_eq!(report.peer, Some(sink.addr()));
    assert_eq!(sink.received(), message::encode(&LogName::new(DEMO_NAME).unwrap(), DEMO_BODY));
}

#[test]
fn one_byte_writes_deliver_identical_stream() {
    crate::vv8_tracing::init();
    let sink = LogSink::start();
    let stream = TcpStream::connect(sink.addr()).unwrap();

    let mut session = UploadSession::new(Throttled::new(stream, 1));
    session.upload(UploadMessage::from_bytes(DEMO_NAME, DEMO_BODY).unwrap()).unwrap();
    assert_eq!(session.state(), SessionState::Closed);

    assert_eq!(sink.received(), message::encode(&LogName::new(DEMO_NAME).unwrap(), DEMO_BODY));
}

#[test]
fn peer_closing_after_header_fails_and_releases() {
    crate::vv8_tracing::init();
    let mock = MockTransport::new().fail_after(4);
    let mut session = UploadSession::new(mock.clone());

    let err = session.upload(UploadMessage::from_bytes(DEMO_NAME, DEMO_BODY).unwrap()).unwrap_err();
    assert!(matches!(err, LogClientError::Io { op: SocketOp::Send, .. }));
    assert_eq!(session.failed_in(), Some(SessionState::HeaderSent));
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(session.bytes_sent(), 4);
    assert_eq!(mock.written(), [0u8, 0, 0, 16]);
    assert!(mock.is_dropped());
}

#[test]
fn server_hanging_up_after_header_fails_the_upload() {
    crate::vv8_tracing::init();
    let sink = LogSink::hang_up_after(4);
    let body = vec![b'v'; 16 << 20];

    let err = client_for(vec![sink.addr()]).upload(DEMO_NAME, body.as_slice()).unwrap_err();
    assert!(matches!(err, LogClientError::Io { op: SocketOp::Send, .. }), "{err:?}");
    assert!(!err.is_connect_failure());
    assert_eq!(sink.received(), [0u8, 0, 0, 16]);
}

#[test]
fn framing_holds_for_any_write_size() {
    crate::vv8_tracing::init();
    let long_name = "nested/dir/".repeat(40) + "trace.log";
    let big_body: Vec<u8> = (0..20_000u32).map(|i| (i * 7 % 256) as u8).collect();
    let cases: [(&str, &[u8]); 3] =
        [("a", &b""[..]), ("vv8-1687.0.log", DEMO_BODY), (long_name.as_str(), big_body.as_slice())];

    for (name, body) in cases {
        let expected = message::encode(&LogName::new(name).unwrap(), body);
        for cap in [1, 5, 4096] {
            let mock = MockTransport::new().with_write_cap(cap);
            UploadSession::new(mock.clone())
                .upload(UploadMessage::new(LogName::new(name).unwrap(), Cursor::new(body)))
                .unwrap();
            assert_eq!(mock.written(), expected, "name={name:?} cap={cap}");
        }
    }
}

#[test]
fn resolver_is_queried_with_configured_endpoint() {
    crate::vv8_tracing::init();
    let sink = LogSink::start();
    let vars = |key: &str| match key {
        ENV_LOG_HOST => Some("logs.internal".to_string()),
        ENV_LOG_PORT => Some("52528".to_string()),
        _ => None,
    };
    let config = ClientConfig::new(Endpoint::from_lookup(vars).unwrap());
    let resolver = RecordingResolver::new(vec![sink.addr()]);
    LogClient::with_resolver(config, &resolver).probe().unwrap();
    sink.received();

    assert_eq!(resolver.queries(), vec![("logs.internal".to_string(), "52528".to_string())]);

    let resolver = RecordingResolver::new(vec![refused_addr()]);
    let config = ClientConfig::new(Endpoint::from_lookup(|_| None).unwrap());
    let err = LogClient::with_resolver(config, &resolver).probe().unwrap_err();
    assert!(matches!(err, LogClientError::Connect { .. }));
    assert_eq!(resolver.queries(), vec![("localhost".to_string(), "5580".to_string())]);
}

#[test]
fn empty_name_is_rejected_before_connecting() {
    crate::vv8_tracing::init();
    let resolver = RecordingResolver::new(vec![refused_addr()]);
    let client = LogClient::with_resolver(ClientConfig::default(), &resolver);

    let err = client.upload("", DEMO_BODY).unwrap_err();
    assert!(matches!(err, LogClientError::EmptyName));
    assert!(resolver.queries().is_empty());
}

#[test]
fn upload_file_streams_from_disk() {
    crate::vv8_tracing::init();
    let path = std::env::temp_dir().join(format!("vv8-log-client-{}.log", std::process::id()));
    std::fs::write(&path, DEMO_BODY).unwrap();

    let sink = LogSink::start();
    let report = client_for(vec![sink.addr()]).upload_file(DEMO_NAME, &path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(report.body_bytes, DEMO_BODY.len() as u64);
    assert_eq!(sink.received(), message::encode(&LogName::new(DEMO_NAME).unwrap(), DEMO_BODY));
}

#[test]
fn upload_of_missing_file_fails_before_connecting() {
    crate::vv8_tracing::init();
    let resolver = RecordingResolver::new(vec![refused_addr()]);
    let client = LogClient::with_resolver(ClientConfig::default(), &resolver);

    let err = client.upload_file(DEMO_NAME, "/nonexistent/vv8/log").unwrap_err();
    assert!(matches!(err, LogClientError::Io { op: SocketOp::Read, .. }));
    assert!(resolver.queries().is_empty());
}
