use knock::resolve::resolve_endpoints;
use knock::{
    knock, run, Console, IpFamily, KnockConfig, KnockError, PortSource, Tcp, Transport,
    TransportKind, Udp,
};
use std::io::Read;
use std::net::{TcpListener, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

fn receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

fn literal_config(kind: &str, ports: Vec<i64>, verbose: bool) -> KnockConfig {
    KnockConfig {
        transport: kind.parse::<TransportKind>().unwrap(),
        local: String::new(),
        remote: "127.0.0.1".to_owned(),
        interval: Duration::ZERO,
        verbose,
        source: PortSource::Literal { ports },
    }
}

#[test]
fn udp_knock_sends_an_empty_datagram() {
    let (socket, port) = receiver();
    let udp = Udp::new(IpFamily::V4);
    let endpoints = resolve_endpoints(&udp, "127.0.0.1", "127.0.0.1").unwrap();
    knock(&udp, &endpoints, port as i64).unwrap();

    let mut buf = [0u8; 16];
    let (len, from) = socket.recv_from(&mut buf).unwrap();
    assert_eq!(len, 0);
    assert_eq!(from.ip(), endpoints.remote_ip());
}

#[test]
fn tcp_knock_completes_a_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let tcp = Tcp::new(IpFamily::Any);
    let endpoints = resolve_endpoints(&tcp, "127.0.0.1", "127.0.0.1").unwrap();
    knock(&tcp, &endpoints, port as i64).unwrap();

    let (_stream, peer) = listener.accept().unwrap();
    assert!(peer.ip().is_loopback());
}

#[test]
fn tcp_empty_write_puts_nothing_on_the_wire() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let remote = listener.local_addr().unwrap();
    let tcp = Tcp::new(IpFamily::V4);
    let mut conn = tcp.bind_dial("0.0.0.0:0".parse().unwrap(), remote).unwrap();
    tcp.send_empty(&mut conn).unwrap();
    tcp.close(conn).unwrap();

    let (mut stream, _) = listener.accept().unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut buf = Vec::new();
    // orderly shutdown, no payload before EOF
    assert_eq!(stream.read_to_end(&mut buf).unwrap(), 0);
}

#[test]
fn refused_tcp_port_is_a_dial_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let tcp = Tcp::new(IpFamily::V4);
    let endpoints = resolve_endpoints(&tcp, "", "127.0.0.1").unwrap();
    let err = knock(&tcp, &endpoints, port as i64).unwrap_err();
    assert!(matches!(err, KnockError::Dial(_)));
    assert!(err.to_string().starts_with("dial fail"));
}

#[test]
fn literal_port_out_of_range_fails_at_dial() {
    let udp = Udp::new(IpFamily::V4);
    let endpoints = resolve_endpoints(&udp, "", "127.0.0.1").unwrap();
    assert!(matches!(
        knock(&udp, &endpoints, 70000),
        Err(KnockError::Dial(_))
    ));
}

#[test]
fn udp_session_arrives_in_sequence_order() {
    let receivers: Vec<(UdpSocket, u16)> = (0..3).map(|_| receiver()).collect();
    let ports: Vec<i64> = receivers.iter().rev().map(|(_, p)| *p as i64).collect();
    let config = literal_config("udp4", ports.clone(), true);

    // one thread per port, stamping when its datagram lands
    let arrivals: Vec<_> = receivers
        .into_iter()
        .rev()
        .map(|(socket, _)| {
            thread::spawn(move || {
                let mut buf = [0u8; 16];
                let len = socket.recv_from(&mut buf).unwrap().0;
                (len, Instant::now())
            })
        })
        .collect();

    let mut out = Vec::new();
    run(&config, Console::new(&mut out, config.verbose)).unwrap();

    let arrivals: Vec<(usize, Instant)> =
        arrivals.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(arrivals.iter().all(|(len, _)| *len == 0));
    // knocks are 100 ms apart, far more than scheduling jitter
    for pair in arrivals.windows(2) {
        assert!(pair[0].1 < pair[1].1, "knocks arrived out of order");
    }
    let out = String::from_utf8(out).unwrap();
    let expected_ports: String = ports.iter().map(|p| format!("{:<6}", p)).collect();
    assert_eq!(
        out,
        format!("ports: {}\nknock: ok    ok    ok    \n", expected_ports)
    );
}

#[test]
fn local_address_is_used_for_the_knock() {
    let (socket, port) = receiver();
    let udp = Udp::new(IpFamily::V4);
    let endpoints = resolve_endpoints(&udp, "127.0.0.1", "127.0.0.1").unwrap();
    assert_eq!(endpoints.local().ip(), udp.resolve("127.0.0.1").unwrap().ip().unwrap());
    knock(&udp, &endpoints, port as i64).unwrap();
    let mut buf = [0u8; 1];
    let (_, from) = socket.recv_from(&mut buf).unwrap();
    assert_eq!(from.ip().to_string(), "127.0.0.1");
}
