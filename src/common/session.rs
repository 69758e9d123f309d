use crate::config::KnockConfig;
use crate::errors::KnockError;
use crate::resolve::{resolve_endpoints, ResolvedEndpoints};
use crate::sequence::{generate, PortSequence};
use crate::status::{KnockEvent, StatusSink};
use crate::transport::{Protocol, Tcp, Transport, Udp};
use std::thread;
use std::time::Duration;

/// Pause after every successful knock so the listener sees discrete packets.
pub const KNOCK_DELAY: Duration = Duration::from_millis(100);

/// Generate the ports, resolve both hosts and knock until done or failed.
pub fn run<S: StatusSink>(config: &KnockConfig, sink: S) -> Result<(), KnockError> {
    let ports = generate(&config.source)?;
    let family = config.transport.family;
    match config.transport.protocol {
        Protocol::Tcp => Session::establish(Tcp::new(family), config, ports, sink)?.run(),
        Protocol::Udp => Session::establish(Udp::new(family), config, ports, sink)?.run(),
    }
}

/// One knock: dial `port` on the remote, send nothing, hang up.
pub fn knock<T: Transport>(
    transport: &T,
    endpoints: &ResolvedEndpoints,
    port: i64,
) -> Result<(), KnockError> {
    let remote = endpoints.remote_at(port)?;
    let mut conn = transport.bind_dial(endpoints.local(), remote)?;
    transport.send_empty(&mut conn)?;
    transport.close(conn)
}

/// Drives the knock cycles. Ports and endpoints are fixed for the lifetime of
/// the session; every cycle reuses them as they are.
pub struct Session<T: Transport, S: StatusSink> {
    transport: T,
    endpoints: ResolvedEndpoints,
    ports: PortSequence,
    interval: Duration,
    sink: S,
}

impl<T: Transport, S: StatusSink> Session<T, S> {
    pub fn new(
        transport: T,
        endpoints: ResolvedEndpoints,
        ports: PortSequence,
        interval: Duration,
        sink: S,
    ) -> Self {
        Session {
            transport,
            endpoints,
            ports,
            interval,
            sink,
        }
    }

    /// Resolve the configured hosts once and build the session around them.
    pub fn establish(
        transport: T,
        config: &KnockConfig,
        ports: PortSequence,
        sink: S,
    ) -> Result<Self, KnockError> {
        let endpoints = resolve_endpoints(&transport, &config.local, &config.remote)?;
        Ok(Session::new(
            transport,
            endpoints,
            ports,
            config.interval,
            sink,
        ))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Knock every port in order, then repeat after the interval. A zero
    /// interval runs a single cycle. Returns on the first failed knock.
    pub fn run(&mut self) -> Result<(), KnockError> {
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            info!(
                "cycle {}: knocking {} ports on {}",
                cycle,
                self.ports.len(),
                self.endpoints.remote_ip()
            );
            self.run_cycle()?;
            if self.interval.is_zero() {
                return Ok(());
            }
            info!("next cycle in {:?}", self.interval);
            thread::sleep(self.interval);
        }
    }

    fn run_cycle(&mut self) -> Result<(), KnockError> {
        self.sink
            .observe(KnockEvent::CycleStarted { ports: &self.ports });
        for &port in self.ports.iter() {
            if let Err(e) = knock(&self.transport, &self.endpoints, port) {
                warn!("knock on port {} failed, aborting: {}", port, e);
                self.sink.observe(KnockEvent::Aborted { port });
                return Err(e);
            }
            self.sink.observe(KnockEvent::Knocked { port });
            thread::sleep(KNOCK_DELAY);
        }
        self.sink.observe(KnockEvent::CycleFinished);
        Ok(())
    }
}
