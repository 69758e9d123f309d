use crate::sequence::PortSequence;
use std::io::{self, Write};

/// Progress reported by a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnockEvent<'a> {
    CycleStarted { ports: &'a PortSequence },
    Knocked { port: i64 },
    CycleFinished,
    /// The knock on `port` failed and the session is stopping.
    Aborted { port: i64 },
}

pub trait StatusSink {
    fn observe(&mut self, event: KnockEvent<'_>);
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn observe(&mut self, event: KnockEvent<'_>) {
        (**self).observe(event)
    }
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl StatusSink for Silent {
    fn observe(&mut self, _event: KnockEvent<'_>) {}
}

/// Terminal status output. Prints nothing unless verbose.
///
/// ```text
/// ports: 40000 41000 42000
/// knock: ok    ok    ok
/// ```
pub struct Console<W: Write> {
    out: W,
    verbose: bool,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Console { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: KnockEvent<'_>) -> io::Result<()> {
        match event {
            KnockEvent::CycleStarted { ports } => {
                writeln!(self.out, "ports: {}", ports)?;
                write!(self.out, "knock: ")?;
            }
            KnockEvent::Knocked { .. } => write!(self.out, "{:<6}", "ok")?,
            KnockEvent::CycleFinished | KnockEvent::Aborted { .. } => writeln!(self.out)?,
        }
        // tokens must show up as each knock lands, not at the end of the line
        self.out.flush()
    }
}

impl<W: Write> StatusSink for Console<W> {
    fn observe(&mut self, event: KnockEvent<'_>) {
        if !self.verbose {
            return;
        }
        if let Err(e) = self.write_event(event) {
            warn!("status output failed: {}", e);
        }
    }
}
