use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;

/// A fixed-size rolling capture of input/output audio, kept only while a
/// call is setting up so a protocol error can be post-mortemed.
/// Dropped without ever touching disk on the happy path.
pub struct IoDump {
    cap: usize,
    input: VecDeque<u8>,
    output: VecDeque<u8>,
}

impl IoDump {
    pub fn new(cap: usize) -> Self {
        Self { cap, input: VecDeque::with_capacity(cap), output: VecDeque::with_capacity(cap) }
    }

    pub fn record_input(&mut self, buf: &[u8]) {
        Self::push_bounded(&mut self.input, buf, self.cap);
    }

    pub fn record_output(&mut self, buf: &[u8]) {
        Self::push_bounded(&mut self.output, buf, self.cap);
    }

    fn push_bounded(ring: &mut VecDeque<u8>, buf: &[u8], cap: usize) {
        if cap == 0 {
            return;
        }
        for &byte in buf {
            if ring.len() == cap {
                ring.pop_front();
            }
            ring.push_back(byte);
        }
    }

    /// Writes `{logname}.s{span}c{chan}.{input|output}.alaw` into
    /// `logdir`. Failures are logged, never propagated — a dump is a
    /// best-effort diagnostic, not part of call control.
    pub fn flush_to(&self, logdir: &Path, logname: &str, span: u32, chan: u32) {
        self.write_one(logdir, logname, span, chan, "input", &self.input);
        self.write_one(logdir, logname, span, chan, "output", &self.output);
    }

    fn write_one(&self, logdir: &Path, logname: &str, span: u32, chan: u32, tag: &str, ring: &VecDeque<u8>) {
        let path = logdir.join(format!("{logname}.s{span}c{chan}.{tag}.alaw"));
        let bytes: Vec<u8> = ring.iter().copied().collect();
        match std::fs::File::create(&path).and_then(|mut f| f.write_all(&bytes)) {
            Ok(()) => tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote diagnostic dump"),
            Err(err) => tracing::warn!(path = %path.display(), %err, "failed to write diagnostic dump"),
        }
    }
}
