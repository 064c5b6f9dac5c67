use std::{
    fmt,
    io::{self, Write},
    sync::Arc,
};

use parking_lot::Mutex;

/// Destination for the tracker's human-facing output.
///
/// Progress lines go to `out`, failures and slow-case warnings go to `err`.
/// Write errors are dropped: a broken terminal must not change a test verdict.
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self { out, err }
    }

    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Console whose output lands in two in-memory buffers.
    pub fn capture() -> (Self, CapturedOutput, CapturedOutput) {
        let out = CapturedOutput::default();
        let err = CapturedOutput::default();
        let console = Self::new(Box::new(out.clone()), Box::new(err.clone()));
        (console, out, err)
    }

    pub fn out(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
        let _ = self.out.flush();
    }

    pub fn err(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.err.write_fmt(args);
        let _ = self.err.flush();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdio()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Shared in-memory sink; clones append to the same buffer.
#[derive(Clone, Debug, Default)]
pub struct CapturedOutput {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
