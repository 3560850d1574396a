//! Terminal rendering for streamed chat answers.
//!
//! Chat snapshots are cumulative: each one is the full text so far. Printing
//! every snapshot would repeat everything already on screen, so the printer
//! tracks how many bytes it has written and emits only the new suffix.

use std::io::Write;

pub struct SnapshotPrinter<W: Write> {
    writer: W,
    printed: usize,
}

impl<W: Write> SnapshotPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, printed: 0 }
    }

    /// Print whatever `snapshot` adds beyond what is already on screen.
    /// A snapshot shorter than what was printed is ignored; the stream
    /// contract says that cannot happen, but a renderer should not panic
    /// if it does.
    pub fn update(&mut self, snapshot: &str) {
        if snapshot.len() <= self.printed {
            return;
        }
        let suffix = &snapshot[self.printed..];
        if self.writer.write_all(suffix.as_bytes()).is_ok() {
            let _ = self.writer.flush();
            self.printed = snapshot.len();
        }
    }

    /// Terminate the answer with a newline if anything was printed.
    pub fn finish(&mut self) {
        if self.printed > 0 {
            let _ = self.writer.write_all(b"\n");
            let _ = self.writer.flush();
        }
    }
}
