//! Process helpers shared by sandbox runners.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::process::Child;
use std::thread;

/// Bytes of stderr kept for error reports.
pub const STDERR_TAIL_BYTES: usize = 64 * 1024;

/// Fixed-size tail buffer: keeps only the last `cap` bytes written to it.
#[derive(Debug)]
pub struct TailBuffer {
    buf: VecDeque<u8>,
    cap: usize,
}

impl TailBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(cap.min(8192)),
            cap,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        if self.cap == 0 {
            return;
        }
        let bytes = if bytes.len() > self.cap {
            &bytes[bytes.len() - self.cap..]
        } else {
            bytes
        };
        let overflow = (self.buf.len() + bytes.len()).saturating_sub(self.cap);
        self.buf.drain(..overflow);
        self.buf.extend(bytes);
    }

    pub fn into_string(self) -> String {
        let bytes: Vec<u8> = self.buf.into_iter().collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Wait for a child while forwarding its stderr to ours.
///
/// Stderr is read on a background thread while the process runs, otherwise a
/// chatty build fills the pipe buffer and blocks. The last `tail_bytes` are
/// returned alongside the exit code (`None` when killed by a signal).
pub fn wait_streaming_stderr(
    child: &mut Child,
    tail_bytes: usize,
) -> io::Result<(Option<i32>, String)> {
    let stderr_handle = child.stderr.take().map(|mut err| {
        thread::spawn(move || {
            let mut tail = TailBuffer::new(tail_bytes);
            let mut buf = [0u8; 4096];
            loop {
                match err.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        tail.push(&buf[..n]);
                        let mut out = io::stderr();
                        let _ = out.write_all(&buf[..n]);
                        let _ = out.flush();
                    }
                    Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            tail.into_string()
        })
    });

    let status = child.wait();
    let stderr = stderr_handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default();
    Ok((status?.code(), stderr))
}
