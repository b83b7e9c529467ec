//! Routes `tracing` output to the browser console.
//!
//! The core crate reports degraded persistence, discarded stored history,
//! rejected configuration and failed uploads through `tracing`. In the
//! browser those events go through [`install`] to `console.error`,
//! `console.warn` or `console.log` by level.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

/// Install the console subscriber. Later calls are no-ops.
pub(crate) fn install() {
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .without_time()
        .with_target(false)
        .with_max_level(Level::INFO)
        .try_init();
    if let Err(err) = installed {
        web_sys::console::debug_1(&JsValue::from_str(&format!(
            "tracing subscriber already set: {err}"
        )));
    }
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event and emits it on drop.
struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let Some(line) = console_line(&self.buf) else {
            return;
        };
        let line = JsValue::from_str(&line);
        match console_method(self.level) {
            ConsoleMethod::Error => web_sys::console::error_1(&line),
            ConsoleMethod::Warn => web_sys::console::warn_1(&line),
            ConsoleMethod::Log => web_sys::console::log_1(&line),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleMethod {
    Error,
    Warn,
    Log,
}

fn console_method(level: Level) -> ConsoleMethod {
    if level == Level::ERROR {
        ConsoleMethod::Error
    } else if level == Level::WARN {
        ConsoleMethod::Warn
    } else {
        ConsoleMethod::Log
    }
}

/// The formatted event without its trailing newline, if it has any text.
fn console_line(buf: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(buf);
    let text = text.trim_end();
    (!text.is_empty()).then(|| text.to_string())
}
