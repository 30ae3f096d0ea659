//! Line rendering into fixed-capacity scratch buffers.
//!
//! Line grammar:
//!
//! ```text
//! <color><wall clock>|<uptime>|<glyph>|<component>|<function>:<message><reset>\r\n
//! ```
//!
//! `<color>` and `<reset>` are present only when color markup is enabled.
//! No allocation; output is truncated at the buffer end, with room kept back
//! so the reset escape and terminator always land.

use core::fmt::{self, Write};

use crate::level::{glyph_for, Severity, COLOR_NONE};
use crate::port::LogPort;

/// Line terminator.
pub const LINE_END: &str = "\r\n";

/// `fmt::Write` over a byte slice that truncates instead of failing.
pub struct LineWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    limit: usize,
    truncated: bool,
}

impl<'a> LineWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        let limit = buf.len();
        Self {
            buf,
            pos: 0,
            limit,
            truncated: false,
        }
    }

    /// Keep the last `bytes` of the buffer out of reach until [`release`](Self::release).
    pub fn reserve_tail(&mut self, bytes: usize) {
        self.limit = self.buf.len().saturating_sub(bytes);
    }

    pub fn release(&mut self) {
        self.limit = self.buf.len();
    }

    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Whether any write was cut short.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

impl Write for LineWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.limit.saturating_sub(self.pos);
        let to_write = bytes.len().min(remaining);
        if to_write < bytes.len() {
            self.truncated = true;
        }
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Fixed fields of one line.
#[derive(Clone, Copy, Debug)]
pub struct LineHeader<'s> {
    /// Raw level value; already validated by the producer.
    pub level: u8,
    pub component: &'s str,
    pub function: &'s str,
    pub use_color: bool,
}

/// Result of rendering one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub len: usize,
    pub truncated: bool,
}

/// Render one full line into `buf`.
///
/// Fails only when a time source or a message argument reports a
/// formatting error.
pub fn render_line<P: LogPort + ?Sized>(
    buf: &mut [u8],
    port: &P,
    header: &LineHeader<'_>,
    args: fmt::Arguments<'_>,
) -> Result<Rendered, fmt::Error> {
    let severity = Severity::from_u8(header.level);
    let color = match severity {
        Some(level) if header.use_color => Some(level.color()),
        _ => None,
    };
    let tail = if color.is_some() { COLOR_NONE.len() } else { 0 } + LINE_END.len();

    let mut w = LineWriter::new(buf);
    w.reserve_tail(tail);

    if let Some(escape) = color {
        w.write_str(escape)?;
    }
    port.write_time(&mut w)?;
    w.write_char('|')?;
    port.write_uptime(&mut w)?;
    write!(
        w,
        "|{}|{}|{}:",
        glyph_for(header.level),
        header.component,
        header.function
    )?;
    w.write_fmt(args)?;

    w.release();
    if color.is_some() {
        w.write_str(COLOR_NONE)?;
    }
    w.write_str(LINE_END)?;

    Ok(Rendered {
        len: w.len(),
        truncated: w.truncated(),
    })
}

/// One hex dump row: uppercase two-digit groups separated by single spaces.
pub struct HexRow<'a>(pub &'a [u8]);

impl fmt::Display for HexRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}
