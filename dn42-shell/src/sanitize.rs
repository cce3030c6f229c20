//! Output normalization for remote terminals.

/// Line terminator sent to the remote terminal.
pub const CRLF: &str = "\r\n";

/// Normalize text for transmission.
///
/// Every physical line (terminated by `\r\n`, `\r` or `\n`) has its trailing
/// whitespace removed and is terminated with `\r\n`. Text without any line
/// yields a single `\r\n`.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len().saturating_add(CRLF.len()));

    for line in physical_lines(text) {
        out.push_str(line.trim_end());
        out.push_str(CRLF);
    }

    if out.is_empty() {
        out.push_str(CRLF);
    }

    out
}

/// Split text into lines on `\r\n`, `\r` and `\n`.
///
/// A terminator at the very end of the text does not start another line.
fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;

    core::iter::from_fn(move || {
        let current = rest;

        if current.is_empty() {
            return None;
        }

        match current.find(|c: char| c == '\r' || c == '\n') {
            Some(end) => {
                let terminator = if current[end..].starts_with(CRLF) { 2 } else { 1 };
                rest = &current[end.saturating_add(terminator)..];
                Some(&current[..end])
            }
            None => {
                rest = "";
                Some(current)
            }
        }
    })
}
