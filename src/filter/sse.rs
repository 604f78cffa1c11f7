//! SSE frame parsing
//!
//! Splits one delivered body slice into `data:` payloads. Each call is
//! independent: a line split across two slices is not reassembled.

use std::borrow::Cow;

/// Prefix of an SSE data line
pub const DATA_PREFIX: &str = "data:";

/// Payload marking the end of a chat completion stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Lazily yields the candidate payloads of `body`, stopping at `[DONE]`.
pub fn data_payloads(body: &[u8]) -> DataPayloads<'_> {
    DataPayloads {
        lines: body.split(is_newline as fn(&u8) -> bool),
        done: false,
    }
}

fn is_newline(b: &u8) -> bool {
    *b == b'\n'
}

/// Extract the payload of a single line, if it is an SSE data line.
///
/// Surrounding whitespace is trimmed from the line, and any whitespace
/// following the `data:` marker is dropped.
pub fn parse_data_line(line: &str) -> Option<&str> {
    line.trim().strip_prefix(DATA_PREFIX).map(str::trim_start)
}

/// Iterator returned by [`data_payloads`]
#[derive(Debug)]
pub struct DataPayloads<'a> {
    lines: std::slice::Split<'a, u8, fn(&u8) -> bool>,
    done: bool,
}

impl<'a> DataPayloads<'a> {
    /// Whether the end-of-stream sentinel was seen in this slice
    pub fn saw_done(&self) -> bool {
        self.done
    }
}

impl<'a> Iterator for DataPayloads<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        for raw in self.lines.by_ref() {
            let payload = match String::from_utf8_lossy(raw) {
                Cow::Borrowed(line) => parse_data_line(line).map(Cow::Borrowed),
                Cow::Owned(line) => parse_data_line(&line).map(|p| Cow::Owned(p.to_string())),
            };

            let Some(payload) = payload else {
                continue;
            };

            if payload == DONE_SENTINEL {
                self.done = true;
                return None;
            }

            return Some(payload);
        }

        None
    }
}
