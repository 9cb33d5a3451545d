//! Line-oriented codec for the oracle's batch protocol: canonical wire lines
//! in, framed CSV tables out. Cell values stay opaque strings here; numeric
//! interpretation belongs to the schema validator.

use crate::domain::{BridgeError, BridgeResult, DumpRequest, RawTable};
use std::collections::BTreeSet;

pub const FRAME_BEGIN_PREFIX: &str = "#BEGIN dump=";
pub const FRAME_END: &str = "#END";

/// One canonical wire line per request, trailing newline terminated. The
/// iteration order of the input is preserved; callers hand over an ordered
/// set, which keeps batch input deterministic for log readability.
pub fn encode_batch<'a, I>(requests: I) -> String
where
    I: IntoIterator<Item = &'a DumpRequest>,
{
    let mut batch = String::new();
    for request in requests {
        batch.push_str(&request.wire_line());
        batch.push('\n');
    }
    batch
}

/// Parse `"<module> <k>=<v> ..."` into a canonical request. Shared between
/// batch-input handling and frame-marker reconstruction; argument order in
/// the input is irrelevant because construction re-sorts.
pub fn parse_wire_line(line: &str) -> BridgeResult<DumpRequest> {
    let mut tokens = line.split_whitespace();
    let Some(module) = tokens.next() else {
        return Err(BridgeError::protocol(
            "WIRE.EMPTY_REQUEST_LINE",
            "request line has no module token",
        ));
    };

    let mut pairs = Vec::new();
    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            return Err(BridgeError::protocol(
                "WIRE.MALFORMED_ARGUMENT",
                format!("argument token '{token}' is not of the form key=value"),
            ));
        };
        pairs.push((key.to_string(), value.to_string()));
    }

    DumpRequest::build(module, pairs)
}

/// Decode concatenated `#BEGIN dump=...` / `#END` frames into request/table
/// pairs. Blank lines between and inside frames are ignored; anything else
/// outside a frame, and every framing fault, is a protocol error.
pub fn decode_batch(output: &str) -> BridgeResult<Vec<(DumpRequest, RawTable)>> {
    let mut frames: Vec<(DumpRequest, RawTable)> = Vec::new();
    let mut seen: BTreeSet<DumpRequest> = BTreeSet::new();
    let mut current: Option<FrameAccumulator> = None;

    for (index, raw_line) in output.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim_end_matches('\r');

        if line.starts_with("#BEGIN") {
            if current.is_some() {
                return Err(BridgeError::protocol(
                    "WIRE.NESTED_BEGIN",
                    format!("line {line_number}: '#BEGIN' inside an open frame"),
                ));
            }
            let Some(request_line) = line.strip_prefix(FRAME_BEGIN_PREFIX) else {
                return Err(BridgeError::protocol(
                    "WIRE.MALFORMED_BEGIN",
                    format!("line {line_number}: frame marker must start with '{FRAME_BEGIN_PREFIX}'"),
                ));
            };
            current = Some(FrameAccumulator::new(parse_wire_line(request_line)?));
            continue;
        }

        if line == FRAME_END {
            let Some(frame) = current.take() else {
                return Err(BridgeError::protocol(
                    "WIRE.END_WITHOUT_BEGIN",
                    format!("line {line_number}: '#END' without an open frame"),
                ));
            };
            let (request, table) = frame.finish()?;
            if !seen.insert(request.clone()) {
                return Err(BridgeError::protocol(
                    "WIRE.DUPLICATE_FRAME",
                    format!("duplicate frame for request '{request}'"),
                ));
            }
            frames.push((request, table));
            continue;
        }

        match current.as_mut() {
            Some(frame) => frame.push_line(line, line_number)?,
            None => {
                if !line.trim().is_empty() {
                    return Err(BridgeError::protocol(
                        "WIRE.STRAY_LINE",
                        format!("line {line_number}: unexpected content outside a frame: '{line}'"),
                    ));
                }
            }
        }
    }

    if let Some(frame) = current {
        return Err(BridgeError::protocol(
            "WIRE.UNTERMINATED_FRAME",
            format!("frame for '{}' was never closed with '#END'", frame.request),
        ));
    }

    Ok(frames)
}

/// Decode unframed single-invocation output: one header row plus data rows.
/// Empty output is a valid empty table (the oracle writes its header lazily).
pub fn decode_single(output: &str) -> BridgeResult<RawTable> {
    let mut columns: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();

    for (index, raw_line) in output.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line);
        match &columns {
            None => columns = Some(fields),
            Some(header) => {
                if fields.len() != header.len() {
                    return Err(BridgeError::protocol(
                        "WIRE.FIELD_COUNT",
                        format!(
                            "line {}: data row has {} fields but the header has {}",
                            index + 1,
                            fields.len(),
                            header.len()
                        ),
                    ));
                }
                rows.push(fields);
            }
        }
    }

    RawTable::from_parts(columns.unwrap_or_default(), rows)
}

/// Locale-independent scientific notation with twelve fractional digits and a
/// signed two-digit exponent, matching the oracle's `%.12e` emission. This
/// precision exceeds every downstream comparison tolerance.
pub fn format_scientific_f64(value: f64) -> String {
    let raw = format!("{value:.12e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(rest) => ('-', rest),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => raw,
    }
}

struct FrameAccumulator {
    request: DumpRequest,
    columns: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl FrameAccumulator {
    fn new(request: DumpRequest) -> Self {
        Self {
            request,
            columns: None,
            rows: Vec::new(),
        }
    }

    fn push_line(&mut self, line: &str, line_number: usize) -> BridgeResult<()> {
        if line.trim().is_empty() {
            return Ok(());
        }
        let fields = split_fields(line);
        match &self.columns {
            None => self.columns = Some(fields),
            Some(header) => {
                if fields.len() != header.len() {
                    return Err(BridgeError::protocol(
                        "WIRE.FIELD_COUNT",
                        format!(
                            "line {}: data row for '{}' has {} fields but the header has {}",
                            line_number,
                            self.request,
                            fields.len(),
                            header.len()
                        ),
                    ));
                }
                self.rows.push(fields);
            }
        }
        Ok(())
    }

    fn finish(self) -> BridgeResult<(DumpRequest, RawTable)> {
        let table = RawTable::from_parts(self.columns.unwrap_or_default(), self.rows)?;
        Ok((self.request, table))
    }
}

// No quoting or escaping on the wire: values never contain commas.
fn split_fields(line: &str) -> Vec<String> {
    line.split(',').map(str::to_string).collect()
}
