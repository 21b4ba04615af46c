//! RESP2 command encoding and reply parsing.
//!
//! Only the client side is needed: commands go out as arrays of bulk
//! strings, replies come back as one of the five RESP2 types.

/// Maximum bulk string size accepted in a reply (512MB).
const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Maximum array elements accepted in a reply.
const MAX_ELEMENTS: usize = 1_000_000;

/// Maximum array nesting depth accepted in a reply.
const MAX_NESTING_DEPTH: usize = 32;

/// A decoded RESP2 reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `+OK`
    Simple(String),
    /// `-ERR message`, kept whole.
    Error(String),
    /// `:1000`
    Integer(i64),
    /// `$6\r\nfoobar` or `$-1` (null).
    Bulk(Option<Vec<u8>>),
    /// `*2\r\n...` or `*-1` (null).
    Array(Option<Vec<Reply>>),
}

/// Outcome of parsing a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    /// A full reply and the number of bytes it occupied.
    Ok(Reply, usize),
    /// More bytes are needed.
    Incomplete,
    /// The bytes are not valid RESP2.
    Error(String),
}

/// Encode a command as a RESP2 array of bulk strings.
pub fn encode_command(args: &[&[u8]]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16 + args.iter().map(|a| a.len() + 16).sum::<usize>());
    buf.push(b'*');
    buf.extend_from_slice(args.len().to_string().as_bytes());
    buf.extend_from_slice(b"\r\n");
    for arg in args {
        buf.push(b'$');
        buf.extend_from_slice(arg.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(arg);
        buf.extend_from_slice(b"\r\n");
    }
    buf
}

/// Parse one reply from the front of `data`.
pub fn parse_reply(data: &[u8]) -> ParseResult {
    parse_value(data, 0)
}

fn parse_value(data: &[u8], depth: usize) -> ParseResult {
    if data.is_empty() {
        return ParseResult::Incomplete;
    }
    if depth > MAX_NESTING_DEPTH {
        return ParseResult::Error("maximum nesting depth exceeded".to_string());
    }

    let Some(line_end) = find_crlf(&data[1..]) else {
        return ParseResult::Incomplete;
    };
    let line = &data[1..1 + line_end];
    // Prefix byte, line, CRLF.
    let header_len = line_end + 3;

    match data[0] {
        b'+' => ParseResult::Ok(
            Reply::Simple(String::from_utf8_lossy(line).into_owned()),
            header_len,
        ),
        b'-' => ParseResult::Ok(
            Reply::Error(String::from_utf8_lossy(line).into_owned()),
            header_len,
        ),
        b':' => match parse_int(line) {
            Some(n) => ParseResult::Ok(Reply::Integer(n), header_len),
            None => ParseResult::Error("invalid integer".to_string()),
        },
        b'$' => match parse_int(line) {
            Some(-1) => ParseResult::Ok(Reply::Bulk(None), header_len),
            Some(len) if len >= 0 => {
                let len = len as usize;
                if len > MAX_BULK_SIZE {
                    return ParseResult::Error(format!(
                        "bulk string too large: {} > {}",
                        len, MAX_BULK_SIZE
                    ));
                }
                let end = header_len + len;
                if data.len() < end + 2 {
                    return ParseResult::Incomplete;
                }
                if &data[end..end + 2] != b"\r\n" {
                    return ParseResult::Error("missing CRLF after bulk string".to_string());
                }
                ParseResult::Ok(Reply::Bulk(Some(data[header_len..end].to_vec())), end + 2)
            }
            _ => ParseResult::Error("invalid bulk string length".to_string()),
        },
        b'*' => match parse_int(line) {
            Some(-1) => ParseResult::Ok(Reply::Array(None), header_len),
            Some(len) if len >= 0 => {
                let len = len as usize;
                if len > MAX_ELEMENTS {
                    return ParseResult::Error(format!(
                        "array too large: {} > {}",
                        len, MAX_ELEMENTS
                    ));
                }
                let mut elements = Vec::with_capacity(len);
                let mut offset = header_len;
                for _ in 0..len {
                    match parse_value(&data[offset..], depth + 1) {
                        ParseResult::Ok(value, consumed) => {
                            elements.push(value);
                            offset += consumed;
                        }
                        other => return other,
                    }
                }
                ParseResult::Ok(Reply::Array(Some(elements)), offset)
            }
            _ => ParseResult::Error("invalid array length".to_string()),
        },
        other => ParseResult::Error(format!("unexpected reply type byte 0x{:02x}", other)),
    }
}

fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w == b"\r\n")
}

fn parse_int(line: &[u8]) -> Option<i64> {
    std::str::from_utf8(line).ok()?.parse().ok()
}
