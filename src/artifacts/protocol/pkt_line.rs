//! pkt-line frame codec
//!
//! A frame is a 4-character lowercase hex length (counting the length
//! bytes themselves) followed by the payload; `0000` is a flush with no
//! payload. Payload text is newline-terminated on the wire, and readers
//! strip the trailing `\r`/`\n`.

use crate::artifacts::core::GitError;
use std::io::Read;

/// The flush delimiter
pub const FLUSH: &str = "0000";

/// Length of the hex length prefix
const PREFIX_LENGTH: usize = 4;

/// One parsed frame
enum Frame {
    Data(String),
    Flush,
    Eof,
}

/// Read a single pkt-line payload. A flush yields an empty payload.
pub fn read_pkt_line(reader: &mut impl Read) -> anyhow::Result<String> {
    match read_frame(reader)? {
        Frame::Data(payload) => Ok(payload),
        Frame::Flush | Frame::Eof => Ok(String::new()),
    }
}

/// Read a pkt-line stream into payloads.
///
/// The first flush is a section delimiter (ref discovery separates the
/// service banner from the refs with one) and is skipped; a second flush
/// or the end of the stream terminates it.
pub fn read_pkt_lines(reader: &mut impl Read) -> anyhow::Result<Vec<String>> {
    let mut payloads = Vec::new();
    let mut passed_first_flush = false;

    loop {
        match read_frame(reader)? {
            Frame::Data(payload) => payloads.push(payload),
            Frame::Flush if !passed_first_flush => passed_first_flush = true,
            Frame::Flush | Frame::Eof => break,
        }
    }

    Ok(payloads)
}

fn read_frame(reader: &mut impl Read) -> anyhow::Result<Frame> {
    let mut prefix = [0u8; PREFIX_LENGTH];
    let mut filled = 0;
    while filled < PREFIX_LENGTH {
        let n = reader.read(&mut prefix[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(Frame::Eof);
            }
            return Err(GitError::Corrupt("pkt-line: truncated length prefix".to_string()).into());
        }
        filled += n;
    }

    let prefix = std::str::from_utf8(&prefix)
        .map_err(|_| GitError::Corrupt("pkt-line: non-utf8 length prefix".to_string()))?;
    let length = usize::from_str_radix(prefix, 16)
        .map_err(|_| GitError::Corrupt(format!("pkt-line: invalid length {prefix:?}")))?;

    if length == 0 {
        return Ok(Frame::Flush);
    }
    if length < PREFIX_LENGTH {
        return Err(GitError::Corrupt(format!("pkt-line: undersized length {length}")).into());
    }

    let mut payload = vec![0u8; length - PREFIX_LENGTH];
    reader
        .read_exact(&mut payload)
        .map_err(|_| GitError::Corrupt("pkt-line: truncated payload".to_string()))?;

    let payload = String::from_utf8(payload)
        .map_err(|_| GitError::Corrupt("pkt-line: non-utf8 payload".to_string()))?;

    Ok(Frame::Data(payload.trim_end_matches(['\r', '\n']).to_string()))
}

/// Frame one payload, newline-terminating it if needed.
pub fn create_pkt_line(content: &str) -> String {
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }

    format!("{:04x}{}", content.len() + PREFIX_LENGTH, content)
}

/// Join framed lines and append the terminating flush.
pub fn create_pkt_line_stream(pkt_lines: &[String]) -> String {
    let mut stream = pkt_lines.concat();
    stream.push_str(FLUSH);
    stream
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case("hello", "000ahello\n")]
    #[case("hello\n", "000ahello\n")]
    #[case("done", "0009done\n")]
    fn frames_payload_with_hex_length(#[case] content: &str, #[case] expected: &str) {
        assert_eq!(create_pkt_line(content), expected);
    }

    #[test]
    fn single_line_read_strips_terminator() {
        let mut reader = Cursor::new(b"0008NAK\n".to_vec());
        assert_eq!(read_pkt_line(&mut reader).unwrap(), "NAK");
    }

    #[test]
    fn stream_skips_section_delimiter_and_stops_at_flush() {
        let body = format!(
            "{}{}{}{}",
            create_pkt_line("# service=git-upload-pack"),
            FLUSH,
            create_pkt_line("3b18e512dba79e4c8300dd08aeb37f8e728b8dad HEAD"),
            FLUSH,
        );

        let lines = read_pkt_lines(&mut Cursor::new(body.into_bytes())).unwrap();
        assert_eq!(
            lines,
            vec![
                "# service=git-upload-pack".to_string(),
                "3b18e512dba79e4c8300dd08aeb37f8e728b8dad HEAD".to_string(),
            ]
        );
    }

    #[test]
    fn status_report_stream_ends_at_its_single_flush() {
        let body = format!(
            "{}{}{}",
            create_pkt_line("unpack ok"),
            create_pkt_line("ok refs/heads/master"),
            FLUSH,
        );

        let lines = read_pkt_lines(&mut Cursor::new(body.into_bytes())).unwrap();
        assert_eq!(
            lines,
            vec!["unpack ok".to_string(), "ok refs/heads/master".to_string()]
        );
    }

    #[test]
    fn carriage_returns_are_stripped() {
        let mut reader = Cursor::new(b"000bhello\r\n\x30\x30\x30\x30".to_vec());
        assert_eq!(read_pkt_line(&mut reader).unwrap(), "hello");
    }

    #[test]
    fn round_trip_through_stream() {
        let lines = vec![create_pkt_line("want abc"), create_pkt_line("done")];
        let stream = create_pkt_line_stream(&lines);
        assert!(stream.ends_with(FLUSH));

        let parsed = read_pkt_lines(&mut Cursor::new(stream.into_bytes())).unwrap();
        assert_eq!(parsed, vec!["want abc".to_string(), "done".to_string()]);
    }

    #[rstest]
    #[case(b"00".to_vec())]
    #[case(b"zzzz".to_vec())]
    #[case(b"0009do".to_vec())]
    #[case(b"0002".to_vec())]
    fn malformed_frames_are_corrupt(#[case] body: Vec<u8>) {
        assert!(read_pkt_line(&mut Cursor::new(body)).is_err());
    }
}
