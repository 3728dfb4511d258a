//! Line framing for the IRC socket

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::error::BridgeError;

/// Longest accepted inbound line, including IRCv3 tags
pub const MAX_LINE_LENGTH: usize = 8192 + 512;

/// Splits inbound bytes on LF (tolerating CR) and terminates outbound lines with CRLF
#[derive(Debug)]
pub struct IrcCodec {
    lines: LinesCodec,
}

impl IrcCodec {
    /// Create a codec with the default line bound
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        }
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = String;
    type Error = BridgeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, BridgeError> {
        self.lines.decode(src).map_err(codec_error)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, BridgeError> {
        self.lines.decode_eof(src).map_err(codec_error)
    }
}

impl Encoder<String> for IrcCodec {
    type Error = BridgeError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), BridgeError> {
        let line = line.trim_end_matches(['\r', '\n']);
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

fn codec_error(err: LinesCodecError) -> BridgeError {
    match err {
        LinesCodecError::MaxLineLengthExceeded => {
            BridgeError::connection(format!("Server line exceeded {MAX_LINE_LENGTH} bytes"))
        }
        LinesCodecError::Io(e) => BridgeError::Io(e),
    }
}
