//! NMEA 0183 sentence validation
use log::trace;
use thiserror::Error;

use crate::prelude::Constellation;

/// Shortest acceptable line: `$` + talker (2) + sentence type (3)
const MIN_LINE_LEN: usize = 6;

/// Checksum length, in hexadecimal digits
const CHECKSUM_LEN: usize = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ParsingError {
    #[error("line is too short")]
    TooShort,
    #[error("missing '$' start marker")]
    MissingStartMarker,
    #[error("missing '*' checksum delimiter")]
    MissingChecksum,
    #[error("truncated checksum field")]
    TruncatedChecksum,
    #[error("checksum field is not hexadecimal")]
    InvalidChecksumField,
    #[error("checksum mismatch: expected {expected:02X}, found {found:02X}")]
    ChecksumMismatch { expected: u8, found: u8 },
    #[error("invalid or missing field #{0}")]
    BadField(usize),
}

/// Sentence types we know how to process.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SentenceKind {
    /// Satellites in view
    Gsv,
    /// Satellites used in the fix, and DOP
    Gsa,
    /// Any other (valid) sentence
    Other([u8; 3]),
}

impl SentenceKind {
    fn from_code(code: [u8; 3]) -> Self {
        match &code {
            b"GSV" => Self::Gsv,
            b"GSA" => Self::Gsa,
            _ => Self::Other(code),
        }
    }
}

/// Validated NMEA sentence, the checksum and start marker stripped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sentence<'a> {
    /// Talker ID (`GP`, `GL`..)
    pub talker: [u8; 2],
    /// [SentenceKind]
    pub kind: SentenceKind,
    /// Payload: everything strictly between `$` and `*`
    pub body: &'a [u8],
}

impl<'a> Sentence<'a> {
    /// Comma separated fields of this sentence. Field #0 is the talker + type
    /// word, for example `GPGSV`.
    pub fn fields(&self) -> impl Iterator<Item = &'a str> {
        // NMEA is ASCII: anything else cannot match a numeric field anyway
        std::str::from_utf8(self.body)
            .unwrap_or_default()
            .split(',')
    }

    /// Resolves the [Constellation] from the talker ID.
    /// Unknown and combined (`GN`) talkers default to GPS.
    pub fn constellation(&self) -> Constellation {
        match &self.talker {
            b"GL" => Constellation::Glonass,
            b"GA" => Constellation::Galileo,
            b"GB" | b"BD" => Constellation::BeiDou,
            b"GQ" => Constellation::QZSS,
            b"GI" => Constellation::IRNSS,
            _ => Constellation::GPS,
        }
    }
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Running exclusive-or of all provided bytes
fn xor(data: &[u8]) -> u8 {
    data.iter().fold(0, |cs, b| cs ^ b)
}

/// Verifies that `line` is a well formed NMEA sentence with a valid checksum,
/// and returns its [Sentence] view. Trailing line terminators may be present,
/// anything after the two checksum digits is ignored.
pub fn validate(line: &[u8]) -> Result<Sentence<'_>, ParsingError> {
    if line.len() < MIN_LINE_LEN {
        return Err(ParsingError::TooShort);
    }

    if line[0] != b'$' {
        return Err(ParsingError::MissingStartMarker);
    }

    let delimiter = line
        .iter()
        .position(|b| *b == b'*')
        .ok_or(ParsingError::MissingChecksum)?;

    if delimiter + CHECKSUM_LEN >= line.len() {
        return Err(ParsingError::TruncatedChecksum);
    }

    let digits = &line[delimiter + 1..delimiter + 1 + CHECKSUM_LEN];
    let found = match (hex_digit(digits[0]), hex_digit(digits[1])) {
        (Some(msb), Some(lsb)) => (msb << 4) | lsb,
        _ => return Err(ParsingError::InvalidChecksumField),
    };

    let expected = xor(&line[1..delimiter]);
    if expected != found {
        return Err(ParsingError::ChecksumMismatch { expected, found });
    }

    let sentence = Sentence {
        talker: [line[1], line[2]],
        kind: SentenceKind::from_code([line[3], line[4], line[5]]),
        body: &line[1..delimiter],
    };

    trace!(
        "valid {:?} sentence ({} bytes)",
        sentence.kind,
        sentence.body.len()
    );

    Ok(sentence)
}
