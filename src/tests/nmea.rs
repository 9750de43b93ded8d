use rand::{rngs::SmallRng, Rng, SeedableRng};
use rstest::*;

use crate::{
    prelude::{validate, Constellation, ParsingError, SentenceKind},
    tests::{init_logger, nmea_line},
};

#[test]
fn gsv_reference_sentence() {
    init_logger();

    let line = b"$GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45*75\r\n";
    let sentence = validate(line).unwrap();

    assert_eq!(sentence.kind, SentenceKind::Gsv);
    assert_eq!(&sentence.talker, b"GP");
    assert_eq!(sentence.constellation(), Constellation::GPS);
    assert_eq!(
        sentence.body,
        b"GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45"
    );

    let fields = sentence.fields().collect::<Vec<_>>();
    assert_eq!(fields.len(), 20);
    assert_eq!(fields[0], "GPGSV");
    assert_eq!(fields[19], "45");
}

#[test]
fn gsa_reference_sentence() {
    init_logger();

    let line = b"$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*39";
    let sentence = validate(line).unwrap();

    assert_eq!(sentence.kind, SentenceKind::Gsa);
    assert_eq!(sentence.fields().nth(5), Some(""));
}

#[test]
fn other_sentence_kind() {
    let line = nmea_line("GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,");
    let sentence = validate(line.as_bytes()).unwrap();
    assert_eq!(sentence.kind, SentenceKind::Other(*b"GGA"));
}

#[rstest]
#[case(b"", ParsingError::TooShort)]
#[case(b"$", ParsingError::TooShort)]
#[case(b"$GPGS", ParsingError::TooShort)]
#[case(b"GPGSV,1,1,00*79", ParsingError::MissingStartMarker)]
#[case(b"!GPGSV,1,1,00*79", ParsingError::MissingStartMarker)]
#[case(b"$GPGSV,1,1,00", ParsingError::MissingChecksum)]
#[case(b"$GPGSV,1,1,00*", ParsingError::TruncatedChecksum)]
#[case(b"$GPGSV,1,1,00*4", ParsingError::TruncatedChecksum)]
#[case(b"$GPGSV,1,1,00*G9", ParsingError::InvalidChecksumField)]
#[case(b"$GPGSV,1,1,00*+9", ParsingError::InvalidChecksumField)]
#[case(b"$GPGSV,1,1,00*00", ParsingError::ChecksumMismatch { expected: 0x79, found: 0x00 })]
fn rejected_lines(#[case] line: &[u8], #[case] error: ParsingError) {
    init_logger();
    assert_eq!(validate(line), Err(error));
}

#[test]
fn checksum_is_case_insensitive() {
    assert!(validate(b"$GPGSV,1,1,00*79").is_ok());
    assert!(validate(b"$GPGSV,1,1,01,10,45,120,*4B").is_ok());
    assert!(validate(b"$GPGSV,1,1,01,10,45,120,*4b").is_ok());
}

#[test]
fn garbage_never_panics() {
    let mut rng = SmallRng::seed_from_u64(0x4e4d4541);

    for _ in 0..1000 {
        let len = rng.random_range(0..96);
        let mut line = (0..len).map(|_| rng.random::<u8>()).collect::<Vec<_>>();
        if rng.random_bool(0.5) && !line.is_empty() {
            line[0] = b'$';
        }
        let _ = validate(&line);
    }
}

#[test]
fn single_corruption_is_detected() {
    init_logger();

    let line = nmea_line("GPGSV,3,1,11,03,03,111,00,04,15,270,00,06,01,010,00,13,06,292,00");
    let bytes = line.as_bytes();
    let delimiter = line.find('*').unwrap();

    let mut rng = SmallRng::seed_from_u64(0x475356);

    for _ in 0..256 {
        let mut corrupted = bytes.to_vec();
        let idx = rng.random_range(1..delimiter);

        // printable replacement, different from original and not a delimiter
        let replacement = loop {
            let c = rng.random_range(b' '..=b'~');
            if c != bytes[idx] && c != b'*' {
                break c;
            }
        };

        corrupted[idx] = replacement;

        assert!(
            matches!(
                validate(&corrupted),
                Err(ParsingError::ChecksumMismatch { .. })
            ),
            "corruption at #{} not detected: {}",
            idx,
            String::from_utf8_lossy(&corrupted)
        );
    }
}

#[rstest]
#[case("GP", Constellation::GPS)]
#[case("GN", Constellation::GPS)]
#[case("GL", Constellation::Glonass)]
#[case("GA", Constellation::Galileo)]
#[case("GB", Constellation::BeiDou)]
#[case("BD", Constellation::BeiDou)]
#[case("GQ", Constellation::QZSS)]
#[case("GI", Constellation::IRNSS)]
fn talker_constellation(#[case] talker: &str, #[case] constellation: Constellation) {
    let line = nmea_line(&format!("{}GSV,1,1,00", talker));
    let sentence = validate(line.as_bytes()).unwrap();
    assert_eq!(sentence.constellation(), constellation);
}
