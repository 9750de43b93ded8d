mod nmea;

pub use provider::{ProviderCall, ScriptedProvider};

use log::LevelFilter;
use std::str::FromStr;
use std::sync::Once;

use crate::prelude::Epoch;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Trace)
            .init();
    });
}

/// Wraps this body into a complete NMEA line, with valid checksum
pub fn nmea_line(body: &str) -> String {
    let checksum = body.bytes().fold(0u8, |cs, b| cs ^ b);
    format!("${}*{:02X}\r\n", body, checksum)
}

/// Reference [Epoch] for all protocol tests
pub fn t0() -> Epoch {
    Epoch::from_str("2020-06-25T00:00:00 GPST").unwrap()
}

/// Two sentences GSV group: 3 satellites (01, 02, 03)
pub const GSV_GROUP: [&str; 2] = [
    "GPGSV,2,1,03,01,40,083,46,02,17,308,41",
    "GPGSV,2,2,03,03,07,344,39",
];

/// GSA sentence using satellites 02 and 03
pub const GSA_02_03: &str = "GPGSA,A,3,02,03,,,,,,,,,,,2.5,1.3,2.1";

/// GSA sentence using satellite 07 (never in view)
pub const GSA_07: &str = "GPGSA,A,3,07,,,,,,,,,,,,2.5,1.3,2.1";
