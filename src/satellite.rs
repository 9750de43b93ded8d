use crate::prelude::{Constellation, SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Telemetry of one observed satellite, as reported in a GSV sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatelliteInfo {
    /// [Constellation] this satellite belongs to
    pub system: Constellation,
    /// PRN number, unique within a [Constellation] at a given instant.
    pub identifier: u16,
    /// Elevation (in degrees), if reported
    pub elevation: Option<u16>,
    /// Azimuth (in degrees), if reported
    pub azimuth: Option<u16>,
    /// SNR (in dB-Hz), if reported. Higher is better.
    pub signal_strength: Option<u16>,
}

impl SatelliteInfo {
    /// Builds a new [SatelliteInfo] with no telemetry attached.
    pub fn new(system: Constellation, identifier: u16) -> Self {
        Self {
            system,
            identifier,
            elevation: None,
            azimuth: None,
            signal_strength: None,
        }
    }

    /// Copies and returns [SatelliteInfo] with elevation (in degrees)
    pub fn with_elevation(&self, elevation: u16) -> Self {
        let mut s = *self;
        s.elevation = Some(elevation);
        s
    }

    /// Copies and returns [SatelliteInfo] with azimuth (in degrees)
    pub fn with_azimuth(&self, azimuth: u16) -> Self {
        let mut s = *self;
        s.azimuth = Some(azimuth);
        s
    }

    /// Copies and returns [SatelliteInfo] with signal strength (in dB-Hz)
    pub fn with_signal_strength(&self, snr: u16) -> Self {
        let mut s = *self;
        s.signal_strength = Some(snr);
        s
    }

    /// Returns this satellite as [SV], when the PRN fits the [SV] numbering.
    pub fn sv(&self) -> Option<SV> {
        let prn = u8::try_from(self.identifier).ok()?;
        Some(SV::new(self.system, prn))
    }
}

impl std::fmt::Display for SatelliteInfo {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}({:02})", self.system, self.identifier)
    }
}
