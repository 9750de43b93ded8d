#![cfg_attr(docrs, feature(doc_cfg))]
//! Live GNSS satellites information, extracted from a stream of NMEA 0183
//! sentences (typically relayed by gpsd).
//!
//! Two views are published: the satellites currently in view (GSV groups)
//! and the satellites currently used in the position fix (GSA, correlated
//! against the last complete GSV group).

extern crate gnss_rs as gnss;

// private modules
mod aggregator;
mod cfg;
mod error;
mod nmea;
mod provider;
mod satellite;
mod source;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::aggregator::Aggregator;
    pub use crate::cfg::Config;
    pub use crate::error::Error;
    pub use crate::nmea::{validate, ParsingError, Sentence, SentenceKind};
    pub use crate::provider::{Handle, LineHub, LineProvider};
    pub use crate::satellite::SatelliteInfo;
    pub use crate::source::{Event, Request, Source, State};
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch};
}

// pub export
pub use error::Error;
