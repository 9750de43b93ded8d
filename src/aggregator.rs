//! GSV / GSA aggregation
use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use log::{debug, info};

use crate::{
    cfg::Config,
    nmea::{ParsingError, Sentence},
    prelude::{Constellation, SatelliteInfo},
};

/// GSV: first satellite field
const GSV_FIRST_SAT: usize = 4;

/// GSA: PRN slots (fixed)
const GSA_PRN_SLOTS: std::ops::RangeInclusive<usize> = 3..=14;

/// Optional numeric field: empty or invalid means "not reported"
fn optional_field(field: &str) -> Option<u16> {
    field.parse::<u16>().ok()
}

fn header_field(fields: &[&str], idx: usize) -> Result<u32, ParsingError> {
    fields
        .get(idx)
        .and_then(|f| f.parse::<u32>().ok())
        .ok_or(ParsingError::BadField(idx))
}

/// [Aggregator] reconciles multi sentences GSV groups into the satellites in
/// view, and correlates GSA fix data against them to form the satellites in use.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    /// [Config] preset
    cfg: Config,
    /// GSV group being assembled
    group: BTreeMap<u16, SatelliteInfo>,
    /// Last complete GSV group
    in_view: BTreeMap<u16, SatelliteInfo>,
    /// Last confirmed GSA correlation
    in_use: Vec<SatelliteInfo>,
}

impl Aggregator {
    /// Builds a new [Aggregator] from [Config] preset.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ..Default::default()
        }
    }

    /// Satellites in view, from the last complete GSV group, in PRN ascending order.
    pub fn satellites_in_view(&self) -> Vec<SatelliteInfo> {
        self.in_view.values().copied().collect()
    }

    /// Satellites used in the fix, from the last confirmed GSA sentence.
    pub fn satellites_in_use(&self) -> &[SatelliteInfo] {
        &self.in_use
    }

    fn constellation(&self, sentence: &Sentence) -> Constellation {
        if self.cfg.talker_constellation {
            sentence.constellation()
        } else {
            Constellation::GPS
        }
    }

    /// Processes one GSV sentence. Returns the new satellites in view snapshot
    /// once the group is complete (last sentence of the group).
    pub fn process_gsv(
        &mut self,
        sentence: &Sentence,
    ) -> Result<Option<Vec<SatelliteInfo>>, ParsingError> {
        let fields = sentence.fields().collect::<Vec<_>>();

        let total = header_field(&fields, 1)?;
        let index = header_field(&fields, 2)?;
        let declared = header_field(&fields, 3)?;

        if index == 1 {
            self.group.clear();
        }

        let system = self.constellation(sentence);

        // short trailing quadruples (or signal ID) are dropped
        for (prn, elev, azim, snr) in fields[GSV_FIRST_SAT..].iter().tuples() {
            let identifier = match prn.parse::<u16>() {
                Ok(prn) => prn,
                Err(_) => {
                    debug!("gsv {}/{}: invalid prn \"{}\"", index, total, prn);
                    continue;
                },
            };

            let info = SatelliteInfo {
                system,
                identifier,
                elevation: optional_field(elev),
                azimuth: optional_field(azim),
                signal_strength: optional_field(snr),
            };

            self.group.insert(identifier, info);
        }

        if index != total {
            debug!("gsv {}/{}: {} satellites so far", index, total, self.group.len());
            return Ok(None);
        }

        if self.group.len() != declared as usize {
            info!(
                "gsv: {} satellites declared, {} assembled",
                declared,
                self.group.len()
            );
        }

        self.in_view = self.group.clone();
        debug!("gsv: {} satellites in view", self.in_view.len());

        Ok(Some(self.satellites_in_view()))
    }

    /// Processes one GSA sentence. Returns the satellites in use, only when
    /// every used PRN could be resolved against the satellites in view.
    pub fn process_gsa(
        &mut self,
        sentence: &Sentence,
    ) -> Result<Option<Vec<SatelliteInfo>>, ParsingError> {
        if self.in_view.is_empty() {
            return Ok(None);
        }

        let fields = sentence.fields().collect::<Vec<_>>();
        if fields.len() < 3 {
            return Err(ParsingError::BadField(fields.len()));
        }

        let mut resolved = true;
        let mut used = BTreeSet::<u16>::new();

        for idx in GSA_PRN_SLOTS {
            let field = match fields.get(idx) {
                Some(field) if !field.is_empty() => field,
                _ => continue,
            };
            match field.parse::<u16>() {
                Ok(prn) => {
                    used.insert(prn);
                },
                Err(_) => {
                    info!("gsa: invalid used prn \"{}\"", field);
                    resolved = false;
                },
            }
        }

        let mut in_use = Vec::with_capacity(used.len());

        for prn in used.iter() {
            match self.in_view.get(prn) {
                Some(info) => in_use.push(*info),
                None => info!("gsa: used satellite {} not found", prn),
            }
        }

        if !resolved || in_use.len() != used.len() {
            return Ok(None);
        }

        self.in_use = in_use.clone();
        Ok(Some(in_use))
    }
}
