// src/filter.rs
//! Satellite visibility filter

use crate::{
    error::Result,
    gnss::{Constellation, SatelliteObservation},
    prefs::PreferenceStore,
};
use std::{fmt, str::FromStr};

/// Preference keys of the six filter toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Gps,
    Galileo,
    Glonass,
    Unknown,
    UsedInFix,
    NotUsedInFix,
}

impl FilterKey {
    pub const ALL: [FilterKey; 6] = [
        FilterKey::Gps,
        FilterKey::Galileo,
        FilterKey::Glonass,
        FilterKey::Unknown,
        FilterKey::UsedInFix,
        FilterKey::NotUsedInFix,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FilterKey::Gps => "gpsChecked",
            FilterKey::Galileo => "galileoChecked",
            FilterKey::Glonass => "glonassChecked",
            FilterKey::Unknown => "unknownChecked",
            FilterKey::UsedInFix => "usedInFix",
            FilterKey::NotUsedInFix => "notUsedInFix",
        }
    }

    /// Checkbox caption
    pub fn label(&self) -> &'static str {
        match self {
            FilterKey::Gps => "GPS",
            FilterKey::Galileo => "Galileo",
            FilterKey::Glonass => "GLONASS",
            FilterKey::Unknown => "Other",
            FilterKey::UsedInFix => "Used in fix",
            FilterKey::NotUsedInFix => "Not used in fix",
        }
    }

    pub fn for_constellation(constellation: Constellation) -> Self {
        match constellation {
            Constellation::Gps => FilterKey::Gps,
            Constellation::Glonass => FilterKey::Glonass,
            Constellation::Galileo => FilterKey::Galileo,
            Constellation::Other => FilterKey::Unknown,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        FilterKey::ALL
            .into_iter()
            .find(|key| key.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown filter key '{}'", s))
    }
}

/// Which satellites the sky plot draws. Every toggle defaults to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityFilter {
    pub gps: bool,
    pub galileo: bool,
    pub glonass: bool,
    pub unknown: bool,
    pub used_in_fix: bool,
    pub not_used_in_fix: bool,
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self {
            gps: true,
            galileo: true,
            glonass: true,
            unknown: true,
            used_in_fix: true,
            not_used_in_fix: true,
        }
    }
}

impl VisibilityFilter {
    /// Read all toggles from the store, defaulting to on
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let mut filter = Self::default();
        for key in FilterKey::ALL {
            filter.set(key, store.get_bool(key.key(), true));
        }
        filter
    }

    /// Write all toggles and flush the store
    pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<()> {
        for key in FilterKey::ALL {
            store.set_bool(key.key(), self.get(key));
        }
        store.flush()
    }

    pub fn get(&self, key: FilterKey) -> bool {
        match key {
            FilterKey::Gps => self.gps,
            FilterKey::Galileo => self.galileo,
            FilterKey::Glonass => self.glonass,
            FilterKey::Unknown => self.unknown,
            FilterKey::UsedInFix => self.used_in_fix,
            FilterKey::NotUsedInFix => self.not_used_in_fix,
        }
    }

    pub fn set(&mut self, key: FilterKey, value: bool) {
        let slot = match key {
            FilterKey::Gps => &mut self.gps,
            FilterKey::Galileo => &mut self.galileo,
            FilterKey::Glonass => &mut self.glonass,
            FilterKey::Unknown => &mut self.unknown,
            FilterKey::UsedInFix => &mut self.used_in_fix,
            FilterKey::NotUsedInFix => &mut self.not_used_in_fix,
        };
        *slot = value;
    }

    pub fn constellation_enabled(&self, constellation: Constellation) -> bool {
        self.get(FilterKey::for_constellation(constellation))
    }

    pub fn fix_usage_enabled(&self, used_in_fix: bool) -> bool {
        if used_in_fix {
            self.used_in_fix
        } else {
            self.not_used_in_fix
        }
    }

    /// Both dimensions must allow the satellite
    pub fn admits(&self, sat: &SatelliteObservation) -> bool {
        self.fix_usage_enabled(sat.used_in_fix) && self.constellation_enabled(sat.constellation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPreferenceStore;
    use rstest::rstest;

    #[test]
    fn test_defaults_all_on() {
        let filter = VisibilityFilter::load(&MemoryPreferenceStore::new());
        assert_eq!(filter, VisibilityFilter::default());
        assert!(FilterKey::ALL.iter().all(|key| filter.get(*key)));
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryPreferenceStore::new();
        let mut filter = VisibilityFilter::default();
        filter.set(FilterKey::Glonass, false);
        filter.set(FilterKey::NotUsedInFix, false);
        filter.save(&mut store).unwrap();

        assert!(!store.get_bool("glonassChecked", true));
        assert!(!store.get_bool("notUsedInFix", true));
        assert!(store.get_bool("gpsChecked", false));
        assert_eq!(VisibilityFilter::load(&store), filter);
    }

    #[rstest]
    #[case("gpsChecked", FilterKey::Gps)]
    #[case("UNKNOWNCHECKED", FilterKey::Unknown)]
    #[case("notUsedInFix", FilterKey::NotUsedInFix)]
    fn test_key_parsing(#[case] text: &str, #[case] expected: FilterKey) {
        assert_eq!(text.parse::<FilterKey>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!("beidouChecked".parse::<FilterKey>().is_err());
    }

    #[rstest]
    #[case(Constellation::Gps, true, true)]
    #[case(Constellation::Gps, false, false)]
    #[case(Constellation::Glonass, true, false)]
    #[case(Constellation::Other, true, true)]
    #[case(Constellation::Other, false, false)]
    fn test_admits_is_conjunction(
        #[case] constellation: Constellation,
        #[case] used: bool,
        #[case] expected: bool,
    ) {
        let mut filter = VisibilityFilter::default();
        filter.set(FilterKey::Glonass, false);
        filter.set(FilterKey::NotUsedInFix, false);

        let sat = SatelliteObservation::new(1, constellation, 0.0, 0.0).used(used);
        assert_eq!(filter.admits(&sat), expected);
    }
}
