// src/chart.rs
//! Signal strength bar chart data

use crate::gnss::SatelliteObservation;

pub const CHART_LABEL: &str = "Satellite SNR";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalBar {
    pub index: usize,
    pub satellite_id: u32,
    pub cn0_db_hz: f32,
}

/// One bar per observation, in snapshot order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalChart {
    bars: Vec<SignalBar>,
}

impl SignalChart {
    pub fn from_observations(observations: &[SatelliteObservation]) -> Self {
        let bars = observations
            .iter()
            .enumerate()
            .map(|(index, sat)| SignalBar {
                index,
                satellite_id: sat.id,
                cn0_db_hz: sat.signal_strength_db_hz,
            })
            .collect();
        Self { bars }
    }

    pub fn bars(&self) -> &[SignalBar] {
        &self.bars
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Largest value, used to scale the bars
    pub fn max_value(&self) -> f32 {
        self.bars.iter().map(|bar| bar.cn0_db_hz).fold(0.0, f32::max)
    }

    /// Bar heights scaled into `0..=full_height`
    pub fn scaled_heights(&self, full_height: f32) -> Vec<f32> {
        let max = self.max_value();
        self.bars
            .iter()
            .map(|bar| {
                if max > 0.0 {
                    (bar.cn0_db_hz.max(0.0) / max) * full_height
                } else {
                    0.0
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gnss::Constellation;

    #[test]
    fn test_bars_follow_snapshot_order() {
        let sats = vec![
            SatelliteObservation::new(9, Constellation::Gps, 0.0, 10.0).signal(30.0),
            SatelliteObservation::new(3, Constellation::Galileo, 0.0, 10.0).signal(45.0),
        ];
        let chart = SignalChart::from_observations(&sats);
        let pairs: Vec<_> = chart.bars().iter().map(|bar| (bar.index, bar.cn0_db_hz)).collect();
        assert_eq!(pairs, vec![(0, 30.0), (1, 45.0)]);
        assert_eq!(chart.bars()[1].satellite_id, 3);
        assert_eq!(chart.max_value(), 45.0);
    }

    #[test]
    fn test_scaled_heights() {
        let sats = vec![
            SatelliteObservation::new(1, Constellation::Gps, 0.0, 10.0).signal(20.0),
            SatelliteObservation::new(2, Constellation::Gps, 0.0, 10.0).signal(40.0),
            SatelliteObservation::new(3, Constellation::Gps, 0.0, 10.0),
        ];
        let heights = SignalChart::from_observations(&sats).scaled_heights(10.0);
        assert_eq!(heights, vec![5.0, 10.0, 0.0]);
    }

    #[test]
    fn test_empty_chart() {
        let chart = SignalChart::from_observations(&[]);
        assert!(chart.is_empty());
        assert_eq!(chart.max_value(), 0.0);
        assert!(chart.scaled_heights(10.0).is_empty());
    }
}
