//! Energy-mix aggregation: merges per-source utilizations into per-timestamp
//! volume and percentage breakdowns.

use std::{
    collections::BTreeMap,
    ops::{Index, IndexMut},
};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{
    api::ned::{Utilization, UtilizationSource},
    core::{source_type::SourceType, window::Window},
    prelude::*,
};

/// Per-source values of a single timestamp bucket.
///
/// Every source type is always present, zero until observed, so the emitted
/// records are never sparse.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PerSource([f64; SourceType::COUNT]);

impl Index<SourceType> for PerSource {
    type Output = f64;

    fn index(&self, source_type: SourceType) -> &Self::Output {
        &self.0[source_type as usize]
    }
}

impl IndexMut<SourceType> for PerSource {
    fn index_mut(&mut self, source_type: SourceType) -> &mut Self::Output {
        &mut self.0[source_type as usize]
    }
}

impl PerSource {
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn green(&self) -> f64 {
        SourceType::ALL
            .into_iter()
            .filter(|source_type| source_type.is_green())
            .map(|source_type| self[source_type])
            .sum()
    }
}

/// Fully-populated energy mix at a single timestamp, immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyMixRecord {
    pub timestamp: String,
    pub volumes: PerSource,
    pub percentages: PerSource,
    pub total_volume: f64,

    /// Share of solar plus onshore and offshore wind.
    pub green_percentage: f64,

    pub solar_percentage: f64,

    /// Share of onshore and offshore wind combined.
    pub wind_percentage: f64,
}

impl EnergyMixRecord {
    /// Derive the totals and percentages from a bucket's volumes.
    ///
    /// Percentages are exactly 0 when the total volume is 0.
    #[must_use]
    pub fn new(timestamp: String, volumes: PerSource) -> Self {
        let total_volume = volumes.total();
        let share =
            |volume: f64| if total_volume > 0.0 { volume / total_volume * 100.0 } else { 0.0 };
        let mut percentages = PerSource::default();
        for source_type in SourceType::ALL {
            percentages[source_type] = share(volumes[source_type]);
        }
        Self {
            green_percentage: share(volumes.green()),
            solar_percentage: share(volumes[SourceType::Solar]),
            wind_percentage: share(
                volumes[SourceType::Wind] + volumes[SourceType::WindOffshore],
            ),
            timestamp,
            volumes,
            percentages,
            total_volume,
        }
    }
}

impl Serialize for EnergyMixRecord {
    /// Flat attribute surface: `{source}_volume` and `{source}_percentage` per
    /// source type, plus the totals and derived shares.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 * SourceType::COUNT + 5))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        for source_type in SourceType::ALL {
            map.serialize_entry(&format!("{source_type}_volume"), &self.volumes[source_type])?;
            map.serialize_entry(
                &format!("{source_type}_percentage"),
                &self.percentages[source_type],
            )?;
        }
        map.serialize_entry("total_volume", &self.total_volume)?;
        map.serialize_entry("green_percentage", &self.green_percentage)?;
        map.serialize_entry("solar_percentage", &self.solar_percentage)?;
        map.serialize_entry("wind_percentage", &self.wind_percentage)?;
        map.end()
    }
}

/// Fetch and merge the utilizations of all source types over the window.
///
/// A failed per-type fetch is logged and degrades to a zero contribution for
/// that source type only, so one source's outage never fails the whole
/// computation. An empty result means «no data», not an error: the caller is
/// expected to keep whatever it published last.
#[instrument(skip_all, fields(window = %window))]
pub async fn compute_energy_mix(
    source: &impl UtilizationSource,
    window: Window,
) -> Vec<EnergyMixRecord> {
    let mut buckets: BTreeMap<String, PerSource> = BTreeMap::new();
    for source_type in SourceType::ALL {
        let utilizations = match source.get_utilizations(source_type, window).await {
            Ok(utilizations) => utilizations,
            Err(error) => {
                warn!(
                    source_type = %source_type,
                    "failed to fetch, counting the source as zero: {error:#}",
                );
                continue;
            }
        };
        for Utilization { valid_from, volume } in utilizations {
            buckets.entry(valid_from).or_default()[source_type] += volume;
        }
    }
    buckets
        .into_iter()
        .map(|(timestamp, volumes)| EnergyMixRecord::new(timestamp, volumes))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use itertools::Itertools;

    use super::*;

    struct FakeSource(HashMap<SourceType, Vec<Utilization>>);

    impl FakeSource {
        fn new(
            utilizations: impl IntoIterator<Item = (SourceType, Vec<(&'static str, f64)>)>,
        ) -> Self {
            Self(
                utilizations
                    .into_iter()
                    .map(|(source_type, observations)| {
                        let observations: Vec<Utilization> = observations
                            .into_iter()
                            .map(|(valid_from, volume)| Utilization {
                                valid_from: valid_from.to_string(),
                                volume,
                            })
                            .collect();
                        (source_type, observations)
                    })
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl UtilizationSource for FakeSource {
        async fn get_utilizations(
            &self,
            source_type: SourceType,
            _window: Window,
        ) -> Result<Vec<Utilization>> {
            Ok(self.0.get(&source_type).cloned().unwrap_or_default())
        }
    }

    struct UnreachableSource;

    #[async_trait]
    impl UtilizationSource for UnreachableSource {
        async fn get_utilizations(
            &self,
            _source_type: SourceType,
            _window: Window,
        ) -> Result<Vec<Utilization>> {
            bail!("the provider is unreachable")
        }
    }

    /// A provider that only answers for solar, and fails for everything else.
    struct SolarOnlySource(FakeSource);

    #[async_trait]
    impl UtilizationSource for SolarOnlySource {
        async fn get_utilizations(
            &self,
            source_type: SourceType,
            window: Window,
        ) -> Result<Vec<Utilization>> {
            ensure!(source_type == SourceType::Solar, "the provider is unreachable");
            self.0.get_utilizations(source_type, window).await
        }
    }

    #[tokio::test]
    async fn solar_and_wind_share_a_timestamp() -> Result {
        let source = FakeSource::new([
            (SourceType::Solar, vec![("2024-01-01T10:00", 50.0)]),
            (SourceType::Wind, vec![("2024-01-01T10:00", 150.0)]),
        ]);
        let records = compute_energy_mix(&source, Window::today()?).await;

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.timestamp, "2024-01-01T10:00");
        assert_relative_eq!(record.volumes[SourceType::Solar], 50.0);
        assert_relative_eq!(record.volumes[SourceType::Wind], 150.0);
        assert_relative_eq!(record.total_volume, 200.0);
        assert_relative_eq!(record.solar_percentage, 25.0);
        assert_relative_eq!(record.wind_percentage, 75.0);
        assert_relative_eq!(record.green_percentage, 100.0);
        for source_type in [SourceType::Coal, SourceType::Gas, SourceType::Nuclear] {
            assert_relative_eq!(record.volumes[source_type], 0.0);
            assert_relative_eq!(record.percentages[source_type], 0.0);
        }
        Ok(())
    }

    #[tokio::test]
    async fn every_record_carries_all_source_types() -> Result {
        let source = FakeSource::new([(SourceType::Gas, vec![("2024-01-01T10:00", 42.0)])]);
        let records = compute_energy_mix(&source, Window::today()?).await;

        let record = &records[0];
        assert_relative_eq!(record.percentages[SourceType::Gas], 100.0);
        for source_type in SourceType::ALL {
            // Present (and finite) even though only gas was observed:
            assert!(record.volumes[source_type].is_finite());
            assert!(record.percentages[source_type].is_finite());
        }
        Ok(())
    }

    #[tokio::test]
    async fn percentages_sum_to_100() -> Result {
        let source = FakeSource::new([
            (SourceType::Solar, vec![("2024-01-01T10:00", 33.3)]),
            (SourceType::Gas, vec![("2024-01-01T10:00", 41.7)]),
            (SourceType::Nuclear, vec![("2024-01-01T10:00", 12.5)]),
            (SourceType::Other, vec![("2024-01-01T10:00", 7.7)]),
        ]);
        let records = compute_energy_mix(&source, Window::today()?).await;

        let record = &records[0];
        let sum: f64 =
            SourceType::ALL.into_iter().map(|source_type| record.percentages[source_type]).sum();
        assert_relative_eq!(sum, 100.0, epsilon = 1e-9);
        let total: f64 =
            SourceType::ALL.into_iter().map(|source_type| record.volumes[source_type]).sum();
        assert_relative_eq!(record.total_volume, total);
        Ok(())
    }

    #[tokio::test]
    async fn zero_total_yields_zero_percentages() -> Result {
        let source = FakeSource::new([(SourceType::Solar, vec![("2024-01-01T10:00", 0.0)])]);
        let records = compute_energy_mix(&source, Window::today()?).await;

        let record = &records[0];
        assert_relative_eq!(record.total_volume, 0.0);
        assert_relative_eq!(record.green_percentage, 0.0);
        assert_relative_eq!(record.solar_percentage, 0.0);
        assert_relative_eq!(record.wind_percentage, 0.0);
        for source_type in SourceType::ALL {
            assert_relative_eq!(record.percentages[source_type], 0.0);
        }
        Ok(())
    }

    #[tokio::test]
    async fn records_are_sorted_and_deduplicated() -> Result {
        let source = FakeSource::new([
            (
                SourceType::Solar,
                vec![("2024-01-01T12:00", 3.0), ("2024-01-01T10:00", 1.0)],
            ),
            (
                SourceType::Wind,
                vec![("2024-01-01T11:00", 2.0), ("2024-01-01T10:00", 9.0)],
            ),
        ]);
        let records = compute_energy_mix(&source, Window::today()?).await;

        let timestamps = records.iter().map(|record| record.timestamp.as_str()).collect_vec();
        assert_eq!(timestamps, ["2024-01-01T10:00", "2024-01-01T11:00", "2024-01-01T12:00"]);
        Ok(())
    }

    #[tokio::test]
    async fn merge_is_commutative() -> Result {
        let observations = [
            (
                SourceType::Solar,
                vec![
                    ("2024-01-01T10:00", 20.0),
                    ("2024-01-01T10:00", 30.0),
                    ("2024-01-01T11:00", 60.0),
                ],
            ),
            (SourceType::Wind, vec![("2024-01-01T10:00", 150.0)]),
        ];
        let mut reversed = observations.clone();
        reversed.reverse();
        for (_, observations) in &mut reversed {
            observations.reverse();
        }

        let window = Window::today()?;
        let records = compute_energy_mix(&FakeSource::new(observations), window).await;
        let records_reversed = compute_energy_mix(&FakeSource::new(reversed), window).await;
        assert_eq!(records, records_reversed);
        assert_relative_eq!(records[0].volumes[SourceType::Solar], 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn all_sources_empty_yields_no_records() -> Result {
        let records = compute_energy_mix(&FakeSource::new([]), Window::today()?).await;
        assert!(records.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_provider_yields_no_records() -> Result {
        let records = compute_energy_mix(&UnreachableSource, Window::today()?).await;
        assert!(records.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failed_sources_degrade_to_zero() -> Result {
        let source = SolarOnlySource(FakeSource::new([(
            SourceType::Solar,
            vec![("2024-01-01T10:00", 50.0)],
        )]));
        let records = compute_energy_mix(&source, Window::today()?).await;

        assert_eq!(records.len(), 1);
        assert_relative_eq!(records[0].solar_percentage, 100.0);
        assert_relative_eq!(records[0].volumes[SourceType::Wind], 0.0);
        Ok(())
    }

    #[test]
    fn record_attribute_surface() -> Result {
        let mut volumes = PerSource::default();
        volumes[SourceType::Solar] = 50.0;
        volumes[SourceType::WindOffshore] = 50.0;
        let record = EnergyMixRecord::new("2024-01-01T10:00".to_string(), volumes);

        let attributes = serde_json::to_value(&record)?;
        assert_eq!(attributes["timestamp"], "2024-01-01T10:00");
        assert_eq!(attributes["solar_volume"], 50.0);
        assert_eq!(attributes["wind_offshore_percentage"], 50.0);
        assert_eq!(attributes["coal_volume"], 0.0);
        assert_eq!(attributes["total_volume"], 100.0);
        assert_eq!(attributes["green_percentage"], 100.0);
        assert_eq!(attributes["wind_percentage"], 50.0);
        Ok(())
    }
}
