use crate::core::models::configuration::ChargeDistribution;
use crate::core::models::layout::{LayoutError, SiteCoord, SiteLayout};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutLoadError {
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid layout in '{path}': {source}")]
    Layout { path: String, source: LayoutError },
}

/// Reads a layout from a CSV file with an `x,y,z` header, one site per record.
///
/// Site indices follow record order.
pub fn read_layout_csv(path: &Path) -> Result<SiteLayout, LayoutLoadError> {
    let csv_err = |e: csv::Error| LayoutLoadError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let mut layout = SiteLayout::new();
    for result in reader.deserialize::<SiteCoord>() {
        let site = result.map_err(csv_err)?;
        layout
            .add_site(site)
            .map_err(|e| LayoutLoadError::Layout {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
    }
    Ok(layout)
}

#[derive(Serialize)]
struct DistributionRecord {
    energy: f64,
    charges: String,
}

/// Writes distributions as `energy,charges` records, charges given as a `-0+` string.
pub fn write_distributions_csv(
    path: &Path,
    distributions: &[ChargeDistribution],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for d in distributions {
        writer.serialize(DistributionRecord {
            energy: d.system_energy,
            charges: d.configuration.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::configuration::ChargeConfiguration;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn read_layout_csv_preserves_record_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.csv");
        fs::write(&path, "x,y,z\n4, 0, 1\n0,0,0\n-2,3,0\n").unwrap();

        let layout = read_layout_csv(&path).unwrap();
        assert_eq!(
            layout.sites(),
            &[
                SiteCoord::new(4, 0, 1),
                SiteCoord::new(0, 0, 0),
                SiteCoord::new(-2, 3, 0)
            ]
        );
    }

    #[test]
    fn read_layout_csv_rejects_duplicates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.csv");
        fs::write(&path, "x,y,z\n1,1,0\n1,1,0\n").unwrap();

        assert!(matches!(
            read_layout_csv(&path),
            Err(LayoutLoadError::Layout {
                source: LayoutError::DuplicateSite(_),
                ..
            })
        ));
    }

    #[test]
    fn read_layout_csv_reports_malformed_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.csv");
        fs::write(&path, "x,y,z\n1,a,0\n").unwrap();
        assert!(matches!(
            read_layout_csv(&path),
            Err(LayoutLoadError::Csv { .. })
        ));
    }

    #[test]
    fn write_distributions_csv_emits_header_and_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let distributions = vec![ChargeDistribution {
            configuration: ChargeConfiguration::parse("-0-").unwrap(),
            system_energy: 0.25,
        }];

        write_distributions_csv(&path, &distributions).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "energy,charges\n0.25,-0-\n");
    }
}
