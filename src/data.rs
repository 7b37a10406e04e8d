//! The experimental clone-size dataset: basal-cell counts per clone, one
//! column per time point per condition, loaded from the CSV export of the
//! clonal counting spreadsheet.
use crate::CloneSize;
use anyhow::{bail, ensure, Context};
use clap::ValueEnum;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Rows of the spreadsheet export occupied by headers.
const HEADER_ROWS: usize = 8;

/// The experimental condition to fit against. Each condition maps to a fixed
/// column set and a fixed list of time points (days post induction) in the
/// clonal counting dataset.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Wild-type
    Wt,
    /// NOTCH1 heterozygous
    Het,
    /// NOTCH1 homozygous
    Hom,
    /// Heterozygous control
    #[value(name = "het_ctl")]
    HetCtl,
    /// Homozygous control
    #[value(name = "hom_ctl")]
    HomCtl,
}

impl Condition {
    pub fn timepoints(&self) -> &'static [f32] {
        match self {
            Condition::Wt => &[10., 14., 28., 63., 91.],
            Condition::Het | Condition::HetCtl => &[10., 28., 63., 91.],
            Condition::Hom | Condition::HomCtl => &[10., 14., 28.],
        }
    }

    fn columns(&self) -> &'static [usize] {
        //! Zero-based column indices of the spreadsheet export: C,E,G,I,K for
        //! wt, M,O,Q,S for het, U,W,Y,AA for het_ctl, AC,AE,AG for hom and
        //! AI,AK,AM for hom_ctl.
        match self {
            Condition::Wt => &[2, 4, 6, 8, 10],
            Condition::Het => &[12, 14, 16, 18],
            Condition::HetCtl => &[20, 22, 24, 26],
            Condition::Hom => &[28, 30, 32],
            Condition::HomCtl => &[34, 36, 38],
        }
    }

    pub fn history_path(&self, dir: &Path) -> PathBuf {
        //! Path of the sampling-history file for this condition.
        dir.join(format!("{}_abc", self)).with_extension("csv")
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

/// The target dataset: an ordered mapping from time point to the positive
/// clone-size observations measured at that time. Constructed once per
/// fitting session and read-only afterwards.
#[derive(Clone, Debug)]
pub struct TargetData(Vec<(f32, Vec<CloneSize>)>);

impl TargetData {
    pub fn new(points: Vec<(f32, Vec<CloneSize>)>) -> anyhow::Result<Self> {
        //! Validate the dataset invariants: time points ascending and unique,
        //! at least one observation per time point.
        ensure!(!points.is_empty(), "the dataset has no time points");
        for window in points.windows(2) {
            ensure!(
                window[0].0 < window[1].0,
                "time points must be ascending and unique, found {} before {}",
                window[0].0,
                window[1].0
            );
        }
        for (time, observations) in points.iter() {
            ensure!(
                !observations.is_empty(),
                "no clone-size observations at time point {}",
                time
            );
        }
        Ok(TargetData(points))
    }

    pub fn load(path: &Path, condition: Condition) -> anyhow::Result<Self> {
        let file = fs::File::open(path).with_context(|| {
            format!("Cannot open the clonal counting dataset {:#?}", path)
        })?;
        TargetData::from_reader(file, condition).with_context(|| {
            format!("Cannot load condition {} from {:#?}", condition, path)
        })
    }

    pub fn from_reader<R: io::Read>(
        reader: R,
        condition: Condition,
    ) -> anyhow::Result<Self> {
        //! Read the columns of `condition` from the rectangular CSV export,
        //! skipping the header rows and dropping non-positive and missing
        //! cells per column.
        let columns = condition.columns();
        let mut pools: Vec<Vec<CloneSize>> =
            vec![Vec::new(); columns.len()];

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        for record in rdr.records().skip(HEADER_ROWS) {
            let record = record?;
            for (pool, &column) in pools.iter_mut().zip(columns) {
                let cell = match record.get(column) {
                    Some(cell) => cell.trim(),
                    None => continue,
                };
                if cell.is_empty() {
                    continue;
                }
                let value: f64 = match cell.parse() {
                    Ok(value) => value,
                    Err(_) => bail!("Cannot parse cell {:?} as a count", cell),
                };
                if value.is_finite() && value > 0f64 {
                    pool.push(value as CloneSize);
                }
            }
        }

        TargetData::new(
            condition
                .timepoints()
                .iter()
                .copied()
                .zip(pools.into_iter())
                .collect(),
        )
    }

    pub fn times(&self) -> Vec<f32> {
        self.0.iter().map(|(time, _)| *time).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (f32, Vec<CloneSize>)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<(usize, &str)>>) -> String {
        //! Rectangular 40-column CSV with 8 header rows, filling the given
        //! (column, cell) pairs per data row.
        let blank = vec![String::from(",").repeat(39); HEADER_ROWS].join("\n");
        let mut out = blank;
        for cells in rows {
            let mut fields = vec![String::new(); 40];
            for (column, cell) in cells {
                fields[column] = cell.to_string();
            }
            out.push('\n');
            out.push_str(&fields.join(","));
        }
        out
    }

    #[test]
    fn load_hom_drops_missing_and_non_positive_cells() {
        let csv = table(vec![
            vec![(28, "12"), (30, "3"), (32, "7")],
            vec![(28, "0"), (30, "-2"), (32, "1")],
            vec![(28, "5"), (32, "2")],
        ]);
        let data =
            TargetData::from_reader(csv.as_bytes(), Condition::Hom).unwrap();
        assert_eq!(data.times(), vec![10., 14., 28.]);
        let observations: Vec<&Vec<CloneSize>> =
            data.iter().map(|(_, obs)| obs).collect();
        assert_eq!(observations[0], &vec![12, 5]);
        assert_eq!(observations[1], &vec![3]);
        assert_eq!(observations[2], &vec![7, 1, 2]);
    }

    #[test]
    fn load_fails_on_empty_column() {
        let csv = table(vec![vec![(28, "12"), (30, "3")]]);
        assert!(
            TargetData::from_reader(csv.as_bytes(), Condition::Hom).is_err()
        );
    }

    #[test]
    fn load_skips_header_rows() {
        // a single data row below the 8 header rows
        let csv = table(vec![vec![(28, "4"), (30, "4"), (32, "4")]]);
        let data =
            TargetData::from_reader(csv.as_bytes(), Condition::Hom).unwrap();
        assert!(data.iter().all(|(_, obs)| obs == &vec![4]));
    }

    #[test]
    fn new_rejects_unordered_timepoints() {
        assert!(TargetData::new(vec![
            (14., vec![1]),
            (10., vec![1]),
        ])
        .is_err());
    }

    #[test]
    fn new_rejects_empty_timepoint() {
        assert!(TargetData::new(vec![(10., vec![])]).is_err());
    }

    #[test]
    fn history_path_derives_from_condition() {
        let path = Condition::HetCtl.history_path(Path::new("results"));
        assert_eq!(path, PathBuf::from("results/het_ctl_abc.csv"));
    }
}
