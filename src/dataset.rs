use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::{debug, info};
use polars::prelude::*;
use smartcore::linalg::basic::arrays::MutArray;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{DonorError, Result};
use crate::records::TrainingExample;

lazy_static! {
    static ref BUILTIN_EXAMPLES: Vec<TrainingExample> = vec![
        TrainingExample::new(1, 1, 1, 2, 1),
        TrainingExample::new(0, 1, 0, 6, 0),
        TrainingExample::new(1, 0, 1, 1, 1),
        TrainingExample::new(0, 1, 1, 8, 0),
        TrainingExample::new(1, 0, 0, 4, 0),
        TrainingExample::new(1, 1, 1, 3, 1),
        TrainingExample::new(0, 0, 1, 10, 0),
        TrainingExample::new(1, 1, 0, 2, 1),
    ];
}

/// Labeled examples the trainer fits on.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    examples: Vec<TrainingExample>,
}

impl TrainingSet {
    pub fn new(examples: Vec<TrainingExample>) -> Self {
        Self { examples }
    }

    /// The fixed eight-row donor response dataset.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_EXAMPLES.clone())
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub async fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let df = read_csv(path.as_ref()).await?;
        Self::from_frame(&df)
    }

    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut columns: Vec<Vec<i32>> = Vec::with_capacity(5);
        for name in TrainingExample::FEATURE_COLUMNS
            .iter()
            .chain(std::iter::once(&TrainingExample::TARGET_COLUMN))
        {
            columns.push(int_column(df, name)?);
        }

        let mut examples = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let flag = |col: usize| -> Result<u8> {
                match columns[col][row] {
                    0 => Ok(0),
                    1 => Ok(1),
                    other => Err(DonorError::Dataset {
                        reason: format!(
                            "row {}: {} must be 0 or 1, got {}",
                            row, column_name(col), other
                        ),
                    }),
                }
            };
            let months = u32::try_from(columns[3][row]).map_err(|_| DonorError::Dataset {
                reason: format!("row {}: negative months since last donation", row),
            })?;
            examples.push(TrainingExample::new(flag(0)?, flag(1)?, flag(2)?, months, flag(4)?));
        }

        info!("Loaded {} training examples", examples.len());
        Ok(Self::new(examples))
    }

    /// Feature matrix in `FEATURE_COLUMNS` order, one row per example.
    pub fn feature_matrix(&self) -> DenseMatrix<f64> {
        let nrows = self.examples.len();
        let ncols = TrainingExample::FEATURE_COLUMNS.len();
        let mut xmatrix: DenseMatrix<f64> =
            DenseMatrix::new(nrows, ncols, vec![0.0; nrows * ncols], false);
        for (row, example) in self.examples.iter().enumerate() {
            for (col, val) in example.features().iter().enumerate() {
                xmatrix.set((row, col), *val);
            }
        }
        xmatrix
    }

    pub fn labels(&self) -> Vec<i32> {
        self.examples
            .iter()
            .map(|e| i32::from(e.responded_previously))
            .collect()
    }
}

fn column_name(col: usize) -> &'static str {
    TrainingExample::FEATURE_COLUMNS
        .get(col)
        .copied()
        .unwrap_or(TrainingExample::TARGET_COLUMN)
}

fn int_column(df: &DataFrame, name: &str) -> Result<Vec<i32>> {
    let series = df.column(name).map_err(|_| DonorError::Dataset {
        reason: format!("missing column {:?}", name),
    })?;
    if series.null_count() > 0 {
        return Err(DonorError::Dataset {
            reason: format!("column {:?} has {} empty values", name, series.null_count()),
        });
    }
    Ok(series.i32()?.into_no_null_iter().collect())
}

pub async fn read_csv(path: &Path) -> Result<DataFrame> {
    debug!("Reading training data from {:?}", path);
    let file = File::open(path)?;

    Ok(CsvReader::new(file)
        .has_header(true)
        .with_dtypes(Some(Arc::new(TrainingExample::raw_schema())))
        .finish()?)
}
