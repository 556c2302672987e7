use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// DashboardError – everything the data pipeline can report to the UI
// ---------------------------------------------------------------------------

/// Errors produced while loading listings or evaluating a view.
///
/// Load errors (`SourceNotFound`, `EmptyDataset`, `MissingColumns`, `Csv`,
/// `Io`) leave the session without data. Interaction errors
/// (`EmptySelection`, `NoMatchingRows`, `NoModelYears`, `InvalidBins`) only
/// affect the current view and clear once the user changes a widget.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("data file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("data file {} contains no rows", path.display())]
    EmptyDataset { path: PathBuf },

    #[error("data file {} is missing required columns: {}", path.display(), columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("failed to parse {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("select at least one {dimension}")]
    EmptySelection { dimension: &'static str },

    #[error("no listings match the current filters")]
    NoMatchingRows,

    #[error("the dataset has no model years")]
    NoModelYears,

    #[error("histogram needs at least one bin")]
    InvalidBins,
}

impl DashboardError {
    /// Whether the error leaves the session without a usable dataset.
    pub fn is_terminal_for_session(&self) -> bool {
        matches!(
            self,
            DashboardError::SourceNotFound { .. }
                | DashboardError::EmptyDataset { .. }
                | DashboardError::MissingColumns { .. }
                | DashboardError::Csv { .. }
                | DashboardError::Io(_)
        )
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
