pub mod error;
pub mod loader;
pub mod pipeline;
pub mod table;

pub use error::{InferenceError, LoadError};
pub use loader::{ModelCache, SharedClassifier, load_artifact};
pub use pipeline::{Feature, LogisticPipeline};
pub use table::{Table, Value};

/// A fitted binary classifier over a [`Table`].
///
/// Both operations return one output per input row. Implementations must be
/// read-only so a single instance can serve concurrent requests.
pub trait Classifier: Send + Sync {
    /// Class label per row: `1` survived, `0` did not.
    fn predict(&self, table: &Table) -> Result<Vec<u8>, InferenceError>;

    /// `[P(class 0), P(class 1)]` per row.
    fn predict_proba(&self, table: &Table) -> Result<Vec<[f64; 2]>, InferenceError>;
}
