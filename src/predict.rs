//! Maps one passenger query onto the classifier and back.

use log::debug;
use std::ops::RangeInclusive;

use crate::model::{Classifier, InferenceError, Table, Value};

/// Column names and order the artifact was fit against.
pub const COLUMNS: [&str; 5] = ["Pclass", "Sex", "Age", "Fare", "Embarked"];

pub const PCLASS_OPTIONS: [u8; 3] = [1, 2, 3];
pub const SEX_OPTIONS: [&str; 2] = ["male", "female"];
pub const AGE_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const FARE_RANGE: RangeInclusive<f64> = 0.0..=600.0;
/// Embarkation code and port name.
pub const PORTS: [(&str, &str); 3] = [
    ("S", "Southampton"),
    ("C", "Cherbourg"),
    ("Q", "Queenstown"),
];

/// Five passenger attributes for a single prediction.
///
/// Numeric ranges are enforced where the query is collected; categorical
/// values are passed through as-is and checked by the artifact's encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerQuery {
    pub pclass: u8,
    pub sex: String,
    pub age: f64,
    pub fare: f64,
    pub embarked: String,
}

impl PassengerQuery {
    /// Single-row table in [`COLUMNS`] order.
    pub fn to_table(&self) -> Table {
        Table::from_record(COLUMNS, self.row())
    }

    fn row(&self) -> [Value; 5] {
        [
            Value::Int(i64::from(self.pclass)),
            Value::Str(self.sex.clone()),
            Value::Float(self.age),
            Value::Float(self.fare),
            Value::Str(self.embarked.clone()),
        ]
    }

    /// `(column, value)` pairs for displaying the submitted record.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        COLUMNS
            .iter()
            .copied()
            .zip(self.row().iter().map(ToString::to_string))
            .collect()
    }
}

/// Label and probability pair for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: u8,
    /// `[P(did not survive), P(survived)]`
    pub probabilities: [f64; 2],
}

impl Prediction {
    pub fn survived(&self) -> bool {
        self.label == 1
    }

    pub fn survival_probability(&self) -> f64 {
        self.probabilities[1]
    }

    pub fn non_survival_probability(&self) -> f64 {
        self.probabilities[0]
    }

    pub fn verdict(&self) -> &'static str {
        if self.survived() {
            "SURVIVED"
        } else {
            "DID NOT SURVIVE"
        }
    }

    pub fn survival_percent(&self) -> String {
        format_percent(self.survival_probability())
    }

    pub fn non_survival_percent(&self) -> String {
        format_percent(self.non_survival_probability())
    }
}

fn format_percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// Score `query` with `model`. Either both the label and the probabilities
/// are produced, or an error is returned.
pub fn predict(
    model: &dyn Classifier,
    query: &PassengerQuery,
) -> Result<Prediction, InferenceError> {
    let table = query.to_table();
    let labels = model.predict(&table)?;
    let probabilities = model.predict_proba(&table)?;

    let (Some(&label), Some(&probabilities)) = (labels.first(), probabilities.first()) else {
        return Err(InferenceError::EmptyOutput {
            labels: labels.len(),
            probabilities: probabilities.len(),
        });
    };

    debug!("prediction for {query:?}: label {label}, probabilities {probabilities:?}");
    Ok(Prediction {
        label,
        probabilities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> PassengerQuery {
        PassengerQuery {
            pclass: 1,
            sex: "female".into(),
            age: 4.0,
            fare: 151.55,
            embarked: "S".into(),
        }
    }

    struct Fixed(u8, [f64; 2]);

    impl Classifier for Fixed {
        fn predict(&self, _: &Table) -> Result<Vec<u8>, InferenceError> {
            Ok(vec![self.0])
        }

        fn predict_proba(&self, _: &Table) -> Result<Vec<[f64; 2]>, InferenceError> {
            Ok(vec![self.1])
        }
    }

    struct Empty;

    impl Classifier for Empty {
        fn predict(&self, _: &Table) -> Result<Vec<u8>, InferenceError> {
            Ok(vec![])
        }

        fn predict_proba(&self, _: &Table) -> Result<Vec<[f64; 2]>, InferenceError> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_table_has_exact_column_order() {
        let table = query().to_table();
        assert_eq!(table.columns(), COLUMNS.map(String::from).as_slice());
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows()[0],
            vec![
                Value::Int(1),
                Value::Str("female".into()),
                Value::Float(4.0),
                Value::Float(151.55),
                Value::Str("S".into()),
            ]
        );
    }

    #[test]
    fn test_summary_pairs() {
        let summary = query().summary();
        assert_eq!(summary[0], ("Pclass", "1".to_string()));
        assert_eq!(summary[3], ("Fare", "151.55".to_string()));
        assert_eq!(summary[4], ("Embarked", "S".to_string()));
    }

    #[test]
    fn test_formatting() {
        let prediction = predict(&Fixed(1, [0.0451, 0.9549]), &query()).unwrap();
        assert_eq!(prediction.verdict(), "SURVIVED");
        assert_eq!(prediction.survival_percent(), "95.5%");
        assert_eq!(prediction.non_survival_percent(), "4.5%");

        let prediction = predict(&Fixed(0, [0.9, 0.1]), &query()).unwrap();
        assert_eq!(prediction.verdict(), "DID NOT SURVIVE");
        assert!(!prediction.survived());
    }

    #[test]
    fn test_empty_model_output_is_an_error() {
        let err = predict(&Empty, &query()).unwrap_err();
        assert_eq!(
            err,
            InferenceError::EmptyOutput {
                labels: 0,
                probabilities: 0
            }
        );
        assert_eq!(
            err.to_string(),
            "model returned 0 labels and 0 probability rows for one input row"
        );
    }
}
