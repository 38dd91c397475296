//! Submitted form → [`PassengerQuery`].

use std::collections::HashMap;
use thiserror::Error;

use crate::predict::{AGE_RANGE, FARE_RANGE, PCLASS_OPTIONS, PassengerQuery};

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("missing field '{0}'")]
    Missing(&'static str),

    #[error("field '{field}' is not a number: '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("field '{field}' must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

/// Parse an `application/x-www-form-urlencoded` body.
///
/// Numeric fields are range-checked here. `sex` and `embarked` are passed
/// through untouched; the model decides whether it knows them.
pub fn parse_form(body: &str) -> Result<PassengerQuery, FormError> {
    let fields: HashMap<String, String> = url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect();

    let pclass_raw = field(&fields, "pclass")?;
    let pclass = pclass_raw
        .parse::<u8>()
        .map_err(|_| FormError::NotANumber {
            field: "pclass",
            value: pclass_raw.to_string(),
        })?;
    if !PCLASS_OPTIONS.contains(&pclass) {
        return Err(FormError::OutOfRange {
            field: "pclass",
            min: f64::from(PCLASS_OPTIONS[0]),
            max: f64::from(PCLASS_OPTIONS[PCLASS_OPTIONS.len() - 1]),
        });
    }

    let age = number(&fields, "age")?;
    if !AGE_RANGE.contains(&age) {
        return Err(FormError::OutOfRange {
            field: "age",
            min: *AGE_RANGE.start(),
            max: *AGE_RANGE.end(),
        });
    }

    let fare = number(&fields, "fare")?;
    if !FARE_RANGE.contains(&fare) {
        return Err(FormError::OutOfRange {
            field: "fare",
            min: *FARE_RANGE.start(),
            max: *FARE_RANGE.end(),
        });
    }

    Ok(PassengerQuery {
        pclass,
        sex: field(&fields, "sex")?.to_string(),
        age,
        fare,
        embarked: field(&fields, "embarked")?.to_string(),
    })
}

fn field<'a>(
    fields: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str, FormError> {
    fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(FormError::Missing(name))
}

fn number(fields: &HashMap<String, String>, name: &'static str) -> Result<f64, FormError> {
    let raw = field(fields, name)?;
    raw.parse::<f64>().map_err(|_| FormError::NotANumber {
        field: name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_form() {
        let query = parse_form("pclass=1&sex=female&age=4&fare=151.55&embarked=S").unwrap();
        assert_eq!(
            query,
            PassengerQuery {
                pclass: 1,
                sex: "female".into(),
                age: 4.0,
                fare: 151.55,
                embarked: "S".into(),
            }
        );
    }

    #[test]
    fn test_missing_field() {
        assert_eq!(
            parse_form("pclass=1&sex=female&age=4&fare=10").unwrap_err(),
            FormError::Missing("embarked")
        );
        assert_eq!(
            parse_form("pclass=1&sex=&age=4&fare=10&embarked=S").unwrap_err(),
            FormError::Missing("sex")
        );
    }

    #[test]
    fn test_out_of_range_values() {
        assert!(matches!(
            parse_form("pclass=4&sex=male&age=4&fare=10&embarked=S"),
            Err(FormError::OutOfRange { field: "pclass", .. })
        ));
        assert!(matches!(
            parse_form("pclass=3&sex=male&age=100.5&fare=10&embarked=S"),
            Err(FormError::OutOfRange { field: "age", .. })
        ));
        assert!(matches!(
            parse_form("pclass=3&sex=male&age=20&fare=-1&embarked=S"),
            Err(FormError::OutOfRange { field: "fare", .. })
        ));
        assert!(matches!(
            parse_form("pclass=3&sex=male&age=NaN&fare=1&embarked=S"),
            Err(FormError::OutOfRange { field: "age", .. })
        ));
    }

    #[test]
    fn test_not_a_number() {
        assert_eq!(
            parse_form("pclass=1&sex=male&age=old&fare=1&embarked=S").unwrap_err(),
            FormError::NotANumber {
                field: "age",
                value: "old".into()
            }
        );
    }

    #[test]
    fn test_categoricals_pass_through() {
        let query = parse_form("pclass=2&sex=male&age=0&fare=600&embarked=X").unwrap();
        assert_eq!(query.embarked, "X");
        assert_eq!(query.age, 0.0);
        assert_eq!(query.fare, 600.0);
    }

    #[test]
    fn test_percent_decoding() {
        let query = parse_form("pclass=2&sex=fe%6Dale&age=1&fare=1&embarked=%3Cb%3E").unwrap();
        assert_eq!(query.sex, "female");
        assert_eq!(query.embarked, "<b>");
    }
}
