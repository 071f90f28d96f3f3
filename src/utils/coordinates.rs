use crate::error::{CollectorError, Result};
use crate::utils::constants::COORDINATE_PRECISION;

/// Parse a coordinate delivered as text (Nominatim returns `"23.8103"`).
pub fn parse_coordinate(raw: &str) -> Result<f64> {
    let value = raw.trim().parse::<f64>().map_err(|_| {
        CollectorError::InvalidResponse(format!("Invalid coordinate value: '{}'", raw))
    })?;

    if !value.is_finite() {
        return Err(CollectorError::InvalidResponse(format!(
            "Non-finite coordinate value: '{}'",
            raw
        )));
    }

    Ok(value)
}

/// Round to the precision kept in output rows (6 decimal places, ~0.1 m).
pub fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(COORDINATE_PRECISION);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert!((parse_coordinate("23.8103").unwrap() - 23.8103).abs() < 1e-9);
        assert!((parse_coordinate(" 90.4125 ").unwrap() - 90.4125).abs() < 1e-9);
        assert!(parse_coordinate("north").is_err());
        assert!(parse_coordinate("NaN").is_err());
    }

    #[test]
    fn test_round_coordinate() {
        assert_eq!(round_coordinate(23.81033349), 23.810333);
        assert_eq!(round_coordinate(-0.12345678), -0.123457);
        assert_eq!(round_coordinate(90.0), 90.0);
    }
}
