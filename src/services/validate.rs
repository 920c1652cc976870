use crate::error::AppError;

/// Require a numeric field to be present and finite.
pub fn required_amount(value: Option<f64>, field: &str) -> Result<f64, AppError> {
    let v = value.ok_or_else(|| AppError::validation(format!("{field} is required")))?;
    if !v.is_finite() {
        return Err(AppError::validation(format!("Invalid {field} value")));
    }
    Ok(v)
}

/// Require a numeric field to be present, finite and strictly positive.
pub fn positive_amount(value: Option<f64>, field: &str) -> Result<f64, AppError> {
    let v = required_amount(value, field)?;
    if v <= 0.0 {
        return Err(AppError::validation(format!("{field} must be greater than zero")));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_amount_rejects_missing() {
        assert!(required_amount(None, "amount").is_err());
        assert!(required_amount(Some(f64::NAN), "amount").is_err());
        assert_eq!(required_amount(Some(0.0), "amount").unwrap(), 0.0);
    }

    #[test]
    fn positive_amount_rejects_zero_and_negative() {
        assert!(positive_amount(Some(0.0), "amount").is_err());
        assert!(positive_amount(Some(-5.0), "amount").is_err());
        assert_eq!(positive_amount(Some(12.5), "amount").unwrap(), 12.5);
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = required_amount(None, "closing_cash").unwrap_err();
        match err {
            AppError::ValidationError(msg) => assert!(msg.contains("closing_cash")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
