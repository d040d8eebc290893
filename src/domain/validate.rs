//! Small, composable field validators applied before persistence. Each
//! checks one constraint and reports the offending field by name.

use crate::error::Error;

pub fn non_empty(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

pub fn length_between(field: &str, value: &str, min: usize, max: usize) -> Result<(), Error> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Error::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

pub fn in_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), Error> {
    if !(min..=max).contains(&value) {
        return Err(Error::Validation(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

pub fn positive(field: &str, value: f64) -> Result<(), Error> {
    if !(value > 0.0) {
        return Err(Error::Validation(format!("{field} must be positive")));
    }
    Ok(())
}

/// Discount-style check: `value` must stay strictly below `bound`.
pub fn below(field: &str, value: f64, bound_field: &str, bound: f64) -> Result<(), Error> {
    if value >= bound {
        return Err(Error::Validation(format!(
            "{field} ({value}) must be below {bound_field} ({bound})"
        )));
    }
    Ok(())
}

/// Minimal shape check; full address validation is the mail system's job.
pub fn email(field: &str, value: &str) -> Result<(), Error> {
    let ok = value
        .split_once('@')
        .is_some_and(|(local, host)| !local.is_empty() && host.contains('.') && !host.ends_with('.'));
    if !ok {
        return Err(Error::Validation(format!("{field} must be a valid email")));
    }
    Ok(())
}
