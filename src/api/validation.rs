use super::ApiError;
use crate::models::Coordinates;

const MAX_NAME_LEN: usize = 200;

/// Trimmed, non-empty value or a 400 carrying `message`.
pub fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ApiError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::validation(message)),
    }
}

pub fn validate_place_name<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ApiError> {
    let name = required(value, message)?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::validation(format!(
            "Name must be {} characters or less",
            MAX_NAME_LEN
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(ApiError::validation("Name cannot contain control characters"));
    }
    Ok(name)
}

pub fn parse_coordinates(lat: Option<&str>, lng: Option<&str>) -> Result<Coordinates, ApiError> {
    const MISSING: &str = "lat & lng required";

    let lat = required(lat, MISSING)?;
    let lng = required(lng, MISSING)?;

    let (Ok(lat), Ok(lng)) = (lat.parse::<f64>(), lng.parse::<f64>()) else {
        return Err(ApiError::validation("lat & lng must be numbers"));
    };

    Coordinates::new(lat, lng).ok_or_else(|| {
        ApiError::validation("lat must be within [-90, 90] and lng within [-180, 180]")
    })
}

/// Optional camera altitude; when present it must be a finite, non-negative number.
pub fn parse_altitude(altitude: Option<&str>) -> Result<Option<f64>, ApiError> {
    let Some(raw) = altitude.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<f64>() {
        Ok(alt) if alt.is_finite() && alt >= 0.0 => Ok(Some(alt)),
        _ => Err(ApiError::validation(
            "altitude must be a non-negative number",
        )),
    }
}
