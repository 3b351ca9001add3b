//! Daily goal maths.

use crate::error::ValidationError;

/// Milliliters of water per kilogram of body weight.
pub const ML_PER_KG: f64 = 33.0;

pub const MIN_WEIGHT_KG: f64 = 30.0;
pub const MAX_WEIGHT_KG: f64 = 200.0;

pub const DEFAULT_CUP_SIZE_ML: u32 = 350;

/// Cup sizes offered by the front-end. Any positive custom size is accepted as well.
pub const CUP_PRESETS_ML: [u32; 4] = [250, 350, 500, 750];

/// `round(weight_kg * 33)`. Negative or NaN weights yield 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn daily_goal_ml(weight_kg: f64) -> u32 {
    (weight_kg * ML_PER_KG).round() as u32
}

pub fn validate_weight(weight_kg: f64) -> Result<f64, ValidationError> {
    if (MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&weight_kg) {
        Ok(weight_kg)
    } else {
        Err(ValidationError::WeightOutOfRange(weight_kg))
    }
}

pub fn validate_cup_size(size_ml: u32) -> Result<u32, ValidationError> {
    if size_ml > 0 {
        Ok(size_ml)
    } else {
        Err(ValidationError::InvalidCupSize(size_ml))
    }
}
