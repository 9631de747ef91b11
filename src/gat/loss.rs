//! Losses over `(batch_size, num_tasks)` predictions where only entries with
//! a set mask bit contribute. Both return the mean over contributing
//! entries, or zero when the mask is empty.

use super::error::Error;
use ndarray::{ArrayView2, Zip};

fn check_shapes(
    predictions: &ArrayView2<'_, f32>,
    labels: &ArrayView2<'_, f32>,
    mask: &ArrayView2<'_, bool>,
) -> Result<(), Error> {
    if labels.dim() != predictions.dim() {
        return Err(Error::dimension("label entries", predictions.len(), labels.len()));
    }
    if mask.dim() != predictions.dim() {
        return Err(Error::dimension("mask entries", predictions.len(), mask.len()));
    }
    Ok(())
}

fn masked_mean(
    predictions: ArrayView2<'_, f32>,
    labels: ArrayView2<'_, f32>,
    mask: ArrayView2<'_, bool>,
    term: impl Fn(f32, f32) -> f32,
) -> Result<f32, Error> {
    check_shapes(&predictions, &labels, &mask)?;
    let (total, count) = Zip::from(&predictions)
        .and(&labels)
        .and(&mask)
        .fold((0.0f32, 0usize), |(total, count), &p, &y, &m| {
            if m { (total + term(p, y), count + 1) } else { (total, count) }
        });
    Ok(if count == 0 { 0.0 } else { total / count as f32 })
}

/// Mean squared error.
///
/// # Errors
///
/// [`Error::DimensionMismatch`] if the three arrays differ in shape.
pub fn masked_mse(
    predictions: ArrayView2<'_, f32>,
    labels: ArrayView2<'_, f32>,
    mask: ArrayView2<'_, bool>,
) -> Result<f32, Error> {
    masked_mean(predictions, labels, mask, |p, y| (p - y).powi(2))
}

/// Binary cross-entropy on raw logits, computed as
/// `max(x, 0) - x·y + ln(1 + exp(-|x|))`.
///
/// # Errors
///
/// [`Error::DimensionMismatch`] if the three arrays differ in shape.
pub fn masked_bce_with_logits(
    logits: ArrayView2<'_, f32>,
    labels: ArrayView2<'_, f32>,
    mask: ArrayView2<'_, bool>,
) -> Result<f32, Error> {
    masked_mean(logits, labels, mask, |x, y| x.max(0.0) - x * y + (-x.abs()).exp().ln_1p())
}
