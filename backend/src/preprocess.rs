//! Turns an uploaded image into the NHWC tensor both classifiers expect.

use image::imageops::{self, FilterType};
use thiserror::Error;
use tract_onnx::prelude::tract_ndarray::Array4;

/// Square side length of the model input.
pub const INPUT_SIZE: u32 = 192;
pub const INPUT_CHANNELS: usize = 3;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("uploaded image is empty")]
    Empty,
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decodes `bytes`, forces RGB, stretches to 192x192 and scales to `[0, 1]`.
///
/// The result has shape `[1, 192, 192, 3]`.
pub fn preprocess_image(bytes: &[u8]) -> Result<Array4<f32>, PreprocessError> {
    if bytes.is_empty() {
        return Err(PreprocessError::Empty);
    }

    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    // Aspect ratio is not preserved.
    let resized = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let side = INPUT_SIZE as usize;
    Ok(Array4::from_shape_fn(
        (1, side, side, INPUT_CHANNELS),
        |(_, y, x, c)| resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
    ))
}
