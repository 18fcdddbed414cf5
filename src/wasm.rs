//! WebAssembly exports for histogram equalization.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Pixel Layout
//!
//! Images cross the boundary as packed RGB bytes (length = width * height * 3).
//! Canvas `ImageData` is RGBA; use [`equalize_rgba_wasm`] for it, which
//! equalizes the color channels and copies alpha through unchanged.

use wasm_bindgen::prelude::*;

use crate::equalize::{Equalizer, EqualizerConfig, PixelBuffer, Strategy, CHANNELS};

fn to_js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn equalize_packed(
    rgb: &[u8],
    width: u32,
    height: u32,
    strategy: &str,
    workers: u32,
) -> Result<Vec<u8>, JsValue> {
    let strategy: Strategy = strategy.parse().map_err(to_js_err)?;
    let mut config = EqualizerConfig::new(strategy);
    // 0 lets the engine pick
    if workers > 0 {
        config = config.with_workers(workers);
    }

    let input = PixelBuffer::from_interleaved(width, height, rgb).map_err(to_js_err)?;
    let output = Equalizer::new(config)
        .and_then(|equalizer| equalizer.equalize(&input))
        .map_err(to_js_err)?;
    Ok(output.to_interleaved())
}

// ============================================================================
// RGB
// ============================================================================

/// Equalize a packed RGB u8 image.
///
/// # Arguments
/// * `data` - Flat array of RGB bytes (length = width * height * 3)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `strategy` - sequential, channel-parallel, spatial-shared or spatial-local
/// * `workers` - Row partitions for the spatial strategies, 0 for automatic
///
/// # Returns
/// Flat array of equalized RGB bytes
#[wasm_bindgen]
pub fn equalize_rgb_wasm(
    data: &[u8],
    width: u32,
    height: u32,
    strategy: &str,
    workers: u32,
) -> Result<Vec<u8>, JsValue> {
    equalize_packed(data, width, height, strategy, workers)
}

// ============================================================================
// RGBA
// ============================================================================

/// Equalize the color channels of a packed RGBA u8 image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `strategy` - sequential, channel-parallel, spatial-shared or spatial-local
/// * `workers` - Row partitions for the spatial strategies, 0 for automatic
///
/// # Returns
/// Flat array of RGBA bytes, alpha preserved
#[wasm_bindgen]
pub fn equalize_rgba_wasm(
    data: &[u8],
    width: u32,
    height: u32,
    strategy: &str,
    workers: u32,
) -> Result<Vec<u8>, JsValue> {
    if data.len() % 4 != 0 {
        return Err(JsValue::from_str("RGBA data length must be a multiple of 4"));
    }

    let rgb: Vec<u8> = data
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let equalized = equalize_packed(&rgb, width, height, strategy, workers)?;

    let mut result = data.to_vec();
    for (dst, src) in result.chunks_exact_mut(4).zip(equalized.chunks_exact(CHANNELS)) {
        dst[..CHANNELS].copy_from_slice(src);
    }
    Ok(result)
}
