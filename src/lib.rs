//! HistEq Rust Extensions
//!
//! Parallel histogram equalization of RGB images, with Python bindings via
//! PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! All entry points work on 8-bit RGB:
//! - **RGB**: (height, width, 3) - 3 color channels, 0-255
//!
//! Internally the image is stored as three separate channel planes so that
//! concurrent writers never share a pixel.
//!
//! ## Strategies
//! Four interchangeable engines compute the same result:
//! - **sequential**: one thread, one channel after another
//! - **channel-parallel**: one worker per channel
//! - **spatial-shared**: row partitions counting into one atomic histogram
//! - **spatial-local**: row partitions with private histograms and a reduction

pub mod equalize;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use equalize::{
    equalize_channel_parallel, equalize_sequential, equalize_spatial_local_histogram,
    equalize_spatial_shared_histogram, Channel, Equalize, EqualizeError, Equalizer,
    EqualizerConfig, PixelBuffer, Strategy,
};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::equalize::{
        self, EqualizeError, Equalizer, EqualizerConfig, PixelBuffer, Strategy,
    };

    fn to_py_err(err: EqualizeError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    /// Copy a numpy array in, run `work` without the GIL, copy the result out.
    fn run<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        work: impl FnOnce(&PixelBuffer) -> equalize::Result<PixelBuffer> + Send,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = PixelBuffer::from_array(image.as_array()).map_err(to_py_err)?;
        let output = py.allow_threads(|| work(&input)).map_err(to_py_err)?;
        Ok(output.to_array().into_pyarray(py))
    }

    // ========================================================================
    // Strategies
    // ========================================================================

    /// Equalize an RGB u8 image on a single thread.
    ///
    /// # Arguments
    /// * `image` - (H, W, 3) uint8 array
    #[pyfunction]
    pub fn equalize_sequential<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run(py, image, equalize::equalize_sequential)
    }

    /// Equalize an RGB u8 image with one worker per channel.
    #[pyfunction]
    pub fn equalize_channel_parallel<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run(py, image, equalize::equalize_channel_parallel)
    }

    /// Equalize with row-partitioned workers sharing one atomic histogram.
    ///
    /// # Arguments
    /// * `image` - (H, W, 3) uint8 array
    /// * `workers` - Row partitions, 1..=H
    #[pyfunction]
    pub fn equalize_spatial_shared<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        workers: u32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run(py, image, |input| {
            equalize::equalize_spatial_shared_histogram(input, workers)
        })
    }

    /// Equalize with row-partitioned workers and private histograms.
    ///
    /// # Arguments
    /// * `image` - (H, W, 3) uint8 array
    /// * `workers` - Row partitions, 1..=H
    #[pyfunction]
    pub fn equalize_spatial_local<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        workers: u32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run(py, image, |input| {
            equalize::equalize_spatial_local_histogram(input, workers)
        })
    }

    /// Equalize with a strategy chosen by name.
    ///
    /// # Arguments
    /// * `image` - (H, W, 3) uint8 array
    /// * `strategy` - sequential, channel-parallel, spatial-shared or spatial-local
    /// * `workers` - Row partitions for the spatial strategies (default: thread count, at most H)
    /// * `threads` - Size of a dedicated thread pool (default: the global pool)
    #[pyfunction]
    #[pyo3(signature = (image, strategy="spatial-local", workers=None, threads=None))]
    pub fn equalize_histogram<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        strategy: &str,
        workers: Option<u32>,
        threads: Option<usize>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let strategy: Strategy = strategy.parse().map_err(to_py_err)?;
        let config = EqualizerConfig {
            strategy,
            workers,
            threads,
        };
        let equalizer = Equalizer::new(config).map_err(to_py_err)?;
        run(py, image, |input| equalizer.equalize(input))
    }

    #[pymodule]
    pub fn histeq_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(equalize_sequential, m)?)?;
        m.add_function(wrap_pyfunction!(equalize_channel_parallel, m)?)?;
        m.add_function(wrap_pyfunction!(equalize_spatial_shared, m)?)?;
        m.add_function(wrap_pyfunction!(equalize_spatial_local, m)?)?;
        m.add_function(wrap_pyfunction!(equalize_histogram, m)?)?;
        Ok(())
    }
}
