// Cross-strategy properties of the equalization engine.

use histeq_rust::equalize::{
    compute_lookup, equalize_channel_parallel, equalize_sequential,
    equalize_spatial_local_histogram, equalize_spatial_shared_histogram, AtomicHistogram,
    Channel, ChannelView, EqualizeError, Equalizer, EqualizerConfig, Histogram, PixelBuffer,
    Strategy as Engine,
};
use proptest::collection::vec;
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

/// Random RGB image of 1..=24 x 1..=24 pixels.
fn image() -> impl Strategy<Value = PixelBuffer> {
    (1u32..=24, 1u32..=24).prop_flat_map(|(width, height)| {
        vec(any::<u8>(), (width * height * 3) as usize).prop_map(move |data| {
            PixelBuffer::from_interleaved(width, height, &data).expect("generated dimensions")
        })
    })
}

/// Pair each generated image with a valid worker count for it.
fn with_workers(
    images: impl Strategy<Value = PixelBuffer>,
) -> impl Strategy<Value = (PixelBuffer, u32)> {
    images.prop_flat_map(|input| {
        let height = input.height();
        (Just(input), 1..=height)
    })
}

fn image_and_workers() -> impl Strategy<Value = (PixelBuffer, u32)> {
    with_workers(image())
}

/// Image whose three channels only use a few intensity levels.
fn sparse_image() -> impl Strategy<Value = PixelBuffer> {
    (1u32..=16, 1u32..=16, vec(any::<u8>(), 1..4)).prop_flat_map(|(width, height, levels)| {
        vec(0..levels.len(), (width * height * 3) as usize).prop_map(move |picks| {
            let data: Vec<u8> = picks.iter().map(|&i| levels[i]).collect();
            PixelBuffer::from_interleaved(width, height, &data).expect("generated dimensions")
        })
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_all_strategies_agree((input, workers) in image_and_workers()) {
        let expected = equalize_sequential(&input).unwrap();

        prop_assert_eq!(&equalize_channel_parallel(&input).unwrap(), &expected);
        prop_assert_eq!(&equalize_spatial_shared_histogram(&input, workers).unwrap(), &expected);
        prop_assert_eq!(&equalize_spatial_local_histogram(&input, workers).unwrap(), &expected);
    }

    #[test]
    fn test_worker_count_does_not_change_output(input in image()) {
        let height = input.height();
        let expected = equalize_spatial_local_histogram(&input, 1).unwrap();

        for workers in [1, 2, 3, height] {
            if workers > height {
                continue;
            }
            prop_assert_eq!(&equalize_spatial_local_histogram(&input, workers).unwrap(), &expected);
            prop_assert_eq!(&equalize_spatial_shared_histogram(&input, workers).unwrap(), &expected);
        }
    }

    #[test]
    fn test_sparse_images_agree((input, workers) in with_workers(sparse_image())) {
        let expected = equalize_sequential(&input).unwrap();
        prop_assert_eq!(&equalize_spatial_shared_histogram(&input, workers).unwrap(), &expected);
        prop_assert_eq!(&equalize_spatial_local_histogram(&input, workers).unwrap(), &expected);
    }

    #[test]
    fn test_histogram_sums_to_pixel_count(input in image()) {
        for channel in Channel::ALL {
            let view = ChannelView::extract(&input, channel);
            let hist = Histogram::build(view.as_slice());
            prop_assert_eq!(hist.total(), input.pixel_count() as u64);

            let shared = AtomicHistogram::new();
            shared.record_all(view.as_slice());
            prop_assert_eq!(shared.snapshot(), hist);
        }
    }

    #[test]
    fn test_lookup_follows_cdf_formula(values in vec(any::<u8>(), 1..2000)) {
        let hist = Histogram::build(&values);
        let total = values.len() as u64;
        let lut = compute_lookup(&hist, values.len() as u32);
        let table = lut.as_array();

        for pair in table.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        prop_assert_eq!(lut.map(0), 0);

        let occupied: Vec<u8> = (0..=255u8).filter(|&v| hist.count(v) > 0).collect();
        if occupied.len() == 1 {
            prop_assert!(lut.is_zero());
        } else {
            let base = u64::from(hist.count(0));
            let mut cdf = 0u64;
            for level in 0..=255u8 {
                cdf += u64::from(hist.count(level));
                let expected = (cdf - base) * 255 / (total - base);
                prop_assert_eq!(u64::from(lut.map(level)), expected);
            }
            prop_assert_eq!(lut.map(occupied[occupied.len() - 1]), 255);
        }
    }

    #[test]
    fn test_input_never_modified((input, workers) in image_and_workers()) {
        let before = input.clone();
        for engine in Engine::ALL {
            let equalizer = Equalizer::new(
                EqualizerConfig::new(engine).with_workers(workers),
            ).unwrap();
            equalizer.equalize(&input).unwrap();
            prop_assert_eq!(&input, &before);
        }
    }

    #[test]
    fn test_too_many_workers_rejected(input in image(), extra in 1u32..8) {
        let workers = input.height() + extra;
        let result = equalize_spatial_local_histogram(&input, workers);
        let is_worker_count_error = matches!(result, Err(EqualizeError::InvalidWorkerCount { .. }));
        prop_assert!(is_worker_count_error);
        let result = equalize_spatial_shared_histogram(&input, workers);
        let is_worker_count_error = matches!(result, Err(EqualizeError::InvalidWorkerCount { .. }));
        prop_assert!(is_worker_count_error);
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_flat_image_is_black_for_every_strategy() {
    for value in [0u8, 77, 255] {
        let input = PixelBuffer::from_interleaved(5, 4, &[value; 60]).unwrap();
        let black = PixelBuffer::new(5, 4).unwrap();

        assert_all_strategies(&input, &black);
    }
}

#[test]
fn test_two_level_image_is_unchanged() {
    // red 0,0,255,255 stays put under every strategy
    let data = [0, 0, 0, 0, 0, 0, 255, 255, 255, 255, 255, 255];
    let input = PixelBuffer::from_interleaved(2, 2, &data).unwrap();

    for workers in [1, 2] {
        assert_eq!(equalize_spatial_local_histogram(&input, workers).unwrap(), input);
        assert_eq!(equalize_spatial_shared_histogram(&input, workers).unwrap(), input);
    }
    assert_eq!(equalize_sequential(&input).unwrap(), input);
    assert_eq!(equalize_channel_parallel(&input).unwrap(), input);
}

/// Run every strategy with every valid worker count and check the result.
fn assert_all_strategies(input: &PixelBuffer, expected: &PixelBuffer) {
    assert_eq!(&equalize_sequential(input).unwrap(), expected);
    assert_eq!(&equalize_channel_parallel(input).unwrap(), expected);
    for workers in 1..=input.height() {
        assert_eq!(&equalize_spatial_shared_histogram(input, workers).unwrap(), expected);
        assert_eq!(&equalize_spatial_local_histogram(input, workers).unwrap(), expected);
    }
}

#[test]
fn test_channel_without_black_pixels() {
    // red 100, 200: cdf[0] = 0, so 100 -> 1 * 255 / 2 = 127
    // green 10, 20 per row, blue keeps a zero
    let data = [100, 10, 0, 200, 20, 40, 100, 10, 0, 200, 20, 40];
    let input = PixelBuffer::from_interleaved(2, 2, &data).unwrap();
    let expected = PixelBuffer::from_interleaved(
        2,
        2,
        &[127, 127, 0, 255, 255, 255, 127, 127, 0, 255, 255, 255],
    )
    .unwrap();

    assert_all_strategies(&input, &expected);
}

#[test]
fn test_three_levels_without_black_pixels() {
    // cdf 1, 2, 3 over 3 pixels -> 85, 170, 255
    let data: Vec<u8> = [10u8, 20, 30].iter().flat_map(|&v| [v, v, v]).collect();
    let input = PixelBuffer::from_interleaved(3, 1, &data).unwrap();

    let output = equalize_sequential(&input).unwrap();
    assert_eq!(output.plane(Channel::Red), &[85, 170, 255]);
    assert_all_strategies(&input, &output);
}

#[test]
fn test_equalization_is_not_idempotent() {
    // one 0, one 1, 255 twos, 254 threes
    let mut levels = vec![0u8, 1];
    levels.extend(std::iter::repeat(2).take(255));
    levels.extend(std::iter::repeat(3).take(254));
    let data: Vec<u8> = levels.iter().flat_map(|&v| [v, v, v]).collect();
    let input = PixelBuffer::from_interleaved(511, 1, &data).unwrap();

    let once = equalize_sequential(&input).unwrap();
    let twice = equalize_sequential(&once).unwrap();

    assert_eq!(once.get(0, 2), Some([128, 128, 128]));
    assert_eq!(twice.get(0, 2), Some([127, 127, 127]));
    assert_ne!(once, twice);
}

#[test]
fn test_single_row_image_accepts_one_worker_only() {
    let input = PixelBuffer::from_interleaved(4, 1, &[10; 12]).unwrap();

    assert!(equalize_spatial_local_histogram(&input, 1).is_ok());
    assert!(matches!(
        equalize_spatial_local_histogram(&input, 2),
        Err(EqualizeError::InvalidWorkerCount { workers: 2, height: 1 })
    ));
}
