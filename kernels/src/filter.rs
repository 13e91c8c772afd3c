/// Width and height of the blur5 filter window
pub const FILTER_SIZE: usize = 5;

/// blur5 weights, indexed `[fy][fx]`
pub const FILTER: [[f32; FILTER_SIZE]; FILTER_SIZE] = [
    [1., 1., 1., 1., 1.],
    [1., 2., 2., 2., 1.],
    [1., 2., 3., 2., 1.],
    [1., 2., 2., 2., 1.],
    [1., 1., 1., 1., 1.],
];

/// Reciprocal of the sum of all filter weights. Kept fixed at the borders,
/// where some taps fall outside the image.
pub const SCALE: f32 = 1. / 35.;

/// Channels the filter is applied to; any channel beyond these (alpha) is copied.
pub const COLOR_CHANNELS: usize = 3;

/// Compute one output pixel at `(x, y)` into `out` (`channels` bytes long).
///
/// Every variant goes through this function so the float accumulation order
/// is identical and the results are byte-exact across variants.
#[inline]
pub(crate) fn blur_pixel(
    input: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    x: usize,
    y: usize,
    out: &mut [u8],
) {
    let color = channels.min(COLOR_CHANNELS);
    let half = (FILTER_SIZE / 2) as isize;
    let mut acc = [0f32; COLOR_CHANNELS];

    for (fy, weights) in FILTER.iter().enumerate() {
        let iy = y as isize - half + fy as isize;
        if iy < 0 || iy >= height as isize {
            continue;
        }
        for (fx, &weight) in weights.iter().enumerate() {
            let ix = x as isize - half + fx as isize;
            if ix < 0 || ix >= width as isize {
                continue;
            }
            let base = (iy as usize * width + ix as usize) * channels;
            acc.iter_mut()
                .zip(&input[base..base + color])
                .for_each(|(acc, &sample)| *acc += weight * f32::from(sample));
        }
    }

    out[..color]
        .iter_mut()
        .zip(acc)
        .for_each(|(dst, acc)| *dst = (255. - SCALE * acc) as u8);

    let base = (y * width + x) * channels;
    out[color..].copy_from_slice(&input[base + color..base + channels]);
}
