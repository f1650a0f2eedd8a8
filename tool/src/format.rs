use std::fmt;

use log::debug;
use util::ONE_US;

/// Samples are classified into whole-microsecond buckets, +/- 0.5 us.
pub const US_BUCKETS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackFormat {
    Fm,
    Mfm,
}

impl fmt::Display for TrackFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackFormat::Fm => write!(f, "FM"),
            TrackFormat::Mfm => write!(f, "MFM"),
        }
    }
}

/// Round a tick count to the nearest whole microsecond, clamped to the last
/// bucket.
pub fn sample_to_us(sample: u32) -> usize {
    let us = ((sample + ONE_US / 2) / ONE_US) as usize;
    us.min(US_BUCKETS - 1)
}

/// Look at the samples and decide if the track is FM or MFM encoded.
/// FM has interval peaks at 2 and 4 us, MFM at 2, 3 and 4 us. The 3 us bucket
/// is populated only by MFM, so more than about 5% of the samples there
/// decide it. `samples` must not be empty.
pub fn detect(samples: &[u32]) -> TrackFormat {
    let mut histogram = [0usize; US_BUCKETS];
    for &sample in samples {
        histogram[sample_to_us(sample)] += 1;
    }

    let format = if histogram[3] * 100 / samples.len() > 5 {
        TrackFormat::Mfm
    } else {
        TrackFormat::Fm
    };

    debug!("Histogram:");
    for (us, count) in histogram.iter().enumerate() {
        debug!("{us:2}: {count}");
    }
    debug!("Track Format: {format}");

    format
}
