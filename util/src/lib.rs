pub mod fluxpulse;
pub mod fm;
pub mod mfm;

/// One bit cell on the disk surface. True means a flux transition.
#[derive(Clone, Copy, Debug)]
pub struct Bit(pub bool);

impl PartialEq<bool> for Bit {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

/// Time between two adjacent flux transitions, in capture ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PulseDuration(pub u32);

// The capture device (Teensy 4.1) runs at 600 MHz and divides by 16,
// so 1 us equals 37.5 ticks.
pub const ONE_US: u32 = 37;
pub const TWO_US: u32 = 75;

/// FM intervals are 2 or 4 us. One split at 3 us tells them apart.
pub const FM_SPLIT: u32 = 112;

/// MFM intervals are 2, 3 or 4 us, so two splits are needed.
pub const MFM_SPLIT_LO: u32 = 93;
pub const MFM_SPLIT_HI: u32 = 131;
