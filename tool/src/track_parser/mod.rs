use crate::disk_image::{DiskImage, SectorHeader, MAX_SECTOR_SIZE, NUM_SECTORS, NUM_SIDES, NUM_TRACKS};
use crate::format::{self, TrackFormat};

pub mod fm;
pub mod mfm;

/// Zero padding appended to every decode buffer so a mark found near the end
/// of a capture can still attempt a full frame read.
pub const DECODE_PAD: usize = 2 * 8 * MAX_SECTOR_SIZE;

/// Decode one track's samples into the disk image. The scratch buffer is
/// reused across tracks to avoid reallocating the decode arena.
pub fn decode_track(samples: &[u32], image: &mut DiskImage, scratch: &mut Vec<u8>) {
    match format::detect(samples) {
        TrackFormat::Fm => fm::decode_track(samples, image, scratch),
        TrackFormat::Mfm => mfm::decode_track(samples, image, scratch),
    }
}

/// CRC of an address or data frame including its two trailing CRC bytes.
/// The polynomial is x^16 + x^12 + x^5 + 1 with initial value 0xFFFF; a frame
/// is intact exactly when the running value ends up zero.
pub(crate) fn crc_ok(frame: &[u8]) -> bool {
    let mut crc = crc16::State::<crc16::CCITT_FALSE>::new();
    crc.update(frame);
    crc.get() == 0
}

pub(crate) fn header_from_fields(track: u8, side: u8, sector: u8, size_code: u8) -> Option<SectorHeader> {
    if track as usize >= NUM_TRACKS
        || side as usize >= NUM_SIDES
        || sector as usize >= NUM_SECTORS
        || size_code >= 4
    {
        return None;
    }
    Some(SectorHeader {
        track,
        side,
        sector,
        size: 128usize << size_code,
    })
}
