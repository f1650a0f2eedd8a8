use log::debug;

use util::mfm::{MfmByteReader, MfmMark, MARK_LEN};
use util::{MFM_SPLIT_HI, MFM_SPLIT_LO};

use crate::disk_image::{DiskImage, SectorHeader};

use super::{crc_ok, header_from_fields, DECODE_PAD};

/// Decoded byte count of an address frame: sync run, mark byte, four header
/// fields and the CRC.
const ADDRESS_FRAME_LEN: usize = MARK_LEN + 4 + 2;

/// Decode one MFM track. Each sample expands to a transition cell followed by
/// one, two or three empty cells depending on its interval.
pub fn decode_track(samples: &[u32], image: &mut DiskImage, scratch: &mut Vec<u8>) {
    scratch.clear();
    scratch.reserve(samples.len() * 4 + DECODE_PAD);
    for &sample in samples {
        scratch.push(1);
        let zeros = if sample >= MFM_SPLIT_HI {
            3 // 4 us
        } else if sample >= MFM_SPLIT_LO {
            2 // 3 us
        } else {
            1 // 2 us
        };
        for _ in 0..zeros {
            scratch.push(0);
        }
    }
    let n = scratch.len();
    debug!("MFM decode expanded to {n} cells");
    scratch.resize(n + DECODE_PAD, 0);

    scan(scratch, n, image);
}

fn scan(bits: &[u8], n: usize, image: &mut DiskImage) {
    let mut last_seen: Option<SectorHeader> = None;
    let mut i = 0;

    while i < n {
        let mut probe = [0u8; MARK_LEN];
        MfmByteReader::new(&bits[i..]).read_into(&mut probe);
        let Some(mark) = MfmMark::match_bytes(&probe) else {
            i += 1;
            continue;
        };

        match mark {
            MfmMark::Index => {
                debug!("{i:06}: INDX");
                last_seen = None;
                i += MARK_LEN * 16; // each byte consumes 8 cell pairs
            }
            MfmMark::Address => match read_address(&bits[i..]) {
                Some((header, consumed)) => {
                    debug!(
                        "{i:06}: ADDR Track:{:02} Side:{} Sector:{:02} Size:{}",
                        header.track, header.side, header.sector, header.size
                    );
                    last_seen = Some(header);
                    i += consumed;
                }
                None => {
                    last_seen = None;
                    i += 1;
                }
            },
            MfmMark::Data | MfmMark::DeletedData => {
                // A data mark only counts directly behind a valid address mark
                match last_seen
                    .take()
                    .and_then(|header| Some((header, read_payload(&bits[i..], mark, header.size)?)))
                {
                    Some((header, (payload, consumed))) => {
                        let tag = if mark == MfmMark::Data { "DATA" } else { "DELD" };
                        debug!("{i:06}: {tag}");
                        image.store(&header, &payload);
                        i += consumed;
                    }
                    None => i += 1,
                }
            }
        }
    }
}

fn read_address(bits: &[u8]) -> Option<(SectorHeader, usize)> {
    let mut frame = [0u8; ADDRESS_FRAME_LEN];
    let mut reader = MfmByteReader::new(bits);
    reader.read_into(&mut frame);

    if !crc_ok(&frame) {
        return None;
    }
    let header = header_from_fields(frame[4], frame[5], frame[6], frame[7])?;
    Some((header, reader.consumed()))
}

/// Data and deleted data frames only differ in the expected mark byte; the
/// CRC runs over the sync run and mark either way.
fn read_payload(bits: &[u8], mark: MfmMark, size: usize) -> Option<(Vec<u8>, usize)> {
    let mut frame = vec![0u8; MARK_LEN + size + 2];
    let mut reader = MfmByteReader::new(bits);
    reader.read_into(&mut frame);

    if frame[MARK_LEN - 1] != mark.mark_byte() {
        return None;
    }
    if !crc_ok(&frame) {
        return None;
    }
    Some((frame[MARK_LEN..MARK_LEN + size].to_vec(), reader.consumed()))
}
