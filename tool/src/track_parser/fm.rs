use log::debug;

use util::fm::{FmByteReader, FmMark};
use util::FM_SPLIT;

use crate::disk_image::{DiskImage, SectorHeader};

use super::{crc_ok, header_from_fields, DECODE_PAD};

/// Decode one FM track. Each sample turns into a single interval bit: 1 for
/// a 2 us interval, 0 for a 4 us one.
pub fn decode_track(samples: &[u32], image: &mut DiskImage, scratch: &mut Vec<u8>) {
    scratch.clear();
    scratch.extend(samples.iter().map(|&sample| u8::from(sample < FM_SPLIT)));
    let n = scratch.len();
    scratch.resize(n + DECODE_PAD, 0);

    scan(scratch, n, image);
}

fn scan(bits: &[u8], n: usize, image: &mut DiskImage) {
    let mut last_seen: Option<SectorHeader> = None;
    let mut i = 0;

    while i < n {
        let Some(mark) = FmMark::match_at(&bits[i..]) else {
            i += 1;
            continue;
        };
        let after = i + mark.lead_len();

        match mark {
            FmMark::Index => {
                debug!("{after:06}: INDX");
                last_seen = None;
                i = after;
            }
            FmMark::Address => match read_address(&bits[after..]) {
                Some((header, consumed)) => {
                    debug!(
                        "{after:06}: ADDR Track:{:02} Side:{} Sector:{:02} Size:{}",
                        header.track, header.side, header.sector, header.size
                    );
                    last_seen = Some(header);
                    i = after + consumed;
                }
                None => {
                    last_seen = None;
                    i += 1;
                }
            },
            FmMark::Data | FmMark::DeletedData => {
                // A data mark only counts directly behind a valid address mark
                match last_seen
                    .take()
                    .and_then(|header| Some((header, read_payload(&bits[after..], mark, header.size)?)))
                {
                    Some((header, (payload, consumed))) => {
                        let tag = if mark == FmMark::Data { "DATA" } else { "DELD" };
                        debug!("{after:06}: {tag}");
                        image.store(&header, &payload);
                        i = after + consumed;
                    }
                    None => i += 1,
                }
            }
        }
    }
}

fn read_address(bits: &[u8]) -> Option<(SectorHeader, usize)> {
    let mut frame = [0u8; 1 + 4 + 2]; // mark, track, side, sector, size, 2 CRC
    frame[0] = FmMark::Address.data_byte();

    let mut reader = FmByteReader::new(bits);
    reader.read_into(&mut frame[1..]);

    if !crc_ok(&frame) {
        return None;
    }
    let header = header_from_fields(frame[1], frame[2], frame[3], frame[4])?;
    Some((header, reader.consumed()))
}

fn read_payload(bits: &[u8], mark: FmMark, size: usize) -> Option<(Vec<u8>, usize)> {
    let mut frame = vec![0u8; 1 + size + 2]; // mark, data, 2 CRC
    frame[0] = mark.data_byte();

    let mut reader = FmByteReader::new(bits);
    reader.read_into(&mut frame[1..]);

    if !crc_ok(&frame) {
        return None;
    }
    Some((frame[1..1 + size].to_vec(), reader.consumed()))
}
