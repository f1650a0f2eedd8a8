use crate::Bit;

/*
 FM interleaves a clock cell before every data cell. Ordinary bytes carry an
 all-ones clock, so two adjacent transitions (a 2 us interval) mean a set data
 bit and a single 4 us interval means a clear one. Marks damage the clock so
 they cannot occur in ordinary data:

 Index mark         Data 0xFC, Clock 0xD7
 Address mark       Data 0xFE, Clock 0xC7
 Data mark          Data 0xFB, Clock 0xC7
 Deleted data mark  Data 0xF8, Clock 0xC7

 Seen through the 3 us split, each mark produces a fixed pattern of interval
 bits (1 = 2 us, 0 = 4 us). The final entries of a pattern reach into what
 follows the mark: the clock cell of the next byte, and for the deleted data
 mark also the first payload bit, which must be set for the mark to be
 recognized at all.
*/

/// Interval-bit entries in an FM mark pattern.
pub const MARK_LEN: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FmMark {
    Index,
    Address,
    Data,
    DeletedData,
}

static MARK_TABLE: [(FmMark, [u8; MARK_LEN]); 4] = [
    (FmMark::Index, [1, 1, 1, 0, 1, 1, 0, 1, 1, 1, 0, 0]),
    (FmMark::Address, [1, 1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 0]),
    (FmMark::Data, [1, 1, 1, 0, 0, 0, 1, 0, 1, 1, 1, 1]),
    (FmMark::DeletedData, [1, 1, 1, 0, 0, 0, 1, 0, 0, 0, 1, 1]),
];

impl FmMark {
    pub fn data_byte(self) -> u8 {
        match self {
            FmMark::Index => 0xfc,
            FmMark::Address => 0xfe,
            FmMark::Data => 0xfb,
            FmMark::DeletedData => 0xf8,
        }
    }

    pub fn clock_byte(self) -> u8 {
        match self {
            FmMark::Index => 0xd7,
            _ => 0xc7,
        }
    }

    /// Interval entries between the match position and the first byte of the
    /// frame behind the mark. The deleted data mark carries only ten
    /// structural entries; its final two reach into the first payload bit,
    /// whose interval token starts at the eleventh entry.
    pub fn lead_len(self) -> usize {
        match self {
            FmMark::DeletedData => MARK_LEN - 1,
            _ => MARK_LEN,
        }
    }

    pub fn pattern(self) -> &'static [u8; MARK_LEN] {
        &MARK_TABLE[MARK_TABLE.iter().position(|(kind, _)| *kind == self).unwrap()].1
    }

    /// Does the start of `bits` spell out one of the four marks?
    pub fn match_at(bits: &[u8]) -> Option<FmMark> {
        MARK_TABLE
            .iter()
            .find(|(_, pattern)| bits.starts_with(pattern))
            .map(|(kind, _)| *kind)
    }
}

/// Reads data bytes out of the interval-bit stream following an FM mark.
/// A set data bit shows up as two adjacent 2 us intervals, a clear one as a
/// single 4 us interval. Positions past the end of the slice read as zero,
/// the same value the decode buffer is padded with.
pub struct FmByteReader<'a> {
    bits: &'a [u8],
    pos: usize,
}

impl<'a> FmByteReader<'a> {
    pub fn new(bits: &'a [u8]) -> Self {
        Self { bits, pos: 0 }
    }

    /// Interval-bit entries consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    fn bit(&self, at: usize) -> u8 {
        self.bits.get(at).copied().unwrap_or(0)
    }

    pub fn read_byte(&mut self) -> u8 {
        let mut byte = 0;
        for _ in 0..8 {
            byte = (byte << 1) | self.bit(self.pos);
            if self.bit(self.pos) == 1 && self.bit(self.pos + 1) == 1 {
                self.pos += 2;
            } else {
                self.pos += 1;
            }
        }
        byte
    }

    pub fn read_into(&mut self, out: &mut [u8]) {
        for byte in out {
            *byte = self.read_byte();
        }
    }
}

/// Emits the interleaved clock and data cells of FM bytes.
pub struct FmEncoder<T>
where
    T: FnMut(Bit),
{
    sink: T,
}

impl<T> FmEncoder<T>
where
    T: FnMut(Bit),
{
    pub fn new(sink: T) -> Self {
        Self { sink }
    }

    /// Data byte with the standard all-ones clock.
    pub fn feed(&mut self, data: u8) {
        self.feed_with_clock(data, 0xff);
    }

    pub fn feed_with_clock(&mut self, data: u8, clock: u8) {
        for i in (0..8).rev() {
            (self.sink)(Bit(clock & (1 << i) != 0));
            (self.sink)(Bit(data & (1 << i) != 0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluxpulse::FluxPulseGenerator;
    use crate::{FM_SPLIT, TWO_US};

    // Interval bits of a byte behind an all-ones clock: a set data bit is two
    // adjacent 2 us intervals, a clear one a single 4 us interval.
    fn interval_bits(byte: u8) -> Vec<u8> {
        let mut bits = Vec::new();
        for i in (0..8).rev() {
            if byte & (1 << i) != 0 {
                bits.extend_from_slice(&[1, 1]);
            } else {
                bits.push(0);
            }
        }
        bits
    }

    #[test]
    fn fetch_inverts_encoding_for_every_byte() {
        for byte in 0..=255u8 {
            let bits = interval_bits(byte);
            let mut reader = FmByteReader::new(&bits);
            assert_eq!(reader.read_byte(), byte);
            assert_eq!(reader.consumed(), bits.len());
        }
    }

    #[test]
    fn fetch_reads_consecutive_bytes() {
        let mut bits = interval_bits(0x4c);
        bits.extend(interval_bits(0xa5));
        let mut reader = FmByteReader::new(&bits);
        let mut out = [0u8; 2];
        reader.read_into(&mut out);
        assert_eq!(out, [0x4c, 0xa5]);
    }

    #[test]
    fn reader_is_zero_past_the_end() {
        let bits = [1, 1];
        let mut reader = FmByteReader::new(&bits);
        assert_eq!(reader.read_byte(), 0x80);
    }

    #[test]
    fn encoder_interleaves_clock_and_data() {
        let mut cells: Vec<u8> = Vec::new();
        let mut encoder = FmEncoder::new(|bit: Bit| cells.push(u8::from(bit.0)));
        encoder.feed(0x00);
        encoder.feed_with_clock(0xfe, 0xc7);

        assert_eq!(
            cells,
            vec![
                1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, // 0x00, clock 0xFF
                1, 1, 1, 1, 0, 1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 0, // 0xFE, clock 0xC7
            ]
        );
    }

    // Derive each mark pattern from first principles: encode the mark cells,
    // run them through the pulse generator and threshold the intervals. The
    // first pulse covers the lead-in and is dropped.
    #[test]
    fn mark_patterns_match_derived_intervals() {
        for (mark, follower) in [
            (FmMark::Index, 0x00),
            (FmMark::Address, 0x00),
            (FmMark::Data, 0x00),
            (FmMark::DeletedData, 0xff),
        ] {
            let mut bits: Vec<u8> = Vec::new();
            let mut generator =
                FluxPulseGenerator::new(|p| bits.push(u8::from(p.0 < FM_SPLIT)), TWO_US);
            let mut encoder = FmEncoder::new(|bit| generator.feed(bit));
            encoder.feed_with_clock(mark.data_byte(), mark.clock_byte());
            encoder.feed(follower);
            encoder.feed(follower);
            drop(encoder);

            assert_eq!(&bits[1..1 + MARK_LEN], mark.pattern(), "{mark:?}");
        }
    }

    #[test]
    fn marks_are_mutually_exclusive() {
        for (kind, pattern) in MARK_TABLE {
            assert_eq!(FmMark::match_at(&pattern), Some(kind));
        }
        assert_eq!(FmMark::match_at(&[1; MARK_LEN]), None);
    }
}
