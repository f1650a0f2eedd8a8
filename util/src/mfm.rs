use crate::Bit;
use log::error;

/*
 Sync word 0x4489
 Data  1 0 1 0 0 0 0 1   0xA1
 Clk  0 0 0 0 1 1 1 0
 MFM  0100010010101001   0x44A9 as it would be if encoded correctly
 Sync 0100010010001001   0x4489 is damaged to be detected separate to normal data.

 The index mark uses 0xC2 with a missing clock in the same way:
 Data  1 1 0 0 0 0 1 0   0xC2
 MFM  0101001000100100   0x5224 with the damaged clock bit
*/
pub const ISO_SYNC_WORD: u16 = 0x4489;
pub const INDEX_SYNC_WORD: u16 = 0x5224;

/// Decoded byte count of an MFM mark: three sync bytes plus the mark byte.
pub const MARK_LEN: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MfmMark {
    Index,
    Address,
    Data,
    DeletedData,
}

static MARK_TABLE: [(MfmMark, [u8; MARK_LEN]); 4] = [
    (MfmMark::Index, [0xc2, 0xc2, 0xc2, 0xfc]),
    (MfmMark::Address, [0xa1, 0xa1, 0xa1, 0xfe]),
    (MfmMark::Data, [0xa1, 0xa1, 0xa1, 0xfb]),
    (MfmMark::DeletedData, [0xa1, 0xa1, 0xa1, 0xf8]),
];

impl MfmMark {
    pub fn mark_byte(self) -> u8 {
        match self {
            MfmMark::Index => 0xfc,
            MfmMark::Address => 0xfe,
            MfmMark::Data => 0xfb,
            MfmMark::DeletedData => 0xf8,
        }
    }

    pub fn byte_sequence(self) -> &'static [u8; MARK_LEN] {
        &MARK_TABLE[MARK_TABLE.iter().position(|(kind, _)| *kind == self).unwrap()].1
    }

    pub fn match_bytes(bytes: &[u8; MARK_LEN]) -> Option<MfmMark> {
        MARK_TABLE
            .iter()
            .find(|(_, sequence)| sequence == bytes)
            .map(|(kind, _)| *kind)
    }
}

/// Reads bytes out of an expanded MFM cell stream by folding cell pairs back
/// to data bits: 00 and 10 are a clear bit, 01 a set bit. A 11 pair cannot
/// come out of the interval expansion; it is reported and read as a clear
/// bit, leaving the CRC check to reject the frame. Positions past the end of
/// the slice read as zero, the same value the decode buffer is padded with.
pub struct MfmByteReader<'a> {
    bits: &'a [u8],
    pos: usize,
}

impl<'a> MfmByteReader<'a> {
    pub fn new(bits: &'a [u8]) -> Self {
        Self { bits, pos: 0 }
    }

    /// Cell entries consumed so far. Every byte takes 16.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    fn bit(&self, at: usize) -> u8 {
        self.bits.get(at).copied().unwrap_or(0)
    }

    pub fn read_bit(&mut self) -> u8 {
        let pair = (self.bit(self.pos) << 1) | self.bit(self.pos + 1);
        self.pos += 2;
        match pair {
            0 | 2 => 0,
            1 => 1,
            _ => {
                error!("Invalid MFM bit");
                0
            }
        }
    }

    pub fn read_byte(&mut self) -> u8 {
        let mut byte = 0;
        for _ in 0..8 {
            byte = (byte << 1) | self.read_bit();
        }
        byte
    }

    pub fn read_into(&mut self, out: &mut [u8]) {
        for byte in out {
            *byte = self.read_byte();
        }
    }
}

pub struct MfmEncoder<T>
where
    T: FnMut(Bit),
{
    sink: T,
    last_bit: Bit,
}

impl<T> MfmEncoder<T>
where
    T: FnMut(Bit),
{
    pub fn new(sink: T) -> Self {
        Self {
            sink,
            last_bit: Bit(false),
        }
    }

    fn encode_bit(&mut self, set: bool) {
        if set {
            (self.sink)(Bit(false)); // Clock Bit 0
            (self.sink)(Bit(true)); // Data Bit 1
        } else {
            // A clock transition separates adjacent zeros
            (self.sink)(Bit(!self.last_bit.0));
            (self.sink)(Bit(false));
        }
        self.last_bit = Bit(set);
    }

    pub fn feed_data(&mut self, mut val: u8) {
        for _ in 0..8 {
            self.encode_bit(val & 0x80 != 0);
            val <<= 1;
        }
    }

    /// Raw 16 cell word, bypassing the clock rule. Used for the damaged sync
    /// words in front of marks.
    pub fn feed_sync(&mut self, mut word: u16) {
        self.last_bit = Bit(word & 0x0001 != 0);

        for _ in 0..16 {
            (self.sink)(Bit(word & 0x8000 != 0));
            word <<= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_rule_inverts_encoding_for_every_byte() {
        for byte in 0..=255u8 {
            let mut cells: Vec<u8> = Vec::new();
            let mut encoder = MfmEncoder::new(|bit: Bit| cells.push(u8::from(bit.0)));
            encoder.feed_data(byte);
            drop(encoder);

            let mut reader = MfmByteReader::new(&cells);
            assert_eq!(reader.read_byte(), byte);
            assert_eq!(reader.consumed(), 16);
        }
    }

    #[test]
    fn sync_words_decode_to_their_sync_byte() {
        let mut cells: Vec<u8> = Vec::new();
        let mut encoder = MfmEncoder::new(|bit: Bit| cells.push(u8::from(bit.0)));
        encoder.feed_sync(ISO_SYNC_WORD);
        drop(encoder);

        assert_eq!(cells, vec![0, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1]);
        assert_eq!(MfmByteReader::new(&cells).read_byte(), 0xa1);

        let mut cells: Vec<u8> = Vec::new();
        let mut encoder = MfmEncoder::new(|bit: Bit| cells.push(u8::from(bit.0)));
        encoder.feed_sync(INDEX_SYNC_WORD);
        drop(encoder);

        assert_eq!(MfmByteReader::new(&cells).read_byte(), 0xc2);
    }

    #[test]
    fn encoder_test() {
        let mut cells: Vec<u8> = Vec::new();
        let mut encoder = MfmEncoder::new(|bit: Bit| cells.push(u8::from(bit.0)));
        encoder.feed_sync(ISO_SYNC_WORD);
        encoder.feed_data(0x00);
        encoder.feed_data(0xfe);
        drop(encoder);

        assert_eq!(
            cells,
            vec![
                0, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, // Sync Word 4489
                0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, // MFM 00
                0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, // MFM FE
            ]
        );
    }

    #[test]
    fn invalid_pair_reads_as_zero() {
        let cells = [1, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1];
        let mut reader = MfmByteReader::new(&cells);
        assert_eq!(reader.read_byte(), 0x7f);
    }

    #[test]
    fn mark_sequences_are_distinct() {
        for (kind, sequence) in MARK_TABLE {
            assert_eq!(MfmMark::match_bytes(&sequence), Some(kind));
            assert_eq!(sequence[3], kind.mark_byte());
        }
        assert_eq!(MfmMark::match_bytes(&[0xa1, 0xa1, 0xa1, 0xfc]), None);
    }
}
