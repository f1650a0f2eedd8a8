use std::io::{self, Write};

use log::{debug, error};

pub const NUM_TRACKS: usize = 77;
pub const NUM_SIDES: usize = 1;
pub const NUM_SECTORS: usize = 33;
pub const MAX_SECTOR_SIZE: usize = 1024;

/// Identity of a sector as recovered from a validated address mark.
/// `size` is in bytes, already expanded from the on-disk size code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectorHeader {
    pub track: u8,
    pub side: u8,
    pub sector: u8,
    pub size: usize,
}

pub fn valid_size(size: usize) -> bool {
    (0..4).any(|code| size == 128 << code)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DumpStyle {
    Human,
    Json,
}

/// The assembled disk: one slot per (track, sector). A slot is filled by the
/// first CRC-validated copy of the sector and never replaced afterwards;
/// conflicting later reads only produce diagnostics.
pub struct DiskImage {
    sectors: Vec<Option<Vec<u8>>>,
}

impl DiskImage {
    pub fn new() -> Self {
        Self {
            sectors: vec![None; NUM_TRACKS * NUM_SECTORS],
        }
    }

    pub fn sector_data(&self, track: usize, sector: usize) -> Option<&[u8]> {
        self.sectors[track * NUM_SECTORS + sector].as_deref()
    }

    /// Add one sector's worth of data to the overall disk image.
    pub fn store(&mut self, header: &SectorHeader, data: &[u8]) {
        if header.track as usize >= NUM_TRACKS
            || header.side as usize >= NUM_SIDES
            || header.sector as usize >= NUM_SECTORS
            || !valid_size(header.size)
        {
            error!(
                "invalid params Track:{} Side:{} Sector:{} Size:{}",
                header.track, header.side, header.sector, header.size
            );
            return;
        }

        let slot = &mut self.sectors[header.track as usize * NUM_SECTORS + header.sector as usize];
        match slot {
            None => *slot = Some(data.to_vec()),
            Some(existing) => {
                if existing.len() != data.len() {
                    error!("Inconsistent sector size");
                } else if existing.as_slice() != data {
                    error!("Inconsistent sector data");
                }
            }
        }
        debug!("OK");
    }

    fn sector_range(&self) -> (usize, usize) {
        let mut sector_min = NUM_SECTORS;
        let mut sector_max = 0;
        for track in 0..NUM_TRACKS {
            for sector in 0..NUM_SECTORS {
                if self.sector_data(track, sector).is_some() {
                    sector_min = sector_min.min(sector);
                    sector_max = sector_max.max(sector);
                }
            }
        }
        // floppies commonly number sectors from 1
        (sector_min.min(1), sector_max)
    }

    /// Print the track/sector size map followed by a dump of every sector in
    /// the observed sector range.
    pub fn render(&self, out: &mut impl Write, style: DumpStyle) -> io::Result<()> {
        let (sector_min, sector_max) = self.sector_range();

        writeln!(
            out,
            "# Track/Sector map: .=Missing, 1=128, 2=256, 3=512, 4=1024"
        )?;
        for sector in sector_min..=sector_max {
            write!(out, "#\t{sector:2}: ")?;
            for track in 0..NUM_TRACKS {
                let size = self.sector_data(track, sector).map_or(0, <[u8]>::len);
                write!(out, "{}", size_to_char(size))?;
            }
            writeln!(out)?;
        }

        for track in 0..NUM_TRACKS {
            for sector in sector_min..=sector_max {
                match style {
                    DumpStyle::Human => self.human_show(out, track, sector)?,
                    DumpStyle::Json => self.json_show(out, track, sector)?,
                }
            }
        }
        Ok(())
    }

    fn human_show(&self, out: &mut impl Write, track: usize, sector: usize) -> io::Result<()> {
        let data = self.sector_data(track, sector);
        let size = data.map_or(0, <[u8]>::len);

        write!(out, "# Track:{track:<2} Sector:{sector:<2} Size:{size:<4} Status:")?;
        match data {
            None => writeln!(out, "MISSING"),
            Some(data) if sector_filled(data) => {
                if data[0] == 0 {
                    writeln!(out, "ZERO")
                } else {
                    writeln!(out, "FILL=0x{:02X}", data[0])
                }
            }
            Some(data) => {
                writeln!(out, "DATA")?;
                dump_sector(out, data)
            }
        }
    }

    fn json_show(&self, out: &mut impl Write, track: usize, sector: usize) -> io::Result<()> {
        let data = self.sector_data(track, sector);
        let size = data.map_or(0, <[u8]>::len);

        writeln!(out, "{{")?;
        write!(out, " \"track\": {track},")?;
        write!(out, " \"sector\": {sector},")?;
        write!(out, " \"size\": {size},")?;
        writeln!(out, " \"data\":[")?;
        for (i, &byte) in data.unwrap_or_default().iter().enumerate() {
            write!(out, "0x{byte:X},")?;
            if i % 32 == 31 {
                writeln!(out)?;
            }
        }
        writeln!(out, " ],")?;
        writeln!(out, "}}")
    }
}

impl Default for DiskImage {
    fn default() -> Self {
        Self::new()
    }
}

fn size_to_char(size: usize) -> char {
    match size {
        0 => '.',
        128 => '1',
        256 => '2',
        512 => '3',
        1024 => '4',
        _ => '?',
    }
}

/// Is the sector all the same value?
fn sector_filled(data: &[u8]) -> bool {
    data.iter().all(|&byte| byte == data[0])
}

const DUMP_STEP: usize = 32;

fn dump_sector(out: &mut impl Write, data: &[u8]) -> io::Result<()> {
    for row in data.chunks(DUMP_STEP) {
        write!(out, "# ")?;
        for &byte in row {
            if byte != 0 {
                write!(out, "{byte:02X} ")?;
            } else {
                write!(out, "__ ")?;
            }
        }
        write!(out, "| ")?;
        for &byte in row {
            let shown = if (0x20..=0x7e).contains(&byte) {
                byte as char
            } else {
                '_'
            };
            write!(out, "{shown}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
