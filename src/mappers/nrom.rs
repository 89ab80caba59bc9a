//! NROM (mapper 0): no bank switching.
//!
//! - PRG ROM: 16 KiB (NROM-128) mirrored across $8000..=$FFFF, or
//!   32 KiB (NROM-256) mapped linearly.
//! - PRG and CHR writes are rejected and logged; the board has no
//!   registers and no writable storage.

use log::warn;

use crate::mappers::Mapper;

#[derive(Clone, Debug)]
pub struct Nrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
}

impl Nrom {
    /// - `prg_rom`: 16 KiB or 32 KiB PRG image
    /// - `chr`: 8 KiB CHR image (allocated zeroed by the cartridge when
    ///   the header declares no CHR banks)
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>) -> Self {
        Self { prg_rom, chr }
    }

    #[inline]
    fn prg_offset(&self, addr: u16) -> Option<usize> {
        if addr < 0x8000 || self.prg_rom.is_empty() {
            return None;
        }
        let rel = (addr - 0x8000) as usize;
        if self.prg_rom.len() > 0x4000 {
            Some(rel)
        } else {
            // NROM-128: $C000..=$FFFF mirrors the single bank.
            Some(rel & 0x3FFF)
        }
    }
}

impl Mapper for Nrom {
    fn id(&self) -> u16 {
        0
    }

    fn name(&self) -> &'static str {
        "NROM"
    }

    fn read_prg(&self, addr: u16) -> u8 {
        match self.prg_offset(addr) {
            Some(ofs) => self.prg_rom[ofs],
            None => {
                warn!("{}: invalid PRG read at {:#06X}", self.name(), addr);
                0
            }
        }
    }

    fn write_prg(&mut self, addr: u16, value: u8) {
        warn!(
            "{}: rejected PRG write {:#04X} at {:#06X}",
            self.name(),
            value,
            addr
        );
    }

    fn read_chr(&self, addr: u16) -> u8 {
        match self.chr.get((addr as usize) & 0x1FFF) {
            Some(&b) => b,
            None => 0,
        }
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        warn!(
            "{}: rejected CHR write {:#04X} at {:#06X}",
            self.name(),
            value,
            addr
        );
    }

    fn read_prg_span(&self, addr: u16, count: usize) -> &[u8] {
        match self.prg_offset(addr) {
            Some(ofs) if ofs + count <= self.prg_rom.len() => &self.prg_rom[ofs..ofs + count],
            _ => {
                warn!("{}: invalid PRG span at {:#06X}+{}", self.name(), addr, count);
                &[]
            }
        }
    }

    fn read_chr_span(&self, addr: u16, count: usize) -> &[u8] {
        let ofs = (addr as usize) & 0x1FFF;
        if ofs + count <= self.chr.len() {
            &self.chr[ofs..ofs + count]
        } else {
            warn!("{}: invalid CHR span at {:#06X}+{}", self.name(), addr, count);
            &[]
        }
    }

    fn reset(&mut self) {
        // No dynamic banks to reset.
    }
}

#[cfg(test)]
mod tests {
    use super::Nrom;
    use crate::mappers::Mapper;

    #[test]
    fn nrom_256_maps_linearly() {
        let mut prg = vec![0u8; 32 * 1024];
        prg[0] = 0x12;
        prg[0x7FFF] = 0x34;
        let m = Nrom::new(prg, vec![0xCC; 8 * 1024]);

        assert_eq!(m.read_prg(0x8000), 0x12);
        assert_eq!(m.read_prg(0xFFFF), 0x34);
        assert_eq!(m.read_chr(0x0000), 0xCC);
    }

    #[test]
    fn nrom_128_mirrors_upper_half() {
        let mut prg = vec![0u8; 16 * 1024];
        prg[0] = 0x12;
        prg[0x3FFF] = 0x34;
        let m = Nrom::new(prg, vec![0; 8 * 1024]);

        assert_eq!(m.read_prg(0x8000), 0x12);
        assert_eq!(m.read_prg(0xBFFF), 0x34);
        // $C000..=$FFFF mirrors the single bank.
        assert_eq!(m.read_prg(0xC000), 0x12);
        assert_eq!(m.read_prg(0xFFFF), 0x34);
    }

    #[test]
    fn writes_are_rejected() {
        let mut m = Nrom::new(vec![0xAA; 16 * 1024], vec![0xBB; 8 * 1024]);
        m.write_prg(0x8000, 0x55);
        m.write_chr(0x0000, 0x55);
        assert_eq!(m.read_prg(0x8000), 0xAA);
        assert_eq!(m.read_chr(0x0000), 0xBB);
    }

    #[test]
    fn prg_span_is_contiguous() {
        let mut prg = vec![0u8; 32 * 1024];
        for (i, b) in prg.iter_mut().enumerate().take(256) {
            *b = i as u8;
        }
        let m = Nrom::new(prg, vec![0; 8 * 1024]);
        let span = m.read_prg_span(0x8000, 256);
        assert_eq!(span.len(), 256);
        assert_eq!(span[0], 0);
        assert_eq!(span[255], 255);
    }
}
