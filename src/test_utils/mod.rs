//! Shared test utilities for building minimal iNES (v1) ROM images.
//!
//! These helpers de-duplicate iNES construction across the CPU, Bus,
//! PPU, cartridge and system tests. They support just what the suite
//! needs: pattern-filled banks, an injected PRG program with CPU
//! vectors, a caller-supplied CHR image, and raw PRG/CHR payloads for
//! the banked-mapper tests.
//!
//! Vector placement: for 16 KiB PRG the vectors live at PRG offsets
//! 0x3FFA..=0x3FFF, for 32 KiB at 0x7FFA..=0x7FFF.

#![allow(dead_code)]

/// Build a minimal iNES (v1) image with pattern-filled PRG (0xAA) and
/// CHR (0xCC) banks.
///
/// - `prg_16k`: number of 16 KiB PRG units
/// - `chr_8k`: number of 8 KiB CHR units (0 => loader allocates CHR RAM)
/// - `flags6`/`flags7`: raw header flag bytes
/// - `trainer`: optional 512-byte trainer inserted after the header
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        16 + trainer.map_or(0, |_| 512) + prg_16k * 16 * 1024 + chr_8k * 8 * 1024,
    );

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.extend_from_slice(&[0u8; 8]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.extend(std::iter::repeat(0xAA).take(prg_16k * 16 * 1024));
    bytes.extend(std::iter::repeat(0xCC).take(chr_8k * 8 * 1024));
    bytes
}

/// Build an iNES image from raw PRG and CHR payloads (sizes must be
/// whole banks). Used by the banked-mapper tests that mark each bank.
pub fn build_ines_custom(prg: &[u8], chr: &[u8], flags6: u8, flags7: u8) -> Vec<u8> {
    assert!(prg.len() % (16 * 1024) == 0 && !prg.is_empty());
    assert!(chr.len() % (8 * 1024) == 0);

    let mut bytes = Vec::with_capacity(16 + prg.len() + chr.len());
    bytes.extend_from_slice(b"NES\x1A");
    bytes.push((prg.len() / (16 * 1024)) as u8);
    bytes.push((chr.len() / (8 * 1024)) as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.extend_from_slice(&[0u8; 8]);
    bytes.extend_from_slice(prg);
    bytes.extend_from_slice(chr);
    bytes
}

/// Build a single-bank NROM image carrying `prg` at the bank start and
/// CPU vectors at the bank end.
///
/// - `prg`: program bytes (at most 16 KiB)
/// - `chr_8k`: number of 8 KiB CHR units
/// - `vectors`: optional `(reset, nmi, irq)`; all default to `$8000`
pub fn build_nrom_with_prg(prg: &[u8], chr_8k: usize, vectors: Option<(u16, u16, u16)>) -> Vec<u8> {
    assert!(
        prg.len() <= 16 * 1024,
        "program must fit within a 16 KiB PRG bank"
    );

    let mut rom = build_ines(1, chr_8k, 0, 0, None);
    let prg_start = 16;
    rom[prg_start..prg_start + prg.len()].copy_from_slice(prg);

    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(&mut rom[prg_start..prg_start + 16 * 1024], reset, nmi, irq);
    rom
}

/// Build a single-bank NROM image with a caller-supplied CHR image
/// (padded to 8 KiB). PRG is pattern fill; used by renderer tests.
pub fn build_ines_with_chr(prg_16k: usize, flags6: u8, chr: &[u8]) -> Vec<u8> {
    assert!(chr.len() <= 8 * 1024);
    let mut rom = build_ines(prg_16k, 1, flags6, 0, None);
    let chr_start = 16 + prg_16k * 16 * 1024;
    rom[chr_start..chr_start + chr.len()].copy_from_slice(chr);
    // Zero the remainder so untouched tiles decode transparent.
    rom[chr_start + chr.len()..].fill(0);
    rom
}

/// Write the NMI/RESET/IRQ vectors into a 16 KiB or 32 KiB PRG slice.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    let base = match prg.len() {
        0x4000 => 0x3FFA,
        0x8000 => 0x7FFA,
        other => panic!("unsupported PRG length for vectors: {} bytes", other),
    };
    write_le_u16(prg, base, nmi);
    write_le_u16(prg, base + 2, reset);
    write_le_u16(prg, base + 4, irq);
}

#[inline]
fn write_le_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset] = (value & 0xFF) as u8;
    buf[offset + 1] = (value >> 8) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_ines() {
        let rom = build_ines(2, 1, 0x01, 0x00, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[6], 0x01);
        assert_eq!(rom.len(), 16 + 2 * 16 * 1024 + 8 * 1024);
    }

    #[test]
    fn vectors_land_at_bank_end() {
        let mut prg = vec![0u8; 16 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(prg[0x3FFA], 0x56);
        assert_eq!(prg[0x3FFB], 0x84);
        assert_eq!(prg[0x3FFC], 0x23);
        assert_eq!(prg[0x3FFD], 0x81);
        assert_eq!(prg[0x3FFE], 0xBC);
        assert_eq!(prg[0x3FFF], 0x8A);
    }

    #[test]
    fn nrom_with_prg_defaults_vectors_to_8000() {
        let rom = build_nrom_with_prg(&[0xA9, 0x01], 1, None);
        // RESET vector low/high at PRG offset 0x3FFC.
        assert_eq!(rom[16 + 0x3FFC], 0x00);
        assert_eq!(rom[16 + 0x3FFD], 0x80);
        assert_eq!(rom[16], 0xA9);
    }

    #[test]
    fn custom_image_keeps_payloads() {
        let prg = vec![0x11; 32 * 1024];
        let chr = vec![0x22; 8 * 1024];
        let rom = build_ines_custom(&prg, &chr, 0x10, 0);
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[16], 0x11);
        assert_eq!(rom[16 + 32 * 1024], 0x22);
    }
}
