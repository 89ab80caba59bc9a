/*!
Mapper subsystem: trait definition and the concrete bank-switching
implementations (NROM, MMC1, CNROM).

Semantics:
- All read/write methods take full CPU or PPU addresses (unmasked).
  PRG methods are called for $4020..=$FFFF, CHR methods for
  $0000..=$1FFF; implementations decide banking and reject anything
  else by logging and returning 0 (open bus), never by panicking.
- The span reads return a contiguous borrow of the backing PRG/CHR
  storage for bulk consumers (OAM DMA, tile fetches). A request that
  cannot be satisfied contiguously returns an empty slice after
  logging; callers substitute zeroes.
- `reset()` reinitializes mapper-local state (bank registers, serial
  latches) on power/reset.
*/

mod cnrom;
mod mmc1;
mod nrom;

pub use cnrom::Cnrom;
pub use mmc1::Mmc1;
pub use nrom::Nrom;

/// Common interface all cartridge mappers implement.
pub trait Mapper {
    /// Mapper numeric identifier (e.g. 0 for NROM).
    fn id(&self) -> u16;

    /// Human-readable mapper name for log lines.
    fn name(&self) -> &'static str;

    /// CPU-visible read in cartridge space ($4020..=$FFFF).
    fn read_prg(&self, addr: u16) -> u8;

    /// CPU-visible write in cartridge space ($4020..=$FFFF).
    fn write_prg(&mut self, addr: u16, value: u8);

    /// PPU-visible pattern read ($0000..=$1FFF).
    fn read_chr(&self, addr: u16) -> u8;

    /// PPU-visible pattern write ($0000..=$1FFF).
    fn write_chr(&mut self, addr: u16, value: u8);

    /// Contiguous PRG view starting at `addr`, `count` bytes.
    fn read_prg_span(&self, addr: u16, count: usize) -> &[u8];

    /// Contiguous CHR view starting at `addr`, `count` bytes.
    fn read_chr_span(&self, addr: u16, count: usize) -> &[u8];

    /// Reset bank registers and latches to power-on state.
    fn reset(&mut self);
}
