#![doc = r#"
famicore library crate.

Cycle-counted Nintendo Entertainment System core: a 6502 interpreter,
a dot-clocked 2C02 PPU, the CPU memory bus, and the common cartridge
mappers (NROM, MMC1, CNROM), assembled behind a small host-facing
orchestrator.

Modules:
- bus: CPU address-space routing, internal RAM, NMI/DMA latches
- cartridge: iNES v1 loader, RomDescriptor, mapper construction
- controller: serial joypad protocol at $4016/$4017
- cpu: table-driven 6502 core with whole-instruction cycle debt
- mappers: Mapper trait and the NROM/MMC1/CNROM implementations
- ppu: register protocol, whole-frame renderer, frame timing
- system: master-clock orchestrator and the host API

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod mappers;
pub mod ppu;
pub mod system;

// Re-export commonly used types at the crate root for convenience.
pub use bus::Bus;
pub use cartridge::{Cartridge, RomDescriptor, RomError};
pub use controller::Button;
pub use cpu::{Cpu, CpuSnapshot};
pub use ppu::Ppu;
pub use system::Nes;

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
