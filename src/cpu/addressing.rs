/*!
Addressing modes and operand resolution.

`fetch_operand` is called with PC still pointing at the opcode; it
reads the operand bytes at PC+1/PC+2 and resolves the effective
address without advancing PC (the dispatcher advances PC by the
mode's instruction size afterwards). For every mode with an effective
address the operand value is the byte read there, so register writes
through the bus see the same access pattern the interpreter does.

Quirks carried from the hardware:
- JMP (indirect) fetches the high pointer byte without crossing the
  page (the 6502 page-wrap bug).
- Zero-page indexed and indirect pointers wrap within page zero.
- The relative mode reports a page crossing against the pre-advance
  PC, which is what the branch cycle penalty keys off.
*/

use crate::bus::Bus;
use crate::cpu::state::Registers;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddrMode {
    Imp,
    Acc,
    Imm,
    Zp,
    ZpX,
    ZpY,
    Rel,
    Abs,
    AbsX,
    AbsY,
    Ind,
    IndX,
    IndY,
}

impl AddrMode {
    /// Total instruction size (opcode + operand bytes) for the mode.
    pub fn instruction_size(self) -> u16 {
        match self {
            AddrMode::Imp | AddrMode::Acc => 1,
            AddrMode::Imm
            | AddrMode::Zp
            | AddrMode::ZpX
            | AddrMode::ZpY
            | AddrMode::Rel
            | AddrMode::IndX
            | AddrMode::IndY => 2,
            AddrMode::Abs | AddrMode::AbsX | AddrMode::AbsY | AddrMode::Ind => 3,
        }
    }
}

/// Resolved operand: the value read, the effective address (0 for the
/// modes that have none), and whether indexing crossed a page.
#[derive(Copy, Clone, Debug, Default)]
pub struct Operand {
    pub value: u8,
    pub addr: u16,
    pub page_crossed: bool,
}

#[inline]
fn join(lo: u8, hi: u8) -> u16 {
    (hi as u16) << 8 | lo as u16
}

/// Resolve the operand for `mode` with PC at the opcode byte.
pub(crate) fn fetch_operand(regs: &Registers, bus: &mut Bus, mode: AddrMode) -> Operand {
    let pc = regs.pc;
    match mode {
        AddrMode::Imp => Operand::default(),
        AddrMode::Acc => Operand {
            value: regs.a,
            ..Operand::default()
        },
        AddrMode::Imm => {
            let addr = pc.wrapping_add(1);
            Operand {
                value: bus.read(addr),
                addr,
                page_crossed: false,
            }
        }
        AddrMode::Zp => {
            let addr = bus.read(pc.wrapping_add(1)) as u16;
            Operand {
                value: bus.read(addr),
                addr,
                page_crossed: false,
            }
        }
        AddrMode::ZpX => {
            let addr = bus.read(pc.wrapping_add(1)).wrapping_add(regs.x) as u16;
            Operand {
                value: bus.read(addr),
                addr,
                page_crossed: false,
            }
        }
        AddrMode::ZpY => {
            let addr = bus.read(pc.wrapping_add(1)).wrapping_add(regs.y) as u16;
            Operand {
                value: bus.read(addr),
                addr,
                page_crossed: false,
            }
        }
        AddrMode::Rel => {
            let addr = pc.wrapping_add(1);
            let offset = bus.read(addr);
            let target = pc.wrapping_add(offset as i8 as u16);
            Operand {
                value: offset,
                addr,
                page_crossed: pc & 0xFF00 != target & 0xFF00,
            }
        }
        AddrMode::Abs => {
            let lo = bus.read(pc.wrapping_add(1));
            let hi = bus.read(pc.wrapping_add(2));
            let addr = join(lo, hi);
            Operand {
                value: bus.read(addr),
                addr,
                page_crossed: false,
            }
        }
        AddrMode::AbsX => {
            let lo = bus.read(pc.wrapping_add(1));
            let hi = bus.read(pc.wrapping_add(2));
            let base = join(lo, hi);
            let addr = base.wrapping_add(regs.x as u16);
            Operand {
                value: bus.read(addr),
                addr,
                page_crossed: lo as u16 + regs.x as u16 > 0xFF,
            }
        }
        AddrMode::AbsY => {
            let lo = bus.read(pc.wrapping_add(1));
            let hi = bus.read(pc.wrapping_add(2));
            let base = join(lo, hi);
            let addr = base.wrapping_add(regs.y as u16);
            Operand {
                value: bus.read(addr),
                addr,
                page_crossed: lo as u16 + regs.y as u16 > 0xFF,
            }
        }
        AddrMode::Ind => {
            let lo = bus.read(pc.wrapping_add(1));
            let hi = bus.read(pc.wrapping_add(2));
            let ptr = join(lo, hi);
            // The high pointer byte never crosses the page.
            let target_lo = bus.read(ptr);
            let target_hi = bus.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF));
            let addr = join(target_lo, target_hi);
            Operand {
                value: bus.read(addr),
                addr,
                page_crossed: false,
            }
        }
        AddrMode::IndX => {
            let zp = bus.read(pc.wrapping_add(1)).wrapping_add(regs.x);
            let lo = bus.read(zp as u16);
            let hi = bus.read(zp.wrapping_add(1) as u16);
            let addr = join(lo, hi);
            Operand {
                value: bus.read(addr),
                addr,
                page_crossed: false,
            }
        }
        AddrMode::IndY => {
            let zp = bus.read(pc.wrapping_add(1)) as u16;
            let lo = bus.read(zp);
            let hi = bus.read((zp + 1) & 0x00FF);
            let addr = join(lo, hi).wrapping_add(regs.y as u16);
            Operand {
                value: bus.read(addr),
                addr,
                page_crossed: lo as u16 + regs.y as u16 > 0xFF,
            }
        }
    }
}
