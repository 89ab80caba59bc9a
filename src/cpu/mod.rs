/*!
6502 CPU core on the whole-instruction cycle-debt model.

Every master-clock CPU step calls `tick`, which increments the global
cycle counter and pays down one cycle of debt if an instruction is
still "executing". With the debt drained the CPU first consumes a
pending NMI from the bus (the latch is only checked at an instruction
boundary), then fetches, decodes through the 256-entry table, resolves
the operand, advances PC, executes, and charges the instruction's full
cycle cost - base cycles plus any page-cross or branch-taken penalty -
as new debt. An OAM DMA latched during the instruction adds 513 stall
cycles (514 when the cycle counter is odd) before the next fetch.

An opcode missing from the table is an emulator defect, not guest
behavior: the core logs a diagnostic and halts instead of guessing.

Submodules:
- state: register file, flag masks, status push/pop composition
- addressing: operand resolution per addressing mode
- table: the 256-entry opcode table
- execute: per-operation semantic helpers
*/

pub mod addressing;
pub mod execute;
pub mod state;
pub mod table;

use log::error;

use crate::bus::Bus;
use crate::cpu::addressing::{fetch_operand, AddrMode, Operand};
use crate::cpu::execute::{
    adc, and, bit, branch, compare, eor, lda, ldx, ldy, ora, pop, pop_word, push, push_word, rmw,
    sbc,
};
use crate::cpu::execute::{asl_value, lsr_value, rol_value, ror_value};
use crate::cpu::state::{Registers, CARRY, IRQ_DISABLE, NEGATIVE, OVERFLOW, ZERO};
use crate::cpu::table::{Instruction, OpInfo, OPCODES};

pub use crate::cpu::state::CpuSnapshot;

const NMI_VECTOR: u16 = 0xFFFA;
const RESET_VECTOR: u16 = 0xFFFC;
const IRQ_VECTOR: u16 = 0xFFFE;

/// OAM DMA stall: 513 cycles, 514 when started on an odd CPU cycle.
const DMA_BASE_STALL: u32 = 513;

pub struct Cpu {
    regs: Registers,
    cycle: u64,
    pending_cycles: u32,
    halted: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            cycle: 0,
            pending_cycles: 0,
            halted: false,
        }
    }

    /// Power/reset: registers to power-up state, PC from the reset
    /// vector, cycle counter at 7 for the hardware startup sequence.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.regs = Registers::new();
        self.regs.pc = bus.read_word(RESET_VECTOR);
        self.cycle = 7;
        self.pending_cycles = 0;
        self.halted = false;
    }

    /// One CPU clock. Pays debt, services NMI at instruction
    /// boundaries, otherwise fetches and executes one instruction and
    /// charges its cycle cost.
    pub fn tick(&mut self, bus: &mut Bus) {
        self.cycle += 1;

        if self.pending_cycles > 0 {
            self.pending_cycles -= 1;
            return;
        }
        if self.halted {
            return;
        }

        if bus.take_nmi() {
            self.service_nmi(bus);
        }

        let opcode = bus.read(self.regs.pc);
        let Some(info) = OPCODES[opcode as usize] else {
            error!(
                "decoder miss: opcode {:#04X} at {:#06X}; halting",
                opcode, self.regs.pc
            );
            self.halted = true;
            return;
        };

        let operand = fetch_operand(&self.regs, bus, info.mode);
        self.regs.pc = self.regs.pc.wrapping_add(info.mode.instruction_size());

        let extra = self.execute(bus, &info, operand);

        let mut debt = info.cycles as u32 + extra;
        if info.page_penalty && operand.page_crossed {
            debt += 1;
        }
        self.pending_cycles = debt;

        if bus.take_dma() {
            self.pending_cycles += DMA_BASE_STALL + u32::from(self.cycle % 2 == 1);
        }
    }

    /// NMI entry: stack the return state and vector through $FFFA.
    /// The pushed P has Break clear; I is set on entry.
    fn service_nmi(&mut self, bus: &mut Bus) {
        let pc = self.regs.pc;
        push_word(&mut self.regs, bus, pc);
        let status = self.regs.status_for_push(false);
        push(&mut self.regs, bus, status);
        self.regs.set_flag(IRQ_DISABLE, true);
        self.regs.pc = bus.read_word(NMI_VECTOR);
    }

    fn execute(&mut self, bus: &mut Bus, info: &OpInfo, operand: Operand) -> u32 {
        use Instruction::*;
        let regs = &mut self.regs;
        match info.instruction {
            // Loads / stores / transfers
            Lda => lda(regs, operand.value),
            Ldx => ldx(regs, operand.value),
            Ldy => ldy(regs, operand.value),
            Sta => bus.write(operand.addr, regs.a),
            Stx => bus.write(operand.addr, regs.x),
            Sty => bus.write(operand.addr, regs.y),
            Tax => {
                regs.x = regs.a;
                regs.update_zn(regs.x);
            }
            Tay => {
                regs.y = regs.a;
                regs.update_zn(regs.y);
            }
            Tsx => {
                regs.x = regs.sp;
                regs.update_zn(regs.x);
            }
            Txa => {
                regs.a = regs.x;
                regs.update_zn(regs.a);
            }
            Txs => regs.sp = regs.x,
            Tya => {
                regs.a = regs.y;
                regs.update_zn(regs.a);
            }

            // Logicals / arithmetic
            And => and(regs, operand.value),
            Ora => ora(regs, operand.value),
            Eor => eor(regs, operand.value),
            Bit => bit(regs, operand.value),
            Adc => adc(regs, operand.value),
            Sbc | Usbc => sbc(regs, operand.value),
            Cmp => {
                let a = regs.a;
                compare(regs, a, operand.value);
            }
            Cpx => {
                let x = regs.x;
                compare(regs, x, operand.value);
            }
            Cpy => {
                let y = regs.y;
                compare(regs, y, operand.value);
            }

            // Register increments/decrements
            Inx => {
                regs.x = regs.x.wrapping_add(1);
                regs.update_zn(regs.x);
            }
            Iny => {
                regs.y = regs.y.wrapping_add(1);
                regs.update_zn(regs.y);
            }
            Dex => {
                regs.x = regs.x.wrapping_sub(1);
                regs.update_zn(regs.x);
            }
            Dey => {
                regs.y = regs.y.wrapping_sub(1);
                regs.update_zn(regs.y);
            }

            // Memory RMW
            Inc => {
                let v = rmw(regs, bus, operand.addr, |_, old| old.wrapping_add(1));
                regs.update_zn(v);
            }
            Dec => {
                let v = rmw(regs, bus, operand.addr, |_, old| old.wrapping_sub(1));
                regs.update_zn(v);
            }

            // Shifts / rotates
            Asl => {
                if info.mode == AddrMode::Acc {
                    regs.a = asl_value(regs, operand.value);
                } else {
                    rmw(regs, bus, operand.addr, asl_value);
                }
            }
            Lsr => {
                if info.mode == AddrMode::Acc {
                    regs.a = lsr_value(regs, operand.value);
                } else {
                    rmw(regs, bus, operand.addr, lsr_value);
                }
            }
            Rol => {
                if info.mode == AddrMode::Acc {
                    regs.a = rol_value(regs, operand.value);
                } else {
                    rmw(regs, bus, operand.addr, rol_value);
                }
            }
            Ror => {
                if info.mode == AddrMode::Acc {
                    regs.a = ror_value(regs, operand.value);
                } else {
                    rmw(regs, bus, operand.addr, ror_value);
                }
            }

            // Flag operations
            Clc => regs.set_flag(CARRY, false),
            Sec => regs.set_flag(CARRY, true),
            Cli => regs.set_flag(IRQ_DISABLE, false),
            Sei => regs.set_flag(IRQ_DISABLE, true),
            Cld => regs.set_flag(state::DECIMAL, false),
            Sed => regs.set_flag(state::DECIMAL, true),
            Clv => regs.set_flag(OVERFLOW, false),

            // Branches
            Bcc => {
                let taken = !regs.get_flag(CARRY);
                return branch(regs, taken, operand.value, operand.page_crossed);
            }
            Bcs => {
                let taken = regs.get_flag(CARRY);
                return branch(regs, taken, operand.value, operand.page_crossed);
            }
            Beq => {
                let taken = regs.get_flag(ZERO);
                return branch(regs, taken, operand.value, operand.page_crossed);
            }
            Bne => {
                let taken = !regs.get_flag(ZERO);
                return branch(regs, taken, operand.value, operand.page_crossed);
            }
            Bmi => {
                let taken = regs.get_flag(NEGATIVE);
                return branch(regs, taken, operand.value, operand.page_crossed);
            }
            Bpl => {
                let taken = !regs.get_flag(NEGATIVE);
                return branch(regs, taken, operand.value, operand.page_crossed);
            }
            Bvc => {
                let taken = !regs.get_flag(OVERFLOW);
                return branch(regs, taken, operand.value, operand.page_crossed);
            }
            Bvs => {
                let taken = regs.get_flag(OVERFLOW);
                return branch(regs, taken, operand.value, operand.page_crossed);
            }

            // Control flow
            Jmp => regs.pc = operand.addr,
            Jsr => {
                let ret = regs.pc.wrapping_sub(1);
                push_word(regs, bus, ret);
                regs.pc = operand.addr;
            }
            Rts => {
                regs.pc = pop_word(regs, bus).wrapping_add(1);
            }
            Rti => {
                let status = pop(regs, bus);
                regs.status = Registers::status_from_pop(status);
                regs.pc = pop_word(regs, bus);
            }
            Brk => {
                let ret = regs.pc.wrapping_add(1);
                push_word(regs, bus, ret);
                let status = regs.status_for_push(true);
                push(regs, bus, status);
                regs.set_flag(IRQ_DISABLE, true);
                regs.pc = bus.read_word(IRQ_VECTOR);
            }

            // Stack
            Pha => {
                let a = regs.a;
                push(regs, bus, a);
            }
            Php => {
                let status = regs.status_for_push(true);
                push(regs, bus, status);
            }
            Pla => {
                let v = pop(regs, bus);
                regs.a = v;
                regs.update_zn(v);
            }
            Plp => {
                let v = pop(regs, bus);
                regs.status = Registers::status_from_pop(v);
            }

            Nop => {}

            // Stable illegal opcodes
            Lax => {
                regs.a = operand.value;
                regs.x = operand.value;
                regs.update_zn(operand.value);
            }
            Sax => bus.write(operand.addr, regs.a & regs.x),
            Dcp => {
                let v = rmw(regs, bus, operand.addr, |_, old| old.wrapping_sub(1));
                let a = regs.a;
                compare(regs, a, v);
            }
            Isc => {
                let v = rmw(regs, bus, operand.addr, |_, old| old.wrapping_add(1));
                sbc(regs, v);
            }
            Slo => {
                let v = rmw(regs, bus, operand.addr, asl_value);
                ora(regs, v);
            }
            Rla => {
                let v = rmw(regs, bus, operand.addr, rol_value);
                and(regs, v);
            }
            Sre => {
                let v = rmw(regs, bus, operand.addr, lsr_value);
                eor(regs, v);
            }
            Rra => {
                let v = rmw(regs, bus, operand.addr, ror_value);
                adc(regs, v);
            }
        }
        0
    }

    // -------------- Host-facing state --------------

    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            pc: self.regs.pc,
            a: self.regs.a,
            x: self.regs.x,
            y: self.regs.y,
            sp: self.regs.sp,
            status: self.regs.status,
            cycle: self.cycle,
        }
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Cycles still owed by the instruction in flight.
    pub fn pending_cycles(&self) -> u32 {
        self.pending_cycles
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }
}
