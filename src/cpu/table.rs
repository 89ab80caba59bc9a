/*!
256-entry opcode table: instruction kind, addressing mode, base cycle
cost, and whether the documented page-cross penalty applies.

Base costs follow the published 6502 tables. Entries flagged with the
page-cross penalty add one cycle only when indexing actually crossed;
indexed stores and every read-modify-write form (including the
combined illegal opcodes) carry their full cost unconditionally.
Branches are listed at their not-taken cost; the taken/page-cross
extras come from the dispatcher.

Besides the documented set, the table carries the stable illegal
opcodes (LAX, SAX, USBC, DCP, ISC, SLO, RLA, SRE, RRA) and the
undocumented NOP variants. Opcodes left `None` (the JAM group and the
unstable illegals) are decoder misses: an emulator-side diagnostic,
never ROM-reachable behavior.
*/

use crate::cpu::addressing::AddrMode;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Stable illegal opcodes
    Lax,
    Sax,
    Usbc,
    Dcp,
    Isc,
    Slo,
    Rla,
    Sre,
    Rra,
}

impl Instruction {
    /// Mnemonic for diagnostics and traces.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Instruction::Adc => "ADC",
            Instruction::And => "AND",
            Instruction::Asl => "ASL",
            Instruction::Bcc => "BCC",
            Instruction::Bcs => "BCS",
            Instruction::Beq => "BEQ",
            Instruction::Bit => "BIT",
            Instruction::Bmi => "BMI",
            Instruction::Bne => "BNE",
            Instruction::Bpl => "BPL",
            Instruction::Brk => "BRK",
            Instruction::Bvc => "BVC",
            Instruction::Bvs => "BVS",
            Instruction::Clc => "CLC",
            Instruction::Cld => "CLD",
            Instruction::Cli => "CLI",
            Instruction::Clv => "CLV",
            Instruction::Cmp => "CMP",
            Instruction::Cpx => "CPX",
            Instruction::Cpy => "CPY",
            Instruction::Dec => "DEC",
            Instruction::Dex => "DEX",
            Instruction::Dey => "DEY",
            Instruction::Eor => "EOR",
            Instruction::Inc => "INC",
            Instruction::Inx => "INX",
            Instruction::Iny => "INY",
            Instruction::Jmp => "JMP",
            Instruction::Jsr => "JSR",
            Instruction::Lda => "LDA",
            Instruction::Ldx => "LDX",
            Instruction::Ldy => "LDY",
            Instruction::Lsr => "LSR",
            Instruction::Nop => "NOP",
            Instruction::Ora => "ORA",
            Instruction::Pha => "PHA",
            Instruction::Php => "PHP",
            Instruction::Pla => "PLA",
            Instruction::Plp => "PLP",
            Instruction::Rol => "ROL",
            Instruction::Ror => "ROR",
            Instruction::Rti => "RTI",
            Instruction::Rts => "RTS",
            Instruction::Sbc => "SBC",
            Instruction::Sec => "SEC",
            Instruction::Sed => "SED",
            Instruction::Sei => "SEI",
            Instruction::Sta => "STA",
            Instruction::Stx => "STX",
            Instruction::Sty => "STY",
            Instruction::Tax => "TAX",
            Instruction::Tay => "TAY",
            Instruction::Tsx => "TSX",
            Instruction::Txa => "TXA",
            Instruction::Txs => "TXS",
            Instruction::Tya => "TYA",
            Instruction::Lax => "LAX",
            Instruction::Sax => "SAX",
            Instruction::Usbc => "USBC",
            Instruction::Dcp => "DCP",
            Instruction::Isc => "ISC",
            Instruction::Slo => "SLO",
            Instruction::Rla => "RLA",
            Instruction::Sre => "SRE",
            Instruction::Rra => "RRA",
        }
    }
}

/// One decoded table row.
#[derive(Copy, Clone, Debug)]
pub struct OpInfo {
    pub instruction: Instruction,
    pub mode: AddrMode,
    pub cycles: u8,
    pub page_penalty: bool,
}

const fn op(instruction: Instruction, mode: AddrMode, cycles: u8) -> Option<OpInfo> {
    Some(OpInfo {
        instruction,
        mode,
        cycles,
        page_penalty: false,
    })
}

/// Entry that adds one cycle when indexing crosses a page.
const fn op_pc(instruction: Instruction, mode: AddrMode, cycles: u8) -> Option<OpInfo> {
    Some(OpInfo {
        instruction,
        mode,
        cycles,
        page_penalty: true,
    })
}

pub static OPCODES: [Option<OpInfo>; 256] = {
    use AddrMode::*;
    use Instruction::*;
    let mut t: [Option<OpInfo>; 256] = [None; 256];

    // ADC
    t[0x69] = op(Adc, Imm, 2);
    t[0x65] = op(Adc, Zp, 3);
    t[0x75] = op(Adc, ZpX, 4);
    t[0x6D] = op(Adc, Abs, 4);
    t[0x7D] = op_pc(Adc, AbsX, 4);
    t[0x79] = op_pc(Adc, AbsY, 4);
    t[0x61] = op(Adc, IndX, 6);
    t[0x71] = op_pc(Adc, IndY, 5);

    // AND
    t[0x29] = op(And, Imm, 2);
    t[0x25] = op(And, Zp, 3);
    t[0x35] = op(And, ZpX, 4);
    t[0x2D] = op(And, Abs, 4);
    t[0x3D] = op_pc(And, AbsX, 4);
    t[0x39] = op_pc(And, AbsY, 4);
    t[0x21] = op(And, IndX, 6);
    t[0x31] = op_pc(And, IndY, 5);

    // ASL
    t[0x0A] = op(Asl, Acc, 2);
    t[0x06] = op(Asl, Zp, 5);
    t[0x16] = op(Asl, ZpX, 6);
    t[0x0E] = op(Asl, Abs, 6);
    t[0x1E] = op(Asl, AbsX, 7);

    // Branches (cost 2 when not taken)
    t[0x90] = op(Bcc, Rel, 2);
    t[0xB0] = op(Bcs, Rel, 2);
    t[0xF0] = op(Beq, Rel, 2);
    t[0x30] = op(Bmi, Rel, 2);
    t[0xD0] = op(Bne, Rel, 2);
    t[0x10] = op(Bpl, Rel, 2);
    t[0x50] = op(Bvc, Rel, 2);
    t[0x70] = op(Bvs, Rel, 2);

    // BIT
    t[0x24] = op(Bit, Zp, 3);
    t[0x2C] = op(Bit, Abs, 4);

    // BRK
    t[0x00] = op(Brk, Imp, 7);

    // Flag clears/sets
    t[0x18] = op(Clc, Imp, 2);
    t[0xD8] = op(Cld, Imp, 2);
    t[0x58] = op(Cli, Imp, 2);
    t[0xB8] = op(Clv, Imp, 2);
    t[0x38] = op(Sec, Imp, 2);
    t[0xF8] = op(Sed, Imp, 2);
    t[0x78] = op(Sei, Imp, 2);

    // CMP
    t[0xC9] = op(Cmp, Imm, 2);
    t[0xC5] = op(Cmp, Zp, 3);
    t[0xD5] = op(Cmp, ZpX, 4);
    t[0xCD] = op(Cmp, Abs, 4);
    t[0xDD] = op_pc(Cmp, AbsX, 4);
    t[0xD9] = op_pc(Cmp, AbsY, 4);
    t[0xC1] = op(Cmp, IndX, 6);
    t[0xD1] = op_pc(Cmp, IndY, 5);

    // CPX / CPY
    t[0xE0] = op(Cpx, Imm, 2);
    t[0xE4] = op(Cpx, Zp, 3);
    t[0xEC] = op(Cpx, Abs, 4);
    t[0xC0] = op(Cpy, Imm, 2);
    t[0xC4] = op(Cpy, Zp, 3);
    t[0xCC] = op(Cpy, Abs, 4);

    // DEC / DEX / DEY
    t[0xC6] = op(Dec, Zp, 5);
    t[0xD6] = op(Dec, ZpX, 6);
    t[0xCE] = op(Dec, Abs, 6);
    t[0xDE] = op(Dec, AbsX, 7);
    t[0xCA] = op(Dex, Imp, 2);
    t[0x88] = op(Dey, Imp, 2);

    // EOR
    t[0x49] = op(Eor, Imm, 2);
    t[0x45] = op(Eor, Zp, 3);
    t[0x55] = op(Eor, ZpX, 4);
    t[0x4D] = op(Eor, Abs, 4);
    t[0x5D] = op_pc(Eor, AbsX, 4);
    t[0x59] = op_pc(Eor, AbsY, 4);
    t[0x41] = op(Eor, IndX, 6);
    t[0x51] = op_pc(Eor, IndY, 5);

    // INC / INX / INY
    t[0xE6] = op(Inc, Zp, 5);
    t[0xF6] = op(Inc, ZpX, 6);
    t[0xEE] = op(Inc, Abs, 6);
    t[0xFE] = op(Inc, AbsX, 7);
    t[0xE8] = op(Inx, Imp, 2);
    t[0xC8] = op(Iny, Imp, 2);

    // JMP / JSR
    t[0x4C] = op(Jmp, Abs, 3);
    t[0x6C] = op(Jmp, Ind, 5);
    t[0x20] = op(Jsr, Abs, 6);

    // LDA
    t[0xA9] = op(Lda, Imm, 2);
    t[0xA5] = op(Lda, Zp, 3);
    t[0xB5] = op(Lda, ZpX, 4);
    t[0xAD] = op(Lda, Abs, 4);
    t[0xBD] = op_pc(Lda, AbsX, 4);
    t[0xB9] = op_pc(Lda, AbsY, 4);
    t[0xA1] = op(Lda, IndX, 6);
    t[0xB1] = op_pc(Lda, IndY, 5);

    // LDX
    t[0xA2] = op(Ldx, Imm, 2);
    t[0xA6] = op(Ldx, Zp, 3);
    t[0xB6] = op(Ldx, ZpY, 4);
    t[0xAE] = op(Ldx, Abs, 4);
    t[0xBE] = op_pc(Ldx, AbsY, 4);

    // LDY
    t[0xA0] = op(Ldy, Imm, 2);
    t[0xA4] = op(Ldy, Zp, 3);
    t[0xB4] = op(Ldy, ZpX, 4);
    t[0xAC] = op(Ldy, Abs, 4);
    t[0xBC] = op_pc(Ldy, AbsX, 4);

    // LSR
    t[0x4A] = op(Lsr, Acc, 2);
    t[0x46] = op(Lsr, Zp, 5);
    t[0x56] = op(Lsr, ZpX, 6);
    t[0x4E] = op(Lsr, Abs, 6);
    t[0x5E] = op(Lsr, AbsX, 7);

    // NOP (documented) and its undocumented variants
    t[0xEA] = op(Nop, Imp, 2);
    t[0x1A] = op(Nop, Imp, 2);
    t[0x3A] = op(Nop, Imp, 2);
    t[0x5A] = op(Nop, Imp, 2);
    t[0x7A] = op(Nop, Imp, 2);
    t[0xDA] = op(Nop, Imp, 2);
    t[0xFA] = op(Nop, Imp, 2);
    t[0x80] = op(Nop, Imm, 2);
    t[0x82] = op(Nop, Imm, 2);
    t[0x89] = op(Nop, Imm, 2);
    t[0xC2] = op(Nop, Imm, 2);
    t[0xE2] = op(Nop, Imm, 2);
    t[0x04] = op(Nop, Zp, 3);
    t[0x44] = op(Nop, Zp, 3);
    t[0x64] = op(Nop, Zp, 3);
    t[0x14] = op(Nop, ZpX, 4);
    t[0x34] = op(Nop, ZpX, 4);
    t[0x54] = op(Nop, ZpX, 4);
    t[0x74] = op(Nop, ZpX, 4);
    t[0xD4] = op(Nop, ZpX, 4);
    t[0xF4] = op(Nop, ZpX, 4);
    t[0x0C] = op(Nop, Abs, 4);
    t[0x1C] = op_pc(Nop, AbsX, 4);
    t[0x3C] = op_pc(Nop, AbsX, 4);
    t[0x5C] = op_pc(Nop, AbsX, 4);
    t[0x7C] = op_pc(Nop, AbsX, 4);
    t[0xDC] = op_pc(Nop, AbsX, 4);
    t[0xFC] = op_pc(Nop, AbsX, 4);

    // ORA
    t[0x09] = op(Ora, Imm, 2);
    t[0x05] = op(Ora, Zp, 3);
    t[0x15] = op(Ora, ZpX, 4);
    t[0x0D] = op(Ora, Abs, 4);
    t[0x1D] = op_pc(Ora, AbsX, 4);
    t[0x19] = op_pc(Ora, AbsY, 4);
    t[0x01] = op(Ora, IndX, 6);
    t[0x11] = op_pc(Ora, IndY, 5);

    // Stack operations
    t[0x48] = op(Pha, Imp, 3);
    t[0x08] = op(Php, Imp, 3);
    t[0x68] = op(Pla, Imp, 4);
    t[0x28] = op(Plp, Imp, 4);

    // ROL / ROR
    t[0x2A] = op(Rol, Acc, 2);
    t[0x26] = op(Rol, Zp, 5);
    t[0x36] = op(Rol, ZpX, 6);
    t[0x2E] = op(Rol, Abs, 6);
    t[0x3E] = op(Rol, AbsX, 7);
    t[0x6A] = op(Ror, Acc, 2);
    t[0x66] = op(Ror, Zp, 5);
    t[0x76] = op(Ror, ZpX, 6);
    t[0x6E] = op(Ror, Abs, 6);
    t[0x7E] = op(Ror, AbsX, 7);

    // RTI / RTS
    t[0x40] = op(Rti, Imp, 6);
    t[0x60] = op(Rts, Imp, 6);

    // SBC (with the USBC immediate alias)
    t[0xE9] = op(Sbc, Imm, 2);
    t[0xE5] = op(Sbc, Zp, 3);
    t[0xF5] = op(Sbc, ZpX, 4);
    t[0xED] = op(Sbc, Abs, 4);
    t[0xFD] = op_pc(Sbc, AbsX, 4);
    t[0xF9] = op_pc(Sbc, AbsY, 4);
    t[0xE1] = op(Sbc, IndX, 6);
    t[0xF1] = op_pc(Sbc, IndY, 5);
    t[0xEB] = op(Usbc, Imm, 2);

    // STA (indexed stores never take the page-cross bonus)
    t[0x85] = op(Sta, Zp, 3);
    t[0x95] = op(Sta, ZpX, 4);
    t[0x8D] = op(Sta, Abs, 4);
    t[0x9D] = op(Sta, AbsX, 5);
    t[0x99] = op(Sta, AbsY, 5);
    t[0x81] = op(Sta, IndX, 6);
    t[0x91] = op(Sta, IndY, 6);

    // STX / STY
    t[0x86] = op(Stx, Zp, 3);
    t[0x96] = op(Stx, ZpY, 4);
    t[0x8E] = op(Stx, Abs, 4);
    t[0x84] = op(Sty, Zp, 3);
    t[0x94] = op(Sty, ZpX, 4);
    t[0x8C] = op(Sty, Abs, 4);

    // Transfers
    t[0xAA] = op(Tax, Imp, 2);
    t[0xA8] = op(Tay, Imp, 2);
    t[0xBA] = op(Tsx, Imp, 2);
    t[0x8A] = op(Txa, Imp, 2);
    t[0x9A] = op(Txs, Imp, 2);
    t[0x98] = op(Tya, Imp, 2);

    // LAX
    t[0xA7] = op(Lax, Zp, 3);
    t[0xB7] = op(Lax, ZpY, 4);
    t[0xAF] = op(Lax, Abs, 4);
    t[0xBF] = op_pc(Lax, AbsY, 4);
    t[0xA3] = op(Lax, IndX, 6);
    t[0xB3] = op_pc(Lax, IndY, 5);

    // SAX
    t[0x87] = op(Sax, Zp, 3);
    t[0x97] = op(Sax, ZpY, 4);
    t[0x8F] = op(Sax, Abs, 4);
    t[0x83] = op(Sax, IndX, 6);

    // DCP
    t[0xC7] = op(Dcp, Zp, 5);
    t[0xD7] = op(Dcp, ZpX, 6);
    t[0xCF] = op(Dcp, Abs, 6);
    t[0xDF] = op(Dcp, AbsX, 7);
    t[0xDB] = op(Dcp, AbsY, 7);
    t[0xC3] = op(Dcp, IndX, 8);
    t[0xD3] = op(Dcp, IndY, 8);

    // ISC
    t[0xE7] = op(Isc, Zp, 5);
    t[0xF7] = op(Isc, ZpX, 6);
    t[0xEF] = op(Isc, Abs, 6);
    t[0xFF] = op(Isc, AbsX, 7);
    t[0xFB] = op(Isc, AbsY, 7);
    t[0xE3] = op(Isc, IndX, 8);
    t[0xF3] = op(Isc, IndY, 8);

    // SLO
    t[0x07] = op(Slo, Zp, 5);
    t[0x17] = op(Slo, ZpX, 6);
    t[0x0F] = op(Slo, Abs, 6);
    t[0x1F] = op(Slo, AbsX, 7);
    t[0x1B] = op(Slo, AbsY, 7);
    t[0x03] = op(Slo, IndX, 8);
    t[0x13] = op(Slo, IndY, 8);

    // RLA
    t[0x27] = op(Rla, Zp, 5);
    t[0x37] = op(Rla, ZpX, 6);
    t[0x2F] = op(Rla, Abs, 6);
    t[0x3F] = op(Rla, AbsX, 7);
    t[0x3B] = op(Rla, AbsY, 7);
    t[0x23] = op(Rla, IndX, 8);
    t[0x33] = op(Rla, IndY, 8);

    // SRE
    t[0x47] = op(Sre, Zp, 5);
    t[0x57] = op(Sre, ZpX, 6);
    t[0x4F] = op(Sre, Abs, 6);
    t[0x5F] = op(Sre, AbsX, 7);
    t[0x5B] = op(Sre, AbsY, 7);
    t[0x43] = op(Sre, IndX, 8);
    t[0x53] = op(Sre, IndY, 8);

    // RRA
    t[0x67] = op(Rra, Zp, 5);
    t[0x77] = op(Rra, ZpX, 6);
    t[0x6F] = op(Rra, Abs, 6);
    t[0x7F] = op(Rra, AbsX, 7);
    t[0x7B] = op(Rra, AbsY, 7);
    t[0x63] = op(Rra, IndX, 8);
    t[0x73] = op(Rra, IndY, 8);

    t
};
