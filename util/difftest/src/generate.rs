//! Generates random, well-formed RV32IM instruction words — encoding is the
//! mirror image of `ckt_isa`'s decoder, so every word this produces decodes
//! cleanly on both sides of the differential check.

use rand::Rng;

fn r_type(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

fn i_type(imm: i32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    (((imm as u32) & 0xFFF) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
}

fn s_type(imm: i32, rs2: u32, rs1: u32, funct3: u32, opcode: u32) -> u32 {
    let raw = imm as u32 & 0xFFF;
    ((raw >> 5) << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | ((raw & 0x1F) << 7) | opcode
}

fn b_type(imm: i32, rs2: u32, rs1: u32, funct3: u32, opcode: u32) -> u32 {
    let raw = imm as u32;
    (((raw >> 12) & 1) << 31)
        | (((raw >> 5) & 0x3F) << 25)
        | (rs2 << 20)
        | (rs1 << 15)
        | (funct3 << 12)
        | (((raw >> 1) & 0xF) << 8)
        | (((raw >> 11) & 1) << 7)
        | opcode
}

fn u_type(imm: i32, rd: u32, opcode: u32) -> u32 {
    ((imm as u32) & 0xFFFF_F000) | (rd << 7) | opcode
}

fn j_type(imm: i32, rd: u32, opcode: u32) -> u32 {
    let raw = imm as u32;
    (((raw >> 20) & 1) << 31)
        | (((raw >> 1) & 0x3FF) << 21)
        | (((raw >> 11) & 1) << 20)
        | (((raw >> 12) & 0xFF) << 12)
        | (rd << 7)
        | opcode
}

fn reg(rng: &mut impl Rng) -> u32 {
    rng.random_range(0..32)
}

/// A 12-bit signed immediate, the range every I/S-type instruction accepts.
fn imm12(rng: &mut impl Rng) -> i32 {
    rng.random_range(-2048..2048)
}

/// A branch offset: even, within the 13-bit signed range B-type encodes.
fn b_imm(rng: &mut impl Rng) -> i32 {
    rng.random_range(-2048..2048) * 2
}

/// A jump offset: even, within the 21-bit signed range J-type encodes.
fn j_imm(rng: &mut impl Rng) -> i32 {
    rng.random_range(-(1 << 19)..(1 << 19)) * 2
}

const REG_OPS: [(u32, u32); 18] = [
    (0b000, 0b000_0000), // ADD
    (0b000, 0b010_0000), // SUB
    (0b001, 0b000_0000), // SLL
    (0b010, 0b000_0000), // SLT
    (0b011, 0b000_0000), // SLTU
    (0b100, 0b000_0000), // XOR
    (0b101, 0b000_0000), // SRL
    (0b101, 0b010_0000), // SRA
    (0b110, 0b000_0000), // OR
    (0b111, 0b000_0000), // AND
    (0b000, 0b000_0001), // MUL
    (0b001, 0b000_0001), // MULH
    (0b010, 0b000_0001), // MULHSU
    (0b011, 0b000_0001), // MULHU
    (0b100, 0b000_0001), // DIV
    (0b101, 0b000_0001), // DIVU
    (0b110, 0b000_0001), // REM
    (0b111, 0b000_0001), // REMU
];

fn random_reg_op(rng: &mut impl Rng) -> u32 {
    let (funct3, funct7) = REG_OPS[rng.random_range(0..REG_OPS.len())];
    r_type(funct7, reg(rng), reg(rng), funct3, reg(rng), 0b011_0011)
}

fn random_imm_op(rng: &mut impl Rng) -> u32 {
    match rng.random_range(0..9) {
        0 => i_type(imm12(rng), reg(rng), 0b000, reg(rng), 0b001_0011), // ADDI
        1 => i_type(imm12(rng), reg(rng), 0b010, reg(rng), 0b001_0011), // SLTI
        2 => i_type(imm12(rng), reg(rng), 0b011, reg(rng), 0b001_0011), // SLTIU
        3 => i_type(imm12(rng), reg(rng), 0b100, reg(rng), 0b001_0011), // XORI
        4 => i_type(imm12(rng), reg(rng), 0b110, reg(rng), 0b001_0011), // ORI
        5 => i_type(imm12(rng), reg(rng), 0b111, reg(rng), 0b001_0011), // ANDI
        6 => r_type(0, rng.random_range(0..32), reg(rng), 0b001, reg(rng), 0b001_0011), // SLLI
        7 => r_type(0, rng.random_range(0..32), reg(rng), 0b101, reg(rng), 0b001_0011), // SRLI
        _ => r_type(0b010_0000, rng.random_range(0..32), reg(rng), 0b101, reg(rng), 0b001_0011), // SRAI
    }
}

fn random_load(rng: &mut impl Rng) -> u32 {
    let funct3 = [0b000, 0b001, 0b010, 0b100, 0b101][rng.random_range(0..5)];
    i_type(imm12(rng), reg(rng), funct3, reg(rng), 0b000_0011)
}

fn random_store(rng: &mut impl Rng) -> u32 {
    let funct3 = [0b000, 0b001, 0b010][rng.random_range(0..3)];
    s_type(imm12(rng), reg(rng), reg(rng), funct3, 0b010_0011)
}

fn random_branch(rng: &mut impl Rng) -> u32 {
    let funct3 = [0b000, 0b001, 0b100, 0b101, 0b110, 0b111][rng.random_range(0..6)];
    b_type(b_imm(rng), reg(rng), reg(rng), funct3, 0b110_0011)
}

/// Generates `count` random instruction words, excluding `ecall`/`ebreak`
/// (which would halt the walk before the program finishes) and `fence`
/// (zero gates, nothing to cross-check).
pub fn random_program(rng: &mut impl Rng, count: usize) -> Vec<u32> {
    (0..count)
        .map(|_| match rng.random_range(0..8) {
            0 => random_reg_op(rng),
            1 => random_imm_op(rng),
            2 => random_load(rng),
            3 => random_store(rng),
            4 => random_branch(rng),
            5 => u_type(rng.random::<i32>(), reg(rng), 0b011_0111), // LUI
            6 => u_type(rng.random::<i32>(), reg(rng), 0b001_0111), // AUIPC
            _ => match rng.random_range(0..2) {
                0 => j_type(j_imm(rng), reg(rng), 0b110_1111),                 // JAL
                _ => i_type(imm12(rng), reg(rng), 0, reg(rng), 0b110_0111),    // JALR
            },
        })
        .collect()
}
