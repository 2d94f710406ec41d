use super::timing::{CB_CYCLES, OPCODE_CYCLES, OPCODE_CYCLES_BRANCHED};
use super::*;

struct TestBus {
    memory: [u8; 0x10000],
    speed_switches: u32,
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: [0; 0x10000],
            speed_switches: 0,
        }
    }
}

impl Bus for TestBus {
    fn read8(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    fn switch_speed(&mut self) -> bool {
        self.speed_switches += 1;
        true
    }
}

fn cpu_at(pc: u16) -> Cpu {
    let mut cpu = Cpu::new();
    cpu.regs.pc = pc;
    cpu
}

#[test]
fn cpu_register_splits_into_halves() {
    let mut reg = CpuRegister::default();
    reg.set(0xBEEF);
    assert_eq!(reg.hi, 0xBE);
    assert_eq!(reg.lo, 0xEF);

    reg.lo = 0x01;
    assert_eq!(reg.get(), 0xBE01);
}

#[test]
fn set_af_masks_low_nibble_of_f() {
    let mut regs = Registers::default();
    regs.set_af(0x12FF);
    assert_eq!(regs.a(), 0x12);
    assert_eq!(regs.f(), 0xF0);
}

#[test]
fn reset_loads_post_boot_registers() {
    let mut cpu = Cpu::new();
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.pc, 0x0100);

    cpu.reset(true);
    assert_eq!(cpu.regs.af(), 0x11B0);
}

#[test]
fn nop_advances_pc() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();
    // 0x00: NOP
    bus.memory[0x0000] = 0x00;

    let cycles = cpu.step(&mut bus);

    assert_eq!(cpu.regs.pc, 0x0001);
    assert_eq!(cycles, 1);
}

#[test]
fn ld_16bit_and_basic_ld_indirect_work() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program:
    // 0x0000: LD BC, 0x1234
    // 0x0003: LD (BC), A
    // 0x0004: LD A, (BC)
    bus.memory[0x0000] = 0x01;
    bus.memory[0x0001] = 0x34;
    bus.memory[0x0002] = 0x12;
    bus.memory[0x0003] = 0x02;
    bus.memory[0x0004] = 0x0A;

    cpu.regs.set_a(0xAB);

    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.bc(), 0x1234);
    assert_eq!(cpu.regs.pc, 0x0003);

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(bus.memory[0x1234], 0xAB);

    cpu.regs.set_a(0x00);
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.a(), 0xAB);
}

#[test]
fn ld_r_r_and_hl_inc_dec_forms_work() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program:
    // 0x0000: LD HL, 0xC000
    // 0x0003: LD B, 0x12
    // 0x0005: LD (HL), B
    // 0x0006: LD A, (HL+)
    // 0x0007: LD (HL-), A
    // 0x0008: LD C, A
    bus.memory[0x0000..0x0009]
        .copy_from_slice(&[0x21, 0x00, 0xC0, 0x06, 0x12, 0x70, 0x2A, 0x32, 0x4F]);

    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.hl(), 0xC000);

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.bc.hi, 0x12);

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(bus.memory[0xC000], 0x12);

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.a(), 0x12);
    assert_eq!(cpu.regs.hl(), 0xC001);

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(bus.memory[0xC001], 0x12);
    assert_eq!(cpu.regs.hl(), 0xC000);

    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.bc.lo, 0x12);
}

#[test]
fn ldh_and_absolute_loads_hit_high_memory() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program:
    // 0x0000: LDH (0x80), A
    // 0x0002: LD (0xC123), A
    // 0x0005: LD A, (C)
    bus.memory[0x0000..0x0006].copy_from_slice(&[0xE0, 0x80, 0xEA, 0x23, 0xC1, 0xF2]);
    bus.memory[0xFF42] = 0x77;
    cpu.regs.set_a(0x5A);
    cpu.regs.bc.lo = 0x42;

    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(bus.memory[0xFF80], 0x5A);
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(bus.memory[0xC123], 0x5A);
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.a(), 0x77);
}

#[test]
fn ld_a16_sp_stores_little_endian() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();
    bus.memory[0x0000..0x0003].copy_from_slice(&[0x08, 0x00, 0xC0]);
    cpu.regs.sp = 0xBEEF;

    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(bus.memory[0xC000], 0xEF);
    assert_eq!(bus.memory[0xC001], 0xBE);
}

#[test]
fn inc_dec_8bit_update_flags_and_preserve_c() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: INC B; DEC B; INC A; DEC A
    bus.memory[0x0000..0x0004].copy_from_slice(&[0x04, 0x05, 0x3C, 0x3D]);

    cpu.regs.bc.hi = 0x0F;
    cpu.set_flag(Flag::C, true);

    // INC B: 0x0F -> 0x10, H=1, C unchanged.
    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.bc.hi, 0x10);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));

    // DEC B: 0x10 -> 0x0F, H=1 (borrow), N=1.
    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.bc.hi, 0x0F);
    assert!(cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));

    cpu.regs.set_a(0xFF);
    cpu.set_flag(Flag::C, false);

    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.a(), 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::H));

    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.a(), 0xFF);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::N));
}

#[test]
fn inc_dec_on_hl_memory() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: INC (HL); DEC (HL)
    bus.memory[0x0000] = 0x34;
    bus.memory[0x0001] = 0x35;
    cpu.regs.set_hl(0xC000);

    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(bus.memory[0xC000], 0x01);

    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(bus.memory[0xC000], 0x00);
    assert!(cpu.get_flag(Flag::Z));
}

#[test]
fn inc_dec_16bit_and_add_hl_rr_behaviour() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: INC BC; DEC BC; ADD HL,BC; ADD HL,SP
    bus.memory[0x0000..0x0004].copy_from_slice(&[0x03, 0x0B, 0x09, 0x39]);

    cpu.regs.set_bc(0x1234);
    cpu.regs.set_hl(0x0FFF);
    cpu.regs.sp = 0x0001;
    cpu.regs.set_f(0xF0);

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.bc(), 0x1235);
    assert_eq!(cpu.regs.f(), 0xF0);

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.bc(), 0x1234);
    assert_eq!(cpu.regs.f(), 0xF0);

    // 0x0FFF + 0x1234 = 0x2233; carry out of bit 11 only.
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.hl(), 0x2233);
    assert!(!cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));
    assert!(cpu.get_flag(Flag::Z));

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.hl(), 0x2234);
}

#[test]
fn add_sp_r8_signed_and_flags() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: ADD SP,+1; ADD SP,-1
    bus.memory[0x0000..0x0004].copy_from_slice(&[0xE8, 0x01, 0xE8, 0xFF]);
    cpu.regs.sp = 0x0FFF;

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.sp, 0x1000);
    assert!(!cpu.get_flag(Flag::Z));
    assert!(!cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.sp, 0x0FFF);
    assert!(!cpu.get_flag(Flag::Z));
}

#[test]
fn ld_hl_sp_plus_r8_and_ld_sp_hl() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: LD HL,SP+1; LD SP,HL
    bus.memory[0x0000..0x0003].copy_from_slice(&[0xF8, 0x01, 0xF9]);
    cpu.regs.sp = 0x0FFF;

    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.hl(), 0x1000);
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::C));

    cpu.set_flag(Flag::Z, true);
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.sp, 0x1000);
    assert!(cpu.get_flag(Flag::Z));
}

#[test]
fn push_and_pop_roundtrip_and_pop_af_masks_low_flags() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: PUSH BC; POP DE; POP AF
    bus.memory[0x0000..0x0003].copy_from_slice(&[0xC5, 0xD1, 0xF1]);
    cpu.regs.sp = 0xFFFE;
    cpu.regs.set_bc(0x1234);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.memory[0xFFFC], 0x34);
    assert_eq!(bus.memory[0xFFFD], 0x12);

    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.de(), 0x1234);
    assert_eq!(cpu.regs.sp, 0xFFFE);

    cpu.regs.sp = 0xFFFC;
    bus.memory[0xFFFC] = 0x3F;
    bus.memory[0xFFFD] = 0x12;

    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.a(), 0x12);
    assert_eq!(cpu.regs.f(), 0x30);
}

#[test]
fn alu_register_group_sets_documented_flags() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: ADD A,B; SUB A,B; ADC A,C; SBC A,C; AND D; XOR A; OR E; CP E
    bus.memory[0x0000..0x0008]
        .copy_from_slice(&[0x80, 0x90, 0x89, 0x99, 0xA2, 0xAF, 0xB3, 0xBB]);

    cpu.regs.set_a(0xF8);
    cpu.regs.bc.hi = 0x08;
    cpu.regs.bc.lo = 0x0F;
    cpu.regs.de.hi = 0x0F;
    cpu.regs.de.lo = 0x10;

    // 0xF8 + 0x08 = 0x00 with carry and half-carry.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x00);
    assert_eq!(cpu.regs.f(), 0xB0);

    // 0x00 - 0x08 = 0xF8, borrow from both nibble and byte.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0xF8);
    assert_eq!(cpu.regs.f(), 0x70);

    // ADC with carry in: 0xF8 + 0x0F + 1 = 0x08.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x08);
    assert_eq!(cpu.regs.f(), 0x30);

    // SBC with carry in: 0x08 - 0x0F - 1 = 0xF8.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0xF8);
    assert_eq!(cpu.regs.f(), 0x70);

    // AND always sets H.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x08);
    assert_eq!(cpu.regs.f(), 0x20);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x00);
    assert_eq!(cpu.regs.f(), 0x80);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x10);
    assert_eq!(cpu.regs.f(), 0x00);

    // CP leaves A alone.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x10);
    assert_eq!(cpu.regs.f(), 0xC0);
}

#[test]
fn daa_cpl_scf_ccf_behaviour() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program:
    // 0x0000: ADD A, 0x15
    // 0x0002: DAA
    // 0x0003: CPL
    // 0x0004: SCF
    // 0x0005: CCF
    bus.memory[0x0000..0x0006].copy_from_slice(&[0xC6, 0x15, 0x27, 0x2F, 0x37, 0x3F]);
    cpu.regs.set_a(0x27);

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.a(), 0x3C);

    // 27 + 15 = 42 in BCD.
    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.a(), 0x42);
    assert!(!cpu.get_flag(Flag::C));

    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.a(), !0x42);
    assert!(cpu.get_flag(Flag::H));
    assert!(cpu.get_flag(Flag::N));

    cpu.step(&mut bus);
    assert!(cpu.get_flag(Flag::C));
    assert!(!cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::N));

    cpu.step(&mut bus);
    assert!(!cpu.get_flag(Flag::C));
}

#[test]
fn daa_after_bcd_subtraction_and_overflowing_addition() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: SUB 0x38; DAA; ADD A,0x01; DAA
    bus.memory[0x0000..0x0006].copy_from_slice(&[0xD6, 0x38, 0x27, 0xC6, 0x01, 0x27]);
    cpu.regs.set_a(0x45);

    // 45 - 38 = 07 in BCD.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x0D);
    assert!(cpu.get_flag(Flag::H));
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x07);
    assert!(cpu.get_flag(Flag::N));
    assert!(!cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::C));

    // 99 + 01 = 100: A wraps to 00 with carry.
    cpu.regs.set_a(0x99);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x9A);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::C));
}

#[test]
fn rlca_rrca_rla_rra_behaviour() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: RLCA; RRCA; RLA; RRA
    bus.memory[0x0000..0x0004].copy_from_slice(&[0x07, 0x0F, 0x17, 0x1F]);
    cpu.regs.set_a(0b1000_0001);
    cpu.set_flag(Flag::C, false);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0b0000_0011);
    assert!(cpu.get_flag(Flag::C));

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0b1000_0001);
    assert!(cpu.get_flag(Flag::C));

    // RLA shifts the old carry into bit 0.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0b0000_0011);
    assert!(cpu.get_flag(Flag::C));

    // RRA with A=0b11 and C=1 -> 0b1000_0001, C=1; Z stays clear.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0b1000_0001);
    assert!(cpu.get_flag(Flag::C));
    assert!(!cpu.get_flag(Flag::Z));
}

#[test]
fn rotate_a_clears_zero_even_for_zero_result() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();
    bus.memory[0x0000] = 0x07; // RLCA
    cpu.regs.set_a(0x00);
    cpu.set_flag(Flag::Z, true);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x00);
    assert!(!cpu.get_flag(Flag::Z));
}

#[test]
fn cb_rotates_shifts_and_swap() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: RLC B; SRA C; SWAP D; SRL E; RL (HL)
    bus.memory[0x0000..0x000A]
        .copy_from_slice(&[0xCB, 0x00, 0xCB, 0x29, 0xCB, 0x32, 0xCB, 0x3B, 0xCB, 0x16]);
    cpu.regs.bc.hi = 0x80;
    cpu.regs.bc.lo = 0x81;
    cpu.regs.de.hi = 0xF1;
    cpu.regs.de.lo = 0x01;
    cpu.regs.set_hl(0xC000);
    bus.memory[0xC000] = 0x80;

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.bc.hi, 0x01);
    assert!(cpu.get_flag(Flag::C));

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.bc.lo, 0xC0);
    assert!(cpu.get_flag(Flag::C));

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.de.hi, 0x1F);
    assert!(!cpu.get_flag(Flag::C));

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.de.lo, 0x00);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::C));

    // RL (HL): 0x80 with C=1 -> 0x01, C=1.
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(bus.memory[0xC000], 0x01);
    assert!(cpu.get_flag(Flag::C));
}

#[test]
fn cb_bit_res_set_on_register_and_memory() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: BIT 7,A; BIT 0,(HL); RES 0,(HL); SET 3,B
    bus.memory[0x0000..0x0008]
        .copy_from_slice(&[0xCB, 0x7F, 0xCB, 0x46, 0xCB, 0x86, 0xCB, 0xD8]);
    cpu.regs.set_a(0x7F);
    cpu.regs.set_hl(0xC000);
    bus.memory[0xC000] = 0x01;
    cpu.set_flag(Flag::C, true);

    assert_eq!(cpu.step(&mut bus), 2);
    assert!(cpu.get_flag(Flag::Z));
    assert!(cpu.get_flag(Flag::H));
    assert!(!cpu.get_flag(Flag::N));
    assert!(cpu.get_flag(Flag::C));

    assert_eq!(cpu.step(&mut bus), 3);
    assert!(!cpu.get_flag(Flag::Z));

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(bus.memory[0xC000], 0x00);

    let flags = cpu.regs.f();
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.bc.hi, 0x08);
    assert_eq!(cpu.regs.f(), flags);
}

#[test]
fn conditional_branches_charge_taken_and_not_taken_costs() {
    let mut bus = TestBus::default();
    // JR NZ,+2
    bus.memory[0x0000] = 0x20;
    bus.memory[0x0001] = 0x02;

    let mut cpu = cpu_at(0x0000);
    cpu.set_flag(Flag::Z, true);
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.pc, 0x0002);

    let mut cpu = cpu_at(0x0000);
    cpu.set_flag(Flag::Z, false);
    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.pc, 0x0004);

    // JR -2 loops onto itself.
    bus.memory[0x0100] = 0x18;
    bus.memory[0x0101] = 0xFE;
    let mut cpu = cpu_at(0x0100);
    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.pc, 0x0100);
}

#[test]
fn call_and_ret_round_trip_with_conditions() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // 0x0000: CALL C,0x2000 (not taken)
    // 0x0003: CALL 0x2000
    // 0x2000: RET NC (taken)
    bus.memory[0x0000..0x0006].copy_from_slice(&[0xDC, 0x00, 0x20, 0xCD, 0x00, 0x20]);
    bus.memory[0x2000] = 0xD0;
    cpu.regs.sp = 0xFFFE;
    cpu.set_flag(Flag::C, false);

    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.pc, 0x0003);

    assert_eq!(cpu.step(&mut bus), 6);
    assert_eq!(cpu.regs.pc, 0x2000);
    assert_eq!(cpu.regs.sp, 0xFFFC);

    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.regs.pc, 0x0006);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn jp_cc_and_rst_vectors() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // 0x0000: JP Z,0x1234 (taken); 0x1234: RST 0x28
    bus.memory[0x0000..0x0003].copy_from_slice(&[0xCA, 0x34, 0x12]);
    bus.memory[0x1234] = 0xEF;
    cpu.regs.sp = 0xD000;
    cpu.set_flag(Flag::Z, true);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x1234);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x0028);
    assert_eq!(bus.memory[0xCFFE], 0x35);
    assert_eq!(bus.memory[0xCFFF], 0x12);
}

#[test]
fn interrupt_dispatch_picks_lowest_pending_bit() {
    let mut cpu = cpu_at(0x1234);
    let mut bus = TestBus::default();
    cpu.ime = true;
    cpu.regs.sp = 0xD000;
    bus.memory[0xFFFF] = 0x1F;
    // Timer and Joypad pending: Timer wins.
    bus.memory[0xFF0F] = 0x14;

    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.regs.pc, 0x0050);
    assert!(!cpu.ime);
    assert_eq!(bus.memory[0xFF0F], 0x10);
    assert_eq!(bus.memory[0xCFFE], 0x34);
    assert_eq!(bus.memory[0xCFFF], 0x12);
}

#[test]
fn masked_interrupt_is_not_dispatched() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();
    cpu.ime = true;
    bus.memory[0xFFFF] = 0x01;
    bus.memory[0xFF0F] = 0x02;

    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.pc, 0x0001);
    assert_eq!(bus.memory[0xFF0F], 0x02);
}

#[test]
#[should_panic]
fn servicing_out_of_range_interrupt_panics() {
    let mut cpu = Cpu::new();
    let mut bus = TestBus::default();
    cpu.service_interrupt(&mut bus, 5);
}

#[test]
fn halt_idles_until_interrupt_then_resumes_without_ime() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: HALT; INC A
    bus.memory[0x0000] = 0x76;
    bus.memory[0x0001] = 0x3C;
    bus.memory[0xFFFF] = 0x04;
    cpu.regs.set_a(0);

    assert_eq!(cpu.step(&mut bus), 1);
    assert!(cpu.halted);

    for _ in 0..3 {
        assert_eq!(cpu.step(&mut bus), 1);
        assert_eq!(cpu.regs.pc, 0x0001);
    }

    // Timer interrupt requested: HALT ends, the handler is not entered.
    bus.memory[0xFF0F] = 0x04;
    assert_eq!(cpu.step(&mut bus), 1);
    assert!(!cpu.halted);
    assert_eq!(cpu.regs.a(), 1);
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(bus.memory[0xFF0F], 0x04);
}

#[test]
fn halt_with_ime_vectors_to_handler() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();
    bus.memory[0x0000] = 0x76;
    bus.memory[0xFFFF] = 0x01;
    cpu.ime = true;
    cpu.regs.sp = 0xD000;

    cpu.step(&mut bus);
    assert!(cpu.halted);

    bus.memory[0xFF0F] = 0x01;
    assert_eq!(cpu.step(&mut bus), 5);
    assert!(!cpu.halted);
    assert_eq!(cpu.regs.pc, 0x0040);
}

#[test]
fn halt_bug_repeats_next_byte() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: HALT; INC A
    bus.memory[0x0000] = 0x76;
    bus.memory[0x0001] = 0x3C;
    bus.memory[0xFFFF] = 0x01;
    bus.memory[0xFF0F] = 0x01;
    cpu.regs.set_a(0);

    cpu.step(&mut bus);
    assert!(!cpu.halted);

    // INC A is fetched twice.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0001);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(cpu.regs.a(), 2);
}

#[test]
fn ei_enables_after_following_instruction() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: EI; NOP; NOP
    bus.memory[0x0000] = 0xFB;
    bus.memory[0xFFFF] = 0x01;
    bus.memory[0xFF0F] = 0x01;
    cpu.regs.sp = 0xD000;

    cpu.step(&mut bus);
    assert!(!cpu.ime);
    cpu.step(&mut bus);
    assert!(cpu.ime);
    assert_eq!(cpu.regs.pc, 0x0002);

    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.regs.pc, 0x0040);
}

#[test]
fn di_cancels_pending_ei() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();

    // Program: EI; DI; NOP
    bus.memory[0x0000] = 0xFB;
    bus.memory[0x0001] = 0xF3;

    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert!(!cpu.ime);
}

#[test]
fn reti_returns_and_enables_ime() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();
    bus.memory[0x0000] = 0xD9;
    bus.memory[0xCFFE] = 0x78;
    bus.memory[0xCFFF] = 0x56;
    cpu.regs.sp = 0xCFFE;

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x5678);
    assert!(cpu.ime);
}

#[test]
fn stop_skips_padding_and_requests_speed_switch() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();
    bus.memory[0x0000] = 0x10;
    bus.memory[0x0001] = 0x00;

    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(bus.speed_switches, 1);
}

#[test]
fn invalid_opcode_locks_cpu() {
    let mut cpu = cpu_at(0x0000);
    let mut bus = TestBus::default();
    bus.memory[0x0000] = 0xD3;

    cpu.step(&mut bus);
    assert!(cpu.is_locked());

    let pc = cpu.regs.pc;
    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.pc, pc);
}

#[test]
fn cycle_tables_match_reference_costs() {
    // Unconditional control flow.
    assert_eq!(OPCODE_CYCLES[0xC3], 4); // JP a16
    assert_eq!(OPCODE_CYCLES[0xCD], 6); // CALL a16
    assert_eq!(OPCODE_CYCLES[0xC9], 4); // RET
    assert_eq!(OPCODE_CYCLES[0xE9], 1); // JP HL

    // Conditional forms only differ when the branch is taken.
    for (op, not_taken, taken) in [(0x20, 2, 3), (0xC2, 3, 4), (0xC4, 3, 6), (0xC0, 2, 5)] {
        assert_eq!(OPCODE_CYCLES[op], not_taken, "opcode {op:#04x}");
        assert_eq!(OPCODE_CYCLES_BRANCHED[op], taken, "opcode {op:#04x}");
    }

    let differing = (0..256)
        .filter(|&op| OPCODE_CYCLES[op] != OPCODE_CYCLES_BRANCHED[op])
        .count();
    assert_eq!(differing, 16);

    // CB block: 2 for registers, 4 for (HL), 3 for BIT n,(HL).
    assert_eq!(OPCODE_CYCLES[0xCB] + CB_CYCLES[0x00], 2);
    assert_eq!(OPCODE_CYCLES[0xCB] + CB_CYCLES[0x06], 4);
    assert_eq!(OPCODE_CYCLES[0xCB] + CB_CYCLES[0x46], 3);
    assert_eq!(OPCODE_CYCLES[0xCB] + CB_CYCLES[0xFE], 4);
}

/// Documented M-cycle cost of a primary opcode, derived from its x/y/z/p/q
/// fields rather than from the lookup tables.
fn documented_cycles(op: u8, taken: bool) -> u32 {
    let (x, y, z) = (op >> 6, (op >> 3) & 7, op & 7);
    let (p, q) = (y >> 1, y & 1);
    let branch = |not_taken: u32, when_taken: u32| -> u32 { if taken { when_taken } else { not_taken } };

    match (x, z) {
        (0, 0) => match y {
            0 | 2 => 1,
            1 => 5,
            3 => 3,
            _ => branch(2, 3),
        },
        (0, 1) => if q == 0 { 3 } else { 2 },
        (0, 2) | (0, 3) => 2,
        (0, 4) | (0, 5) => if y == 6 { 3 } else { 1 },
        (0, 6) => if y == 6 { 3 } else { 2 },
        (0, 7) => 1,
        (1, _) if op == 0x76 => 1,
        (1, _) => if y == 6 || z == 6 { 2 } else { 1 },
        (2, _) => if z == 6 { 2 } else { 1 },
        (3, 0) => match y {
            0..=3 => branch(2, 5),
            5 => 4,
            _ => 3,
        },
        (3, 1) => match (q, p) {
            (0, _) => 3,
            (_, 0) | (_, 1) => 4,
            (_, 2) => 1,
            _ => 2,
        },
        (3, 2) => match y {
            0..=3 => branch(3, 4),
            4 | 6 => 2,
            _ => 4,
        },
        (3, 3) => if y == 0 { 4 } else { 1 },
        (3, 4) => if y < 4 { branch(3, 6) } else { 1 },
        (3, 5) => match (q, p) {
            (0, _) => 4,
            (_, 0) => 6,
            _ => 1,
        },
        (3, 6) => 2,
        _ => 4,
    }
}

/// Whether a conditional opcode branches when Z and C both equal `flags_set`.
fn condition_holds(op: u8, flags_set: bool) -> bool {
    // NZ/NC are the even conditions, Z/C the odd ones.
    let wants_set = (op >> 3) & 1 == 1;
    wants_set == flags_set
}

#[test]
fn every_opcode_steps_for_documented_cycles() {
    for op in (0..=0xFFu8).filter(|&op| op != 0xCB) {
        for flags_set in [false, true] {
            let mut cpu = cpu_at(0x0100);
            cpu.regs.sp = 0xD000;
            cpu.regs.set_f(if flags_set { 0xF0 } else { 0x00 });
            let mut bus = TestBus::default();
            bus.memory[0x0100] = op;

            let expected = documented_cycles(op, condition_holds(op, flags_set));
            assert_eq!(
                cpu.step(&mut bus),
                expected,
                "opcode {op:#04x} with Z/C {}",
                if flags_set { "set" } else { "clear" }
            );
        }
    }
}

#[test]
fn every_cb_opcode_steps_for_documented_cycles() {
    for op in 0..=0xFFu8 {
        let mut cpu = cpu_at(0x0100);
        let mut bus = TestBus::default();
        bus.memory[0x0100] = 0xCB;
        bus.memory[0x0101] = op;

        // (HL) operands cost two extra cycles, one for BIT.
        let expected = match (op >> 6, op & 7) {
            (1, 6) => 3,
            (_, 6) => 4,
            _ => 2,
        };
        assert_eq!(cpu.step(&mut bus), expected, "CB opcode {op:#04x}");
    }
}
