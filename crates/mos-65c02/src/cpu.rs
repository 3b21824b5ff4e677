//! 65C02 CPU execution engine.
//!
//! Cycle-accurate emulation at the pin level: each [`Mos65C02::tick`]
//! consumes the pin vector the driver presents, performs one rising-edge
//! cycle of bus and register activity, and returns the pin vector the
//! chip drives for that cycle. Instructions are decomposed into explicit
//! per-cycle micro-programs dispatched on (opcode, micro-step).

use log::{debug, trace};

use crate::Fault;
use crate::flags;
use crate::pins::{self, Pins};
use crate::registers::Registers;

/// Pending-IRQ bit, consumed by the BRK micro-program.
const BRK_IRQ: u8 = 1 << 0;
/// Pending-NMI bit.
const BRK_NMI: u8 = 1 << 1;
/// Pending-reset bit.
const BRK_RESET: u8 = 1 << 2;

/// Read-operand micro-operation. Faults only for decimal-mode ADC/SBC.
type ReadOp = fn(&mut Mos65C02, u8) -> Result<(), Fault>;

/// Read-modify-write micro-operation: operand in, result out.
type ModifyOp = fn(&mut Mos65C02, u8) -> u8;

/// The MOS 65C02 CPU.
///
/// One `tick` per half-clock edge; only the PHI2 rising edge does work.
/// Multi-cycle instructions resume from the packed instruction register
/// (`opcode << 3 | micro_step`), so a snapshot of the struct mid-flight
/// resumes exactly where it left off.
#[derive(Debug)]
pub struct Mos65C02 {
    /// Architectural registers.
    pub regs: Registers,

    /// Instruction register: `opcode << 3 | micro_step`.
    ir: u16,

    /// Hidden latch for assembling multi-byte addresses across cycles.
    ad: u16,

    /// Pin snapshot from the previous call, for PHI2 edge detection.
    prev: Pins,

    /// IRQ recognition delay pipeline (bit 0 loaded on detection,
    /// shifted left each cycle, bit 2 consumed at the next SYNC).
    irq_pip: u16,

    /// NMI recognition delay pipeline.
    nmi_pip: u16,

    /// Pending reset/NMI/IRQ bits, set during control sampling and
    /// cleared once the BRK micro-program has consumed them.
    brk_flags: u8,
}

impl Default for Mos65C02 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos65C02 {
    /// Create a CPU in its power-up state. The first instruction should
    /// be reached through the reset sequence (RESB held low across a
    /// rising edge, then released).
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            ir: 0,
            ad: 0,
            prev: Pins::LOW,
            irq_pip: 0,
            nmi_pip: 0,
            brk_flags: 0,
        }
    }

    /// The opcode currently executing.
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        (self.ir >> 3) as u8
    }

    /// The micro-step the current opcode will dispatch next (0..=7).
    #[must_use]
    pub const fn micro_step(&self) -> u8 {
        (self.ir & 7) as u8
    }

    /// Advance the chip by one half-clock edge.
    ///
    /// On a PHI2 rising edge this samples the control inputs, runs one
    /// micro-step of the current instruction and returns the mutated pin
    /// vector. Any other call only refreshes the edge-detection snapshot
    /// and echoes `pins` back.
    pub fn tick(&mut self, pins: Pins) -> Result<Pins, Fault> {
        let mut pins = pins;
        let rising = !self.prev.contains(pins::PHI2) && pins.contains(pins::PHI2);
        if rising {
            if pins.contains(pins::SYNC)
                || !pins.contains(pins::IRQB)
                || !pins.contains(pins::NMIB)
                || pins.contains(pins::RDY)
                || !pins.contains(pins::RESB)
            {
                // NMIB is edge-triggered: arm on the high-to-low transition.
                if self.prev.contains(pins::NMIB) && !pins.contains(pins::NMIB) {
                    trace!("NMIB asserted");
                    self.nmi_pip |= 1;
                }

                // IRQB is level-triggered while I is clear.
                if !pins.contains(pins::IRQB) && !self.regs.p.is_set(flags::I) {
                    trace!("IRQB asserted");
                    self.irq_pip |= 1;
                }

                if !pins.contains(pins::RESB) {
                    debug!("RESB low, redirecting into the reset sequence");
                    self.brk_flags |= BRK_RESET;
                    self.ir = 0;
                    self.regs.p.clear(flags::B);
                    self.prev = pins;
                    return Ok(pins);
                }

                if pins.contains(pins::SYNC) {
                    // This cycle consumes the opcode byte fetched last cycle.
                    self.ir = u16::from(pins.data()) << 3;
                    pins = pins.without(pins::SYNC);

                    if self.irq_pip & 4 != 0 {
                        debug!("IRQ recognized");
                        self.brk_flags |= BRK_IRQ;
                        self.ir = 0;
                        self.regs.p.clear(flags::B);
                    }
                    if self.nmi_pip & 0xFFFC != 0 {
                        debug!("NMI recognized");
                        self.brk_flags |= BRK_NMI;
                        self.ir = 0;
                        self.regs.p.clear(flags::B);
                    }
                    self.irq_pip &= 3;
                    self.nmi_pip &= 3;

                    // An interrupt sequence must push the un-advanced PC.
                    if self.brk_flags == 0 {
                        self.regs.pc = self.regs.pc.wrapping_add(1);
                    }
                }
            }

            // Every cycle defaults to a read; write steps override.
            pins = pins.begin_read();
            pins = self.dispatch(pins)?;
            self.ir += 1;
            self.irq_pip <<= 1;
            self.nmi_pip <<= 1;
        }
        self.prev = pins;
        Ok(pins)
    }

    /// Execute one micro-step of the current opcode.
    fn dispatch(&mut self, pins: Pins) -> Result<Pins, Fault> {
        let step = self.micro_step();
        match self.opcode() {
            // BRK s - 7 cycles; doubles as the reset/IRQ/NMI sequence
            0x00 => self.brk(pins, step),

            // ORA # - 2 cycles
            0x09 => self.imm(pins, step, Self::ora),

            // TSB a - 6 cycles
            0x0C => self.bit_rmw_abs(pins, step, |a, m| a | m),

            // ORA a - 4 cycles
            0x0D => self.abs_read(pins, step, Self::ora),

            // ASL a - 6 cycles
            0x0E => self.abs_rmw(pins, step, Self::asl),

            // CLC i - 2 cycles
            0x18 => self.implied(pins, step, |cpu| cpu.regs.p.clear(flags::C)),

            // TRB a - 6 cycles
            0x1C => self.bit_rmw_abs(pins, step, |a, m| !a & m),

            // JSR a - 6 cycles
            0x20 => self.jsr(pins, step),

            // AND # - 2 cycles
            0x29 => self.imm(pins, step, Self::and),

            // BIT a - 4 cycles
            0x2C => self.abs_read(pins, step, Self::bit),

            // AND a - 4 cycles
            0x2D => self.abs_read(pins, step, Self::and),

            // ROL a - 6 cycles
            0x2E => self.abs_rmw(pins, step, Self::rol),

            // SEC i - 2 cycles
            0x38 => self.implied(pins, step, |cpu| cpu.regs.p.set(flags::C)),

            // EOR # - 2 cycles
            0x49 => self.imm(pins, step, Self::eor),

            // JMP a - 3 cycles
            0x4C => self.jmp_abs(pins, step),

            // EOR a - 4 cycles
            0x4D => self.abs_read(pins, step, Self::eor),

            // LSR a - 6 cycles
            0x4E => self.abs_rmw(pins, step, Self::lsr),

            // CLI i - 2 cycles
            0x58 => self.implied(pins, step, |cpu| cpu.regs.p.clear(flags::I)),

            // ADC # - 2 cycles
            0x69 => self.imm(pins, step, Self::adc),

            // ADC a - 4 cycles
            0x6D => self.abs_read(pins, step, Self::adc),

            // ROR a - 6 cycles
            0x6E => self.abs_rmw(pins, step, Self::ror),

            // SEI i - 2 cycles
            0x78 => self.implied(pins, step, |cpu| cpu.regs.p.set(flags::I)),

            // DEY i - 2 cycles
            0x88 => self.implied(pins, step, |cpu| {
                cpu.regs.y = cpu.regs.y.wrapping_sub(1);
                cpu.regs.p.update_nz(cpu.regs.y);
            }),

            // BIT # - 2 cycles; only Z is affected in immediate mode
            0x89 => self.imm(pins, step, Self::bit_imm),

            // TXA i - 2 cycles
            0x8A => self.implied(pins, step, |cpu| {
                cpu.regs.a = cpu.regs.x;
                cpu.regs.p.update_nz(cpu.regs.a);
            }),

            // STY a - 4 cycles
            0x8C => self.abs_write(pins, step, |cpu| cpu.regs.y),

            // STA a - 4 cycles
            0x8D => self.abs_write(pins, step, |cpu| cpu.regs.a),

            // STX a - 4 cycles
            0x8E => self.abs_write(pins, step, |cpu| cpu.regs.x),

            // TYA i - 2 cycles
            0x98 => self.implied(pins, step, |cpu| {
                cpu.regs.a = cpu.regs.y;
                cpu.regs.p.update_nz(cpu.regs.a);
            }),

            // TXS i - 2 cycles; no flags
            0x9A => self.implied(pins, step, |cpu| cpu.regs.s = cpu.regs.x),

            // STZ a - 4 cycles
            0x9C => self.abs_write(pins, step, |_| 0x00),

            // LDY # - 2 cycles
            0xA0 => self.imm(pins, step, Self::ldy),

            // LDX # - 2 cycles
            0xA2 => self.imm(pins, step, Self::ldx),

            // TAY i - 2 cycles
            0xA8 => self.implied(pins, step, |cpu| {
                cpu.regs.y = cpu.regs.a;
                cpu.regs.p.update_nz(cpu.regs.y);
            }),

            // LDA # - 2 cycles
            0xA9 => self.imm(pins, step, Self::lda),

            // TAX i - 2 cycles
            0xAA => self.implied(pins, step, |cpu| {
                cpu.regs.x = cpu.regs.a;
                cpu.regs.p.update_nz(cpu.regs.x);
            }),

            // LDY a - 4 cycles
            0xAC => self.abs_read(pins, step, Self::ldy),

            // LDA a - 4 cycles
            0xAD => self.abs_read(pins, step, Self::lda),

            // LDX a - 4 cycles
            0xAE => self.abs_read(pins, step, Self::ldx),

            // CLV i - 2 cycles
            0xB8 => self.implied(pins, step, |cpu| cpu.regs.p.clear(flags::V)),

            // TSX i - 2 cycles
            0xBA => self.implied(pins, step, |cpu| {
                cpu.regs.x = cpu.regs.s;
                cpu.regs.p.update_nz(cpu.regs.x);
            }),

            // CPY # - 2 cycles
            0xC0 => self.imm(pins, step, Self::cpy),

            // INY i - 2 cycles
            0xC8 => self.implied(pins, step, |cpu| {
                cpu.regs.y = cpu.regs.y.wrapping_add(1);
                cpu.regs.p.update_nz(cpu.regs.y);
            }),

            // CMP # - 2 cycles
            0xC9 => self.imm(pins, step, Self::cmp),

            // DEX i - 2 cycles
            0xCA => self.implied(pins, step, |cpu| {
                cpu.regs.x = cpu.regs.x.wrapping_sub(1);
                cpu.regs.p.update_nz(cpu.regs.x);
            }),

            // CPY a - 4 cycles
            0xCC => self.abs_read(pins, step, Self::cpy),

            // CMP a - 4 cycles
            0xCD => self.abs_read(pins, step, Self::cmp),

            // DEC a - 6 cycles
            0xCE => self.abs_rmw(pins, step, Self::dec),

            // CLD i - 2 cycles
            0xD8 => self.implied(pins, step, |cpu| cpu.regs.p.clear(flags::D)),

            // CPX # - 2 cycles
            0xE0 => self.imm(pins, step, Self::cpx),

            // INX i - 2 cycles
            0xE8 => self.implied(pins, step, |cpu| {
                cpu.regs.x = cpu.regs.x.wrapping_add(1);
                cpu.regs.p.update_nz(cpu.regs.x);
            }),

            // SBC # - 2 cycles
            0xE9 => self.imm(pins, step, Self::sbc),

            // NOP i - 2 cycles
            0xEA => self.implied(pins, step, |_| {}),

            // CPX a - 4 cycles
            0xEC => self.abs_read(pins, step, Self::cpx),

            // SBC a - 4 cycles
            0xED => self.abs_read(pins, step, Self::sbc),

            // INC a - 6 cycles
            0xEE => self.abs_rmw(pins, step, Self::inc),

            // SED i - 2 cycles
            0xF8 => self.implied(pins, step, |cpu| cpu.regs.p.set(flags::D)),

            opcode => Err(Fault::UnimplementedOpcode { opcode, step }),
        }
    }

    /// Typed fault for a step past the end of a defined micro-program.
    fn overrun(&self, step: u8) -> Result<Pins, Fault> {
        Err(Fault::UnimplementedOpcode {
            opcode: self.opcode(),
            step,
        })
    }

    fn inc_pc(&mut self) {
        self.regs.pc = self.regs.pc.wrapping_add(1);
    }

    /// Stack address for the current S.
    const fn stack_addr(&self) -> u16 {
        0x0100 | self.regs.s as u16
    }

    // ========================================================================
    // Micro-program shapes
    // ========================================================================

    /// Implied addressing, 2 cycles: dummy read of the next byte, then
    /// execute while the following opcode is fetched.
    fn implied(&mut self, pins: Pins, step: u8, op: fn(&mut Self)) -> Result<Pins, Fault> {
        match step {
            0 => Ok(pins.with_address(self.regs.pc)),
            1 => {
                op(self);
                Ok(pins.begin_fetch(self.regs.pc))
            }
            _ => self.overrun(step),
        }
    }

    /// Immediate addressing, 2 cycles.
    fn imm(&mut self, pins: Pins, step: u8, op: ReadOp) -> Result<Pins, Fault> {
        match step {
            0 => {
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            1 => {
                op(self, pins.data())?;
                Ok(pins.begin_fetch(self.regs.pc))
            }
            _ => self.overrun(step),
        }
    }

    /// Absolute addressing, read, 4 cycles: operand address low, high,
    /// then the data cycle overlapping the next fetch.
    fn abs_read(&mut self, pins: Pins, step: u8, op: ReadOp) -> Result<Pins, Fault> {
        match step {
            0 => {
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            1 => {
                self.ad = u16::from(pins.data());
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            2 => Ok(pins.with_address((u16::from(pins.data()) << 8) | self.ad)),
            3 => {
                op(self, pins.data())?;
                Ok(pins.begin_fetch(self.regs.pc))
            }
            _ => self.overrun(step),
        }
    }

    /// Absolute addressing, write, 4 cycles.
    fn abs_write(&mut self, pins: Pins, step: u8, value: fn(&Self) -> u8) -> Result<Pins, Fault> {
        match step {
            0 => {
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            1 => {
                self.ad = u16::from(pins.data());
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            2 => {
                let addr = (u16::from(pins.data()) << 8) | self.ad;
                Ok(pins.with_address_data(addr, value(self)).begin_write())
            }
            3 => Ok(pins.begin_fetch(self.regs.pc)),
            _ => self.overrun(step),
        }
    }

    /// Absolute addressing, read-modify-write, 6 cycles. The unmodified
    /// value is written back before the modified one, matching the real
    /// chip's bus traffic.
    fn abs_rmw(&mut self, pins: Pins, step: u8, op: ModifyOp) -> Result<Pins, Fault> {
        match step {
            0 => {
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            1 => {
                self.ad = u16::from(pins.data());
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            2 => Ok(pins.with_address((u16::from(pins.data()) << 8) | self.ad)),
            3 => {
                // Latch the operand; the dummy write re-issues it as-is.
                self.ad = u16::from(pins.data());
                Ok(pins.begin_write())
            }
            4 => {
                let result = op(self, self.ad as u8);
                Ok(pins.with_data(result).begin_write())
            }
            5 => Ok(pins.begin_fetch(self.regs.pc)),
            _ => self.overrun(step),
        }
    }

    /// TSB/TRB absolute, 6 cycles: read the operand, write the merged
    /// value, then settle Z from the original operand.
    fn bit_rmw_abs(&mut self, pins: Pins, step: u8, merge: fn(u8, u8) -> u8) -> Result<Pins, Fault> {
        match step {
            0 => {
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            1 => {
                self.ad = u16::from(pins.data());
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            2 => Ok(pins.with_address((u16::from(pins.data()) << 8) | self.ad)),
            3 => {
                let operand = pins.data();
                self.ad = u16::from(operand);
                Ok(pins.with_data(merge(self.regs.a, operand)).begin_write())
            }
            4 => {
                // Z reflects the test against the original memory value.
                let operand = self.ad as u8;
                self.regs.p.set_if(flags::Z, self.regs.a & operand == 0);
                Ok(pins)
            }
            5 => Ok(pins.begin_fetch(self.regs.pc)),
            _ => self.overrun(step),
        }
    }

    /// JMP absolute, 3 cycles.
    fn jmp_abs(&mut self, pins: Pins, step: u8) -> Result<Pins, Fault> {
        match step {
            0 => {
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            1 => {
                self.ad = u16::from(pins.data());
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            2 => {
                self.regs.pc = (u16::from(pins.data()) << 8) | self.ad;
                Ok(pins.begin_fetch(self.regs.pc))
            }
            _ => self.overrun(step),
        }
    }

    /// JSR absolute, 6 cycles: target low, stack rummage, push return
    /// address high then low, target high, jump.
    fn jsr(&mut self, pins: Pins, step: u8) -> Result<Pins, Fault> {
        match step {
            0 => {
                let out = pins.with_address(self.regs.pc);
                self.inc_pc();
                Ok(out)
            }
            1 => {
                self.ad = u16::from(pins.data());
                Ok(pins.with_address(self.stack_addr()))
            }
            2 => {
                let out = pins
                    .with_address_data(self.stack_addr(), (self.regs.pc >> 8) as u8)
                    .begin_write();
                self.regs.s = self.regs.s.wrapping_sub(1);
                Ok(out)
            }
            3 => {
                let out = pins
                    .with_address_data(self.stack_addr(), self.regs.pc as u8)
                    .begin_write();
                self.regs.s = self.regs.s.wrapping_sub(1);
                Ok(out)
            }
            4 => Ok(pins.with_address(self.regs.pc)),
            5 => {
                self.regs.pc = (u16::from(pins.data()) << 8) | self.ad;
                Ok(pins.begin_fetch(self.regs.pc))
            }
            _ => self.overrun(step),
        }
    }

    /// BRK, 7 cycles. Shared by the software instruction and the three
    /// hardware sequences: reset suppresses the stack writes, NMI and
    /// reset select their own vectors, and a pending NMI or reset hijacks
    /// an in-flight BRK by keeping the brk flags armed until step 4.
    fn brk(&mut self, pins: Pins, step: u8) -> Result<Pins, Fault> {
        match step {
            0 => Ok(pins.with_address(self.regs.pc)),
            1 => {
                // Software BRK (and reset) skip the signature byte.
                if self.brk_flags & (BRK_IRQ | BRK_NMI) == 0 {
                    self.inc_pc();
                }
                let out = pins.with_address_data(self.stack_addr(), (self.regs.pc >> 8) as u8);
                self.regs.s = self.regs.s.wrapping_sub(1);
                if self.brk_flags & BRK_RESET == 0 {
                    Ok(out.begin_write())
                } else {
                    Ok(out)
                }
            }
            2 => {
                let out = pins.with_address_data(self.stack_addr(), self.regs.pc as u8);
                self.regs.s = self.regs.s.wrapping_sub(1);
                if self.brk_flags & BRK_RESET == 0 {
                    Ok(out.begin_write())
                } else {
                    Ok(out)
                }
            }
            3 => {
                let out = pins.with_address_data(self.stack_addr(), self.regs.p.0 | flags::U);
                self.regs.s = self.regs.s.wrapping_sub(1);
                if self.brk_flags & BRK_RESET != 0 {
                    self.ad = 0xFFFC;
                    Ok(out)
                } else {
                    self.ad = if self.brk_flags & BRK_NMI != 0 {
                        0xFFFA
                    } else {
                        0xFFFE
                    };
                    Ok(out.begin_write())
                }
            }
            4 => {
                let out = pins.with_address(self.ad);
                self.ad = self.ad.wrapping_add(1);
                self.regs.p.set(flags::I);
                self.regs.p.set(flags::B);
                self.brk_flags = 0;
                Ok(out)
            }
            5 => {
                // Vector low byte arrives; address the high byte.
                let lo = pins.data();
                let out = pins.with_address(self.ad);
                self.ad = u16::from(lo);
                Ok(out)
            }
            6 => {
                self.regs.pc = (u16::from(pins.data()) << 8) | self.ad;
                Ok(pins.begin_fetch(self.regs.pc))
            }
            _ => self.overrun(step),
        }
    }

    // ========================================================================
    // ALU and flag helpers
    // ========================================================================

    fn lda(&mut self, value: u8) -> Result<(), Fault> {
        self.regs.a = value;
        self.regs.p.update_nz(value);
        Ok(())
    }

    fn ldx(&mut self, value: u8) -> Result<(), Fault> {
        self.regs.x = value;
        self.regs.p.update_nz(value);
        Ok(())
    }

    fn ldy(&mut self, value: u8) -> Result<(), Fault> {
        self.regs.y = value;
        self.regs.p.update_nz(value);
        Ok(())
    }

    fn ora(&mut self, value: u8) -> Result<(), Fault> {
        self.regs.a |= value;
        self.regs.p.update_nz(self.regs.a);
        Ok(())
    }

    fn and(&mut self, value: u8) -> Result<(), Fault> {
        self.regs.a &= value;
        self.regs.p.update_nz(self.regs.a);
        Ok(())
    }

    fn eor(&mut self, value: u8) -> Result<(), Fault> {
        self.regs.a ^= value;
        self.regs.p.update_nz(self.regs.a);
        Ok(())
    }

    fn bit(&mut self, value: u8) -> Result<(), Fault> {
        self.regs.p.set_if(flags::Z, self.regs.a & value == 0);
        self.regs.p.set_if(flags::N, value & 0x80 != 0);
        self.regs.p.set_if(flags::V, value & 0x40 != 0);
        Ok(())
    }

    fn bit_imm(&mut self, value: u8) -> Result<(), Fault> {
        self.regs.p.set_if(flags::Z, self.regs.a & value == 0);
        Ok(())
    }

    /// Compare `reg` against `value`: C set iff no borrow occurred.
    fn compare(&mut self, reg: u8, value: u8) {
        self.regs.p.set_if(flags::C, reg >= value);
        self.regs.p.update_nz(reg.wrapping_sub(value));
    }

    fn cmp(&mut self, value: u8) -> Result<(), Fault> {
        self.compare(self.regs.a, value);
        Ok(())
    }

    fn cpx(&mut self, value: u8) -> Result<(), Fault> {
        self.compare(self.regs.x, value);
        Ok(())
    }

    fn cpy(&mut self, value: u8) -> Result<(), Fault> {
        self.compare(self.regs.y, value);
        Ok(())
    }

    fn adc(&mut self, value: u8) -> Result<(), Fault> {
        if self.regs.p.is_set(flags::D) {
            return Err(Fault::DecimalMode {
                opcode: self.opcode(),
            });
        }
        let a = self.regs.a;
        let carry = u16::from(self.regs.p.is_set(flags::C));
        let sum = u16::from(a) + u16::from(value) + carry;
        let result = sum as u8;
        self.regs.p.set_if(flags::C, sum > 0xFF);
        self.regs
            .p
            .set_if(flags::V, (a ^ result) & (value ^ result) & 0x80 != 0);
        self.regs.a = result;
        self.regs.p.update_nz(result);
        Ok(())
    }

    fn sbc(&mut self, value: u8) -> Result<(), Fault> {
        if self.regs.p.is_set(flags::D) {
            return Err(Fault::DecimalMode {
                opcode: self.opcode(),
            });
        }
        let a = self.regs.a;
        let borrow = i16::from(!self.regs.p.is_set(flags::C));
        let diff = i16::from(a) - i16::from(value) - borrow;
        let result = diff as u8;
        self.regs.p.set_if(flags::C, diff >= 0);
        self.regs
            .p
            .set_if(flags::V, (a ^ value) & (a ^ result) & 0x80 != 0);
        self.regs.a = result;
        self.regs.p.update_nz(result);
        Ok(())
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(flags::C, value & 0x80 != 0);
        let result = value << 1;
        self.regs.p.update_nz(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(flags::C, value & 0x01 != 0);
        let result = value >> 1;
        self.regs.p.update_nz(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.regs.p.is_set(flags::C));
        self.regs.p.set_if(flags::C, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.regs.p.update_nz(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = if self.regs.p.is_set(flags::C) { 0x80 } else { 0 };
        self.regs.p.set_if(flags::C, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.regs.p.update_nz(result);
        result
    }

    fn inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.regs.p.update_nz(result);
        result
    }

    fn dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.regs.p.update_nz(result);
        result
    }
}
