//! 65C02 circuit glue.
//!
//! A [`Circuit`] wires the CPU to a bus device and owns the shared pin
//! state. Each clock it services the data bus from the address/RWB pins
//! the CPU drove last cycle, then presents the next PHI2 edge. The
//! address is stable on the bus before data is sampled (reads) or
//! committed (writes); servicing first preserves that ordering.

use emu_core::Bus;
use log::trace;
use memory_64k::{MapError, Memory64, Ram, Rom};
use mos_65c02::{Fault, Mos65C02, Pins, pins};

/// The CPU, a bus device, and the pin state connecting them.
pub struct Circuit<B: Bus> {
    /// Pin state as of the last half-clock.
    pub pins: Pins,
    /// The CPU.
    pub cpu: Mos65C02,
    /// The device answering the address/data bus.
    pub memory: B,
}

impl Circuit<Memory64> {
    /// Assemble the canonical RAM+ROM memory map and wire it up. Map
    /// validation failures surface here, before the first clock.
    pub fn with_memory_map(ram: Ram, rom: Rom) -> Result<Self, MapError> {
        Ok(Self::new(Memory64::new(ram, rom)?))
    }
}

impl<B: Bus> Circuit<B> {
    /// Wire a CPU in power-up state to `memory`.
    #[must_use]
    pub fn new(memory: B) -> Self {
        Self {
            pins: Pins::power_on().begin_read(),
            cpu: Mos65C02::new(),
            memory,
        }
    }

    /// Service the data bus, then present the current pin state to the
    /// CPU. Called once per half-clock, after the driver has toggled
    /// PHI2 or any control input.
    pub fn update(&mut self) -> Result<(), Fault> {
        let addr = self.pins.address();
        if self.pins.contains(pins::RWB) {
            let data = self.memory.read(addr);
            self.pins = self.pins.with_data(data);
        } else {
            self.memory.write(addr, self.pins.data());
        }
        self.pins = self.cpu.tick(self.pins)?;
        Ok(())
    }

    /// One full clock: the working PHI2 high half, then the low half.
    /// Control inputs toggled between steps are sampled on the next
    /// rising edge.
    pub fn step(&mut self) -> Result<(), Fault> {
        self.pins = self.pins.with(pins::PHI2);
        self.update()?;
        self.pins = self.pins.without(pins::PHI2);
        self.update()
    }

    /// Run the reset sequence: RESB held low across one clock, released,
    /// then the seven-cycle vector walk. Afterwards the first opcode
    /// fetch from the $FFFC/$FFFD vector is queued on the bus.
    pub fn reset(&mut self) -> Result<(), Fault> {
        trace!("resetting");
        self.pins = self.pins.without(pins::RESB);
        self.step()?;
        self.pins = self.pins.with(pins::RESB);
        for _ in 0..7 {
            self.step()?;
        }
        debug_assert!(self.pins.contains(pins::SYNC));
        Ok(())
    }
}
