//! Engine faults.

use thiserror::Error;

/// Fatal faults raised by the execution engine.
///
/// None of these are recoverable: once a fault is returned the bus state
/// is unspecified and the driver should stop the machine and report the
/// offending opcode and cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// The (opcode, micro-step) pair has no defined micro-program entry.
    /// Covers both undecoded opcodes and stepping past the declared
    /// length of an implemented micro-program.
    #[error("no micro-program for opcode ${opcode:02X} step {step}")]
    UnimplementedOpcode {
        /// The opcode half of the packed instruction register.
        opcode: u8,
        /// The micro-step that had no entry (0..=7).
        step: u8,
    },

    /// ADC/SBC executed with the D flag set. Decimal arithmetic is not
    /// modeled; failing loudly beats computing a wrong binary result.
    #[error("decimal-mode arithmetic is not implemented (opcode ${opcode:02X})")]
    DecimalMode {
        /// The arithmetic opcode that observed D set.
        opcode: u8,
    },
}
