//! Defines the [`Error`] type of the crate.

use thiserror::Error;

/// An error that might occur when loading or executing an Intcode program.
///
/// Apart from [`Error::Parse`], every error is fatal to the [`IntcodeVM`](crate::IntcodeVM)
/// instance that raised it. The machine remembers the fault and refuses to execute any further
/// instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A token of a textual program image is not a decimal integer.
    #[error("token #{index} of the program image is not an integer: {token:?}")]
    Parse {
        /// The zero-based index of the offending token.
        index: usize,
        /// The offending token, trimmed.
        token: String,
    },
    /// Attempted to read or write a negative address, or to jump to one.
    #[error("attempted to access the invalid address {address}")]
    InvalidAddress {
        /// The address that was requested.
        address: i64,
    },
    /// The word referenced by the instruction pointer does not decode to an enabled operation.
    ///
    /// This is also what happens when a program runs past its last instruction without halting,
    /// since unwritten memory reads as zero.
    #[error("malformed opcode {word} at address {ip}")]
    MalformedOpcode {
        /// The address of the instruction.
        ip: usize,
        /// The raw instruction word.
        word: i64,
    },
    /// The destination operand of an instruction is encoded in immediate mode.
    #[error("instruction {word} at address {ip} writes to an immediate operand")]
    WriteToImmediate {
        /// The address of the instruction.
        ip: usize,
        /// The raw instruction word.
        word: i64,
    },
    /// An addition, multiplication or address computation did not fit in 64 bits.
    #[error("arithmetic overflow in instruction at address {ip}")]
    Overflow {
        /// The address of the instruction.
        ip: usize,
    },
    /// The memory could not grow enough to hold the requested address.
    #[error("ran out of memory while writing to address {address}")]
    OutOfMemory {
        /// The address that was being written.
        address: usize,
    },
}
