//! Defines the [`Cpu`] type, responsible for describing the state of the CPU.
//!
//! More information in the documentation for [`Cpu`].

/// The registers of an Intcode machine.
///
/// But itself, a [`Cpu`] is not enough to execute an Intcode program. In order to do anything
/// useful, it has to be connected to a [`Memory`](crate::memory::Memory).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cpu {
    /// The Instruction Pointer, the address of the next instruction word to be fetched.
    ///
    /// It is advanced past each instruction as it executes, or overwritten by a taken jump.
    /// When the machine suspends waiting for input, it keeps pointing at the input instruction
    /// so that the instruction is attempted again on the next run.
    pub ip: usize,
    /// The Relative Base, added to operands encoded in relative mode to form an address.
    ///
    /// Only the "adjust relative base" instruction modifies it. It may become negative, in which
    /// case relative operands must compensate for it.
    pub relative_base: i64,
}
