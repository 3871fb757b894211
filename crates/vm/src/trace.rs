//! Defines the [`Trace`] trait, used to gather information about the execution of an Intcode
//! program within the virtual machine.

use crate::cpu::Cpu;
use crate::instr::Instruction;
use crate::Status;

/// A collection of callbacks to be called during the execution of an Intcode program.
///
/// Every method has an empty default implementation, so implementors only need to override the
/// events they care about.
#[allow(unused_variables)]
pub trait Trace {
    /// Called after an instruction has been decoded, before it is executed.
    ///
    /// `cpu` holds the state of the registers at that point.
    fn instruction(&mut self, cpu: &Cpu, instruction: Instruction) {}

    /// Called when an input instruction consumed `value`.
    fn input(&mut self, value: i64) {}

    /// Called when an output instruction emitted `value`.
    fn output(&mut self, value: i64) {}

    /// Called when the machine gives control back to its caller.
    fn suspended(&mut self, cpu: &Cpu, status: Status) {}
}

/// An implementation of [`Trace`] that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrace;
impl Trace for NoopTrace {}

/// An implementation of [`Trace`] that forwards every event to [`tracing`] at the `TRACE`
/// level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTrace;

impl Trace for LogTrace {
    fn instruction(&mut self, cpu: &Cpu, instruction: Instruction) {
        tracing::trace!(
            ip = cpu.ip,
            relative_base = cpu.relative_base,
            word = instruction.0,
            op_code = ?instruction.op_code(),
            "executing instruction"
        );
    }

    fn input(&mut self, value: i64) {
        tracing::trace!(value, "consumed input");
    }

    fn output(&mut self, value: i64) {
        tracing::trace!(value, "emitted output");
    }

    fn suspended(&mut self, cpu: &Cpu, status: Status) {
        tracing::trace!(ip = cpu.ip, ?status, "suspended");
    }
}
