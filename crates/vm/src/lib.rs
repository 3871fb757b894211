//! # Intcode
//!
//! A small, suspendable virtual machine for Intcode programs.
//!
//! An Intcode program is a flat list of signed integers. The machine executes it in place:
//! instructions and data share the same linear memory, operands are resolved through one of
//! three addressing modes, and the program talks to the outside world through two instructions,
//! one reading an input value and one emitting an output value.
//!
//! # Driving a machine
//!
//! The caller owns every [`IntcodeVM`] it creates and drives it by calling
//! [`IntcodeVM::run`] with two callbacks: one providing input values, and one receiving output
//! values. When the program needs an input that the provider cannot give yet, the machine
//! returns [`Status::AwaitingInput`] instead of blocking. Calling [`IntcodeVM::run`] again
//! retries the same input instruction, which makes it possible to multiplex any number of
//! machines on a single thread.
//!
//! ```
//! use intcode_vm::{IntcodeVM, Status};
//!
//! // Outputs 1 if the input is equal to 8, and 0 otherwise.
//! let mut vm = IntcodeVM::new(&[3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8]);
//! let mut outputs = Vec::new();
//!
//! let status = vm.run(|| None, |v| outputs.push(v)).unwrap();
//! assert_eq!(status, Status::AwaitingInput);
//!
//! let status = vm.run(|| Some(8), |v| outputs.push(v)).unwrap();
//! assert_eq!(status, Status::Halted);
//! assert_eq!(outputs, [1]);
//! ```

#![warn(missing_docs, missing_debug_implementations)]

use cpu::Cpu;
use instr::{Decoded, Instruction, Mode, OpCode};
use memory::{to_index, Memory};
use trace::{NoopTrace, Trace};

pub mod ascii;
pub mod config;
pub mod cpu;
pub mod error;
pub mod instr;
pub mod memory;
pub mod trace;

pub use self::config::{Config, OpSet, OutputMode};
pub use self::error::Error;
pub use self::memory::Image;

/// The execution status of an [`IntcodeVM`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The machine can keep executing instructions.
    ///
    /// This is what [`IntcodeVM::run`] returns when it gives control back right after an output
    /// in [`OutputMode::Suspend`].
    #[default]
    Running,
    /// The machine is stopped on an input instruction for which no value was available.
    ///
    /// The instruction has not been executed. It will be attempted again on the next run.
    AwaitingInput,
    /// The machine reached a halt instruction. Running it again does nothing.
    Halted,
}

/// Contains the full state of an Intcode virtual machine.
///
/// # Components
///
/// The [`IntcodeVM`] is composed of two main components:
///
/// - [`Cpu`]: The registers of the machine, namely the instruction pointer and the relative
///   base.
///
/// - [`Memory`]: The memory associated with the virtual machine. Instructions and working memory
///   are stored here.
///
/// # Faults
///
/// When an instruction fails, the error is returned to the caller and the machine is left
/// *faulted*. Its state is no longer meaningful, and any further attempt to run it returns the
/// same error without executing anything. Use [`IntcodeVM::reset`] to start over.
#[derive(Debug, Clone)]
pub struct IntcodeVM {
    /// The registers of the machine.
    cpu: Cpu,
    /// The memory associated with the virtual machine.
    ///
    /// Instructions and working memory are stored here.
    memory: Memory,
    /// The capabilities of the machine.
    config: Config,
    /// The status of the machine after the last run.
    status: Status,
    /// The error that stopped the machine, if any.
    fault: Option<Error>,
}

impl IntcodeVM {
    /// Creates a new [`IntcodeVM`] with the default [`Config`], loading a copy of `image`.
    #[inline]
    pub fn new(image: &[i64]) -> Self {
        Self::with_config(image, Config::default())
    }

    /// Creates a new [`IntcodeVM`] with the provided [`Config`], loading a copy of `image`.
    pub fn with_config(image: &[i64], config: Config) -> Self {
        Self {
            cpu: Cpu::default(),
            memory: Memory::new(image),
            config,
            status: Status::Running,
            fault: None,
        }
    }

    /// Returns the current state of the [`Cpu`].
    #[inline(always)]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Returns the current state of the [`Memory`].
    #[inline(always)]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Returns the [`Memory`] of the machine, allowing the caller to patch it.
    ///
    /// This is typically used before the first run, to select an alternate behavior of a
    /// program by overwriting some of its cells.
    #[inline(always)]
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Returns the [`Config`] of the machine.
    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the status of the machine after the last run.
    #[inline(always)]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns the error that stopped the machine, if any.
    #[inline(always)]
    pub fn fault(&self) -> Option<&Error> {
        self.fault.as_ref()
    }

    /// Reloads the machine with a copy of `image`, clearing its registers, status and fault.
    ///
    /// The [`Config`] of the machine is kept.
    pub fn reset(&mut self, image: &[i64]) {
        self.cpu = Cpu::default();
        self.memory.load(image);
        self.status = Status::Running;
        self.fault = None;

        tracing::debug!(len = image.len(), "machine reset");
    }

    /// Runs the machine until it halts, needs an input that `input` cannot provide, or (in
    /// [`OutputMode::Suspend`]) emits an output.
    ///
    /// `input` is called every time an input instruction executes. Returning `None` suspends the
    /// machine with [`Status::AwaitingInput`]. `output` is called with every emitted value.
    ///
    /// # Errors
    ///
    /// Any [`Error`] raised by an instruction. The machine is faulted afterwards.
    #[inline]
    pub fn run<I, O>(&mut self, input: I, output: O) -> Result<Status, Error>
    where
        I: FnMut() -> Option<i64>,
        O: FnMut(i64),
    {
        self.run_traced(input, output, &mut NoopTrace)
    }

    /// Like [`IntcodeVM::run`], but reports execution events to the provided [`Trace`]
    /// implementation.
    pub fn run_traced<I, O, T>(
        &mut self,
        mut input: I,
        mut output: O,
        trace: &mut T,
    ) -> Result<Status, Error>
    where
        I: FnMut() -> Option<i64>,
        O: FnMut(i64),
        T: ?Sized + Trace,
    {
        if let Some(status) = self.check_runnable()? {
            return Ok(status);
        }

        loop {
            match self.execute(&mut input, &mut output, trace) {
                Ok(Flow::Continue) => (),
                Ok(Flow::Output) => {
                    if self.config.output == OutputMode::Suspend {
                        return Ok(self.suspend(Status::Running, trace));
                    }
                }
                Ok(Flow::Blocked) => return Ok(self.suspend(Status::AwaitingInput, trace)),
                Ok(Flow::Halted) => return Ok(self.suspend(Status::Halted, trace)),
                Err(err) => return Err(self.record_fault(err)),
            }
        }
    }

    /// Advances the virtual machine by a single instruction, tracing events using the provided
    /// [`Trace`] implementation.
    ///
    /// This follows the same suspension rules as [`IntcodeVM::run`]: an input instruction for
    /// which `input` returns `None` is not executed and the machine reports
    /// [`Status::AwaitingInput`].
    pub fn step<I, O, T>(
        &mut self,
        mut input: I,
        mut output: O,
        trace: &mut T,
    ) -> Result<Status, Error>
    where
        I: FnMut() -> Option<i64>,
        O: FnMut(i64),
        T: ?Sized + Trace,
    {
        if let Some(status) = self.check_runnable()? {
            return Ok(status);
        }

        match self.execute(&mut input, &mut output, trace) {
            Ok(Flow::Continue | Flow::Output) => Ok(Status::Running),
            Ok(Flow::Blocked) => Ok(self.suspend(Status::AwaitingInput, trace)),
            Ok(Flow::Halted) => Ok(self.suspend(Status::Halted, trace)),
            Err(err) => Err(self.record_fault(err)),
        }
    }

    /// Makes sure the machine is allowed to execute instructions.
    ///
    /// # Returns
    ///
    /// - `Err(_)` with the recorded fault if the machine previously failed.
    ///
    /// - `Ok(Some(Status::Halted))` if the machine already halted.
    ///
    /// - `Ok(None)` if execution may proceed. The status is set back to [`Status::Running`].
    fn check_runnable(&mut self) -> Result<Option<Status>, Error> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }

        if self.status == Status::Halted {
            return Ok(Some(Status::Halted));
        }

        self.status = Status::Running;
        Ok(None)
    }

    /// Records the status the machine stopped with and returns it.
    fn suspend<T>(&mut self, status: Status, trace: &mut T) -> Status
    where
        T: ?Sized + Trace,
    {
        self.status = status;
        trace.suspended(&self.cpu, status);

        match status {
            Status::Halted => tracing::debug!(ip = self.cpu.ip, "machine halted"),
            Status::AwaitingInput => tracing::debug!(ip = self.cpu.ip, "machine awaiting input"),
            Status::Running => (),
        }

        status
    }

    /// Records `err` as the fault of the machine and returns it.
    fn record_fault(&mut self, err: Error) -> Error {
        tracing::debug!(ip = self.cpu.ip, error = %err, "machine faulted");
        self.fault = Some(err.clone());
        err
    }

    /// Executes the instruction referenced by the instruction pointer.
    fn execute<I, O, T>(
        &mut self,
        input: &mut I,
        output: &mut O,
        trace: &mut T,
    ) -> Result<Flow, Error>
    where
        I: FnMut() -> Option<i64>,
        O: FnMut(i64),
        T: ?Sized + Trace,
    {
        let ip = self.cpu.ip;
        let instruction = fetch_instruction(&self.cpu, &self.memory);
        let decoded = instruction.decode(ip, self.config.ops)?;

        trace.instruction(&self.cpu, instruction);

        let ctx = StepContext {
            cpu: &self.cpu,
            memory: &self.memory,
            decoded,
        };

        match decoded.op_code {
            OpCode::Add => {
                let (a, b, dst) = (ctx.load(0)?, ctx.load(1)?, ctx.store_address(2)?);
                let result = a.checked_add(b).ok_or(Error::Overflow { ip })?;
                self.memory.write(dst, result)?;
            }
            OpCode::Mul => {
                let (a, b, dst) = (ctx.load(0)?, ctx.load(1)?, ctx.store_address(2)?);
                let result = a.checked_mul(b).ok_or(Error::Overflow { ip })?;
                self.memory.write(dst, result)?;
            }
            OpCode::Input => {
                let dst = ctx.store_address(0)?;

                // Nothing has been modified yet, the instruction will be attempted again on the
                // next run.
                let Some(value) = input() else {
                    return Ok(Flow::Blocked);
                };

                trace.input(value);
                self.memory.write(dst, value)?;
            }
            OpCode::Output => {
                let value = ctx.load(0)?;
                self.cpu.ip = ip + decoded.op_code.size();

                trace.output(value);
                output(value);
                return Ok(Flow::Output);
            }
            OpCode::JumpIfTrue | OpCode::JumpIfFalse => {
                let (a, b) = (ctx.load(0)?, ctx.load(1)?);

                if (a != 0) == (decoded.op_code == OpCode::JumpIfTrue) {
                    self.cpu.ip = to_index(b)?;
                    return Ok(Flow::Continue);
                }
            }
            OpCode::LessThan => {
                let (a, b, dst) = (ctx.load(0)?, ctx.load(1)?, ctx.store_address(2)?);
                self.memory.write(dst, i64::from(a < b))?;
            }
            OpCode::Equals => {
                let (a, b, dst) = (ctx.load(0)?, ctx.load(1)?, ctx.store_address(2)?);
                self.memory.write(dst, i64::from(a == b))?;
            }
            OpCode::AdjustRelativeBase => {
                let a = ctx.load(0)?;
                self.cpu.relative_base = self
                    .cpu
                    .relative_base
                    .checked_add(a)
                    .ok_or(Error::Overflow { ip })?;
            }
            OpCode::Halt => return Ok(Flow::Halted),
        }

        self.cpu.ip = ip + decoded.op_code.size();
        Ok(Flow::Continue)
    }
}

/// What happened during the execution of a single instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// The instruction was executed normally.
    Continue,
    /// The instruction emitted an output value.
    Output,
    /// The instruction needs an input value that was not available. It was not executed.
    Blocked,
    /// The instruction was a halt instruction.
    Halted,
}

/// Fetches the instruction word referenced by the instruction pointer of the [`Cpu`].
///
/// Memory past the end of the program reads as zero, which never decodes to a valid
/// instruction.
#[inline(always)]
fn fetch_instruction(cpu: &Cpu, memory: &Memory) -> Instruction {
    Instruction(memory.get(cpu.ip))
}

/// Stores a state that must be kept around while resolving the operands of an instruction.
struct StepContext<'a> {
    /// The registers, as they were when the instruction was fetched.
    cpu: &'a Cpu,
    /// The memory of the machine.
    memory: &'a Memory,
    /// The instruction being executed.
    decoded: Decoded,
}

impl StepContext<'_> {
    /// Returns the raw value of the operand at `index`, as stored after the instruction word.
    #[inline(always)]
    fn raw(&self, index: usize) -> i64 {
        self.memory.get(self.cpu.ip + 1 + index)
    }

    /// Computes `relative_base + offset`.
    #[inline]
    fn relative(&self, offset: i64) -> Result<i64, Error> {
        self.cpu
            .relative_base
            .checked_add(offset)
            .ok_or(Error::Overflow { ip: self.cpu.ip })
    }

    /// Resolves the value of the operand at `index` according to its mode.
    fn load(&self, index: usize) -> Result<i64, Error> {
        let raw = self.raw(index);

        match self.decoded.modes[index] {
            Mode::Position => self.memory.read(raw),
            Mode::Immediate => Ok(raw),
            Mode::Relative => self.memory.read(self.relative(raw)?),
        }
    }

    /// Resolves the address designated by the destination operand at `index`.
    fn store_address(&self, index: usize) -> Result<i64, Error> {
        let raw = self.raw(index);

        match self.decoded.modes[index] {
            Mode::Position => Ok(raw),
            Mode::Relative => self.relative(raw),
            // Already rejected by `Instruction::decode`.
            Mode::Immediate => Err(Error::WriteToImmediate {
                ip: self.cpu.ip,
                word: self.memory.get(self.cpu.ip),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs `image` to completion with the provided inputs, returning the machine and its
    /// outputs.
    fn run_to_halt(image: &[i64], inputs: &[i64]) -> (IntcodeVM, Vec<i64>) {
        let mut vm = IntcodeVM::new(image);
        let mut inputs = inputs.iter().copied();
        let mut outputs = Vec::new();

        let status = vm.run(|| inputs.next(), |v| outputs.push(v)).unwrap();
        assert_eq!(status, Status::Halted);

        (vm, outputs)
    }

    #[test]
    fn position_mode_reads_through_addresses() {
        let (vm, _) = run_to_halt(&[1, 0, 0, 0, 99], &[]);
        assert_eq!(vm.memory().as_slice(), &[2, 0, 0, 0, 99]);

        let (vm, _) = run_to_halt(&[1, 1, 1, 4, 99, 5, 6, 0, 99], &[]);
        assert_eq!(vm.memory().as_slice(), &[30, 1, 1, 4, 2, 5, 6, 0, 99]);
    }

    #[test]
    fn immediate_mode_uses_literals() {
        let (vm, _) = run_to_halt(&[1002, 4, 3, 4, 33], &[]);
        assert_eq!(vm.memory().read(4), Ok(99));

        let (vm, _) = run_to_halt(&[1101, 100, -1, 4, 0], &[]);
        assert_eq!(vm.memory().read(4), Ok(99));
    }

    #[test]
    fn relative_mode_follows_the_relative_base() {
        // rb = 2000 - 7, then output [rb + 7] and write input to [rb + 8].
        let image = [109, 2000, 109, -7, 204, 7, 203, 8, 99];
        let (vm, outputs) = run_to_halt(&image, &[42]);

        assert_eq!(outputs, [0]);
        assert_eq!(vm.cpu().relative_base, 1993);
        assert_eq!(vm.memory().read(2001), Ok(42));
    }

    #[test]
    fn halt_keeps_the_instruction_pointer() {
        let (mut vm, _) = run_to_halt(&[1101, 1, 1, 5, 99, 0], &[]);
        assert_eq!(vm.cpu().ip, 4);
        assert_eq!(vm.status(), Status::Halted);

        // Running a halted machine is a no-op.
        assert_eq!(vm.run(|| None, |_| ()), Ok(Status::Halted));
        assert_eq!(vm.cpu().ip, 4);
    }

    #[test]
    fn suspended_input_is_retried() {
        let mut vm = IntcodeVM::new(&[109, 7, 203, 0, 4, 7, 99, 0]);

        for _ in 0..3 {
            assert_eq!(vm.run(|| None, |_| panic!()), Ok(Status::AwaitingInput));
            assert_eq!(vm.status(), Status::AwaitingInput);
            assert_eq!(*vm.cpu(), Cpu { ip: 2, relative_base: 7 });
        }

        let mut outputs = Vec::new();
        let mut supplied = Some(-12);
        assert_eq!(
            vm.run(|| supplied.take(), |v| outputs.push(v)),
            Ok(Status::Halted)
        );
        assert_eq!(outputs, [-12]);
        assert_eq!(supplied, None);
    }

    #[test]
    fn output_suspension_yields_after_each_value() {
        let config = Config::default().with_output(OutputMode::Suspend);
        let mut vm = IntcodeVM::with_config(&[104, 1, 104, 2, 99], config);
        let mut outputs = Vec::new();

        assert_eq!(vm.run(|| None, |v| outputs.push(v)), Ok(Status::Running));
        assert_eq!(outputs, [1]);
        assert_eq!(vm.cpu().ip, 2);

        assert_eq!(vm.run(|| None, |v| outputs.push(v)), Ok(Status::Running));
        assert_eq!(outputs, [1, 2]);

        assert_eq!(vm.run(|| None, |v| outputs.push(v)), Ok(Status::Halted));
        assert_eq!(outputs, [1, 2]);
    }

    #[test]
    fn step_executes_one_instruction() {
        let mut vm = IntcodeVM::new(&[1101, 2, 3, 0, 99]);

        assert_eq!(vm.step(|| None, |_| (), &mut NoopTrace), Ok(Status::Running));
        assert_eq!(vm.cpu().ip, 4);
        assert_eq!(vm.memory().read(0), Ok(5));

        assert_eq!(vm.step(|| None, |_| (), &mut NoopTrace), Ok(Status::Halted));
    }

    #[test]
    fn jumps_land_exactly_on_their_target() {
        // Both operands read address 0, which holds 5: the jump goes to address 5 rather than
        // falling through to the halt at address 3.
        let mut vm = IntcodeVM::new(&[5, 0, 0, 99]);
        assert_eq!(
            vm.run(|| None, |_| ()),
            Err(Error::MalformedOpcode { ip: 5, word: 0 })
        );

        // A jump to itself loops forever.
        let mut vm = IntcodeVM::new(&[1105, 1, 0, 99]);
        for _ in 0..100 {
            assert_eq!(vm.step(|| None, |_| (), &mut NoopTrace), Ok(Status::Running));
            assert_eq!(vm.cpu().ip, 0);
        }

        // Not taken.
        let (vm, _) = run_to_halt(&[1106, 1, 7, 99], &[]);
        assert_eq!(vm.cpu().ip, 3);
    }

    #[test]
    fn negative_jump_targets_are_invalid() {
        let mut vm = IntcodeVM::new(&[1105, 1, -3, 99]);
        assert_eq!(
            vm.run(|| None, |_| ()),
            Err(Error::InvalidAddress { address: -3 })
        );
    }

    #[test]
    fn running_off_the_end_is_malformed() {
        let mut vm = IntcodeVM::new(&[1101, 0, 0, 10]);
        assert_eq!(
            vm.run(|| None, |_| ()),
            Err(Error::MalformedOpcode { ip: 4, word: 0 })
        );
    }

    #[test]
    fn overflow_is_reported() {
        let mut vm = IntcodeVM::new(&[1101, i64::MAX, 1, 0, 99]);
        assert_eq!(vm.run(|| None, |_| ()), Err(Error::Overflow { ip: 0 }));

        // Relative-address computation.
        let mut vm = IntcodeVM::new(&[109, i64::MAX, 209, 1, 99]);
        assert_eq!(vm.run(|| None, |_| ()), Err(Error::Overflow { ip: 2 }));

        // Relative-base adjustment.
        let mut vm = IntcodeVM::new(&[109, i64::MAX, 109, 1, 99]);
        assert_eq!(vm.run(|| None, |_| ()), Err(Error::Overflow { ip: 2 }));
        assert_eq!(vm.cpu().relative_base, i64::MAX);
    }

    #[test]
    fn faults_are_sticky() {
        let mut vm = IntcodeVM::new(&[1, -1, 0, 0, 99]);
        let err = Error::InvalidAddress { address: -1 };

        assert_eq!(vm.run(|| None, |_| ()), Err(err.clone()));
        assert_eq!(vm.fault(), Some(&err));
        assert_eq!(vm.run(|| None, |_| ()), Err(err.clone()));
        assert_eq!(vm.step(|| None, |_| (), &mut NoopTrace), Err(err));

        vm.reset(&[99]);
        assert_eq!(vm.fault(), None);
        assert_eq!(vm.run(|| None, |_| ()), Ok(Status::Halted));
    }

    #[test]
    fn disabled_operations_are_malformed() {
        let config = Config::default().with_ops(OpSet::ARITHMETIC);
        let mut vm = IntcodeVM::with_config(&[1101, 1, 1, 0, 104, 0, 99], config);
        assert_eq!(
            vm.run(|| None, |_| ()),
            Err(Error::MalformedOpcode { ip: 4, word: 104 })
        );
        assert_eq!(vm.memory().read(0), Ok(2));
    }

    #[test]
    fn immediate_destination_is_rejected() {
        let mut vm = IntcodeVM::new(&[11101, 1, 1, 0, 99]);
        assert_eq!(
            vm.run(|| None, |_| ()),
            Err(Error::WriteToImmediate { ip: 0, word: 11101 })
        );
    }

    #[test]
    fn trace_observes_execution() {
        #[derive(Default)]
        struct Recorder {
            ips: Vec<usize>,
            inputs: Vec<i64>,
            outputs: Vec<i64>,
            suspensions: Vec<Status>,
        }

        impl Trace for Recorder {
            fn instruction(&mut self, cpu: &Cpu, _instruction: Instruction) {
                self.ips.push(cpu.ip);
            }

            fn input(&mut self, value: i64) {
                self.inputs.push(value);
            }

            fn output(&mut self, value: i64) {
                self.outputs.push(value);
            }

            fn suspended(&mut self, _cpu: &Cpu, status: Status) {
                self.suspensions.push(status);
            }
        }

        let mut vm = IntcodeVM::new(&[3, 0, 4, 0, 99]);
        let mut recorder = Recorder::default();

        vm.run_traced(|| None, |_| (), &mut recorder).unwrap();
        vm.run_traced(|| Some(3), |_| (), &mut recorder).unwrap();

        assert_eq!(recorder.ips, [0, 0, 2, 4]);
        assert_eq!(recorder.inputs, [3]);
        assert_eq!(recorder.outputs, [3]);
        assert_eq!(
            recorder.suspensions,
            [Status::AwaitingInput, Status::Halted]
        );
    }
}
