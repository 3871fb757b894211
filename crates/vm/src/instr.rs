//! Defines the [`Instruction`] type, responsible for decoding a single Intcode instruction word.
//!
//! # Encoding
//!
//! An instruction word is a non-negative decimal number. Its two least significant digits form
//! the [`OpCode`], and each following digit gives the [`Mode`] of one operand, starting with the
//! first operand (hundreds digit). Missing digits are zero, which means that operands default
//! to [`Mode::Position`].
//!
//! ```text
//!   ABCDE
//!    1002
//!
//!   DE - two-digit opcode      (02 = multiply)
//!    C - mode of operand 1     (0 = position)
//!    B - mode of operand 2     (1 = immediate)
//!    A - mode of operand 3     (0 = position, omitted)
//! ```

use std::fmt;

use crate::config::OpSet;
use crate::error::Error;

/// The way an operand of an instruction is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    /// The operand is the address of the value.
    Position = 0,
    /// The operand is the value itself.
    ///
    /// This mode is never valid for an operand that is written to.
    Immediate = 1,
    /// The operand is added to the **Relative Base** to form the address of the value.
    Relative = 2,
}

impl Mode {
    /// Converts a single decimal digit into a [`Mode`].
    #[inline(always)]
    pub const fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(Self::Position),
            1 => Some(Self::Immediate),
            2 => Some(Self::Relative),
            _ => None,
        }
    }
}

/// The OP code of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// `dst = a + b`
    Add = 1,
    /// `dst = a * b`
    Mul = 2,
    /// `dst = <next input>`
    Input = 3,
    /// `<output> a`
    Output = 4,
    /// `if a != 0 { ip = b }`
    JumpIfTrue = 5,
    /// `if a == 0 { ip = b }`
    JumpIfFalse = 6,
    /// `dst = (a < b) as i64`
    LessThan = 7,
    /// `dst = (a == b) as i64`
    Equals = 8,
    /// `relative_base += a`
    AdjustRelativeBase = 9,
    /// Stops the machine.
    Halt = 99,
}

impl OpCode {
    /// Converts a two-digit operation code into an [`OpCode`].
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Add),
            2 => Some(Self::Mul),
            3 => Some(Self::Input),
            4 => Some(Self::Output),
            5 => Some(Self::JumpIfTrue),
            6 => Some(Self::JumpIfFalse),
            7 => Some(Self::LessThan),
            8 => Some(Self::Equals),
            9 => Some(Self::AdjustRelativeBase),
            99 => Some(Self::Halt),
            _ => None,
        }
    }

    /// Returns the number of operands that follow the instruction word.
    #[inline]
    pub const fn operand_count(self) -> usize {
        match self {
            Self::Add | Self::Mul | Self::LessThan | Self::Equals => 3,
            Self::JumpIfTrue | Self::JumpIfFalse => 2,
            Self::Input | Self::Output | Self::AdjustRelativeBase => 1,
            Self::Halt => 0,
        }
    }

    /// Returns the number of memory cells taken by the instruction, including the instruction
    /// word itself.
    #[inline(always)]
    pub const fn size(self) -> usize {
        1 + self.operand_count()
    }

    /// Returns whether the last operand of the instruction is a write destination.
    #[inline]
    pub const fn writes(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Mul | Self::Input | Self::LessThan | Self::Equals
        )
    }

    /// Returns the [`OpSet`] flag that enables this operation.
    ///
    /// [`OpCode::Halt`] is always enabled and maps to the empty set.
    #[inline]
    pub const fn flag(self) -> OpSet {
        match self {
            Self::Add => OpSet::ADD,
            Self::Mul => OpSet::MUL,
            Self::Input => OpSet::INPUT,
            Self::Output => OpSet::OUTPUT,
            Self::JumpIfTrue => OpSet::JUMP_IF_TRUE,
            Self::JumpIfFalse => OpSet::JUMP_IF_FALSE,
            Self::LessThan => OpSet::LESS_THAN,
            Self::Equals => OpSet::EQUALS,
            Self::AdjustRelativeBase => OpSet::ADJUST_RELATIVE_BASE,
            Self::Halt => OpSet::empty(),
        }
    }
}

/// A single Intcode instruction word.
///
/// This only holds the word itself. Operands are stored in the memory cells that follow it and
/// are resolved by the virtual machine during execution.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Instruction(pub i64);

impl Instruction {
    /// Returns the OP code of the instruction, if it is one of the defined operations.
    #[inline(always)]
    pub fn op_code(&self) -> Option<OpCode> {
        if self.0 < 0 {
            None
        } else {
            OpCode::from_code(self.0 % 100)
        }
    }

    /// Returns the mode of the operand at `index` (zero-based), if its digit is a valid mode.
    #[inline]
    pub fn mode(&self, index: usize) -> Option<Mode> {
        let divisor = match index {
            0 => 100,
            1 => 1_000,
            2 => 10_000,
            _ => return None,
        };

        Mode::from_digit(self.0 / divisor % 10)
    }

    /// Decodes the instruction against the set of enabled operations.
    ///
    /// The instruction is known to sit at address `ip`, which is only used to report errors.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedOpcode`] if the operation is undefined or disabled, or if any of its
    ///   operand modes is invalid.
    ///
    /// - [`Error::WriteToImmediate`] if the destination operand of the instruction is encoded
    ///   in [`Mode::Immediate`].
    pub fn decode(self, ip: usize, ops: OpSet) -> Result<Decoded, Error> {
        let malformed = Error::MalformedOpcode { ip, word: self.0 };

        let op_code = self.op_code().ok_or_else(|| malformed.clone())?;
        if !ops.contains(op_code.flag()) {
            return Err(malformed);
        }

        // Digits of operands the operation does not use are ignored.
        let mut modes = [Mode::Position; 3];
        for (index, mode) in modes.iter_mut().enumerate().take(op_code.operand_count()) {
            *mode = self.mode(index).ok_or_else(|| malformed.clone())?;
        }

        if op_code.writes() && modes[op_code.operand_count() - 1] == Mode::Immediate {
            return Err(Error::WriteToImmediate { ip, word: self.0 });
        }

        Ok(Decoded { op_code, modes })
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("word", &self.0)
            .field("op_code", &self.op_code())
            .field("mode0", &self.mode(0))
            .field("mode1", &self.mode(1))
            .field("mode2", &self.mode(2))
            .finish()
    }
}

/// An [`Instruction`] that was successfully decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// The operation to perform.
    pub op_code: OpCode,
    /// The mode of each operand.
    ///
    /// Entries past [`OpCode::operand_count`] are always [`Mode::Position`].
    pub modes: [Mode; 3],
}
