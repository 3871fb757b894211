//! Defines the [`Config`] type, describing which capabilities an [`IntcodeVM`] instance has.
//!
//! The Intcode machine family evolved over time: early programs only know how to add and
//! multiply, later ones perform I/O and branch, and the latest revision introduces the relative
//! base. Instead of maintaining one interpreter per revision, a single engine is configured with
//! the set of operations it accepts ([`OpSet`]) and the way it reacts to outputs
//! ([`OutputMode`]).
//!
//! [`IntcodeVM`]: crate::IntcodeVM

use bitflags::bitflags;

bitflags! {
    /// A set of operations accepted by an [`IntcodeVM`](crate::IntcodeVM).
    ///
    /// The halt instruction is always accepted and has no associated flag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpSet: u16 {
        /// Operation `1`, addition.
        const ADD = 1 << 0;
        /// Operation `2`, multiplication.
        const MUL = 1 << 1;
        /// Operation `3`, reading an input value.
        const INPUT = 1 << 2;
        /// Operation `4`, emitting an output value.
        const OUTPUT = 1 << 3;
        /// Operation `5`, jumping when the first operand is non-zero.
        const JUMP_IF_TRUE = 1 << 4;
        /// Operation `6`, jumping when the first operand is zero.
        const JUMP_IF_FALSE = 1 << 5;
        /// Operation `7`, the less-than comparison.
        const LESS_THAN = 1 << 6;
        /// Operation `8`, the equality comparison.
        const EQUALS = 1 << 7;
        /// Operation `9`, adjusting the relative base.
        const ADJUST_RELATIVE_BASE = 1 << 8;

        /// The first revision of the machine: addition and multiplication only.
        const ARITHMETIC = Self::ADD.bits() | Self::MUL.bits();
        /// Arithmetic, input and output.
        const BASIC_IO = Self::ARITHMETIC.bits() | Self::INPUT.bits() | Self::OUTPUT.bits();
        /// Everything but relative addressing.
        const BRANCHING = Self::BASIC_IO.bits()
            | Self::JUMP_IF_TRUE.bits()
            | Self::JUMP_IF_FALSE.bits()
            | Self::LESS_THAN.bits()
            | Self::EQUALS.bits();
    }
}

impl Default for OpSet {
    #[inline(always)]
    fn default() -> Self {
        Self::all()
    }
}

/// What an [`IntcodeVM`](crate::IntcodeVM) does after it has emitted an output value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputMode {
    /// Keep executing instructions. This is the batch mode, where outputs are simply collected.
    #[default]
    Continue,
    /// Return control to the caller right after the output instruction.
    ///
    /// This is useful when several machines exchange values and the caller needs to route every
    /// output before the emitting machine goes any further.
    Suspend,
}

/// The configuration of an [`IntcodeVM`](crate::IntcodeVM).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// The operations the machine accepts. Decoding any other operation fails.
    pub ops: OpSet,
    /// How the machine reacts to output instructions.
    pub output: OutputMode,
}

impl Config {
    /// Returns this configuration with its set of enabled operations replaced.
    #[inline(always)]
    pub const fn with_ops(mut self, ops: OpSet) -> Self {
        self.ops = ops;
        self
    }

    /// Returns this configuration with its output mode replaced.
    #[inline(always)]
    pub const fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }
}
