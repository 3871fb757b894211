//! Defines the [`Memory`] type, responsible for representing the memory of an Intcode virtual
//! machine.
//!
//! # Addressing
//!
//! The address space of the machine is conceptually infinite: every non-negative address holds
//! a signed integer, and addresses that were never written to read as zero. In practice, the
//! memory is a flat array that starts out with the contents of the program [`Image`] and grows
//! whenever the program writes past its current end.
//!
//! Negative addresses are never valid. Any attempt to read or write one is reported as
//! [`Error::InvalidAddress`].

mod image;

pub use self::image::*;

use num_traits::ToPrimitive;

use crate::error::Error;

/// Represents the memory of the Intcode virtual machine.
///
/// More information on memory can be found in [module-level documentation](self).
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    /// The cells that have been materialized so far.
    ///
    /// Everything past the end of this vector is implicitly zero.
    cells: Vec<i64>,
}

impl Memory {
    /// Creates a new [`Memory`] instance initialized with a copy of the provided program image.
    pub fn new(image: &[i64]) -> Self {
        Self {
            cells: image.to_vec(),
        }
    }

    /// Replaces the whole content of the memory with a copy of the provided program image.
    ///
    /// Cells past the end of `image` read as zero again afterwards.
    pub fn load(&mut self, image: &[i64]) {
        self.cells.clear();
        self.cells.extend_from_slice(image);
    }

    /// Returns the number of materialized cells.
    ///
    /// This is the length of the loaded image, or one past the highest address written since,
    /// whichever is larger.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns whether no cell has been materialized yet.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the materialized cells of the memory.
    #[inline(always)]
    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }

    /// Returns the value stored at `index`, or zero if it was never written.
    #[inline]
    pub fn get(&self, index: usize) -> i64 {
        self.cells.get(index).copied().unwrap_or(0)
    }

    /// Reads the value stored at `address`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidAddress`] if `address` is negative.
    #[inline]
    pub fn read(&self, address: i64) -> Result<i64, Error> {
        Ok(self.get(to_index(address)?))
    }

    /// Writes `value` at `address`, growing the memory if needed.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAddress`] if `address` is negative.
    ///
    /// - [`Error::OutOfMemory`] if the memory could not be grown enough to hold `address`.
    pub fn write(&mut self, address: i64, value: i64) -> Result<(), Error> {
        let index = to_index(address)?;

        if index >= self.cells.len() {
            self.grow(index)?;
        }

        self.cells[index] = value;
        Ok(())
    }

    /// Grows the memory so that `index` becomes a valid position in `cells`.
    ///
    /// New cells are initialized to zero.
    fn grow(&mut self, index: usize) -> Result<(), Error> {
        let new_len = index
            .checked_add(1)
            .ok_or(Error::OutOfMemory { address: index })?;

        // `try_reserve` keeps the amortized growth of `Vec` while letting us report
        // allocation failures instead of aborting.
        self.cells
            .try_reserve(new_len - self.cells.len())
            .map_err(|_| Error::OutOfMemory { address: index })?;
        self.cells.resize(new_len, 0);

        Ok(())
    }
}

/// Converts a signed address into an index within [`Memory`].
#[inline(always)]
pub(crate) fn to_index(address: i64) -> Result<usize, Error> {
    address.to_usize().ok_or(Error::InvalidAddress { address })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_cells_read_as_zero() {
        let memory = Memory::new(&[1, 2, 3]);
        assert_eq!(memory.read(2), Ok(3));
        assert_eq!(memory.read(3), Ok(0));
        assert_eq!(memory.read(1_000_000), Ok(0));
        assert_eq!(memory.len(), 3);
    }

    #[test]
    fn writes_extend_the_address_space() {
        let mut memory = Memory::new(&[7]);
        memory.write(5, -4).unwrap();
        assert_eq!(memory.as_slice(), &[7, 0, 0, 0, 0, -4]);
        assert_eq!(memory.read(5), Ok(-4));
    }

    #[test]
    fn negative_addresses_are_rejected() {
        let mut memory = Memory::default();
        assert_eq!(memory.read(-1), Err(Error::InvalidAddress { address: -1 }));
        assert_eq!(
            memory.write(-7, 3),
            Err(Error::InvalidAddress { address: -7 })
        );
        assert!(memory.is_empty());
    }

    #[test]
    fn load_discards_previous_contents() {
        let mut memory = Memory::new(&[1, 2, 3]);
        memory.write(10, 9).unwrap();
        memory.load(&[4, 5]);
        assert_eq!(memory.as_slice(), &[4, 5]);
        assert_eq!(memory.read(10), Ok(0));
    }

    #[test]
    fn refused_growth_is_out_of_memory() {
        let mut memory = Memory::new(&[1, 2]);
        assert_eq!(
            memory.write(i64::MAX, 1),
            Err(Error::OutOfMemory {
                address: i64::MAX as usize
            })
        );
        assert_eq!(memory.as_slice(), &[1, 2]);
    }
}
