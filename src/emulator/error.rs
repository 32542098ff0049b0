use std::io;
use thiserror::Error;

/// Conditions that stop the machine or prevent a program from loading.
///
/// Invalid opcodes are deliberately not represented here; they are
/// non-fatal and only logged, so that execution always makes forward
/// progress.
#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("could not read program: {0}")]
    Io(#[from] io::Error),

    #[error("program is {size} bytes, only {max} fit above 0x200")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("call stack overflow")]
    StackOverflow,

    #[error("return with empty call stack")]
    StackUnderflow,

    #[error("memory access past end of address space at {address:#05x}")]
    AddressOutOfRange { address: usize },
}
