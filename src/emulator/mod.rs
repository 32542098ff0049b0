//! The CHIP-8 virtual machine: state aggregate, instruction set and errors.

pub mod emulator;
pub mod error;
pub mod instruction;
pub mod opcode;

pub use emulator::{Emulator, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use error::EmulatorError;
