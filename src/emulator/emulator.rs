//! The CHIP-8 machine state and its fetch-decode-execute step, as described
//! at https://en.wikipedia.org/wiki/CHIP-8#Virtual_machine_description.

use std::fmt;
use std::path::Path;

use crate::emulator::error::EmulatorError;
use crate::emulator::instruction::{Addr, Const, Instruction, Reg};
use crate::emulator::opcode::Opcode;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

const MEM_SIZE: usize = 4096;
const NUM_REGISTERS: usize = 16;
const STACK_SIZE: usize = 16;
const NUM_KEYS: usize = 16;
const PC_START: u16 = 0x200;
const MAX_PROGRAM_SIZE: usize = MEM_SIZE - PC_START as usize;
const GLYPH_SIZE: u16 = 5;
const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// The whole machine state: memory, registers, call stack, timers,
/// framebuffer and keypad, stepped one instruction at a time.
///
/// The frontend writes key states with [`set_key`](Emulator::set_key),
/// reads the framebuffer with [`screen`](Emulator::screen), and services
/// the one-shot redraw/beep flags. Timers are decremented by
/// [`tick_timers`](Emulator::tick_timers), which the caller drives at
/// 60Hz independently of the CPU step rate.
pub struct Emulator {
    memory: [u8; MEM_SIZE],
    registers: [u8; NUM_REGISTERS],
    index: u16,
    program_counter: u16,
    stack: [u16; STACK_SIZE],
    stack_pointer: u8,
    delay_timer: u8,
    sound_timer: u8,
    screen: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],
    keypad: [bool; NUM_KEYS],
    redraw: bool,
    beep: bool,
}

impl fmt::Display for Emulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.screen.chunks(SCREEN_WIDTH) {
            for &on in row {
                write!(f, "{}", if on { "#" } else { " " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    /// Create a new machine in its reset state.
    pub fn new() -> Emulator {
        let mut emulator = Emulator {
            memory: [0; MEM_SIZE],
            registers: [0; NUM_REGISTERS],
            index: 0,
            program_counter: PC_START,
            stack: [0; STACK_SIZE],
            stack_pointer: 0,
            delay_timer: 0,
            sound_timer: 0,
            screen: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
            keypad: [false; NUM_KEYS],
            redraw: false,
            beep: false,
        };
        emulator.reset();
        emulator
    }

    /// Reinitialize everything: pc back to 0x200, registers, stack,
    /// timers and framebuffer cleared, font reloaded.
    pub fn reset(&mut self) {
        self.memory = [0; MEM_SIZE];
        self.memory[..FONT.len()].copy_from_slice(&FONT);
        self.registers = [0; NUM_REGISTERS];
        self.index = 0;
        self.program_counter = PC_START;
        self.stack = [0; STACK_SIZE];
        self.stack_pointer = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.screen = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
        self.keypad = [false; NUM_KEYS];
        self.redraw = false;
        self.beep = false;
    }

    /// Copy a program into memory at 0x200.
    ///
    /// Programs longer than the 3584 bytes above 0x200 are rejected.
    pub fn load(&mut self, program: &[u8]) -> Result<(), EmulatorError> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(EmulatorError::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = PC_START as usize;
        self.memory[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Read a program file and load it into memory at 0x200.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), EmulatorError> {
        let program = std::fs::read(path)?;
        self.load(&program)
    }

    /// Record a key state, written by the input frontend.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keypad[(key & 0xF) as usize] = pressed;
    }

    /// The 64x32 framebuffer, row-major.
    pub fn screen(&self) -> &[bool; SCREEN_WIDTH * SCREEN_HEIGHT] {
        &self.screen
    }

    /// True once a clear or draw has changed the framebuffer.
    /// The consumer clears it with [`clear_redraw`](Emulator::clear_redraw).
    pub fn redraw_requested(&self) -> bool {
        self.redraw
    }

    pub fn clear_redraw(&mut self) {
        self.redraw = false;
    }

    /// True once the sound timer has run. The consumer clears it with
    /// [`clear_beep`](Emulator::clear_beep).
    pub fn beep_requested(&self) -> bool {
        self.beep
    }

    pub fn clear_beep(&mut self) {
        self.beep = false;
    }

    /// Decrement each nonzero timer by one. Call this at 60Hz, regardless
    /// of how fast [`step`](Emulator::step) is being driven.
    pub fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
            self.beep = true;
        }
    }

    /// Perform a single fetch-decode-execute cycle.
    ///
    /// Words outside the instruction set are logged and skipped so that
    /// execution always moves forward; stack misuse and out-of-range
    /// block transfers are returned as errors.
    pub fn step(&mut self) -> Result<(), EmulatorError> {
        let pc = self.program_counter as usize;
        let high = self.memory[pc % MEM_SIZE];
        let low = self.memory[(pc + 1) % MEM_SIZE];
        let opcode = Opcode::from_bytes(high, low);

        match Instruction::decode(opcode) {
            Some(instruction) => {
                log::trace!("{:#05x}: {:?}", self.program_counter, instruction);
                self.execute(instruction)
            }
            None => {
                log::warn!(
                    "invalid opcode {:#06x} at {:#05x}, skipping",
                    opcode.as_u16(),
                    self.program_counter
                );
                self.program_counter = (self.program_counter + 2) & 0x0FFF;
                Ok(())
            }
        }
    }

    /// Execute a single instruction and commit the new program counter.
    fn execute(&mut self, instruction: Instruction) -> Result<(), EmulatorError> {
        let pc = self.program_counter;
        let mut next = (pc + 2) & 0x0FFF;

        match instruction {
            Instruction::ClearScreen => {
                self.screen = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
                self.redraw = true;
            }

            // Jump back via the stack.
            Instruction::Return => {
                next = self.pop()?;
            }

            Instruction::Jump(Addr(addr)) => {
                next = addr;
            }

            // Store the address of the following instruction, then jump.
            Instruction::Call(Addr(addr)) => {
                self.push(next)?;
                next = addr;
            }

            Instruction::SkipEqConst(Reg(x), Const(n)) => {
                if self.registers[x as usize] == n {
                    next = (next + 2) & 0x0FFF;
                }
            }

            Instruction::SkipNeqConst(Reg(x), Const(n)) => {
                if self.registers[x as usize] != n {
                    next = (next + 2) & 0x0FFF;
                }
            }

            Instruction::SkipEqReg(Reg(x), Reg(y)) => {
                if self.registers[x as usize] == self.registers[y as usize] {
                    next = (next + 2) & 0x0FFF;
                }
            }

            Instruction::SetConst(Reg(x), Const(n)) => {
                self.registers[x as usize] = n;
            }

            // No carry flag for the constant variant.
            Instruction::AddConst(Reg(x), Const(n)) => {
                self.registers[x as usize] = self.registers[x as usize].wrapping_add(n);
            }

            Instruction::Copy(Reg(x), Reg(y)) => {
                self.registers[x as usize] = self.registers[y as usize];
            }

            Instruction::Or(Reg(x), Reg(y)) => {
                self.registers[x as usize] |= self.registers[y as usize];
            }

            Instruction::And(Reg(x), Reg(y)) => {
                self.registers[x as usize] &= self.registers[y as usize];
            }

            Instruction::Xor(Reg(x), Reg(y)) => {
                self.registers[x as usize] ^= self.registers[y as usize];
            }

            Instruction::AddReg(Reg(x), Reg(y)) => {
                let (sum, carried) =
                    self.registers[x as usize].overflowing_add(self.registers[y as usize]);
                self.registers[0xF] = carried as u8;
                self.registers[x as usize] = sum;
            }

            // VF = 1 when there is no borrow.
            Instruction::SubReg(Reg(x), Reg(y)) => {
                let (diff, borrowed) =
                    self.registers[x as usize].overflowing_sub(self.registers[y as usize]);
                self.registers[0xF] = !borrowed as u8;
                self.registers[x as usize] = diff;
            }

            Instruction::ShiftRight(Reg(x)) => {
                let value = self.registers[x as usize];
                self.registers[0xF] = value & 1;
                self.registers[x as usize] = value >> 1;
            }

            Instruction::SubFrom(Reg(x), Reg(y)) => {
                let (diff, borrowed) =
                    self.registers[y as usize].overflowing_sub(self.registers[x as usize]);
                self.registers[0xF] = !borrowed as u8;
                self.registers[x as usize] = diff;
            }

            Instruction::ShiftLeft(Reg(x)) => {
                let value = self.registers[x as usize];
                self.registers[0xF] = value >> 7;
                self.registers[x as usize] = value << 1;
            }

            Instruction::SkipNeqReg(Reg(x), Reg(y)) => {
                if self.registers[x as usize] != self.registers[y as usize] {
                    next = (next + 2) & 0x0FFF;
                }
            }

            Instruction::SetIndex(Addr(addr)) => {
                self.index = addr;
            }

            Instruction::JumpOffset(Addr(addr)) => {
                next = (addr + self.registers[0] as u16) & 0x0FFF;
            }

            Instruction::Random(Reg(x), Const(n)) => {
                self.registers[x as usize] = rand::random::<u8>() & n;
            }

            Instruction::Draw(Reg(x), Reg(y), Const(height)) => {
                self.draw(x, y, height);
            }

            Instruction::SkipKeyPressed(Reg(x)) => {
                if self.keypad[(self.registers[x as usize] & 0xF) as usize] {
                    next = (next + 2) & 0x0FFF;
                }
            }

            Instruction::SkipKeyReleased(Reg(x)) => {
                if !self.keypad[(self.registers[x as usize] & 0xF) as usize] {
                    next = (next + 2) & 0x0FFF;
                }
            }

            Instruction::ReadDelay(Reg(x)) => {
                self.registers[x as usize] = self.delay_timer;
            }

            // With no key down, leave the pc where it is so the same
            // instruction is refetched on the next step.
            Instruction::WaitKey(Reg(x)) => match self.keypad.iter().position(|&down| down) {
                Some(key) => self.registers[x as usize] = key as u8,
                None => next = pc,
            },

            Instruction::SetDelay(Reg(x)) => {
                self.delay_timer = self.registers[x as usize];
            }

            Instruction::SetSound(Reg(x)) => {
                self.sound_timer = self.registers[x as usize];
            }

            // Only the low 12 bits of the index are architecturally
            // meaningful, so the stored value stays masked.
            Instruction::AddIndex(Reg(x)) => {
                let sum = self.index as u32 + self.registers[x as usize] as u32;
                self.registers[0xF] = (sum > 0xFFF) as u8;
                self.index = (sum & 0x0FFF) as u16;
            }

            // Font glyphs are 5 bytes each, starting at address 0.
            Instruction::GlyphAddr(Reg(x)) => {
                self.index = GLYPH_SIZE * self.registers[x as usize] as u16;
            }

            Instruction::StoreBcd(Reg(x)) => {
                let start = self.block(3)?;
                let value = self.registers[x as usize];
                self.memory[start] = value / 100;
                self.memory[start + 1] = (value / 10) % 10;
                self.memory[start + 2] = value % 10;
            }

            // Copies the registers below X, matching the reference machine.
            Instruction::StoreRegs(Reg(x)) => {
                let start = self.block(x as usize)?;
                for r in 0..x as usize {
                    self.memory[start + r] = self.registers[r];
                }
            }

            Instruction::LoadRegs(Reg(x)) => {
                let start = self.block(x as usize)?;
                for r in 0..x as usize {
                    self.registers[r] = self.memory[start + r];
                }
            }
        };

        self.program_counter = next;
        Ok(())
    }

    /// XOR a sprite of `height` rows onto the framebuffer at (V[x], V[y]),
    /// wrapping both coordinates. VF reports whether any set pixel was
    /// toggled off.
    fn draw(&mut self, x: u8, y: u8, height: u8) {
        let x0 = self.registers[x as usize] as usize % SCREEN_WIDTH;
        let y0 = self.registers[y as usize] as usize % SCREEN_HEIGHT;

        self.registers[0xF] = 0;
        for row in 0..height as usize {
            let sprite = self.memory[(self.index as usize + row) % MEM_SIZE];
            for col in 0..8 {
                if sprite & (0x80 >> col) == 0 {
                    continue;
                }
                let px = (x0 + col) % SCREEN_WIDTH;
                let py = (y0 + row) % SCREEN_HEIGHT;
                let cell = &mut self.screen[py * SCREEN_WIDTH + px];
                if *cell {
                    self.registers[0xF] = 1;
                }
                *cell = !*cell;
            }
        }

        if height > 0 {
            self.redraw = true;
        }
    }

    fn push(&mut self, addr: u16) -> Result<(), EmulatorError> {
        if self.stack_pointer as usize >= STACK_SIZE {
            return Err(EmulatorError::StackOverflow);
        }
        self.stack[self.stack_pointer as usize] = addr;
        self.stack_pointer += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<u16, EmulatorError> {
        if self.stack_pointer == 0 {
            return Err(EmulatorError::StackUnderflow);
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer as usize])
    }

    /// Bounds-check a block transfer of `len` bytes starting at the index
    /// register. Running past the end of memory is an error, not a wrap.
    fn block(&self, len: usize) -> Result<usize, EmulatorError> {
        let start = self.index as usize;
        if start + len > MEM_SIZE {
            return Err(EmulatorError::AddressOutOfRange {
                address: start + len - 1,
            });
        }
        Ok(start)
    }
}
