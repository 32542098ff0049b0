/*!

A CHIP-8 virtual machine core as specified at https://en.wikipedia.org/wiki/CHIP-8.

The crate only implements the machine itself: memory, registers, call stack,
timers, the 64x32 framebuffer and the 35-instruction fetch-decode-execute
step. Windowing, key mapping and audio are left to a frontend, which talks
to the machine through four narrow surfaces: loading a program, writing key
states, reading the framebuffer, and servicing the one-shot redraw/beep flags.

# Library

The main way of running a program is to load its bytes and step the machine.

```rust
use chip8_vm::emulator::Emulator;

let mut vm = Emulator::new();

// Load a program at address 0x200.
let clear_display = [0x00, 0xE0];
vm.load(&clear_display).unwrap();
vm.step().unwrap(); // Clears the display

assert!(vm.redraw_requested());
vm.clear_redraw(); // The frontend re-renders, then clears the flag
```

Key states come from the frontend; the wait-for-key instruction simply
refetches itself until one arrives.

```rust
use chip8_vm::emulator::Emulator;

let mut vm = Emulator::new();
vm.load(&[0xF0, 0x0A]).unwrap(); // wait for a key into V0

vm.step().unwrap(); // no key yet, the pc stays put
vm.set_key(0x4, true);
vm.step().unwrap(); // V0 = 0x4, execution continues
```

# Driving the machine

`step` runs exactly one instruction and never touches the timers; the two
cadences are the caller's job. Step at your chosen CPU rate (commonly
500-1000Hz) and call `tick_timers` at a fixed 60Hz:

```rust,no_run
use std::time::Duration;
use chip8_vm::emulator::Emulator;

let mut vm = Emulator::new();
vm.load_file("program.ch8").unwrap();

loop {
    for _ in 0..12 {
        vm.step().unwrap(); // ~700 steps per second
    }
    vm.tick_timers(); // 60 times per second
    std::thread::sleep(Duration::from_millis(1_000 / 60));
}
```
*/

pub mod emulator;
