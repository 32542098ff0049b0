use std::path::PathBuf;
use std::time::{Duration, Instant};

use structopt::StructOpt;

use chip8_vm::emulator::{Emulator, EmulatorError};

const TIMER_RATE: u32 = 60;

/// The program options.
#[derive(StructOpt)]
struct Opt {
    /// The program to execute
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// CPU steps per second
    #[structopt(long, default_value = "700")]
    clock: u32,
}

fn main() -> Result<(), EmulatorError> {
    env_logger::init();

    let opt = Opt::from_args();
    log::info!("Executing {:?} at {}Hz", &opt.input, opt.clock);

    let mut vm = Emulator::new();
    vm.load_file(&opt.input)?;

    let step_interval = Duration::from_secs(1) / opt.clock.max(1);
    let timer_interval = Duration::from_secs(1) / TIMER_RATE;
    let mut next_timer_tick = Instant::now() + timer_interval;

    loop {
        vm.step()?;

        // Timers decay at 60Hz no matter how fast the CPU is clocked.
        while Instant::now() >= next_timer_tick {
            vm.tick_timers();
            next_timer_tick += timer_interval;
        }

        if vm.redraw_requested() {
            vm.clear_redraw();
            log::debug!("display:\n{}", vm);
        }
        if vm.beep_requested() {
            vm.clear_beep();
            log::debug!("beep");
        }

        std::thread::sleep(step_interval);
    }
}
