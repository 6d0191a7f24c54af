use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use ocho::display::{Display, MonoTermDisplay};
use ocho::input::{Input, StdinInput};
use ocho::interpreter::Cpu;
use ocho::sound::{Mute, SimpleBeep, Sound};

const FRAME_RATE: u32 = 60;

/// A CHIP-8 emulator for the terminal.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// ROM file to run
    rom: PathBuf,

    /// machine cycles per second
    #[arg(long, default_value_t = 600)]
    clock: u32,

    /// disable the buzzer
    #[arg(long)]
    mute: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    // initialise the host collaborators
    let mut display = MonoTermDisplay::new()?;
    let mut input = StdinInput::new();
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };

    let mut cpu = Cpu::new(StdRng::from_entropy());
    let mut rom = File::open(&args.rom)?;
    cpu.load_program(&mut rom)?;

    let cycles_per_frame = (args.clock / FRAME_RATE).max(1);
    let mut pacer = spin_sleep::LoopHelper::builder().build_with_target_rate(f64::from(FRAME_RATE));

    while !input.quit_requested() {
        pacer.loop_start();

        cpu.set_keys(input.poll_keys()?);

        // the tone request only lasts one cycle, so latch it over the frame
        let mut tone = false;
        for _ in 0..cycles_per_frame {
            cpu.cycle()?;
            tone |= cpu.tone_requested();
        }

        if cpu.take_clear_request() {
            display.clear()?;
        }
        display.draw(cpu.pixels())?;

        if tone {
            sound.tone()?;
        } else {
            sound.quiet()?;
        }

        pacer.loop_sleep();
    }
    sound.quiet()?;

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }
    Ok(())
}
