//! A CHIP-8 emulator for the terminal.
//!
//! ## Design
//!
//! * the interpreter owns all machine state and runs one instruction per
//!   `cycle()` call; pacing, input capture and presentation stay in the host
//!   loop
//! * lit display cells are tracked in a sparse index (grid plus dense
//!   coordinate list) so the renderer redraws only what is on instead of
//!   scanning a framebuffer every frame
//! * display, input and sound sit behind traits so alternative frontends can
//!   be plugged in; the bundled ones are TUI-in-console, raw-mode stdin and
//!   the PC speaker
//! * the random byte source is injected at construction, so seeded runs are
//!   reproducible
//!
//! Model
//!
//! main
//!  |-- display, input, sound (host collaborators, trait objects)
//!  |-- interpreter
//!  |    |-- ram (font + program)
//!  |    `-- pixel set (sparse lit-cell index)
//!  `-- frame loop
//!       |-- keys = input.poll_keys(); cpu.set_keys(keys)
//!       |-- cpu.cycle() x (clock / frame rate)
//!       |-- if cpu.take_clear_request() { display.clear() }
//!       |-- display.draw(cpu.pixels())
//!       `-- sound.tone() / sound.quiet(); sleep to the next frame

pub mod display;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod pixels;
pub mod sound;
