//! The virtual CPU: fetch, decode and execute one opcode per `cycle()` call.
//!
//! The machine state (RAM, registers, timers, call stack, program counter)
//! lives here and is mutated by nothing else. Draw instructions flip cells in
//! the owned [`PixelSet`]; the host reads the resulting snapshot and the
//! clear/tone flags between cycles. Pacing is entirely the host's problem:
//! one call, one instruction, no blocking.

use crate::memory::{Ram, RomError, FONT_ADDR, PROGRAM_ADDR};
use crate::pixels::{PixelSet, HEIGHT, WIDTH};
use log::warn;
use rand::Rng;
use std::io;
use thiserror::Error;

/// subroutine nesting allowed before the machine faults
pub const STACK_DEPTH: usize = 16;

/// number of keys on the hex keypad
pub const KEY_COUNT: usize = 16;

/// Fatal machine faults. Either one means a malformed program or an
/// interpreter bug, so the run aborts with a diagnostic. Unknown opcodes are
/// not here: those are logged and skipped.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("call stack overflow at {pc:#06x}: nesting deeper than {STACK_DEPTH}")]
    StackOverflow { pc: u16 },
    #[error("return with an empty call stack at {pc:#06x}")]
    StackUnderflow { pc: u16 },
}

/// The CHIP-8 machine. The random byte source is injected so seeded runs are
/// deterministic under test.
pub struct Cpu<R: Rng> {
    ram: Ram,
    v: [u8; 16],
    i: u16,
    pc: u16,
    stack: [u16; STACK_DEPTH],
    sp: usize,
    delay_timer: u8,
    sound_timer: u8,
    keys: [bool; KEY_COUNT],
    pixels: PixelSet,
    clear_requested: bool,
    tone_requested: bool,
    rng: R,
}

impl<R: Rng> Cpu<R> {
    pub fn new(rng: R) -> Self {
        Cpu {
            ram: Ram::new(),
            v: [0; 16],
            i: 0,
            pc: PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keys: [false; KEY_COUNT],
            pixels: PixelSet::new(),
            clear_requested: false,
            tone_requested: false,
            rng,
        }
    }

    /// Load a ROM at 0x200. Must succeed before the first `cycle()`.
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, RomError> {
        self.ram.load_program(reader)
    }

    /// The host supplies the current press state of the whole keypad once per
    /// cycle; the interpreter never edge-detects or debounces.
    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.keys = keys;
    }

    /// True once per clear-screen instruction; reading it resets it. The
    /// host should wipe its presentation state when this fires.
    pub fn take_clear_request(&mut self) -> bool {
        let requested = self.clear_requested;
        self.clear_requested = false;
        requested
    }

    /// True only for the cycle on which the sound timer ran out.
    pub fn tone_requested(&self) -> bool {
        self.tone_requested
    }

    /// The lit cells of the display, in no particular order.
    pub fn pixels(&self) -> &[(u8, u8)] {
        self.pixels.snapshot()
    }

    /// Run exactly one fetch-decode-execute pass, then tick the timers.
    pub fn cycle(&mut self) -> Result<(), MachineError> {
        let opcode = self.ram.word(self.pc);
        self.tone_requested = false;
        self.execute(opcode)?;
        self.tick_timers();
        Ok(())
    }

    fn execute(&mut self, opcode: u16) -> Result<(), MachineError> {
        let x = ((opcode & 0x0f00) >> 8) as usize;
        let y = ((opcode & 0x00f0) >> 4) as usize;
        let n = opcode & 0x000f;
        let nn = (opcode & 0x00ff) as u8;
        let nnn = opcode & 0x0fff;

        // the top nibble picks the family; every family either sets PC
        // outright or falls through to an advance of 2 (4 when skipping)
        match opcode >> 12 {
            0x0 => match nn {
                0xe0 => {
                    self.pixels.clear();
                    self.clear_requested = true;
                    self.pc += 2;
                }
                0xee => {
                    if self.sp == 0 {
                        return Err(MachineError::StackUnderflow { pc: self.pc });
                    }
                    self.sp -= 1;
                    // resume at the instruction after the call
                    self.pc = self.stack[self.sp] + 2;
                }
                _ => self.skip_unknown(opcode),
            },
            0x1 => self.pc = nnn,
            0x2 => {
                if self.sp == STACK_DEPTH {
                    return Err(MachineError::StackOverflow { pc: self.pc });
                }
                self.stack[self.sp] = self.pc;
                self.sp += 1;
                self.pc = nnn;
            }
            0x3 => self.pc += if self.v[x] == nn { 4 } else { 2 },
            0x4 => self.pc += if self.v[x] != nn { 4 } else { 2 },
            0x5 => self.pc += if self.v[x] == self.v[y] { 4 } else { 2 },
            0x6 => {
                self.v[x] = nn;
                self.pc += 2;
            }
            0x7 => {
                // no carry flag for the immediate add
                self.v[x] = self.v[x].wrapping_add(nn);
                self.pc += 2;
            }
            0x8 => self.alu(opcode, x, y),
            0x9 => self.pc += if self.v[x] != self.v[y] { 4 } else { 2 },
            0xa => {
                self.i = nnn;
                self.pc += 2;
            }
            0xb => self.pc = nnn + self.v[0] as u16,
            0xc => {
                self.v[x] = self.rng.gen::<u8>() & nn;
                self.pc += 2;
            }
            0xd => {
                self.draw(x, y, n);
                self.pc += 2;
            }
            0xe => {
                let pressed = self.keys[(self.v[x] & 0x0f) as usize];
                match nn {
                    0x9e => self.pc += if pressed { 4 } else { 2 },
                    0xa1 => self.pc += if !pressed { 4 } else { 2 },
                    _ => self.skip_unknown(opcode),
                }
            }
            0xf => self.misc(opcode, x, nn),
            _ => unreachable!(),
        }
        Ok(())
    }

    /// The 0x8XY* register ops. VX and VY are read up front because either
    /// may alias VF, and the flag write always lands last.
    fn alu(&mut self, opcode: u16, x: usize, y: usize) {
        let vx = self.v[x];
        let vy = self.v[y];
        match opcode & 0x000f {
            0x0 => self.v[x] = vy,
            0x1 => self.v[x] = vx | vy,
            0x2 => self.v[x] = vx & vy,
            0x3 => self.v[x] = vx ^ vy,
            0x4 => {
                let (sum, carry) = vx.overflowing_add(vy);
                self.v[x] = sum;
                self.v[0xf] = carry as u8;
            }
            0x5 => {
                let (diff, borrow) = vx.overflowing_sub(vy);
                self.v[x] = diff;
                self.v[0xf] = (!borrow) as u8;
            }
            0x6 => {
                self.v[x] = vx >> 1;
                self.v[0xf] = vx & 0x01;
            }
            0x7 => {
                let (diff, borrow) = vy.overflowing_sub(vx);
                self.v[x] = diff;
                self.v[0xf] = (!borrow) as u8;
            }
            0xe => {
                self.v[x] = vx << 1;
                self.v[0xf] = vx >> 7;
            }
            _ => warn!("unknown register op {:#06x} at {:#06x}", opcode, self.pc),
        }
        self.pc += 2;
    }

    /// 0xDXYN: XOR-draw an 8-wide, `rows`-tall sprite from memory at `I`.
    /// A set sprite bit toggles its cell; erasing a lit cell raises VF.
    /// Pixels falling outside the grid are clipped, never wrapped, so the
    /// pixel set only ever sees in-range coordinates.
    fn draw(&mut self, x: usize, y: usize, rows: u16) {
        let left = self.v[x] as usize;
        let top = self.v[y] as usize;
        let mut erased = false;
        for row in 0..rows {
            let py = top + row as usize;
            if py >= HEIGHT {
                break;
            }
            let sprite = self.ram.read(self.i + row);
            for bit in 0..8 {
                if sprite & (0x80 >> bit) == 0 {
                    continue;
                }
                let px = left + bit;
                if px >= WIDTH {
                    continue;
                }
                if self.pixels.is_active(px as u8, py as u8) {
                    self.pixels.deactivate(px as u8, py as u8);
                    erased = true;
                } else {
                    self.pixels.activate(px as u8, py as u8);
                }
            }
        }
        self.v[0xf] = erased as u8;
    }

    /// The 0xFX** grab-bag: timers, keypad wait, I arithmetic, BCD and the
    /// register block transfers.
    fn misc(&mut self, opcode: u16, x: usize, nn: u8) {
        match nn {
            0x07 => self.v[x] = self.delay_timer,
            0x0a => {
                // wait for a key without blocking: leave PC on this
                // instruction until some key is down; the host's repeated
                // cycle() calls provide the polling
                match self.keys.iter().position(|&k| k) {
                    Some(key) => self.v[x] = key as u8,
                    None => return,
                }
            }
            0x15 => self.delay_timer = self.v[x],
            0x18 => self.sound_timer = self.v[x],
            0x1e => self.i = self.i.wrapping_add(self.v[x] as u16),
            0x29 => self.i = FONT_ADDR + 5 * (self.v[x] & 0x0f) as u16,
            0x33 => {
                let vx = self.v[x];
                self.ram.write(self.i, vx / 100);
                self.ram.write(self.i + 1, vx / 10 % 10);
                self.ram.write(self.i + 2, vx % 10);
            }
            0x55 => {
                for r in 0..=x {
                    self.ram.write(self.i + r as u16, self.v[r]);
                }
            }
            0x65 => {
                for r in 0..=x {
                    self.v[r] = self.ram.read(self.i + r as u16);
                }
            }
            _ => {
                self.skip_unknown(opcode);
                return;
            }
        }
        self.pc += 2;
    }

    /// Unknown opcodes are recoverable: report them and step over.
    fn skip_unknown(&mut self, opcode: u16) {
        warn!("unknown opcode {:#06x} at {:#06x}; skipping", opcode, self.pc);
        self.pc += 2;
    }

    fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            if self.sound_timer == 1 {
                self.tone_requested = true;
            }
            self.sound_timer -= 1;
        }
    }
}
