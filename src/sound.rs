use beep::beep;
use std::error::Error;

/// The machine only ever signals "tone requested"; how that becomes audible
/// is up to the implementation.
pub trait Sound {
    /// start (or keep) sounding the tone
    fn tone(&mut self) -> Result<(), Box<dyn Error>>;

    /// stop sounding it
    fn quiet(&mut self) -> Result<(), Box<dyn Error>>;
}

const BUZZER_PITCH: u16 = 2093; // C

/// the PC speaker, via the beep crate
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Sound for SimpleBeep {
    fn tone(&mut self) -> Result<(), Box<dyn Error>> {
        if !self.is_beeping {
            beep(BUZZER_PITCH)?;
            self.is_beeping = true;
        }
        Ok(())
    }

    fn quiet(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_beeping {
            beep(0)?;
            self.is_beeping = false;
        }
        Ok(())
    }
}

pub struct Mute {}

impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}

impl Sound for Mute {
    fn tone(&mut self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn quiet(&mut self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}
