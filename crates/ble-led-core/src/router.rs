//! Command router
//!
//! Applies decoded commands to the strip: colors go through the waveform
//! encoder into the transmit queue, power commands switch the rail. The last
//! requested color is cached so that powering the strip back on restores it.

use crate::{
    command::{ColorCommand, Command, PowerCommand},
    frame::LedFrame,
    power::PowerSwitch,
    session::CommandHandler,
    transmit::{Submitter, TransmitError},
    waveform::{EncodeError, WaveformEncoder},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterError {
    Encode(EncodeError),
    Transmit(TransmitError),
}

impl From<EncodeError> for RouterError {
    fn from(err: EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl From<TransmitError> for RouterError {
    fn from(err: TransmitError) -> Self {
        Self::Transmit(err)
    }
}

pub struct CommandRouter<'q, P: PowerSwitch, const PIXELS: usize, const CAP: usize, const DEPTH: usize>
{
    power: P,
    encoder: WaveformEncoder,
    submitter: Submitter<'q, CAP, DEPTH>,
    last_color: Option<ColorCommand>,
}

impl<'q, P: PowerSwitch, const PIXELS: usize, const CAP: usize, const DEPTH: usize>
    CommandRouter<'q, P, PIXELS, CAP, DEPTH>
{
    pub const fn new(power: P, encoder: WaveformEncoder, submitter: Submitter<'q, CAP, DEPTH>) -> Self {
        Self {
            power,
            encoder,
            submitter,
            last_color: None,
        }
    }

    /// Power the strip on, then show `color`
    pub fn start(&mut self, color: ColorCommand) -> Result<(), RouterError> {
        self.power.set_power(true);
        self.apply_color(color)
    }

    /// Broadcast `color` to every pixel and queue the frame.
    ///
    /// The color is remembered even when the queue refuses the frame.
    pub fn apply_color(&mut self, color: ColorCommand) -> Result<(), RouterError> {
        self.last_color = Some(color);
        self.show(color)
    }

    /// Switch the rail. Switching on replays the last color.
    pub fn apply_power(&mut self, command: PowerCommand) -> Result<(), RouterError> {
        self.power.set_power(command.on);
        match self.last_color {
            Some(color) if command.on => self.show(color),
            _ => Ok(()),
        }
    }

    pub fn apply(&mut self, command: Command) -> Result<(), RouterError> {
        match command {
            Command::Color(color) => self.apply_color(color),
            Command::Power(power) => self.apply_power(power),
        }
    }

    pub const fn last_color(&self) -> Option<ColorCommand> {
        self.last_color
    }

    pub const fn power(&self) -> &P {
        &self.power
    }

    fn show(&self, color: ColorCommand) -> Result<(), RouterError> {
        let frame = LedFrame::<PIXELS>::broadcast(color);
        let sequence = self.encoder.encode::<PIXELS, CAP>(&frame)?;
        self.submitter.submit(sequence)?;
        Ok(())
    }
}

impl<P: PowerSwitch, const PIXELS: usize, const CAP: usize, const DEPTH: usize> CommandHandler
    for CommandRouter<'_, P, PIXELS, CAP, DEPTH>
{
    fn handle_command(&mut self, command: Command) {
        if let Err(err) = self.apply(command) {
            log::warn!("router: {:?} not shown: {:?}", command, err);
        }
    }
}
