//! Host loop pacing the interpreter against wall clock time.
use std::time::Instant;

use chip8::{constants::TIMER_PERIOD, prelude::*, Clock};
use log::{debug, info};

use crate::error::AppError;

/// Drives a virtual machine and a presentation surface.
///
/// Instructions run at the configured clock frequency, while input polling
/// and presentation happen at 60 Hz.
pub struct Host<S: Surface> {
    vm: Chip8Vm,
    surface: S,
    blender: FrameBlender,
    start: Instant,
}

impl<S: Surface> Host<S> {
    pub fn new(vm: Chip8Vm, surface: S, buffering: BufferingMode) -> Self {
        Self {
            vm,
            surface,
            blender: FrameBlender::new(buffering),
            start: Instant::now(),
        }
    }

    pub fn vm(&self) -> &Chip8Vm {
        &self.vm
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Run until the program exits, or the user closes the surface.
    pub fn run(&mut self) -> Result<(), AppError> {
        let mut cpu_clock = Clock::new(self.vm.config().clock_interval());
        let mut frame_clock = Clock::new(TIMER_PERIOD);
        let mut input = KeyInput::NONE;

        self.start = Instant::now();

        loop {
            if frame_clock.ready() {
                input = self.surface.poll_input()?;
                if self.surface.quit_requested() {
                    info!("quit requested");
                    break;
                }

                self.vm.service_controls(input);
                self.present()?;
                self.surface.set_silent(self.vm.sound_off());
            }

            match self.vm.step(input.keys(), self.start.elapsed())? {
                Flow::Exit => {
                    info!("program exited");
                    break;
                }
                Flow::Unknown(instr) => debug!("skipped unknown instruction {instr:04X}"),
                _ => {}
            }

            cpu_clock.wait();
        }

        self.present()?;
        self.surface.set_silent(true);

        Ok(())
    }

    /// Present the display when it changed since the last frame.
    fn present(&mut self) -> Result<(), AppError> {
        if self.vm.take_dirty() {
            let frame = self.blender.compose(self.vm.display_buffer());
            self.surface.present(frame)?;
        }
        Ok(())
    }
}
