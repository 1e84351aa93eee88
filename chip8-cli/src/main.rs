//! Entrypoint for CLI
use std::{env, error::Error, fs, path::PathBuf, process};

use chip8::{constants::MEM_START, prelude::*, IMPL_VERSION};
use log::{debug, error, info, LevelFilter};

mod config;
mod error;
mod host;
mod term;

use self::{config::Settings, error::AppError, host::Host, term::TermSurface};

static USAGE: &str = r#"
usage: chip8 ROM [SCALE] [-single|-double]

arguments:
    ROM         Program file to run
    SCALE       Terminal characters per display cell
    -single     Present every frame as is
    -double     Blend each frame with the previous one, reducing flicker

keys:
    1 2 3 4 / Q W E R / A S D F / Z X C V   keypad
    F5 save state, F9 load state, F2 redraw, Esc quit

settings are read from chip8.yaml, or the file named by CHIP8_CONFIG
"#;

/// FreeBSD EX_USAGE (64)
const EXIT_USAGE: i32 = 64;

#[derive(Debug, PartialEq, Eq)]
struct Args {
    rom: PathBuf,
    scale: Option<usize>,
    buffering: Option<BufferingMode>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args, AppError> {
    let mut rom = None;
    let mut scale = None;
    let mut buffering = None;

    for arg in args {
        match arg.as_str() {
            "-single" => buffering = Some(BufferingMode::Single),
            "-double" => buffering = Some(BufferingMode::Double),
            flag if flag.starts_with('-') => {
                return Err(AppError::usage(format!("unknown option {flag}")))
            }
            _ if rom.is_none() => rom = Some(PathBuf::from(&arg)),
            _ if scale.is_none() => match arg.parse::<usize>() {
                Ok(value) if value > 0 => scale = Some(value),
                _ => return Err(AppError::usage(format!("invalid scale {arg}"))),
            },
            _ => return Err(AppError::usage(format!("unexpected argument {arg}"))),
        }
    }

    Ok(Args {
        rom: rom.ok_or_else(|| AppError::usage("missing ROM file"))?,
        scale,
        buffering,
    })
}

fn print_usage() {
    println!("Chip8 v{IMPL_VERSION}");
    println!("{USAGE}");
}

fn run(args: Args) -> Result<(), AppError> {
    let mut settings = Settings::load()?;
    if let Some(scale) = args.scale {
        settings.display.scale = scale;
    }
    if let Some(buffering) = args.buffering {
        settings.display.buffering = buffering;
    }

    info!("load rom: {}", args.rom.display());
    let bytecode = fs::read(&args.rom).map_err(Chip8Error::RomUnreadable)?;

    let mut vm = Chip8Vm::new(settings.vm.clone());
    vm.load_rom(&bytecode)?;

    if log::log_enabled!(log::Level::Debug) {
        let listing = Disassembler::new(&bytecode)
            .with_origin(MEM_START)
            .listing()
            .map_err(Chip8Error::from)?;
        debug!("disassembly:\n{listing}");
    }

    let surface = TermSurface::new(settings.display.scale)?;
    let mut host = Host::new(vm, surface, settings.display.buffering);
    host.run()
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            process::exit(EXIT_USAGE)
        }
    };

    // The terminal is restored before the error is reported.
    if let Err(err) = run(args) {
        error!("{err}");
        process::exit(1);
    }

    Ok(())
}
