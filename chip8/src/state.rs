//! Save states.
//!
//! A snapshot holds everything needed to resume the machine: display,
//! timers, quirks, memory and CPU registers. Fields are written in a fixed
//! order, multi-byte integers little endian, after a magic header and a
//! format version.
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
    time::Duration,
};

use crate::{
    clock::TimerClock,
    constants::*,
    cpu::Chip8Cpu,
    display::Display,
    error::{Chip8Error, Chip8Result},
    quirks::Quirks,
    vm::Chip8Vm,
};

const MAGIC: &[u8; 4] = b"C8ST";
const VERSION: u8 = 1;

impl Chip8Vm {
    /// Serialize the machine state.
    pub fn save_state<W: Write>(&self, writer: &mut W) -> Chip8Result<()> {
        self.encode_state(writer)
            .map_err(Chip8Error::PersistenceUnavailable)
    }

    fn encode_state<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let cpu = &self.cpu;

        w.write_all(MAGIC)?;
        w.write_all(&[VERSION])?;

        w.write_all(self.display.buffer())?;
        w.write_all(&[
            cpu.sound_off as u8,
            self.exit as u8,
            self.quirks.bits(),
        ])?;
        let deadline = self.timer.deadline().as_nanos() as u64;
        w.write_all(&deadline.to_le_bytes())?;

        w.write_all(&cpu.ram[..])?;
        w.write_all(&cpu.registers)?;
        w.write_all(&cpu.pc.to_le_bytes())?;
        w.write_all(&cpu.address.to_le_bytes())?;
        for addr in cpu.stack.iter() {
            w.write_all(&addr.to_le_bytes())?;
        }
        w.write_all(&[
            cpu.sp as u8,
            cpu.delay_timer,
            cpu.sound_timer,
            self.display.is_high_resolution() as u8,
        ])?;

        Ok(())
    }

    /// Restore the machine state from a snapshot written by [`Chip8Vm::save_state`].
    ///
    /// The machine is only modified once the whole snapshot was decoded,
    /// so a failure leaves it untouched. A restored display is always
    /// marked dirty.
    pub fn load_state<R: Read>(&mut self, reader: &mut R) -> Chip8Result<()> {
        let snapshot = Snapshot::decode(reader)?;

        self.cpu = snapshot.cpu;
        self.display = snapshot.display;
        self.display.mark_dirty();
        self.timer = snapshot.timer;
        self.quirks = snapshot.quirks;
        self.exit = snapshot.exit;

        Ok(())
    }

    pub fn save_state_file(&self, path: impl AsRef<Path>) -> Chip8Result<()> {
        let file = File::create(path).map_err(Chip8Error::PersistenceUnavailable)?;
        let mut writer = BufWriter::new(file);
        self.save_state(&mut writer)?;
        writer.flush().map_err(Chip8Error::PersistenceUnavailable)
    }

    pub fn load_state_file(&mut self, path: impl AsRef<Path>) -> Chip8Result<()> {
        let file = File::open(path).map_err(Chip8Error::PersistenceUnavailable)?;
        self.load_state(&mut BufReader::new(file))
    }
}

/// Decoded state, staged before it replaces the live machine.
struct Snapshot {
    cpu: Chip8Cpu,
    display: Display,
    timer: TimerClock,
    quirks: Quirks,
    exit: bool,
}

impl Snapshot {
    fn decode<R: Read>(r: &mut R) -> Chip8Result<Self> {
        let mut magic = [0; 4];
        read_exact(r, &mut magic)?;
        if &magic != MAGIC {
            return Err(Chip8Error::InvalidState("not a save state"));
        }
        if read_u8(r)? != VERSION {
            return Err(Chip8Error::InvalidState("unsupported save state version"));
        }

        let mut display = Display::new();
        read_exact(r, &mut display.buffer[..])?;
        if display.buffer.iter().any(|cell| *cell > 1) {
            return Err(Chip8Error::InvalidState("display cell out of range"));
        }

        let mut cpu = Chip8Cpu::new();
        cpu.sound_off = read_u8(r)? != 0;
        let exit = read_u8(r)? != 0;
        let quirks = Quirks::from_bits(read_u8(r)?);

        let mut deadline = [0; 8];
        read_exact(r, &mut deadline)?;
        let timer = TimerClock::from_deadline(Duration::from_nanos(u64::from_le_bytes(deadline)));

        read_exact(r, &mut cpu.ram[..])?;
        read_exact(r, &mut cpu.registers)?;
        cpu.pc = read_u16(r)?;
        cpu.address = read_u16(r)?;
        if cpu.pc > ADDRESS_MASK || cpu.address > ADDRESS_MASK {
            return Err(Chip8Error::InvalidState("address out of range"));
        }
        for slot in cpu.stack.iter_mut() {
            *slot = read_u16(r)?;
        }

        cpu.sp = read_u8(r)? as usize;
        if cpu.sp > STACK_SIZE {
            return Err(Chip8Error::InvalidState("stack pointer out of range"));
        }
        cpu.delay_timer = read_u8(r)?;
        cpu.sound_timer = read_u8(r)?;
        display.hires = read_u8(r)? != 0;

        Ok(Snapshot {
            cpu,
            display,
            timer,
            quirks,
            exit,
        })
    }
}

fn read_exact<R: Read>(r: &mut R, buf: &mut [u8]) -> Chip8Result<()> {
    r.read_exact(buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => Chip8Error::InvalidState("truncated save state"),
        _ => Chip8Error::PersistenceUnavailable(err),
    })
}

fn read_u8<R: Read>(r: &mut R) -> Chip8Result<u8> {
    let mut buf = [0; 1];
    read_exact(r, &mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(r: &mut R) -> Chip8Result<u16> {
    let mut buf = [0; 2];
    read_exact(r, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        devices::{KeyInput, MemoryFlagStore},
        vm::Chip8Conf,
    };

    #[rustfmt::skip]
    const PROGRAM: &[u8] = &[
        0x00, 0xFF, // HIGH
        0x6A, 0x2A, // LD vA, 0x2A
        0xFA, 0x15, // LD DT, vA
        0xA0, 0x50, // LD I, 0x50
        0xD0, 0x05, // DRW v0, v0, 5
        0x22, 0x0E, // CALL 0x20E
        0x00, 0x00,
        0x12, 0x0E, // JP 0x20E
    ];

    fn running_vm() -> Chip8Vm {
        let mut vm = Chip8Vm::new(Chip8Conf::default()).with_flag_store(MemoryFlagStore::new());
        vm.load_rom(PROGRAM).unwrap();
        vm.run_steps(7, KeyInput::NONE, Duration::from_millis(20))
            .unwrap();
        vm
    }

    #[test]
    fn test_round_trip() {
        let mut vm = running_vm();
        vm.exit = true;
        vm.cpu.sound_off = false;
        assert_eq!(vm.cpu.sp, 1);
        assert!(vm.display.is_high_resolution());

        let mut buf = Vec::new();
        vm.save_state(&mut buf).unwrap();

        let mut other = Chip8Vm::new(Chip8Conf::default());
        assert!(!other.is_dirty());
        other.load_state(&mut buf.as_slice()).unwrap();

        assert!(other.cpu == vm.cpu);
        assert_eq!(other.display.buffer(), vm.display.buffer());
        assert!(other.display.is_high_resolution());
        assert_eq!(other.timer, vm.timer);
        assert_eq!(other.quirks, vm.quirks);
        assert!(other.exit_requested());
        assert!(!other.sound_off());
        assert!(other.is_dirty());
    }

    #[test]
    fn test_quirks_restored() {
        let mut vm = running_vm();
        vm.quirks = Quirks::LEGACY;

        let mut buf = Vec::new();
        vm.save_state(&mut buf).unwrap();

        let mut other = Chip8Vm::new(Chip8Conf::default());
        other.load_state(&mut buf.as_slice()).unwrap();
        assert_eq!(other.quirks(), Quirks::LEGACY);
    }

    #[test]
    fn test_bad_header_leaves_state() {
        let mut vm = running_vm();
        let before = vm.cpu.clone();

        let mut buf = Vec::new();
        vm.save_state(&mut buf).unwrap();
        buf[0] = b'X';

        assert!(matches!(
            vm.load_state(&mut buf.as_slice()),
            Err(Chip8Error::InvalidState(_))
        ));
        assert!(vm.cpu == before);
    }

    #[test]
    fn test_truncated_leaves_state() {
        let mut vm = running_vm();
        let before = vm.cpu.clone();

        let mut buf = Vec::new();
        Chip8Vm::new(Chip8Conf::default())
            .save_state(&mut buf)
            .unwrap();
        buf.truncate(buf.len() - 1);

        assert!(matches!(
            vm.load_state(&mut buf.as_slice()),
            Err(Chip8Error::InvalidState("truncated save state"))
        ));
        assert!(vm.cpu == before);
    }

    #[test]
    fn test_missing_file() {
        let mut vm = running_vm();
        let path = std::env::temp_dir().join(format!("chip8-no-state-{}.bin", std::process::id()));

        let err = vm.load_state_file(&path).unwrap_err();
        assert!(matches!(err, Chip8Error::PersistenceUnavailable(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let vm = running_vm();
        let path = std::env::temp_dir().join(format!("chip8-state-{}.bin", std::process::id()));

        vm.save_state_file(&path).unwrap();
        let mut other = Chip8Vm::new(Chip8Conf::default());
        other.load_state_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(other.cpu == vm.cpu);
    }
}
