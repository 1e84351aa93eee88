use std::time::Duration;

use chip8::{constants::*, devices::MemoryFlagStore, prelude::*};

const NOW: Duration = Duration::ZERO;

fn boot(conf: Chip8Conf, rom: &[u8]) -> Chip8Vm {
    let mut vm = Chip8Vm::new(conf).with_flag_store(MemoryFlagStore::new());
    vm.load_rom(rom).unwrap();
    vm
}

#[test]
fn test_init_state() {
    let vm = Chip8Vm::new(Chip8Conf::default());
    let cpu = vm.cpu();

    assert_eq!(cpu.pc(), MEM_START as u16);
    assert_eq!(cpu.address(), 0);
    assert_eq!(cpu.stack_depth(), 0);
    assert!((0..16).all(|i| cpu.register(i) == 0));

    let fonts = FONTSET_START as usize..LARGE_FONTSET_START as usize + LARGE_FONTSET_DATA_LENGTH;
    assert!(cpu
        .memory()
        .iter()
        .enumerate()
        .filter(|(addr, _)| !fonts.contains(addr))
        .all(|(_, b)| *b == 0));

    assert!(vm.display_buffer().iter().all(|c| *c == 0));
    assert!(!vm.is_dirty());
    assert!(vm.sound_off());
}

#[test]
#[rustfmt::skip]
fn test_clear_load_add() {
    let mut vm = boot(Chip8Conf::default(), &[
        0x00, 0xE0, // CLS
        0x60, 0xFF, // LD v0, 0xFF
        0x70, 0x01, // ADD v0, 1
    ]);

    vm.step(KeyInput::NONE, NOW).unwrap();
    assert!(vm.display_buffer().iter().all(|c| *c == 0));
    vm.step(KeyInput::NONE, NOW).unwrap();
    assert_eq!(vm.cpu().register(0), 0xFF);
    vm.step(KeyInput::NONE, NOW).unwrap();
    assert_eq!(vm.cpu().register(0), 0x00);
}

#[test]
#[rustfmt::skip]
fn test_subroutine_returns_to_caller() {
    let mut vm = boot(Chip8Conf::default(), &[
        0x60, 0x01, // LD v0, 1
        0x22, 0x08, // CALL 0x208
        0x61, 0x02, // LD v1, 2
        0x00, 0xFD, // EXIT
        0x00, 0xEE, // RET
    ]);

    vm.run_steps(2, KeyInput::NONE, NOW).unwrap();
    assert_eq!(vm.cpu().pc(), 0x208);
    assert_eq!(vm.cpu().stack_depth(), 1);

    vm.step(KeyInput::NONE, NOW).unwrap();
    assert_eq!(vm.cpu().pc(), 0x204);
    assert_eq!(vm.cpu().stack_depth(), 0);

    assert_eq!(vm.run_steps(100, KeyInput::NONE, NOW).unwrap(), Flow::Exit);
    assert_eq!(vm.cpu().register(1), 2);
    assert!(vm.exit_requested());
}

#[test]
fn test_key_wait_retries() {
    let mut vm = boot(Chip8Conf::default(), &[0xF3, 0x0A]);

    for _ in 0..10 {
        assert_eq!(vm.step(KeyInput::NONE, NOW).unwrap(), Flow::KeyWait);
        assert_eq!(vm.cpu().pc(), 0x200);
    }

    vm.step(KeyInput::pressed(KeyCode::KeyB), NOW).unwrap();
    assert_eq!(vm.cpu().pc(), 0x202);
    assert_eq!(vm.cpu().register(3), 0xB);
}

#[test]
#[rustfmt::skip]
fn test_jump_offset_depends_on_quirk() {
    let rom = [
        0x60, 0x04, // LD v0, 4
        0x62, 0x08, // LD v2, 8
        0xB2, 0x40, // JP v0, 0x240
    ];

    let mut modern = boot(Chip8Conf::default(), &rom);
    modern.run_steps(3, KeyInput::NONE, NOW).unwrap();

    let conf = Chip8Conf {
        quirks: Quirks { legacy_jump_offset: true, ..Quirks::default() },
        ..Chip8Conf::default()
    };
    let mut legacy = boot(conf, &rom);
    legacy.run_steps(3, KeyInput::NONE, NOW).unwrap();

    assert_eq!(modern.cpu().pc(), 0x248);
    assert_eq!(legacy.cpu().pc(), 0x244);
}

#[test]
#[rustfmt::skip]
fn test_scroll_right_high_resolution() {
    // Draw a 1 pixel wide line down column 0, then scroll right.
    let mut rom = vec![
        0x00, 0xFF, // HIGH
        0xA2, 0x0A, // LD I, 0x20A
        0xD0, 0x1F, // DRW v0, v1, 15
        0x00, 0xFB, // SCR
        0x00, 0x00,
    ];
    rom.extend_from_slice(&[0x80; 15]);

    let mut vm = boot(Chip8Conf::default(), &rom);
    vm.run_steps(3, KeyInput::NONE, NOW).unwrap();
    let display = vm.display();
    assert_eq!(display.cell(0, 0), 1);
    assert_eq!(display.cell(0, 14), 1);
    assert_eq!(display.cell(0, 15), 0);

    vm.step(KeyInput::NONE, NOW).unwrap();
    let display = vm.display();
    for y in 0..DISPLAY_HEIGHT {
        for x in 0..DISPLAY_WIDTH {
            let expected = (x == 4 && y < 15) as u8;
            assert_eq!(display.cell(x, y), expected, "cell ({x}, {y})");
        }
    }
}

#[test]
fn test_sprite_clipped_at_right_edge() {
    // HIGH; LD v0, 127; LD I, 0x20A; DRW v0, v1, 1; data
    let mut vm = boot(
        Chip8Conf::default(),
        &[0x00, 0xFF, 0x60, 0x7F, 0xA2, 0x0A, 0xD0, 0x11, 0x00, 0x00, 0xFF],
    );
    vm.run_steps(4, KeyInput::NONE, NOW).unwrap();

    let lit = vm.display_buffer().iter().filter(|c| **c == 1).count();
    assert_eq!(lit, 1);
    assert_eq!(vm.display().cell(DISPLAY_WIDTH - 1, 0), 1);
}

#[test]
fn test_rom_too_large() {
    let mut vm = Chip8Vm::new(Chip8Conf::default());
    let rom = vec![0; MAX_PROGRAM_SIZE + 2];

    let err = vm.load_rom(&rom).unwrap_err();
    assert!(matches!(err, Chip8Error::RomTooLarge { .. }));
}

#[test]
fn test_rom_unreadable() {
    let mut vm = Chip8Vm::new(Chip8Conf::default());
    let err = vm.load_rom_file("does/not/exist.ch8").unwrap_err();
    assert!(matches!(err, Chip8Error::RomUnreadable(_)));
}

#[test]
fn test_controls_save_and_load() {
    let path = std::env::temp_dir().join(format!("chip8-controls-{}.bin", std::process::id()));
    let conf = Chip8Conf {
        state_file: path.clone(),
        ..Chip8Conf::default()
    };

    // LD v0, 1; LD v0, 2
    let mut vm = boot(conf, &[0x60, 0x01, 0x60, 0x02]);
    vm.step(KeyInput::NONE, NOW).unwrap();
    vm.service_controls(KeyInput::NONE.with(KeyInput::SAVE_STATE));
    vm.step(KeyInput::NONE, NOW).unwrap();
    assert_eq!(vm.cpu().register(0), 2);

    vm.take_dirty();
    vm.service_controls(KeyInput::NONE.with(KeyInput::LOAD_STATE));
    std::fs::remove_file(&path).unwrap();

    assert_eq!(vm.cpu().register(0), 1);
    assert_eq!(vm.cpu().pc(), 0x202);
    assert!(vm.take_dirty());
}

#[test]
fn test_controls_load_missing_is_noop() {
    let path = std::env::temp_dir().join(format!("chip8-absent-{}.bin", std::process::id()));
    let conf = Chip8Conf {
        state_file: path,
        ..Chip8Conf::default()
    };

    let mut vm = boot(conf, &[0x60, 0x01]);
    vm.step(KeyInput::NONE, NOW).unwrap();
    vm.service_controls(KeyInput::NONE.with(KeyInput::LOAD_STATE));

    assert_eq!(vm.cpu().register(0), 1);
    assert!(!vm.is_dirty());
}

#[test]
fn test_controls_redraw() {
    let mut vm = boot(Chip8Conf::default(), &[]);
    assert!(!vm.is_dirty());
    vm.service_controls(KeyInput::NONE.with(KeyInput::REDRAW));
    assert!(vm.is_dirty());
}

#[test]
fn test_disassemble_rom() {
    let listing = Disassembler::new(&[0x00, 0xE0, 0xD0, 0x15])
        .listing()
        .unwrap();
    assert_eq!(listing, "0200: 00E0  CLS\n0202: D015  DRW v0, v1, 5\n");
}
