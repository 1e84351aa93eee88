use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chip8::prelude::*;

/// Draws an endless random maze of diagonal lines.
#[rustfmt::skip]
const MAZE: &[u8] = &[
    0xA2, 0x1E, // LD I, 0x21E
    0xC2, 0x01, // RND v2, 1
    0x32, 0x01, // SE v2, 1
    0xA2, 0x1A, // LD I, 0x21A
    0xD0, 0x14, // DRW v0, v1, 4
    0x70, 0x04, // ADD v0, 4
    0x30, 0x40, // SE v0, 64
    0x12, 0x00, // JP 0x200
    0x60, 0x00, // LD v0, 0
    0x71, 0x04, // ADD v1, 4
    0x31, 0x20, // SE v1, 32
    0x12, 0x00, // JP 0x200
    0x12, 0x18, // JP 0x218
    0x80, 0x40, 0x20, 0x10, // sprite "\"
    0x20, 0x40, 0x80, 0x10, // sprite "/"
];

fn criterion_benchmark(c: &mut Criterion) {
    let mut vm = Chip8Vm::new(Chip8Conf::default()).with_seed(7);
    vm.load_rom(MAZE).unwrap();

    c.bench_function("maze bytecode", |b| {
        b.iter(|| {
            let step_count = black_box(1000_usize);
            black_box(vm.run_steps(step_count, KeyInput::NONE, Duration::ZERO))
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
