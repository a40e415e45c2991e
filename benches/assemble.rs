use criterion::{criterion_group, criterion_main, Criterion};
use ravm::assembler::{self, disasm};
use std::path::PathBuf;

fn demo(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("asm")
        .join("demo")
        .join(name);
    std::fs::read_to_string(&path).unwrap()
}

fn assemble_demos(c: &mut Criterion) {
    for name in &["primes.ras", "branches.ras"] {
        let source = demo(name);
        c.bench_function(&format!("assemble {}", name), |b| {
            b.iter(|| assembler::assemble_image(&source).unwrap())
        });
    }
}

fn assemble_long(c: &mut Criterion) {
    let mut source = String::new();
    for idx in 0..2_000 {
        source.push_str(&format!("l{}: add r{} {}\n", idx, idx % 16, idx * 31));
        source.push_str(&format!("jnz r1 l{}\n", (idx * 7) % 2_000));
    }

    c.bench_function("assemble 4000 lines", |b| {
        b.iter(|| assembler::assemble(&source).unwrap())
    });

    let words = assembler::assemble(&source).unwrap();
    c.bench_function("disassemble 4000 lines", |b| {
        b.iter(|| disasm::render(&disasm::disassemble(&words).unwrap()))
    });
}

criterion_group!(benches, assemble_demos, assemble_long);
criterion_main!(benches);
