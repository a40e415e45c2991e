mod common;

use common::{error_kind, first_inst, words};
use ravm::assembler::{self, phases::types::Loc, Error, ErrorKind, FileSource};
use ravm::image::{Header, Image, MAGIC};
use ravm::isa::{Inst, OpCode, Word};

#[test]
fn simple_literal() {
    let inst = first_inst("mov r0 5");
    assert_eq!(inst.opcode, OpCode::MovImm8Signed);
    assert_eq!(inst.dest, 0);
    assert_eq!(inst.src, 5);
    assert_eq!(words("mov r0 5"), vec![0x0B00_0500]);
}

#[test]
fn immediate_width_selection() {
    let inst = first_inst("mov r1 200");
    assert_eq!(inst.opcode, OpCode::MovImm16Signed);
    assert_eq!(inst.wide(), 200);
    assert_eq!(words("mov r1 200").len(), 1);

    let wide = words("mov r1 100000");
    assert_eq!(Inst::decode(wide[0]).unwrap().opcode, OpCode::MovImm32);
    assert_eq!(wide[1], 100_000);

    assert_eq!(first_inst("mov r1 -129").wide(), 0xFF7F);
    assert_eq!(first_inst("mov r1 -128").opcode, OpCode::MovImm8Signed);
    assert_eq!(first_inst("add r1 255").opcode, OpCode::AddImm8);
    let add = words("add r1 256");
    assert_eq!(Inst::decode(add[0]).unwrap().opcode, OpCode::AddImm32);
    assert_eq!(add[1], 256);
}

#[test]
fn forward_and_backward_references() {
    let forward = words("jmp target\nnop\ntarget: exit");
    assert_eq!(forward.len(), 4);
    assert_eq!(forward[1], 4);

    let backward = words("target: nop\njmp target");
    assert_eq!(backward[2], -12i32 as Word);
}

fn nops_then(count: usize, branch: &str) -> String {
    let mut source = String::from("top: nop\n");
    for _ in 1..count {
        source.push_str("nop\n");
    }
    source.push_str(branch);
    source.push('\n');
    source
}

#[test]
fn near_backward_reach() {
    let ok = words(&nops_then(63, "callb top"));
    let inst = Inst::decode(ok[63]).unwrap();
    assert_eq!(inst.opcode, OpCode::CallRelativeNearBackward);
    assert_eq!(inst.src, 0);

    let too_far = nops_then(64, "callb top");
    assert!(assembler::plan(&too_far.as_str()).is_ok());
    match assembler::assemble(&too_far) {
        Err(err @ Error::Encode(_)) => assert_eq!(err.kind(), ErrorKind::Generic),
        other => panic!("expected a range error, got {:?}", other),
    }

    let loop_back = words(&nops_then(63, "decjnznear r1 top"));
    assert_eq!(Inst::decode(loop_back[63]).unwrap().src, 0);
}

#[test]
fn unknown_label_fails_only_in_pass_two() {
    let source = "nop\njmp nowhere";
    let plan = assembler::plan(&source).unwrap();
    assert_eq!(plan.program_length(), 12);

    let err = assembler::assemble(source).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownLabel);
    assert_eq!(err.exit_code(), 7);
}

#[test]
fn case_insensitivity() {
    let lower = words("mov r1 5\nagain: dec r1\njnz r1 again");
    assert_eq!(words("MOV R1 5\nAgain: DEC r1\nJnz R1 AGAIN"), lower);
    assert_eq!(words("Mov r1 5\nAGAIN: Dec r1\njNZ r1 again"), lower);
    assert_eq!(error_kind("a: nop\nA: nop"), ErrorKind::Generic);
}

#[test]
fn error_classes() {
    assert_eq!(error_kind("bogus r1"), ErrorKind::UnknownInstruction);
    assert_eq!(error_kind("mov r1"), ErrorKind::Syntax);
    assert_eq!(error_kind("add r1 r2 r3"), ErrorKind::Syntax);
    assert_eq!(error_kind("jmp r1"), ErrorKind::Syntax);
    assert_eq!(error_kind("x:y nop"), ErrorKind::Syntax);
    assert_eq!(error_kind("section"), ErrorKind::Syntax);
    assert_eq!(error_kind("mov r1 0x"), ErrorKind::Generic);
    assert_eq!(error_kind("mov r1 12z"), ErrorKind::Generic);
    assert_eq!(error_kind("mov r256 1"), ErrorKind::Generic);
    assert_eq!(error_kind("sub r1 256"), ErrorKind::Generic);
    assert_eq!(error_kind("set r1 32"), ErrorKind::Generic);
    assert_eq!(error_kind("section bss"), ErrorKind::Generic);
    assert_eq!(error_kind("back: nop\ncallf back"), ErrorKind::Generic);
    assert_eq!(error_kind("callb ahead\nahead: nop"), ErrorKind::Generic);
}

#[test]
fn errors_are_located() {
    match assembler::assemble("nop\n\n  mov r1 0xZZ").unwrap_err() {
        Error::Operand(err) => assert_eq!(err.loc(), Some(Loc::new(3, 10))),
        other => panic!("unexpected {}", other),
    }

    let msg = assembler::assemble("nop\nfrobnicate").unwrap_err().to_string();
    assert!(msg.contains("line: 2"), "{}", msg);
    assert!(msg.contains("frobnicate"), "{}", msg);
}

#[test]
fn comments_commas_and_blank_lines() {
    let source = "\r\n# header\n   ; note\nmov r1, 5 # five\r\n\nadd r1, r2\n";
    assert_eq!(words(source), words("mov r1 5\nadd r1 r2"));
}

#[test]
fn image_layout() {
    let bytes = assembler::assemble_image("mov r1 100000\nexit").unwrap();
    assert_eq!(bytes.len(), Header::SIZE + 12);
    assert_eq!(&bytes[..4], &MAGIC.to_le_bytes());

    let image = Image::parse(&bytes).unwrap();
    assert_eq!(image.header, Header::new(12, 0));
    assert_eq!(image.program_words(), Some(words("mov r1 100000\nexit")));
}

#[test]
fn empty_source() {
    assert_eq!(words(""), Vec::<Word>::new());
    assert_eq!(
        assembler::assemble_image("# nothing\n").unwrap(),
        Header::new(0, 0).to_bytes()
    );
}

#[test]
fn address_synchronization_on_demos() {
    let dir = tempfile::tempdir().unwrap();
    for path in common::demo_sources() {
        let plan = assembler::plan(&FileSource::new(&path)).unwrap();
        let out = dir.path().join("out.dat");
        let emitted = assembler::assemble_path(&path, &out).unwrap();

        assert_eq!(emitted.program_length(), plan.program_length());
        let written = std::fs::metadata(&out).unwrap().len();
        assert_eq!(
            written,
            Header::SIZE as u64 + plan.program_length() as u64,
            "{}",
            path.display()
        );
    }
}

#[test]
fn file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.ras");
    let out = dir.path().join("out.dat");
    let err = assembler::assemble_path(&missing, &out).unwrap_err();
    assert_eq!(err.exit_code(), 4);

    let source = dir.path().join("ok.ras");
    std::fs::write(&source, "exit\n").unwrap();
    let unwritable = dir.path().join("no").join("such").join("out.dat");
    let err = assembler::assemble_path(&source, &unwritable).unwrap_err();
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn output_is_not_created_when_pass_one_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("bad.ras");
    std::fs::write(&source, "nop\nmov r1\n").unwrap();
    let out = dir.path().join("out.dat");

    let err = assembler::assemble_path(&source, &out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(!out.exists());
}

#[test]
#[cfg_attr(not(feature = "big_tests"), ignore)]
fn long_program_stays_synchronized() {
    let mut source = String::new();
    for idx in 0..20_000 {
        source.push_str(&format!("l{}: mov r{} {}\n", idx, idx % 256, idx * 977));
        if idx % 7 == 0 {
            source.push_str(&format!("jnz r1 l{}\n", (idx * 13) % 20_000));
        }
        if idx % 5 == 0 && idx > 0 {
            source.push_str(&format!("jmpnear l{}\n", idx));
        }
    }

    let plan = assembler::plan(&source.as_str()).unwrap();
    let bytes = assembler::assemble_image(&source).unwrap();
    assert_eq!(bytes.len() as u64, Header::SIZE as u64 + plan.program_length() as u64);
}
