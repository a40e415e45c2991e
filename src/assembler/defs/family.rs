use crate::assembler::{
    lang::Builder,
    model::{Family, Variant},
};
use crate::isa::{layout::Slot, OpCode};

// Variants are tried in order, so within a family the register form comes
// first and immediates go from narrowest to widest.

fn gen_ctl(builder: &mut Builder) {
    builder.register_family(Family::single("nop", OpCode::MainLoop));
    builder.register_family(Family::single("exit", OpCode::Exit));
    builder.register_family(Family::single("dump", OpCode::Dump));
}

fn gen_mem(builder: &mut Builder) {
    builder.register_family(Family::with(
        "mov",
        &[
            OpCode::Mov,
            OpCode::MovImm8Signed,
            OpCode::MovImm16Signed,
            OpCode::MovImm32,
        ],
    ));

    builder.register_family(Family::single("load8", OpCode::Load8Unsigned));
    builder.register_family(Family::single("load8s", OpCode::Load8Signed));
    builder.register_family(Family::single("load16", OpCode::Load16Unsigned));
    builder.register_family(Family::single("load16s", OpCode::Load16Signed));
    builder.register_family(Family::single("load32", OpCode::Load32));
    builder.register_family(Family::single("store8", OpCode::Store8));
    builder.register_family(Family::single("store16", OpCode::Store16));
    builder.register_family(Family::single("store32", OpCode::Store32));

    builder.register_family(Family::single("write8", OpCode::WriteMemory8));
    builder.register_family(Family::single("write16", OpCode::WriteMemory16));
    builder.register_family(Family::single("write32", OpCode::WriteMemory32));
}

fn gen_alu(builder: &mut Builder) {
    builder.register_family(Family::with(
        "add",
        &[OpCode::Add, OpCode::AddImm8, OpCode::AddImm32],
    ));

    let pairs = [
        ("sub", OpCode::Sub, OpCode::SubImm8),
        ("and", OpCode::And, OpCode::AndImm8),
        ("or", OpCode::Or, OpCode::OrImm8),
        ("xor", OpCode::Xor, OpCode::XorImm8),
        ("mul", OpCode::Mul, OpCode::MulImm8),
        ("imul", OpCode::Imul, OpCode::ImulImm8),
        ("shl", OpCode::Shl, OpCode::ShlImm8),
        ("shr", OpCode::Shr, OpCode::ShrImm8),
        ("sar", OpCode::Sar, OpCode::SarImm8),
        ("div", OpCode::Div, OpCode::DivImm8),
        ("mod", OpCode::Mod, OpCode::ModImm8),
        ("idiv", OpCode::Idiv, OpCode::IdivImm8),
        ("imod", OpCode::Imod, OpCode::ImodImm8),
    ];
    for (name, reg, imm) in pairs.iter() {
        builder.register_family(Family::with(name, &[*reg, *imm]));
    }

    builder.register_family(Family::single("neg", OpCode::Neg));
    builder.register_family(Family::single("not", OpCode::Not));
    builder.register_family(Family::single("lnot", OpCode::LogicalNot));
    builder.register_family(Family::single("land", OpCode::LogicalAnd));
    builder.register_family(Family::single("lor", OpCode::LogicalOr));
    builder.register_family(Family::single("mul10", OpCode::Mul10));
    builder.register_family(Family::single("mul100", OpCode::Mul100));

    builder.register_family(Family::single("set", OpCode::SetBitImm8));
    builder.register_family(Family::single("clear", OpCode::ClearBitImm8));
    builder.register_family(Family::single("invert", OpCode::InvertBitImm8));

    builder.register_family(Family::new(
        "inc",
        vec![Variant::with_preset(OpCode::AddImm8, Slot::Src, 1)],
    ));
    builder.register_family(Family::new(
        "dec",
        vec![Variant::with_preset(OpCode::SubImm8, Slot::Src, 1)],
    ));
}

fn gen_stack(builder: &mut Builder) {
    builder.register_family(Family::single("push", OpCode::Push));
    builder.register_family(Family::single("pop", OpCode::Pop));
    builder.register_family(Family::single("alloca", OpCode::Alloca));
    builder.register_family(Family::single("drop", OpCode::Drop));
    builder.register_family(Family::single("get", OpCode::GetStackRelative));
    builder.register_family(Family::single("put", OpCode::PutStackRelative));
}

fn gen_io(builder: &mut Builder) {
    builder.register_family(Family::single("putchar", OpCode::Putchar));
    builder.register_family(Family::single("print", OpCode::Print));
    builder.register_family(Family::single("printhex", OpCode::PrintHex));
    builder.register_family(Family::single("callout", OpCode::Callout));
}

pub(crate) fn register(builder: &mut Builder) {
    gen_ctl(builder);
    gen_mem(builder);
    gen_alu(builder);
    gen_stack(builder);
    gen_io(builder);
}
