use crate::assembler::{lang::Builder, model::Family};
use crate::isa::{Cond, OpCode};
use strum::IntoEnumIterator;

fn gen_jump(builder: &mut Builder) {
    builder.register_family(Family::single("jmp", OpCode::Jump));
    builder.register_family(Family::single("jmpnear", OpCode::JumpNear));

    for cond in Cond::iter() {
        builder.register_family(Family::single(&cond.far_mnemonic(), cond.far()));
        builder.register_family(Family::single(&cond.near_mnemonic(), cond.near()));
    }
}

fn gen_call(builder: &mut Builder) {
    builder.register_family(Family::single("call", OpCode::Call));
    builder.register_family(Family::single("calli", OpCode::CallRegisterIndirect));
    builder.register_family(Family::single("callf", OpCode::CallRelativeNearForward));
    builder.register_family(Family::single(
        "callnearf",
        OpCode::CallRelativeNearForward,
    ));
    builder.register_family(Family::single("callb", OpCode::CallRelativeNearBackward));
    builder.register_family(Family::single(
        "callnearb",
        OpCode::CallRelativeNearBackward,
    ));
    builder.register_family(Family::single("ret", OpCode::Ret));
}

fn gen_loop(builder: &mut Builder) {
    builder.register_family(Family::single("decjnz", OpCode::DecJnz));
    builder.register_family(Family::single("decjnznear", OpCode::DecJnzNear));
    builder.register_family(Family::single("loop", OpCode::Loop));
    builder.register_family(Family::single("repeat", OpCode::Repeat));
}

pub(crate) fn register(builder: &mut Builder) {
    gen_jump(builder);
    gen_call(builder);
    gen_loop(builder);
}
