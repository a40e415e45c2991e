use super::{defs, model::Family};
use crate::common;
use crate::isa::OpCode;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static STORAGE: Lazy<Lang> = Lazy::new(Lang::new);

/// The mnemonic table, keyed by lowercased mnemonic.
pub struct Lang {
    families: HashMap<String, Family>,
    // The mnemonic the disassembler prints for each opcode.
    names: HashMap<OpCode, String>,
}

impl Lang {
    fn new() -> Self {
        let mut builder = Builder::new();
        defs::family::register(&mut builder);
        defs::branch::register(&mut builder);
        builder.build()
    }

    pub fn get() -> &'static Lang {
        Lazy::force(&STORAGE)
    }

    pub fn lookup_family(&self, name: &str) -> Option<&Family> {
        self.families.get(&common::sanitize_name(name))
    }

    pub fn mnemonic_of(&self, opcode: OpCode) -> Option<&str> {
        self.names.get(&opcode).map(String::as_str)
    }
}

pub struct Builder {
    lang: Lang,
}

impl Builder {
    fn new() -> Self {
        Builder {
            lang: Lang {
                families: HashMap::new(),
                names: HashMap::new(),
            },
        }
    }

    fn build(self) -> Lang {
        self.lang
    }

    /// The first family to use an opcode without a preset names it when
    /// disassembling, so canonical mnemonics must be registered before aliases.
    pub(super) fn register_family(&mut self, mut f: Family) {
        f.name = common::sanitize_name(&f.name);
        assert!(!f.variants.is_empty());

        for variant in f.variants.iter().filter(|v| v.preset.is_none()) {
            self.lang
                .names
                .entry(variant.opcode)
                .or_insert_with(|| f.name.clone());
        }

        assert!(self.lang.families.insert(f.name.clone(), f).is_none());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_opcode_is_reachable() {
        let lang = Lang::get();
        for opcode in OpCode::iter() {
            if opcode == OpCode::JumpRelativeNear {
                assert_eq!(lang.mnemonic_of(opcode), None);
            } else {
                assert!(lang.mnemonic_of(opcode).is_some(), "{:?}", opcode);
            }
        }
    }

    #[test]
    fn canonical_names() {
        let lang = Lang::get();
        assert_eq!(lang.mnemonic_of(OpCode::AddImm8), Some("add"));
        assert_eq!(lang.mnemonic_of(OpCode::MovImm16Signed), Some("mov"));
        assert_eq!(lang.mnemonic_of(OpCode::CallRelativeNearForward), Some("callf"));
        assert_eq!(lang.mnemonic_of(OpCode::MainLoop), Some("nop"));
        assert_eq!(lang.mnemonic_of(OpCode::JbeNear), Some("jbenear"));
    }

    #[test]
    fn lookup_ignores_case() {
        let lang = Lang::get();
        assert!(lang.lookup_family("MoV").is_some());
        assert!(lang.lookup_family("CALLNEARB").is_some());
        assert!(lang.lookup_family("section").is_none());
    }
}
