/// Switchbench Intermediate Representation (IR)
/// Register-based bytecode stored in emitted library images.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::options::{OptimizationLevel, OutputKind};

/// Instruction format: (Opcode, A, B, C) where A/B/C are register indices,
/// constant pool indices or jump targets depending on the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Load constant pool[B] into register A
    LoadConst = 0,
    /// Load null into register A
    LoadNull = 1,

    /// A = (B == pool[C]), string equality
    StrEq = 20,
    /// A = (B == pool[C]), hash equality
    HashEq = 21,
    /// A = (B < pool[C]), hash ordering
    HashLt = 22,

    /// A = hash(B)
    HashStr = 36,

    /// Load argument B into register A
    GetArg = 40,

    /// Jump to instruction A (absolute)
    Jump = 60,
    /// Jump to instruction A if register B is false
    JumpIfFalse = 61,

    /// Return value in register A
    Return = 71,

    /// Abort: no arm matched the value in register A
    Fail = 90,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Instruction {
    pub fn new(opcode: Opcode, a: u32, b: u32, c: u32) -> Self {
        Self { opcode, a, b, c }
    }

    pub fn a_only(opcode: Opcode, a: u32) -> Self {
        Self { opcode, a, b: 0, c: 0 }
    }

    pub fn ab(opcode: Opcode, a: u32, b: u32) -> Self {
        Self { opcode, a, b, c: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Integer(i64),
    String(String),
    Hash(u64),
}

/// A compiled method: bytecode, constants and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledFunction {
    pub name: String,
    pub is_static: bool,
    pub param_names: Vec<String>,
    pub registers: u32,
    pub instructions: Vec<Instruction>,
    pub constants: Vec<Constant>,
    #[serde(skip)]
    constant_index: HashMap<Constant, u32>,
}

impl CompiledFunction {
    pub fn new(name: impl Into<String>, param_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            param_names,
            registers: 0,
            instructions: vec![],
            constants: vec![],
            constant_index: HashMap::new(),
        }
    }

    pub fn arity(&self) -> usize {
        self.param_names.len()
    }

    /// Add a constant and return its index. Equal constants share a slot.
    pub fn add_constant(&mut self, constant: Constant) -> u32 {
        if let Some(&index) = self.constant_index.get(&constant) {
            return index;
        }
        let index = self.constants.len() as u32;
        self.constant_index.insert(constant.clone(), index);
        self.constants.push(constant);
        index
    }

    /// Emit an instruction and return its index.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        let index = self.instructions.len();
        self.instructions.push(instruction);
        index
    }

    /// Index the next emitted instruction will get.
    pub fn next_offset(&self) -> u32 {
        self.instructions.len() as u32
    }

    /// Point the jump at `index` to `target`.
    pub fn patch_jump(&mut self, index: usize, target: u32) {
        self.instructions[index].a = target;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledClass {
    pub name: String,
    pub modifiers: Vec<String>,
    pub methods: Vec<CompiledFunction>,
}

impl CompiledClass {
    pub fn method(&self, name: &str) -> Option<&CompiledFunction> {
        self.methods.iter().find(|method| method.name == name)
    }
}

/// Everything written into a library image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledLibrary {
    pub assembly_name: String,
    pub output_kind: OutputKind,
    pub optimization: OptimizationLevel,
    pub namespace: String,
    pub classes: Vec<CompiledClass>,
    pub version: String,
}

impl CompiledLibrary {
    pub fn new(
        assembly_name: impl Into<String>,
        output_kind: OutputKind,
        optimization: OptimizationLevel,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            assembly_name: assembly_name.into(),
            output_kind,
            optimization,
            namespace: namespace.into(),
            classes: vec![],
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Look up `Namespace.Class` then `method`.
    pub fn find_method(&self, qualified_class: &str, method: &str) -> Option<&CompiledFunction> {
        let class_name = qualified_class
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('.'))?;
        self.classes
            .iter()
            .find(|class| class.name == class_name)?
            .method(method)
    }
}
