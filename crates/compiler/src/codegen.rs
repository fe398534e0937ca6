/// Codegen: emits register bytecode for a lowered switch method.
///
/// Register layout: r0 holds the governing value, r1 its hash (when the tree
/// dispatches on hashes), r2 is scratch for tests and results. Every leaf jumps
/// to a result block; result blocks follow the decision code.

use switchbench_language::ast::Modifier;

use crate::bind::{BoundMethod, BoundUnit, BoundValue};
use crate::decision::{Decision, DecisionTree};
use crate::ir::*;
use crate::options::CompilationOptions;

const INPUT: u32 = 0;
const HASH: u32 = 1;
const SCRATCH: u32 = 2;

struct Emitter<'m> {
    function: CompiledFunction,
    /// Arm index -> index of the arm whose result block it uses.
    result_blocks: &'m [usize],
    /// (jump instruction, result block) pairs to patch.
    pending: Vec<(usize, usize)>,
}

impl Emitter<'_> {
    fn load_value(&mut self, register: u32, value: BoundValue<'_>) {
        let instruction = match value {
            BoundValue::Null => Instruction::a_only(Opcode::LoadNull, register),
            BoundValue::Argument(index) => Instruction::ab(Opcode::GetArg, register, index),
            BoundValue::String(value) => {
                let index = self.function.add_constant(Constant::String(value.to_string()));
                Instruction::ab(Opcode::LoadConst, register, index)
            }
            BoundValue::Integer(value) => {
                let index = self.function.add_constant(Constant::Integer(value));
                Instruction::ab(Opcode::LoadConst, register, index)
            }
        };
        self.function.emit(instruction);
    }

    fn jump_to_result(&mut self, arm: usize) {
        let jump = self.function.emit(Instruction::a_only(Opcode::Jump, 0));
        self.pending.push((jump, self.result_blocks[arm]));
    }

    /// Emit `test`, then `then_branch` for the true case; returns to the caller
    /// positioned at the false case.
    fn test_and_branch(&mut self, test: Instruction, then_branch: impl FnOnce(&mut Self)) {
        self.function.emit(test);
        let skip = self.function.emit(Instruction::ab(Opcode::JumpIfFalse, 0, SCRATCH));
        then_branch(self);
        let target = self.function.next_offset();
        self.function.patch_jump(skip, target);
    }

    fn emit_decision(&mut self, node: &Decision<'_>) {
        let mut node = node;
        loop {
            match node {
                Decision::Arm(arm) => {
                    self.jump_to_result(*arm);
                    return;
                }
                Decision::Fail => {
                    self.function.emit(Instruction::a_only(Opcode::Fail, INPUT));
                    return;
                }
                Decision::Equals { label, then, otherwise } => {
                    let index = self.function.add_constant(Constant::String(label.to_string()));
                    let arm = *then;
                    self.test_and_branch(
                        Instruction::new(Opcode::StrEq, SCRATCH, INPUT, index),
                        |emitter| emitter.jump_to_result(arm),
                    );
                    node = &**otherwise;
                }
                Decision::HashBelow { pivot, below, rest } => {
                    let index = self.function.add_constant(Constant::Hash(*pivot));
                    self.test_and_branch(
                        Instruction::new(Opcode::HashLt, SCRATCH, HASH, index),
                        |emitter| emitter.emit_decision(below),
                    );
                    node = &**rest;
                }
                Decision::HashEquals { hash, then, otherwise } => {
                    let index = self.function.add_constant(Constant::Hash(*hash));
                    self.test_and_branch(
                        Instruction::new(Opcode::HashEq, SCRATCH, HASH, index),
                        |emitter| emitter.emit_decision(then),
                    );
                    node = &**otherwise;
                }
            }
        }
    }

    fn emit_result_blocks(&mut self, method: &BoundMethod<'_>) {
        let mut offsets: Vec<Option<u32>> = vec![None; method.switch.arms.len()];
        for (arm, &block) in self.result_blocks.iter().enumerate() {
            if block != arm {
                continue;
            }
            offsets[arm] = Some(self.function.next_offset());
            self.load_value(SCRATCH, method.switch.arms[arm].result);
            self.function.emit(Instruction::a_only(Opcode::Return, SCRATCH));
        }
        for (jump, block) in std::mem::take(&mut self.pending) {
            if let Some(target) = offsets[block] {
                self.function.patch_jump(jump, target);
            }
        }
    }
}

/// Generate bytecode for `method` from its decision tree.
/// `result_blocks` comes from `optimize::share_results` or `optimize::unshared_results`.
pub fn generate_method(
    method: &BoundMethod<'_>,
    tree: &DecisionTree<'_>,
    result_blocks: &[usize],
) -> CompiledFunction {
    let mut function = CompiledFunction::new(method.name, vec![method.parameter.0.to_string()]);
    function.is_static = method.is_static;
    function.registers = SCRATCH + 1;

    let mut emitter = Emitter {
        function,
        result_blocks,
        pending: Vec::new(),
    };
    emitter.load_value(INPUT, method.switch.governing);
    if tree.uses_hash {
        emitter.function.emit(Instruction::ab(Opcode::HashStr, HASH, INPUT));
    }
    emitter.emit_decision(&tree.root);
    emitter.emit_result_blocks(method);
    emitter.function
}

pub fn generate_library(
    assembly_name: &str,
    options: CompilationOptions,
    unit: &BoundUnit<'_>,
    tree: &DecisionTree<'_>,
    result_blocks: &[usize],
) -> CompiledLibrary {
    let mut library = CompiledLibrary::new(
        assembly_name,
        options.output_kind,
        options.optimization,
        unit.namespace,
    );
    library.classes.push(CompiledClass {
        name: unit.class_name.to_string(),
        modifiers: unit
            .class_modifiers
            .iter()
            .map(|modifier: &Modifier| modifier.keyword().to_string())
            .collect(),
        methods: vec![generate_method(&unit.method, tree, result_blocks)],
    });
    library
}
