/// Bytecode interpreter for emitted libraries.
///
/// Loads an image back from disk and runs one method on caller-supplied
/// arguments, so an emitted library can be exercised without a separate VM.

use std::fmt;
use std::fs;
use std::io::{self, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::hash::hash_str;
use crate::image::{self, Manifest};
use crate::ir::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Str(String),
    Bool(bool),
    Hash(u64),
}

impl From<&Constant> for Value {
    fn from(constant: &Constant) -> Self {
        match constant {
            Constant::Integer(n) => Value::Int(*n),
            Constant::String(s) => Value::Str(s.clone()),
            Constant::Hash(h) => Value::Hash(*h),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Hash(h) => write!(f, "#{:016x}", h),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("method '{class}.{method}' not found")]
    MethodNotFound { class: String, method: String },
    #[error("'{method}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        method: String,
        expected: usize,
        got: usize,
    },
    #[error("register r{0} out of range")]
    BadRegister(u32),
    #[error("constant #{0} out of range")]
    BadConstant(u32),
    #[error("argument #{0} out of range")]
    BadArgument(u32),
    #[error("{opcode:?} cannot operate on {value}")]
    TypeMismatch { opcode: Opcode, value: String },
    #[error("no arm matched {0}")]
    NoArmMatched(String),
    #[error("execution ran past the end of '{0}'")]
    MissingReturn(String),
}

/// Registers and arguments of the running method.
struct Frame<'f> {
    function: &'f CompiledFunction,
    registers: Vec<Value>,
    args: &'f [Value],
}

impl<'f> Frame<'f> {
    fn get(&self, register: u32) -> Result<&Value, RuntimeError> {
        self.registers
            .get(register as usize)
            .ok_or(RuntimeError::BadRegister(register))
    }

    fn set(&mut self, register: u32, value: Value) -> Result<(), RuntimeError> {
        let slot = self
            .registers
            .get_mut(register as usize)
            .ok_or(RuntimeError::BadRegister(register))?;
        *slot = value;
        Ok(())
    }

    fn constant(&self, index: u32) -> Result<&'f Constant, RuntimeError> {
        self.function
            .constants
            .get(index as usize)
            .ok_or(RuntimeError::BadConstant(index))
    }

    fn mismatch(opcode: Opcode, value: &Value) -> RuntimeError {
        RuntimeError::TypeMismatch { opcode, value: value.to_string() }
    }

    fn compare(&self, instr: &Instruction) -> Result<bool, RuntimeError> {
        let lhs = self.get(instr.b)?;
        let rhs = self.constant(instr.c)?;
        match (instr.opcode, lhs, rhs) {
            (Opcode::StrEq, Value::Str(value), Constant::String(label)) => Ok(value == label),
            (Opcode::StrEq, Value::Null, Constant::String(_)) => Ok(false),
            (Opcode::HashEq, Value::Hash(value), Constant::Hash(hash)) => Ok(value == hash),
            (Opcode::HashLt, Value::Hash(value), Constant::Hash(pivot)) => Ok(value < pivot),
            (opcode, value, _) => Err(Self::mismatch(opcode, value)),
        }
    }
}

/// Run `function` to completion.
pub fn invoke(function: &CompiledFunction, args: &[Value]) -> Result<Value, RuntimeError> {
    if args.len() != function.arity() {
        return Err(RuntimeError::ArityMismatch {
            method: function.name.clone(),
            expected: function.arity(),
            got: args.len(),
        });
    }

    let mut frame = Frame {
        function,
        registers: vec![Value::Null; function.registers as usize],
        args,
    };
    let mut ip = 0usize;

    loop {
        let instr = *function
            .instructions
            .get(ip)
            .ok_or_else(|| RuntimeError::MissingReturn(function.name.clone()))?;
        ip += 1;

        match instr.opcode {
            Opcode::LoadConst => {
                let value = Value::from(frame.constant(instr.b)?);
                frame.set(instr.a, value)?;
            }
            Opcode::LoadNull => frame.set(instr.a, Value::Null)?,
            Opcode::GetArg => {
                let value = frame
                    .args
                    .get(instr.b as usize)
                    .cloned()
                    .ok_or(RuntimeError::BadArgument(instr.b))?;
                frame.set(instr.a, value)?;
            }
            Opcode::HashStr => {
                let hash = match frame.get(instr.b)? {
                    Value::Str(value) => hash_str(value),
                    Value::Null => hash_str(""),
                    other => return Err(Frame::mismatch(instr.opcode, other)),
                };
                frame.set(instr.a, Value::Hash(hash))?;
            }
            Opcode::StrEq | Opcode::HashEq | Opcode::HashLt => {
                let result = frame.compare(&instr)?;
                frame.set(instr.a, Value::Bool(result))?;
            }
            Opcode::Jump => ip = instr.a as usize,
            Opcode::JumpIfFalse => match frame.get(instr.b)? {
                Value::Bool(false) => ip = instr.a as usize,
                Value::Bool(true) => {}
                other => return Err(Frame::mismatch(instr.opcode, other)),
            },
            Opcode::Return => return Ok(frame.get(instr.a)?.clone()),
            Opcode::Fail => return Err(RuntimeError::NoArmMatched(frame.get(instr.a)?.to_string())),
        }
    }
}

/// A library image read back from disk.
#[derive(Debug, Clone)]
pub struct LoadedLibrary {
    pub manifest: Manifest,
    pub library: CompiledLibrary,
}

impl LoadedLibrary {
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = fs::File::open(path.as_ref())?;
        let (manifest, library) = image::read_image(&mut BufReader::new(file))?;
        Ok(Self { manifest, library })
    }

    /// Call `Namespace.Class::method` with string arguments.
    pub fn invoke(&self, class: &str, method: &str, args: &[&str]) -> Result<Value, RuntimeError> {
        let function = self
            .library
            .find_method(class, method)
            .ok_or_else(|| RuntimeError::MethodNotFound {
                class: class.to_string(),
                method: method.to_string(),
            })?;
        let args: Vec<Value> = args.iter().map(|arg| Value::Str(arg.to_string())).collect();
        invoke(function, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::bind_unit;
    use crate::decision::lower_switch;
    use crate::codegen::generate_method;
    use crate::optimize::share_results;
    use crate::testing::TestUnit;

    fn compiled(count: usize) -> CompiledFunction {
        let test = TestUnit::new();
        let unit = test.numbered_switch(count);
        let bound = bind_unit(&unit, &mut vec![]);
        let tree = lower_switch(&bound.method.switch);
        generate_method(&bound.method, &tree, &share_results(&bound.method.switch.arms))
    }

    fn call(function: &CompiledFunction, input: &str) -> Value {
        invoke(function, &[Value::Str(input.to_string())]).expect("invoke failed")
    }

    #[test]
    fn linear_dispatch_selects_matching_arm() {
        let function = compiled(4);
        assert_eq!(call(&function, "label-0"), Value::Int(0));
        assert_eq!(call(&function, "label-3"), Value::Int(3));
        assert_eq!(call(&function, "label-4"), Value::Int(-1));
    }

    #[test]
    fn hash_dispatch_selects_matching_arm() {
        let function = compiled(500);
        for i in [0, 1, 250, 498, 499] {
            assert_eq!(call(&function, &format!("label-{i}")), Value::Int(i));
        }
        assert_eq!(call(&function, "label-500"), Value::Int(-1));
        assert_eq!(call(&function, ""), Value::Int(-1));
    }

    #[test]
    fn null_input_falls_through_to_discard() {
        let function = compiled(10);
        assert_eq!(invoke(&function, &[Value::Null]), Ok(Value::Int(-1)));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let function = compiled(1);
        let result = invoke(&function, &[]);
        assert!(matches!(result, Err(RuntimeError::ArityMismatch { expected: 1, got: 0, .. })));
    }

    #[test]
    fn fail_reports_the_input() {
        let mut function = CompiledFunction::new("M", vec!["s".to_string()]);
        function.registers = 1;
        function.emit(Instruction::ab(Opcode::GetArg, 0, 0));
        function.emit(Instruction::a_only(Opcode::Fail, 0));
        let result = invoke(&function, &[Value::Str("x".to_string())]);
        assert_eq!(result, Err(RuntimeError::NoArmMatched("\"x\"".to_string())));
    }
}
