/// External `rustc` pipeline.
///
/// Renders the unit as a Rust crate with a `match` over string literals and
/// times a real `rustc` invocation on it. `#![deny(unreachable_patterns)]`
/// turns a repeated label into a hard error, like SB8510 on the native side.

use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, trace, warn};
use serde::Deserialize;
use switchbench_compiler::{CompilationOptions, Diagnostic, EmitResult, OptimizationLevel, OutputKind, Severity};
use switchbench_language::ast::{CompilationUnit, Expression, Pattern};
use uuid::Uuid;

use crate::error::BenchError;
use crate::pipeline::{EmitSettings, Pipeline, Session};

pub const DEFAULT_RUSTC: &str = "rustc";

/// Rendered crate source plus the 1-based line of the first arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCrate {
    pub source: String,
    pub first_arm_line: usize,
}

fn render_expression(out: &mut String, expr: &Expression<'_>, parameter: &str) -> fmt::Result {
    match expr {
        Expression::Null => out.write_str("None"),
        Expression::Integer(n) => write!(out, "Some(Box::new({}i64))", n),
        Expression::String(s) => write!(out, "Some(Box::new({:?}))", s),
        Expression::Identifier(name) if *name == parameter => {
            write!(out, "Some(Box::new({}.to_string()))", name)
        }
        Expression::Identifier(name) => out.write_str(name),
    }
}

fn render_governing(out: &mut String, expr: &Expression<'_>) -> fmt::Result {
    match expr {
        Expression::Identifier(name) => out.write_str(name),
        Expression::String(s) => write!(out, "{:?}", s),
        Expression::Integer(n) => write!(out, "{}", n),
        Expression::Null => out.write_str("None::<&str>"),
    }
}

/// Write the crate into `out`; returns the 1-based line of the first arm.
fn write_crate(out: &mut String, unit: &CompilationUnit<'_>) -> Result<usize, fmt::Error> {
    let class = unit.class();
    let method = unit.method();
    let parameter = method.parameter.name;

    out.write_str("#![deny(unreachable_patterns)]\n")?;
    out.write_str("#![allow(non_snake_case, dead_code)]\n\n")?;
    writeln!(out, "pub mod {} {{", unit.namespace.name)?;
    writeln!(out, "    pub struct {};\n", class.name)?;
    writeln!(out, "    impl {} {{", class.name)?;
    writeln!(
        out,
        "        pub fn {}({}: &str) -> Option<Box<dyn std::any::Any>> {{",
        method.name, parameter
    )?;
    out.write_str("            match ")?;
    render_governing(out, &method.body.governing)?;
    out.write_str(" {\n")?;
    let first_arm_line = out.lines().count() + 1;

    for arm in method.body.arms() {
        out.write_str("                ")?;
        match arm.pattern {
            Pattern::Literal(token) => write!(out, "{:?}", token)?,
            Pattern::Discard => out.write_char('_')?,
        }
        out.write_str(" => ")?;
        render_expression(out, &arm.result, parameter)?;
        out.write_str(",\n")?;
    }

    out.write_str("            }\n        }\n    }\n}\n")?;
    Ok(first_arm_line)
}

pub fn render_crate(unit: &CompilationUnit<'_>) -> Result<RenderedCrate, fmt::Error> {
    let mut source = String::with_capacity(64 * (unit.switch().arm_count() + 16));
    let first_arm_line = write_crate(&mut source, unit)?;
    Ok(RenderedCrate { source, first_arm_line })
}

/// A valid crate name derived from the assembly name.
fn crate_name(assembly_name: &str) -> String {
    let name: String = assembly_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => name,
        _ => format!("_{}", name),
    }
}

// ============================================================
// Diagnostics
// ============================================================

#[derive(Debug, Deserialize)]
struct RustcMessage {
    message: String,
    level: String,
    #[serde(default)]
    code: Option<RustcCode>,
    #[serde(default)]
    spans: Vec<RustcSpan>,
}

#[derive(Debug, Deserialize)]
struct RustcCode {
    code: String,
}

#[derive(Debug, Deserialize)]
struct RustcSpan {
    line_start: usize,
    is_primary: bool,
}

/// Parse `--error-format=json` stderr. Non-JSON lines, notes and the trailing
/// "aborting due to" summary are skipped.
pub fn parse_diagnostics(stderr: &str, first_arm_line: usize) -> Vec<Diagnostic> {
    stderr
        .lines()
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| serde_json::from_str::<RustcMessage>(line).ok())
        .filter_map(|msg| {
            let severity = if msg.level.starts_with("error") {
                Severity::Error
            } else if msg.level == "warning" {
                Severity::Warning
            } else {
                return None;
            };
            if msg.message.starts_with("aborting due to") {
                return None;
            }
            let code = msg.code.map(|c| c.code).unwrap_or_else(|| DEFAULT_RUSTC.to_string());
            let diagnostic = Diagnostic::new(severity, code, msg.message);
            let arm = msg
                .spans
                .iter()
                .find(|span| span.is_primary)
                .and_then(|span| span.line_start.checked_sub(first_arm_line));
            Some(match arm {
                Some(arm) => diagnostic.at_arm(arm),
                None => diagnostic,
            })
        })
        .collect()
}

// ============================================================
// Pipeline
// ============================================================

/// Owns its work directory; the directory is removed on drop.
#[derive(Debug)]
pub struct RustcPipeline {
    rustc: PathBuf,
    work_dir: PathBuf,
}

impl RustcPipeline {
    pub fn new(rustc: impl Into<PathBuf>) -> Self {
        Self {
            rustc: rustc.into(),
            work_dir: std::env::temp_dir().join(format!("switchbench-rustc-{}", Uuid::new_v4())),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

impl Default for RustcPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_RUSTC)
    }
}

impl Drop for RustcPipeline {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.work_dir) {
            Ok(()) => debug!("rustc: removed {}", self.work_dir.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("rustc: cannot remove {}: {}", self.work_dir.display(), e),
        }
    }
}

struct RustcSession {
    rustc: PathBuf,
    source_path: PathBuf,
    crate_name: String,
    options: CompilationOptions,
    metadata: String,
    first_arm_line: usize,
}

impl Pipeline for RustcPipeline {
    fn name(&self) -> &'static str {
        "rustc"
    }

    fn configure<'u>(
        &self,
        unit: &'u CompilationUnit<'u>,
        settings: &EmitSettings,
    ) -> Result<Box<dyn Session + 'u>, BenchError> {
        fs::create_dir_all(&self.work_dir).map_err(|e| BenchError::io(&self.work_dir, e))?;

        let crate_name = crate_name(&settings.assembly_name);
        let source_path = self.work_dir.join(format!("{}.rs", crate_name));
        let rendered = render_crate(unit)?;
        fs::write(&source_path, &rendered.source).map_err(|e| BenchError::io(&source_path, e))?;
        debug!(
            "rustc: wrote {} byte(s) of source to {}",
            rendered.source.len(),
            source_path.display()
        );

        let metadata = if settings.options.deterministic {
            crate_name.clone()
        } else {
            Uuid::new_v4().simple().to_string()
        };
        Ok(Box::new(RustcSession {
            rustc: self.rustc.clone(),
            source_path,
            crate_name,
            options: settings.options,
            metadata,
            first_arm_line: rendered.first_arm_line,
        }))
    }
}

impl RustcSession {
    fn command(&self, output: &Path) -> Command {
        let crate_type = match self.options.output_kind {
            OutputKind::DynamicallyLinkedLibrary => "--crate-type=cdylib",
            OutputKind::ConsoleApplication => "--crate-type=bin",
        };
        let opt_level = match self.options.optimization {
            OptimizationLevel::Debug => "opt-level=0",
            OptimizationLevel::Release => "opt-level=3",
        };

        let mut command = Command::new(&self.rustc);
        command
            .arg(crate_type)
            .arg("--edition=2021")
            .arg("--crate-name")
            .arg(&self.crate_name)
            .arg("-C")
            .arg(opt_level)
            .arg("-C")
            .arg(format!("metadata={}", self.metadata))
            .arg("--error-format=json")
            .arg(&self.source_path)
            .arg("-o")
            .arg(output);
        command
    }
}

impl Session for RustcSession {
    fn emit(&mut self, output: &Path) -> Result<EmitResult, BenchError> {
        // rustc leaves the output untouched on failure.
        match fs::remove_file(output) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(BenchError::io(output, e)),
        }

        let mut command = self.command(output);
        trace!("rustc: {:?}", command);
        let finished = command.output().map_err(|source| BenchError::Spawn {
            program: self.rustc.display().to_string(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&finished.stderr);
        let mut diagnostics = parse_diagnostics(&stderr, self.first_arm_line);
        let has_errors = diagnostics.iter().any(Diagnostic::is_error);
        if !finished.status.success() && !has_errors {
            diagnostics.push(Diagnostic::error(
                DEFAULT_RUSTC,
                format!("{} exited with {}", self.rustc.display(), finished.status),
            ));
        }

        Ok(EmitResult {
            success: finished.status.success() && !has_errors,
            diagnostics,
        })
    }
}
