/// Compilation session: one syntax tree, one set of options, one emit.
///
/// Pipeline: bind -> reachability/exhaustiveness -> entry point check ->
/// decision tree lowering -> result sharing (release) -> codegen -> image.
/// Errors in the analysis passes stop the pipeline before anything is written.

use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;
use std::time::Instant;

use log::debug;
use switchbench_language::ast::CompilationUnit;

use crate::bind::{self, BoundUnit};
use crate::codegen;
use crate::decision;
use crate::diag::{self, Diagnostic, Severity};
use crate::exhaustiveness;
use crate::image;
use crate::ir::CompiledLibrary;
use crate::optimize;
use crate::options::{CompilationOptions, OutputKind};

/// Outcome of `Compilation::emit`. `success` is false whenever any error
/// diagnostic was produced; callers must check it before trusting the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitResult {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl EmitResult {
    pub fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self { success: false, diagnostics }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

pub struct Compilation<'a> {
    assembly_name: String,
    unit: &'a CompilationUnit<'a>,
    options: CompilationOptions,
}

impl<'a> Compilation<'a> {
    pub fn create(
        assembly_name: impl Into<String>,
        unit: &'a CompilationUnit<'a>,
        options: CompilationOptions,
    ) -> Self {
        Self {
            assembly_name: assembly_name.into(),
            unit,
            options,
        }
    }

    /// Diagnostics from analysis alone, without lowering or emitting.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.analyze(&mut diagnostics);
        diagnostics
    }

    fn analyze(&self, diagnostics: &mut Vec<Diagnostic>) -> BoundUnit<'a> {
        let bound = bind::bind_unit(self.unit, diagnostics);
        exhaustiveness::check_switch(&bound.method.switch, diagnostics);
        if self.options.output_kind == OutputKind::ConsoleApplication
            && !(bound.method.is_static && bound.method.name == "Main")
        {
            diagnostics.push(Diagnostic::error(
                diag::NO_ENTRY_POINT,
                "Program does not contain a static 'Main' method suitable for an entry point",
            ));
        }
        bound
    }

    /// Run every pass short of writing the image.
    pub fn compile(&self) -> Result<(CompiledLibrary, Vec<Diagnostic>), Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();

        let started = Instant::now();
        let bound = self.analyze(&mut diagnostics);
        let arms = &bound.method.switch.arms;
        debug!(
            "analysis: {} arms, {} diagnostic(s) in {:?}",
            arms.len(),
            diagnostics.len(),
            started.elapsed()
        );
        if diag::has_errors(&diagnostics) {
            return Err(diagnostics);
        }

        let started = Instant::now();
        let tree = decision::lower_switch(&bound.method.switch);
        let result_blocks = if self.options.is_release() {
            optimize::share_results(arms)
        } else {
            optimize::unshared_results(arms.len())
        };
        debug!(
            "lowering: hash dispatch {} in {:?}",
            tree.uses_hash,
            started.elapsed()
        );

        let started = Instant::now();
        let library = codegen::generate_library(
            &self.assembly_name,
            self.options,
            &bound,
            &tree,
            &result_blocks,
        );
        debug!(
            "codegen: {} instruction(s) in {:?}",
            library.classes.iter().flat_map(|c| &c.methods).map(|m| m.instructions.len()).sum::<usize>(),
            started.elapsed()
        );

        Ok((library, diagnostics))
    }

    /// Compile and write the image to `writer`.
    pub fn emit_to<W: Write>(&self, writer: &mut W) -> EmitResult {
        match self.compile() {
            Ok((library, diagnostics)) => self.write(writer, &library, diagnostics),
            Err(diagnostics) => EmitResult::failed(diagnostics),
        }
    }

    /// Compile and write the image to `path`, replacing any existing file.
    /// When compilation fails nothing is written and a file left at `path`
    /// by an earlier emit is removed.
    pub fn emit(&self, path: impl AsRef<Path>) -> EmitResult {
        let path = path.as_ref();
        let (library, mut diagnostics) = match self.compile() {
            Ok(compiled) => compiled,
            Err(mut diagnostics) => {
                discard_stale_output(path, &mut diagnostics);
                return EmitResult::failed(diagnostics);
            }
        };

        let file = match fs::File::create(path) {
            Ok(file) => file,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    diag::OUTPUT_WRITE_FAILED,
                    format!("Cannot open '{}' for writing -- {}", path.display(), e),
                ));
                return EmitResult::failed(diagnostics);
            }
        };
        self.write(&mut BufWriter::new(file), &library, diagnostics)
    }

    fn write<W: Write>(
        &self,
        writer: &mut W,
        library: &CompiledLibrary,
        mut diagnostics: Vec<Diagnostic>,
    ) -> EmitResult {
        let started = Instant::now();
        let written = image::write_image(&mut *writer, library, self.options.deterministic)
            .and_then(|manifest| {
                writer.flush()?;
                Ok(manifest)
            });
        match written {
            Ok(manifest) => {
                debug!("emit: module {} in {:?}", manifest.module_id, started.elapsed());
                EmitResult { success: true, diagnostics }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    diag::OUTPUT_WRITE_FAILED,
                    format!("Cannot write '{}' -- {}", self.assembly_name, e),
                ));
                EmitResult::failed(diagnostics)
            }
        }
    }
}

fn discard_stale_output(path: &Path, diagnostics: &mut Vec<Diagnostic>) {
    match fs::remove_file(path) {
        Ok(()) => debug!("emit: removed stale {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => diagnostics.push(Diagnostic::error(
            diag::OUTPUT_WRITE_FAILED,
            format!("Cannot remove stale '{}' -- {}", path.display(), e),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;
    use crate::interp::{LoadedLibrary, Value};
    use crate::options::OptimizationLevel;
    use crate::testing::TestUnit;
    use switchbench_language::ast::*;
    use switchbench_language::builder::SwitchBuilder;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time must be after epoch")
            .as_nanos();
        let base = env::temp_dir().join(format!("switchbench-compiler-{nanos}"));
        fs::create_dir_all(&base).expect("temp dir create should succeed");
        base.join(name)
    }

    #[test]
    fn three_arms_and_discard_emit_a_loadable_library() {
        let test = TestUnit::new();
        let unit = test.null_switch(&["a", "b", "c"]);
        let path = temp_path("SomeAssm.dll");

        let result = Compilation::create("SomeAssm", &unit, CompilationOptions::default()).emit(&path);
        assert!(result.success, "{:?}", result.diagnostics);
        assert!(path.exists());

        let loaded = LoadedLibrary::load(&path).expect("load failed");
        assert_eq!(loaded.manifest.assembly, "SomeAssm");
        assert_eq!(loaded.manifest.output_kind, OutputKind::DynamicallyLinkedLibrary);
        let value = loaded.invoke("SomeNs.SomeClass", "SomeMethod", &["b"]).expect("invoke failed");
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn duplicate_labels_fail_without_writing() {
        let test = TestUnit::new();
        let unit = test.null_switch(&["same", "other", "same"]);
        let path = temp_path("Duplicate.dll");

        let result = Compilation::create("Duplicate", &unit, CompilationOptions::default()).emit(&path);
        assert!(!result.success);
        assert_eq!(result.error_count(), 1);
        let error = result.errors().next().expect("one error");
        assert_eq!(error.code, diag::SUBSUMED_PATTERN);
        assert_eq!(error.arm, Some(2));
        assert!(!path.exists());
    }

    #[test]
    fn failed_emit_removes_the_previous_artifact() {
        let test = TestUnit::new();
        let path = temp_path("Stale.dll");

        let valid = test.null_switch(&["a", "b", "c"]);
        let result = Compilation::create("Stale", &valid, CompilationOptions::default()).emit(&path);
        assert!(result.success);
        assert!(path.exists());

        let duplicate = test.null_switch(&["a", "a"]);
        let result = Compilation::create("Stale", &duplicate, CompilationOptions::default()).emit(&path);
        assert!(!result.success);
        assert_eq!(result.error_count(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn emit_overwrites_an_existing_file() {
        let test = TestUnit::new();
        let unit = test.null_switch(&["a"]);
        let path = temp_path("Overwrite.dll");
        fs::write(&path, b"stale").expect("seed write should succeed");

        let result = Compilation::create("Overwrite", &unit, CompilationOptions::default()).emit(&path);
        assert!(result.success);
        assert!(LoadedLibrary::load(&path).is_ok());
    }

    #[test]
    fn unwritable_path_is_a_diagnostic() {
        let test = TestUnit::new();
        let unit = test.null_switch(&["a"]);
        let path = temp_path("missing-dir").join("nested").join("Out.dll");

        let result = Compilation::create("Out", &unit, CompilationOptions::default()).emit(&path);
        assert!(!result.success);
        assert_eq!(result.diagnostics[0].code, diag::OUTPUT_WRITE_FAILED);
    }

    #[test]
    fn console_application_needs_an_entry_point() {
        let test = TestUnit::new();
        let unit = test.null_switch(&["a"]);
        let options = CompilationOptions::new(OutputKind::ConsoleApplication);
        let diagnostics = Compilation::create("App", &unit, options).diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, diag::NO_ENTRY_POINT);
    }

    #[test]
    fn console_application_with_static_main_emits() {
        let arena = bumpalo::Bump::new();
        let body = SwitchBuilder::new(&arena, "str")
            .arm("a", Expression::Integer(1))
            .discard(Expression::Integer(0));
        let method = Method::new(
            "Main",
            PredefinedType::Object,
            Parameter::new("str", PredefinedType::String),
            body,
        )
        .with_modifiers(&[Modifier::Public, Modifier::Static]);
        let unit = CompilationUnit::new(Namespace::new(
            "SomeNs",
            Class::new("Program", &[Modifier::Public], method),
        ));

        let options = CompilationOptions::new(OutputKind::ConsoleApplication);
        let compilation = Compilation::create("App", &unit, options);
        assert!(compilation.diagnostics().is_empty());

        let mut image = Vec::new();
        assert!(compilation.emit_to(&mut image).success);
        let (manifest, library) =
            image::read_image(&mut std::io::Cursor::new(image)).expect("read failed");
        assert_eq!(manifest.output_kind, OutputKind::ConsoleApplication);
        let main = library.find_method("SomeNs.Program", "Main").expect("Main missing");
        assert!(main.is_static);
        assert_eq!(crate::interp::invoke(main, &[Value::Str("a".to_string())]), Ok(Value::Int(1)));
    }

    #[test]
    fn debug_and_release_images_behave_the_same() {
        let test = TestUnit::new();
        let unit = test.numbered_switch(32);
        for optimization in [OptimizationLevel::Debug, OptimizationLevel::Release] {
            let options = CompilationOptions::default().with_optimization(optimization);
            let mut image = Vec::new();
            let result = Compilation::create("Levels", &unit, options).emit_to(&mut image);
            assert!(result.success);

            let (manifest, library) =
                image::read_image(&mut std::io::Cursor::new(image)).expect("read failed");
            assert_eq!(manifest.optimization, optimization);
            let method = library
                .find_method("SomeNs.SomeClass", "SomeMethod")
                .expect("method missing");
            let value = crate::interp::invoke(method, &[Value::Str("label-17".to_string())]);
            assert_eq!(value, Ok(Value::Int(17)));
        }
    }

    #[test]
    fn non_deterministic_builds_differ_in_module_id() {
        let test = TestUnit::new();
        let unit = test.null_switch(&["a"]);
        let options = CompilationOptions::default().with_deterministic(false);
        let compilation = Compilation::create("Nondet", &unit, options);

        let mut first = Vec::new();
        let mut second = Vec::new();
        assert!(compilation.emit_to(&mut first).success);
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(compilation.emit_to(&mut second).success);
        assert_ne!(first, second);
    }
}
