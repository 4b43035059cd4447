//! Shared fixtures for the engine integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tsgate_engine::{
    scan_imports, CompileOptions, CompilerEngine, CompilerHost, Diagnostic, EmitResult,
    ModuleCompiler, ModuleId, StdLib, UrlMapper,
};
use tsgate_net::MemoryFetcher;

pub const ORIGIN: &str = "https://app.test";

/// Marker that makes the scripted engine report an error at its offset
pub const ERROR_MARKER: &str = "@error";

/// Declaration file the scripted engine requires before compiling anything
pub const STD_LIB_FILE: &str = "lib.d.ts";

/// Prefix the scripted engine puts in front of every emitted artifact
pub const EMIT_HEADER: &str = "// compiled\n";

/// Minimal stand-in for a real compiler.
///
/// Walks the import graph through the host the same way a real engine does,
/// requires the standard library, reports unresolvable imports and `@error`
/// markers as diagnostics, and otherwise emits every reachable module as
/// `EMIT_HEADER + text`.
#[derive(Clone)]
pub struct ScriptedEngine {
    mapper: UrlMapper,
    invocations: Arc<AtomicUsize>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            mapper: UrlMapper::new(ORIGIN),
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl CompilerEngine for ScriptedEngine {
    fn emit(
        &mut self,
        roots: &[ModuleId],
        options: &CompileOptions,
        host: &mut dyn CompilerHost,
    ) -> EmitResult {
        self.invocations.fetch_add(1, Ordering::SeqCst);

        let mut diagnostics = Vec::new();
        if !host.file_exists(STD_LIB_FILE) || host.read_file(STD_LIB_FILE).is_none() {
            diagnostics.push(Diagnostic::global("Cannot find global type 'Array'."));
        }
        let mut seen: FxHashSet<ModuleId> = roots.iter().cloned().collect();
        let mut queue: VecDeque<ModuleId> = roots.iter().cloned().collect();
        let mut modules = Vec::new();

        while let Some(id) = queue.pop_front() {
            let Some(text) = host.read_file(id.as_str()).map(str::to_string) else {
                diagnostics.push(Diagnostic::global(format!("File '{id}' not found.")));
                continue;
            };

            for import in scan_imports(&text) {
                let dep = self.mapper.to_source_id(&import.specifier, &id);
                if !host.file_exists(dep.as_str()) {
                    diagnostics.push(Diagnostic::at(
                        id.as_str(),
                        import.span.start,
                        format!("Cannot find module '{}'.", import.specifier),
                    ));
                } else if seen.insert(dep.clone()) {
                    queue.push_back(dep);
                }
            }

            for (offset, _) in text.match_indices(ERROR_MARKER) {
                diagnostics.push(Diagnostic::at(id.as_str(), offset, "Simulated error."));
            }
            modules.push((id, text));
        }

        if options.no_emit_on_error && !diagnostics.is_empty() {
            return EmitResult::skipped(diagnostics);
        }

        for (id, text) in modules {
            let artifact = self.mapper.to_artifact_id(id.as_str());
            host.write_file(artifact.as_str(), &format!("{EMIT_HEADER}{text}"));
        }
        EmitResult {
            emit_skipped: false,
            diagnostics,
        }
    }
}

/// Absolute URL of `path` under the test origin
pub fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

/// Fetcher serving `files`, keyed by origin-relative path
pub fn fetcher(files: &[(&str, &str)]) -> Arc<MemoryFetcher> {
    Arc::new(MemoryFetcher::with_files(
        files.iter().map(|(path, text)| (url(path), text.to_string())),
    ))
}

pub fn compiler(
    fetcher: Arc<MemoryFetcher>,
    engine: ScriptedEngine,
) -> ModuleCompiler<MemoryFetcher, ScriptedEngine> {
    compiler_with_std_lib(
        fetcher,
        engine,
        StdLib::from_files([(STD_LIB_FILE, "interface Array<T> {}")]),
    )
}

pub fn compiler_with_std_lib(
    fetcher: Arc<MemoryFetcher>,
    engine: ScriptedEngine,
    std_lib: StdLib,
) -> ModuleCompiler<MemoryFetcher, ScriptedEngine> {
    ModuleCompiler::new(fetcher, engine, UrlMapper::new(ORIGIN), Arc::new(std_lib))
}
