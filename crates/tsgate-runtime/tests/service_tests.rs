//! Tests for the module service facade

use std::sync::Arc;

use tsgate_engine::{
    CompileOptions, CompilerEngine, CompilerHost, Diagnostic, EmitResult, ModuleId, UrlMapper,
};
use tsgate_net::MemoryFetcher;
use tsgate_runtime::{
    ModuleResponse, ModuleService, RuntimeError, ServiceConfig, JAVASCRIPT_CONTENT_TYPE,
};

const ORIGIN: &str = "https://app.test";
const LIB_ROOT: &str = "https://cdn.test/ts/";

/// Emits each root unchanged, after checking the standard library is visible
struct PassThroughEngine {
    mapper: UrlMapper,
}

impl CompilerEngine for PassThroughEngine {
    fn emit(
        &mut self,
        roots: &[ModuleId],
        _options: &CompileOptions,
        host: &mut dyn CompilerHost,
    ) -> EmitResult {
        if !host.file_exists("lib.d.ts") {
            return EmitResult::skipped(vec![Diagnostic::global("Cannot find lib.d.ts.")]);
        }
        for root in roots {
            let Some(text) = host.read_file(root.as_str()).map(str::to_string) else {
                return EmitResult::skipped(vec![Diagnostic::global(format!(
                    "File '{root}' not found."
                ))]);
            };
            let artifact = self.mapper.to_artifact_id(root.as_str());
            host.write_file(artifact.as_str(), &text);
        }
        EmitResult::emitted()
    }
}

fn config() -> ServiceConfig {
    let mut config = ServiceConfig::new(ORIGIN);
    config.std_lib.root = LIB_ROOT.to_string();
    config.std_lib.files = vec!["lib.d.ts".to_string(), "lib.es5.d.ts".to_string()];
    config
}

fn fetcher() -> Arc<MemoryFetcher> {
    Arc::new(MemoryFetcher::with_files([
        (format!("{LIB_ROOT}lib/lib.d.ts"), "/// <reference lib=\"es5\" />".to_string()),
        (format!("{LIB_ROOT}lib/lib.es5.d.ts"), "interface Array<T> {}".to_string()),
        (format!("{ORIGIN}/main.ts"), "export const main = 1;".to_string()),
    ]))
}

async fn service(fetcher: Arc<MemoryFetcher>) -> ModuleService<MemoryFetcher, PassThroughEngine> {
    let engine = PassThroughEngine {
        mapper: UrlMapper::new(ORIGIN),
    };
    ModuleService::with_fetcher(&config(), fetcher, engine)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_start_loads_std_lib() {
    let fetcher = fetcher();
    let service = service(Arc::clone(&fetcher)).await;

    assert_eq!(service.compiler().std_lib().len(), 2);
    assert_eq!(fetcher.fetch_count(&format!("{LIB_ROOT}lib/lib.d.ts")), 1);
    assert_eq!(service.origin(), ORIGIN);
}

#[tokio::test]
async fn test_start_fails_on_missing_lib_file() {
    let fetcher = fetcher();
    fetcher.remove(&format!("{LIB_ROOT}lib/lib.es5.d.ts"));
    let engine = PassThroughEngine {
        mapper: UrlMapper::new(ORIGIN),
    };

    let result = ModuleService::with_fetcher(&config(), fetcher, engine).await;
    assert!(matches!(result, Err(RuntimeError::StdLib(_))));
}

#[tokio::test]
async fn test_start_rejects_invalid_config() {
    let mut config = config();
    config.origin = "ftp://app.test".to_string();
    let engine = PassThroughEngine {
        mapper: UrlMapper::new(ORIGIN),
    };

    let result = ModuleService::with_fetcher(&config, fetcher(), engine).await;
    assert!(matches!(result, Err(RuntimeError::Config(_))));
}

#[tokio::test]
async fn test_handle_serves_javascript() {
    let mut service = service(fetcher()).await;

    let response = service.handle(&format!("{ORIGIN}/main.ts")).await;
    assert_eq!(
        response,
        Some(ModuleResponse {
            body: "export const main = 1;".to_string(),
            content_type: JAVASCRIPT_CONTENT_TYPE,
        })
    );
    assert_eq!(JAVASCRIPT_CONTENT_TYPE, "application/javascript");
}

#[tokio::test]
async fn test_handle_serves_cross_origin_import() {
    let fetcher = fetcher();
    fetcher.insert(
        format!("{ORIGIN}/main.ts"),
        "import { x } from 'https://cdn.test/x.ts';",
    );
    fetcher.insert("https://cdn.test/x.ts", "export const x = 1;");
    let mut service = service(Arc::clone(&fetcher)).await;

    assert!(service.handle(&format!("{ORIGIN}/main.ts")).await.is_some());
    assert!(service.compiler().sources().contains("https://cdn.test/x.ts"));

    let response = service.handle("https://cdn.test/x.ts").await.unwrap();
    assert_eq!(response.body, "export const x = 1;");
    assert_eq!(response.content_type, JAVASCRIPT_CONTENT_TYPE);
}

#[tokio::test]
async fn test_same_origin_only_passes_through_foreign_origin() {
    let fetcher = fetcher();
    fetcher.insert("https://other.test/main.ts", "export {};");
    let mut config = config();
    config.same_origin_only = true;
    let engine = PassThroughEngine {
        mapper: UrlMapper::new(ORIGIN),
    };
    let mut service = ModuleService::with_fetcher(&config, Arc::clone(&fetcher), engine)
        .await
        .unwrap();

    assert_eq!(service.handle("https://other.test/main.ts").await, None);
    assert_eq!(service.handle("https://app.tester/main.ts").await, None);
    assert_eq!(fetcher.fetch_count("https://other.test/main.ts"), 0);
    assert!(service.handle(&format!("{ORIGIN}/main.ts")).await.is_some());
}

#[tokio::test]
async fn test_handle_passes_through_uncompiled_assets() {
    let mut service = service(fetcher()).await;
    assert_eq!(service.handle(&format!("{ORIGIN}/index.html")).await, None);
}

#[tokio::test]
async fn test_handles() {
    let service = service(fetcher()).await;
    assert!(service.handles("https://app.test/main.ts"));
    assert!(service.handles("https://cdn.test/x.ts"));
    assert!(service.handles("/main.ts"));

    let mut config = config();
    config.same_origin_only = true;
    let engine = PassThroughEngine {
        mapper: UrlMapper::new(ORIGIN),
    };
    let service = ModuleService::with_fetcher(&config, fetcher(), engine)
        .await
        .unwrap();
    assert!(service.handles("https://app.test/main.ts"));
    assert!(service.handles("https://app.test"));
    assert!(service.handles("/main.ts"));
    assert!(!service.handles("https://app.testing/main.ts"));
}

#[tokio::test]
async fn test_init_logging_is_opt_in() {
    let mut config = config();
    config.init_logging = true;
    config.verbosity = 2;

    let engine = PassThroughEngine {
        mapper: UrlMapper::new(ORIGIN),
    };
    assert!(ModuleService::with_fetcher(&config, fetcher(), engine).await.is_ok());

    // The global subscriber is now taken; only services that opt in try to
    // install another one.
    let engine = PassThroughEngine {
        mapper: UrlMapper::new(ORIGIN),
    };
    let result = ModuleService::with_fetcher(&config, fetcher(), engine).await;
    assert!(matches!(result, Err(RuntimeError::Logging(_))));

    let _ = service(fetcher()).await;
}
