//! Command implementations for the perfsweep CLI.

mod report;
mod run;
mod sweep;

pub use report::report;
pub use run::run;
pub use sweep::sweep;

use crate::GlobalArgs;
use perfsweep_cache::ExecutionCache;
use perfsweep_core::{Error, Result};
use perfsweep_runner::{PerfRunner, RunnerConfig};
use std::fs;

/// Prepare the cache directory and check that the measured program exists.
///
/// Runs before any measurement; a missing program is a configuration error.
pub fn bootstrap(global: &GlobalArgs) -> Result<()> {
    fs::create_dir_all(&global.cache_dir)?;

    if !global.program.is_file() {
        return Err(Error::Configuration(format!(
            "Program \"{}\" not found, build it before running measurements",
            global.program.display()
        )));
    }
    Ok(())
}

/// Create a cache backed by the `perf stat` runner.
fn create_cache(global: &GlobalArgs) -> ExecutionCache {
    let config = RunnerConfig::new(&global.program)
        .with_harness(&global.harness)
        .with_artifact(&global.artifact)
        .with_threads_env(&global.threads_env);
    ExecutionCache::new(&global.cache_dir, Box::new(PerfRunner::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn global(dir: &std::path::Path, program: PathBuf) -> GlobalArgs {
        GlobalArgs {
            cache_dir: dir.join("results"),
            program,
            harness: PathBuf::from("perf"),
            artifact: PathBuf::from("mandelbrot.ppm"),
            threads_env: "OMP_NUM_THREADS".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn test_bootstrap_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let args = global(dir.path(), dir.path().join("mandelbrot"));

        assert!(matches!(bootstrap(&args), Err(Error::Configuration(_))));
        // The cache directory is still prepared.
        assert!(args.cache_dir.is_dir());
    }

    #[test]
    fn test_bootstrap_ok() {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("mandelbrot");
        fs::write(&program, "").unwrap();

        assert!(bootstrap(&global(dir.path(), program)).is_ok());
    }

    #[test]
    fn test_create_cache_uses_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = global(dir.path(), dir.path().join("mandelbrot"));
        assert_eq!(create_cache(&args).dir(), args.cache_dir);
    }
}
