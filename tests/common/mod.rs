use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

pub fn run_memoscribe(args: &[&str]) -> Output {
    TestEnv::new().run(args)
}

/// Runs the binary against scrubbed HOME/XDG directories so invocations never
/// see a developer's real config, model cache, or API key.
pub struct TestEnv {
    home: TempDir,
    config: TempDir,
    cache: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temporary HOME dir"),
            config: tempfile::tempdir().expect("create temporary XDG config dir"),
            cache: tempfile::tempdir().expect("create temporary XDG cache dir"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_memoscribe"))
            .args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.config.path())
            .env("XDG_CACHE_HOME", self.cache.path())
            .env_remove("MEMOSCRIBE_GEMINI_API_KEY")
            .output()
            .expect("failed to execute memoscribe binary")
    }

    #[allow(dead_code)]
    pub fn write_config(&self, contents: &str) {
        let config_dir = self.config.path().join("memoscribe");
        std::fs::create_dir_all(&config_dir).expect("create config directory");
        std::fs::write(config_dir.join("config.toml"), contents).expect("write config file");
    }

    #[allow(dead_code)]
    pub fn home_path(&self) -> &Path {
        self.home.path()
    }
}
