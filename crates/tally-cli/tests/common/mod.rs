use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Run the CLI binary with an isolated HOME, so the config file lands in a
/// temp directory and the caller's environment cannot leak a key in.
pub fn run_cli_with_env(args: &[&str], home: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tally"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd.env_remove("TALLY_API_KEY");
    cmd.env_remove("TALLY_BASE_URL");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI with a custom HOME and expect success.
pub fn run_cli_with_env_success(args: &[&str], home: &Path) -> String {
    let output = run_cli_with_env(args, home);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Where `tally configure` writes on Linux with the HOME above.
pub fn config_file(home: &Path) -> PathBuf {
    home.join("config").join("tally").join("config.json")
}
