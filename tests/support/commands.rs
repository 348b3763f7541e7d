//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a pwdstore command with an isolated environment.
    ///
    /// Returns a Command configured with:
    /// - HOME set to the temporary home directory
    /// - PWDSTORE_DIR pointing at the temporary store
    /// - PWDSTORE_CONFIG and GNUPGHOME inside the temporary home
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("pwdstore").expect("failed to find pwdstore binary");
        cmd.env("HOME", self.home.path());
        // Windows uses USERPROFILE instead of HOME for home directory
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("PWDSTORE_DIR", self.store.path());
        cmd.env("PWDSTORE_CONFIG", self.config_path());
        cmd.env("GNUPGHOME", self.gnupg_home());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("PWDSTORE_LOG");
        cmd.current_dir(self.store.path());
        cmd
    }

    /// Shortcut for `pwdstore show`.
    pub fn show(&self, names: &[&str]) -> Output {
        self.cmd()
            .arg("show")
            .args(names)
            .output()
            .expect("failed to run pwdstore show")
    }

    /// Shortcut for `pwdstore show` with passphrases piped on stdin.
    pub fn show_with_input(&self, names: &[&str], stdin: &str) -> Output {
        self.cmd()
            .arg("show")
            .arg("--reveal")
            .args(names)
            .write_stdin(stdin)
            .output()
            .expect("failed to run pwdstore show")
    }

    /// Shortcut for `pwdstore ls`.
    pub fn ls(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("ls")
            .args(args)
            .output()
            .expect("failed to run pwdstore ls")
    }

    /// Shortcut for `pwdstore recipients`.
    pub fn recipients(&self, name: &str) -> Output {
        self.cmd()
            .args(["recipients", name])
            .output()
            .expect("failed to run pwdstore recipients")
    }

    /// Shortcut for `pwdstore config ...`.
    pub fn config(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("config")
            .args(args)
            .output()
            .expect("failed to run pwdstore config")
    }
}
