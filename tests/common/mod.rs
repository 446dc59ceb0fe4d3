#![allow(dead_code)]

pub mod file;

use assert_cmd::assert::Assert;

/// Captured stdout of a finished command.
pub fn stdout_of(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

pub fn stderr_of(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}
