//! Shared test utilities for integration tests
//!
//! Builds a throwaway GOPATH with a small documented package
//! and a command preconfigured to look only there.

use std::process::Command;

use assert_cmd::prelude::*;
use assert_fs::prelude::*;

pub const HELLO_GO: &str = "// Package hello greets people.
package hello

import \"fmt\"

// Greeting is the default salutation.
const Greeting = \"hello\"

// Greeter says hello.
type Greeter struct {
\tName string
\tloud bool
}

// NewGreeter returns a Greeter for name.
func NewGreeter(name string) *Greeter { return &Greeter{Name: name} }

// Greet prints the greeting.
func (g *Greeter) Greet() { fmt.Println(Greeting, g.Name) }

func helper() {}
";

/// GOPATH fixture: `src/example.com/hello` plus an `internal` subdirectory.
pub fn make_gopath() -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    tmp.child("gopath/src/example.com/hello/hello.go")
        .write_str(HELLO_GO)
        .expect("write hello.go");

    // Test files are listed but never documented
    tmp.child("gopath/src/example.com/hello/hello_test.go")
        .write_str("package hello\n\nfunc TestNothing() {}\n")
        .expect("write hello_test.go");

    tmp.child("gopath/src/example.com/hello/internal/impl.go")
        .write_str("package internal\n")
        .expect("write impl.go");

    tmp
}

/// The binary, isolated from the host Go installation and config.
pub fn annodoc(tmp: &assert_fs::TempDir) -> Command
{
    let mut cmd = Command::cargo_bin("annodoc").expect("bin");
    cmd.current_dir(tmp.path())
        .env_remove("GOROOT")
        .env_remove("RUST_LOG")
        .env(
            "GOPATH",
            tmp.path()
                .join("gopath"),
        );
    cmd
}
