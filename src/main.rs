// Copyright 2025 the Kupu Authors
// SPDX-License-Identifier: Apache-2.0

//! Kupu command-line front end

use std::process::ExitCode;

fn main() -> ExitCode {
    kupu::run()
}
