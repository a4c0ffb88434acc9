// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::BufRead;

use ecm_core::Argon2Hasher;

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Prints an Argon2id PHC string for the given password.
pub fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = match args.password {
        Some(password) if !args.stdin => password,
        _ => read_stdin_line()?,
    };

    let hash = Argon2Hasher::new()
        .hash(&password)
        .map_err(|e| BinError::output(e.to_string()))?;

    println!("{}", hash);
    Ok(())
}

fn read_stdin_line() -> BinResult<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
