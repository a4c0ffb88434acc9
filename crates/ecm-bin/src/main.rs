// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! ECM - extenuating-circumstances case-management backend
//!
//! Main binary entry point.

use ecm_bin::{commands, error::report_error_and_exit, logging, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let settings = logging::LogSettings::resolve(&cli);
    logging::init_logging(&settings);

    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
