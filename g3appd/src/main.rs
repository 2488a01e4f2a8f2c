/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::Context;
use log::{debug, error, info};

fn main() -> anyhow::Result<()> {
    let Some(proc_args) =
        g3appd::opts::parse_clap().context("failed to parse command line options")?
    else {
        return Ok(());
    };

    let _logger_guard = g3appd::log::setup(proc_args.verbose_level)
        .context("failed to setup logger")?;

    let config = g3appd::config::load(&proc_args.config_file)
        .context(format!("failed to load config, opts: {proc_args:?}"))?;
    debug!("loaded config from {}", proc_args.config_file.display());

    if proc_args.test_config {
        info!("the format of the config file is ok");
        return Ok(());
    }

    info!(
        "starting AppDynamics sync of {} rule(s) at {} minute(s) interval",
        config.rule_count(),
        config.interval_minutes()
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let ret = rt.block_on(g3appd::runtime::run(config));

    match ret {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("{e:?}");
            Err(e)
        }
    }
}
