/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::Arc;

use anyhow::Context;
use once_cell::sync::OnceCell;
use tracing_subscriber::filter::Filtered;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::TestWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::EnvFilter;

use crate::gn_env;

pub trait LogConfigurationReloadHandle: Send + Sync + 'static {
    fn update_log_filter(&self, format: &str) -> anyhow::Result<()>;
}

impl dyn LogConfigurationReloadHandle {
    pub fn noop() -> Arc<dyn LogConfigurationReloadHandle> {
        Arc::new(NoopLogConfigurationReloadHandle) as _
    }
}

struct NoopLogConfigurationReloadHandle;

impl LogConfigurationReloadHandle for NoopLogConfigurationReloadHandle {
    fn update_log_filter(&self, _filter: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<L, R> LogConfigurationReloadHandle for Handle<Filtered<L, EnvFilter, R>, R>
where
    L: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    fn update_log_filter(&self, raw: &str) -> anyhow::Result<()> {
        let filter = EnvFilter::try_new(raw).context("Invalid log filter")?;
        self.modify(|layer| *layer.filter_mut() = filter)
            .context("Error updating log filter")?;
        tracing::debug!("Log filter was updated to: `{}`", raw);
        Ok(())
    }
}

/// Install a global subscriber writing to `writer`, filtered by `$GN_LOG` (warnings by default).
pub fn init_tracing_for_writer<W>(writer: W) -> anyhow::Result<Arc<dyn LogConfigurationReloadHandle>>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    const ENV_VAR: &str = "GN_LOG";

    let filter = match gn_env!(ENV_VAR)? {
        Some(v) => EnvFilter::try_new(v)
            .with_context(|| format!("Failed to parse ${} as a filter", ENV_VAR))?,
        None => EnvFilter::new("warn"),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_filter(filter);

    let (layer, handle) = reload::Layer::new(layer);

    tracing_subscriber::registry().with(layer).try_init()?;

    Ok(Arc::new(handle) as _)
}

/// Send logs to the test harness's captured output. Safe to call from every test; only the
/// first call installs anything.
pub fn init_tracing_for_tests() {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_init(|| {
        // Fails if the test binary installed its own subscriber, which then keeps the logs.
        if let Err(e) = init_tracing_for_writer(TestWriter::new()) {
            eprintln!("Test logging not installed: {:#}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::Registry;

    use super::*;

    #[test]
    fn test_reload_handle_updates_filter() {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::sink)
            .with_filter(EnvFilter::new("warn"));
        let (layer, handle) = reload::Layer::<_, Registry>::new(layer);
        let _subscriber = tracing_subscriber::registry().with(layer);
        handle.update_log_filter("gn_interpreter=debug").unwrap();
    }

    #[test]
    fn test_init_for_tests_is_idempotent() {
        init_tracing_for_tests();
        init_tracing_for_tests();
        tracing::info!("logging installed");
    }

    #[test]
    fn test_noop_handle() {
        <dyn LogConfigurationReloadHandle>::noop()
            .update_log_filter("trace")
            .unwrap();
    }
}
