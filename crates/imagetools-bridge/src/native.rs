// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine-backed native module, exposed under both calling conventions.
//
// Work is moved off the calling thread: onto Tokio's blocking pool when a
// runtime is active, otherwise onto a named worker thread. The call itself
// returns immediately.

use std::sync::{Arc, RwLock};

use tracing::{debug, error};

use imagetools_core::{BinaryImageArgs, ToolsConfig};
use imagetools_engine::ImageToolsEngine;

use crate::promise::{Rejecter, Resolver};
use crate::traits::{ErrorFirstCallback, ErrorFirstModule, ResolveRejectModule};

/// Run `task` without blocking the caller.
///
/// If no worker can be started the task, and the callbacks it owns, are
/// dropped; the caller's promise then settles as `Abandoned`.
pub fn dispatch<F>(task: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(task);
        }
        Err(_) => {
            if let Err(e) = std::thread::Builder::new()
                .name("imagetools-worker".into())
                .spawn(task)
            {
                error!(error = %e, "failed to start image worker thread");
            }
        }
    }
}

/// The image engine as a native module. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct EngineModule {
    engine: Arc<ImageToolsEngine>,
}

impl EngineModule {
    pub fn new(config: ToolsConfig) -> Self {
        Self {
            engine: Arc::new(ImageToolsEngine::new(config)),
        }
    }
}

static SHARED: RwLock<Option<EngineModule>> = RwLock::new(None);

/// Process-wide module used by the foreign surfaces.
///
/// Created on first use from [`ToolsConfig::from_env`].
pub fn shared_module() -> EngineModule {
    if let Ok(guard) = SHARED.read() {
        if let Some(module) = guard.as_ref() {
            return module.clone();
        }
    }
    let mut guard = match SHARED.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard
        .get_or_insert_with(|| EngineModule::new(ToolsConfig::from_env()))
        .clone()
}

/// Replace the process-wide module. Calls already in flight keep the old one.
pub fn configure_shared(config: ToolsConfig) {
    debug!(cache_dir = %config.cache_dir.display(), "Shared module reconfigured");
    let mut guard = match SHARED.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Some(EngineModule::new(config));
}

impl ResolveRejectModule for EngineModule {
    fn create_binary_image(&self, args: BinaryImageArgs, resolve: Resolver, reject: Rejecter) {
        let engine = self.engine.clone();
        dispatch(move || match engine.create_binary_image(&args) {
            Ok(response) => resolve.resolve(response),
            Err(e) => reject.reject(e),
        });
    }

    fn get_image_rgbas(&self, image_path: String, resolve: Resolver, reject: Rejecter) {
        let engine = self.engine.clone();
        dispatch(move || match engine.get_image_rgbas(&image_path) {
            Ok(response) => resolve.resolve(response),
            Err(e) => reject.reject(e),
        });
    }
}

impl ErrorFirstModule for EngineModule {
    fn create_binary_image(&self, args: BinaryImageArgs, callback: ErrorFirstCallback) {
        let engine = self.engine.clone();
        dispatch(move || match engine.create_binary_image(&args) {
            Ok(response) => callback(None, Some(response)),
            Err(e) => callback(Some(e), None),
        });
    }

    fn get_image_rgbas(&self, image_path: String, callback: ErrorFirstCallback) {
        let engine = self.engine.clone();
        dispatch(move || match engine.get_image_rgbas(&image_path) {
            Ok(response) => callback(None, Some(response)),
            Err(e) => callback(Some(e), None),
        });
    }
}
