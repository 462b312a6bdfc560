// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! imagetools bridge: one promise-returning API over the native image module.
//!
//! The Android variant adapts a resolve/reject native module, the iOS variant
//! an error-first one. Both settle each call exactly once and pass native
//! results and errors through unchanged. Foreign hosts reach the same module
//! through the C ABI in [`ffi`] and, on Android, through JNI.

pub mod android;
pub mod ffi;
pub mod ios;
pub mod native;
pub mod promise;
pub mod traits;

#[cfg(target_os = "android")]
pub mod jni_bridge;

pub use android::AndroidImageTools;
pub use ios::IosImageTools;
pub use native::EngineModule;
pub use promise::{Promise, Rejecter, Resolver, deferred};
pub use traits::{ErrorFirstCallback, ErrorFirstModule, ImageTools, ResolveRejectModule};

use imagetools_core::ToolsConfig;

/// The adapter compiled in for the target platform.
#[cfg(target_os = "ios")]
pub type PlatformImageTools = IosImageTools<EngineModule>;

/// The adapter compiled in for the target platform.
#[cfg(not(target_os = "ios"))]
pub type PlatformImageTools = AndroidImageTools<EngineModule>;

/// The platform adapter over the process-wide native module.
///
/// The C ABI and JNI entry points call through this, so foreign hosts get
/// the same pre-dispatch checks as Rust callers on that platform.
pub fn shared_tools() -> PlatformImageTools {
    PlatformImageTools::new(native::shared_module())
}

/// Build the image tools implementation for the target operating system.
///
/// iOS gets the error-first adapter with its JPEG/PNG restriction; Android,
/// desktop and CI builds get the resolve/reject adapter.
pub fn platform_image_tools(config: ToolsConfig) -> Box<dyn ImageTools> {
    Box::new(PlatformImageTools::new(EngineModule::new(config)))
}
