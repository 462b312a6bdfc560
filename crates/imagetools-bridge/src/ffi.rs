// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C ABI for foreign hosts (Swift, Objective-C, C).
//
// Calls go through the platform adapter, so an iOS build refuses formats
// other than JPEG and PNG here exactly as it does for Rust callers. Results
// follow the error-first convention: the callback receives
// `(ctx, error_json, response_json)` with exactly one of the two JSON strings
// non-null. Both strings are only valid for the duration of the callback.
// The declarations live in `include/imagetools.h`.

use std::ffi::{CStr, CString, c_char, c_void};

use tracing::{debug, warn};

use imagetools_core::error::{ImageToolsError, Result};
use imagetools_core::{BinaryImageRequest, CompressFormat, Response, ToolsConfig};

use crate::native::configure_shared;
use crate::shared_tools;
use crate::traits::ImageTools;

/// `createBinaryImage` parameters as passed across the C boundary.
///
/// `front_color` and `back_color` may be null to use the defaults.
#[repr(C)]
pub struct ImageToolsBinaryRequest {
    pub path: *const c_char,
    pub binarize_type: i32,
    pub threshold: i32,
    /// "PNG", "JPEG" or "WEBP", case-insensitive.
    pub format: *const c_char,
    pub quality: i32,
    pub output_base64: bool,
    pub front_color: *const c_char,
    pub back_color: *const c_char,
}

/// Completion callback: `(ctx, error_json, response_json)`.
pub type ImageToolsCallback =
    extern "C" fn(ctx: *mut c_void, error_json: *const c_char, response_json: *const c_char);

/// Caller's callback and opaque context, carried to the worker thread.
struct Completion {
    callback: ImageToolsCallback,
    ctx: *mut c_void,
}

// The foreign caller owns `ctx` and guarantees it may be used from any thread
// until the callback has run.
unsafe impl Send for Completion {}

impl Completion {
    fn complete(self, outcome: Result<Response>) {
        let (error_json, response_json) = match outcome.and_then(|response| response.to_json()) {
            Ok(json) => (None, Some(json)),
            Err(err) => (Some(err.to_json()), None),
        };

        // serde_json escapes NUL, so these conversions only fail on a bug.
        let error_c = error_json.and_then(|json| CString::new(json).ok());
        let response_c = response_json.and_then(|json| CString::new(json).ok());
        (self.callback)(
            self.ctx,
            error_c.as_ref().map_or(std::ptr::null(), |s| s.as_ptr()),
            response_c.as_ref().map_or(std::ptr::null(), |s| s.as_ptr()),
        );
    }

    fn fail(self, error: ImageToolsError) {
        debug!(code = error.code(), "Rejecting foreign call before dispatch");
        self.complete(Err(error));
    }
}

/// Read an optional UTF-8 string.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn optional_str(ptr: *const c_char) -> std::result::Result<Option<String>, ()> {
    if ptr.is_null() {
        return Ok(None);
    }
    let text = unsafe { CStr::from_ptr(ptr) };
    text.to_str().map(|s| Some(s.to_string())).map_err(|_| ())
}

/// # Safety
/// `request` must point to a valid `ImageToolsBinaryRequest` whose string
/// fields are null or NUL-terminated.
unsafe fn read_request(request: *const ImageToolsBinaryRequest) -> Result<BinaryImageRequest> {
    let Some(request) = (unsafe { request.as_ref() }) else {
        return Err(ImageToolsError::SourceUnavailable("request is null".into()));
    };

    let path = unsafe { optional_str(request.path) }
        .ok()
        .flatten()
        .ok_or_else(|| ImageToolsError::SourceUnavailable("path is null or not UTF-8".into()))?;
    let format: CompressFormat = unsafe { optional_str(request.format) }
        .ok()
        .flatten()
        .ok_or_else(|| ImageToolsError::UnsupportedFormat("format is null or not UTF-8".into()))?
        .parse()?;

    let mut parsed = BinaryImageRequest::new(
        path,
        request.binarize_type,
        request.threshold,
        format,
        request.quality,
    )
    .with_base64(request.output_base64);
    match unsafe { optional_str(request.front_color) } {
        Ok(Some(color)) => parsed = parsed.with_front_color(color),
        Ok(None) => {}
        Err(()) => return Err(ImageToolsError::InvalidColor("front color is not UTF-8".into())),
    }
    match unsafe { optional_str(request.back_color) } {
        Ok(Some(color)) => parsed = parsed.with_back_color(color),
        Ok(None) => {}
        Err(()) => return Err(ImageToolsError::InvalidColor("back color is not UTF-8".into())),
    }
    Ok(parsed)
}

/// Binarize an image and write it to the cache directory.
///
/// Returns immediately; `callback` runs exactly once, on a worker thread, or
/// synchronously when the request itself is invalid.
///
/// # Safety
/// `request` must be null or valid for the duration of this call. `ctx` must
/// remain valid until `callback` has been invoked.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn imagetools_create_binary_image(
    request: *const ImageToolsBinaryRequest,
    callback: Option<ImageToolsCallback>,
    ctx: *mut c_void,
) {
    let Some(callback) = callback else {
        warn!("imagetools_create_binary_image called without a callback");
        return;
    };
    let completion = Completion { callback, ctx };

    unsafe { submit_binary_image(&shared_tools(), request, completion) };
}

/// # Safety
/// Same contract as [`imagetools_create_binary_image`].
unsafe fn submit_binary_image<T: ImageTools>(
    tools: &T,
    request: *const ImageToolsBinaryRequest,
    completion: Completion,
) {
    let request = match unsafe { read_request(request) } {
        Ok(request) => request,
        Err(err) => return completion.fail(err),
    };
    tools
        .create_binary_image(request)
        .on_settled(move |outcome| completion.complete(outcome));
}

/// Extract the RGBA pixels of the image at `path`.
///
/// # Safety
/// `path` must be null or a NUL-terminated string valid for the duration of
/// this call. `ctx` must remain valid until `callback` has been invoked.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn imagetools_get_image_rgbas(
    path: *const c_char,
    callback: Option<ImageToolsCallback>,
    ctx: *mut c_void,
) {
    let Some(callback) = callback else {
        warn!("imagetools_get_image_rgbas called without a callback");
        return;
    };
    let completion = Completion { callback, ctx };

    let path = match unsafe { optional_str(path) } {
        Ok(Some(path)) => path,
        _ => {
            return completion.fail(ImageToolsError::SourceUnavailable(
                "path is null or not UTF-8".into(),
            ));
        }
    };
    shared_tools()
        .get_image_rgbas(&path)
        .on_settled(move |outcome| completion.complete(outcome));
}

/// Replace the module configuration with the given `ToolsConfig` JSON.
///
/// Returns 0 on success and -1 if the JSON is missing or invalid. Calls
/// already in flight keep the configuration they started with.
///
/// # Safety
/// `config_json` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn imagetools_configure(config_json: *const c_char) -> i32 {
    let Ok(Some(json)) = (unsafe { optional_str(config_json) }) else {
        warn!("imagetools_configure: config is null or not UTF-8");
        return -1;
    };
    let config: ToolsConfig = match serde_json::from_str(&json) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "imagetools_configure: invalid config");
            return -1;
        }
    };
    configure_shared(config);
    0
}
