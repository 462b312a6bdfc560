// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JNI entry points for `com.imagetools.ImageToolsModule`.
//
// Java declaration:
//
//   static native void createBinaryImage(String imagePath, int type,
//       int threshold, String compressFormat, int quality,
//       boolean outputBase64, String frontColor, String backColor,
//       Callback success, Callback failure);
//   static native void GetImageRGBAs(String imagePath,
//       Callback success, Callback failure);
//
// `Callback` is any object with `void invoke(Object... args)`. Calls go
// through the platform adapter; exactly one of the two callbacks is invoked,
// once, with a single JSON string argument. The one exception is a worker
// thread that cannot attach to the JVM: with no `JNIEnv` there is no way to
// reach either callback, so the failure is only logged.

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{JNI_TRUE, jboolean, jint};
use jni::{JNIEnv, JavaVM};
use tracing::{debug, error};

use imagetools_core::error::{ImageToolsError, Result};
use imagetools_core::{BinaryImageRequest, CompressFormat, Response};

use crate::shared_tools;
use crate::traits::ImageTools;

const INVOKE_SIG: &str = "([Ljava/lang/Object;)V";

fn jni_err(context: &str, e: jni::errors::Error) -> ImageToolsError {
    ImageToolsError::Native(format!("JNI {context}: {e}"))
}

/// Success and failure callbacks pinned for use from a worker thread.
struct Callbacks {
    vm: JavaVM,
    success: GlobalRef,
    failure: GlobalRef,
}

impl Callbacks {
    fn new(env: &mut JNIEnv, success: &JObject, failure: &JObject) -> Result<Self> {
        Ok(Self {
            vm: env.get_java_vm().map_err(|e| jni_err("get_java_vm", e))?,
            success: env
                .new_global_ref(success)
                .map_err(|e| jni_err("new_global_ref(success)", e))?,
            failure: env
                .new_global_ref(failure)
                .map_err(|e| jni_err("new_global_ref(failure)", e))?,
        })
    }

    /// Attach the current thread and invoke the matching callback.
    fn settle(self, outcome: Result<Response>) {
        let mut env = match self.vm.attach_current_thread() {
            Ok(env) => env,
            Err(e) => {
                error!(error = %e, "failed to attach JNI worker thread; callbacks not invoked");
                return;
            }
        };
        let (callback, payload) = match outcome.and_then(|response| response.to_json()) {
            Ok(json) => (&self.success, json),
            Err(err) => (&self.failure, err.to_json()),
        };
        if let Err(e) = invoke(&mut env, callback.as_obj(), &payload) {
            error!(error = %e, "failed to invoke JNI callback");
        }
    }
}

fn invoke(env: &mut JNIEnv, callback: &JObject, payload: &str) -> Result<()> {
    let text = env
        .new_string(payload)
        .map_err(|e| jni_err("new_string(payload)", e))?;
    let args = env
        .new_object_array(1, "java/lang/Object", &text)
        .map_err(|e| jni_err("new_object_array", e))?;
    env.call_method(callback, "invoke", INVOKE_SIG, &[JValue::Object(&args)])
        .map_err(|e| jni_err("Callback.invoke", e))?;
    Ok(())
}

fn required_string(env: &mut JNIEnv, value: &JString, name: &str) -> Result<String> {
    if value.is_null() {
        return Err(ImageToolsError::SourceUnavailable(format!("{name} is null")));
    }
    Ok(env
        .get_string(value)
        .map_err(|e| jni_err(name, e))?
        .into())
}

fn optional_string(env: &mut JNIEnv, value: &JString, name: &str) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    required_string(env, value, name).map(Some)
}

/// Report a failure on the calling thread, before any work is dispatched.
fn fail_now(env: &mut JNIEnv, failure: &JObject, err: ImageToolsError) {
    debug!(code = err.code(), "Rejecting JNI call before dispatch");
    if let Err(e) = invoke(env, failure, &err.to_json()) {
        error!(error = %e, "failed to invoke JNI failure callback");
    }
}

#[allow(clippy::too_many_arguments)]
fn read_request(
    env: &mut JNIEnv,
    image_path: &JString,
    binarize_type: jint,
    threshold: jint,
    compress_format: &JString,
    quality: jint,
    output_base64: jboolean,
    front_color: &JString,
    back_color: &JString,
) -> Result<BinaryImageRequest> {
    let path = required_string(env, image_path, "imagePath")?;
    let format: CompressFormat = optional_string(env, compress_format, "compressFormat")?
        .ok_or_else(|| ImageToolsError::UnsupportedFormat("compressFormat is null".into()))?
        .parse()?;

    let mut request = BinaryImageRequest::new(path, binarize_type, threshold, format, quality)
        .with_base64(output_base64 == JNI_TRUE);
    if let Some(color) = optional_string(env, front_color, "frontColor")? {
        request = request.with_front_color(color);
    }
    if let Some(color) = optional_string(env, back_color, "backColor")? {
        request = request.with_back_color(color);
    }
    Ok(request)
}

/// JNI: ImageToolsModule.createBinaryImage(...)
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "system" fn Java_com_imagetools_ImageToolsModule_createBinaryImage<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    image_path: JString<'local>,
    binarize_type: jint,
    threshold: jint,
    compress_format: JString<'local>,
    quality: jint,
    output_base64: jboolean,
    front_color: JString<'local>,
    back_color: JString<'local>,
    success: JObject<'local>,
    failure: JObject<'local>,
) {
    let request = match read_request(
        &mut env,
        &image_path,
        binarize_type,
        threshold,
        &compress_format,
        quality,
        output_base64,
        &front_color,
        &back_color,
    ) {
        Ok(request) => request,
        Err(err) => return fail_now(&mut env, &failure, err),
    };
    let callbacks = match Callbacks::new(&mut env, &success, &failure) {
        Ok(callbacks) => callbacks,
        Err(err) => return fail_now(&mut env, &failure, err),
    };

    shared_tools()
        .create_binary_image(request)
        .on_settled(move |outcome| callbacks.settle(outcome));
}

/// JNI: ImageToolsModule.GetImageRGBAs(String, Callback, Callback)
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_imagetools_ImageToolsModule_GetImageRGBAs<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    image_path: JString<'local>,
    success: JObject<'local>,
    failure: JObject<'local>,
) {
    let path = match required_string(&mut env, &image_path, "imagePath") {
        Ok(path) => path,
        Err(err) => return fail_now(&mut env, &failure, err),
    };
    let callbacks = match Callbacks::new(&mut env, &success, &failure) {
        Ok(callbacks) => callbacks,
        Err(err) => return fail_now(&mut env, &failure, err),
    };

    shared_tools()
        .get_image_rgbas(&path)
        .on_settled(move |outcome| callbacks.settle(outcome));
}
