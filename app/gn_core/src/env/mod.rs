/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

pub mod helper;

/// Read an environment variable once per process and cache it.
///
/// ```ignore
/// let filter: Option<&str> = gn_env!("GN_LOG")?;
/// ```
#[macro_export]
macro_rules! gn_env {
    ($var:expr) => {{
        static ENV_HELPER: $crate::env::helper::EnvHelper<String> =
            $crate::env::helper::EnvHelper::with_converter_from_macro(
                $var,
                $crate::env::helper::convert_string,
            );
        ENV_HELPER.get().map(|v| v.map(String::as_str))
    }};
    ($var:expr, type = $ty:ty) => {{
        static ENV_HELPER: $crate::env::helper::EnvHelper<$ty> =
            $crate::env::helper::EnvHelper::with_converter_from_macro(
                $var,
                $crate::env::helper::convert_from_str::<$ty>,
            );
        ENV_HELPER.get()
    }};
    ($var:expr, type = $ty:ty, default = $default:expr) => {{
        static ENV_HELPER: $crate::env::helper::EnvHelper<$ty> =
            $crate::env::helper::EnvHelper::with_converter_from_macro(
                $var,
                $crate::env::helper::convert_from_str::<$ty>,
            );
        ENV_HELPER.get().map(|v| v.copied().unwrap_or($default))
    }};
}
