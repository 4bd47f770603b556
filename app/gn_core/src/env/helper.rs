/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::env;
use std::env::VarError;
use std::str::FromStr;

use anyhow::Context;
use once_cell::sync::OnceCell;

#[derive(Debug, thiserror::Error)]
#[error("Variable is not unicode")]
struct NotUnicode;

pub struct EnvHelper<T> {
    convert: fn(&str) -> anyhow::Result<T>,
    var: &'static str,
    cell: OnceCell<Option<T>>,
}

impl<T> EnvHelper<T> {
    pub const fn with_converter_from_macro(
        var: &'static str,
        convert: fn(&str) -> anyhow::Result<T>,
    ) -> Self {
        Self {
            convert,
            var,
            cell: OnceCell::new(),
        }
    }

    // The value is cached, so the helper must live in a static to be of any use.
    pub fn get(&'static self) -> anyhow::Result<Option<&'static T>> {
        let var = self.var;
        let convert = self.convert;

        self.cell
            .get_or_try_init(move || match env::var(var) {
                Ok(v) => {
                    tracing::info!("Env override found: ${} = {}", var, v);
                    Ok::<_, anyhow::Error>(Some((convert)(&v)?))
                }
                Err(VarError::NotPresent) => Ok(None),
                Err(VarError::NotUnicode(..)) => Err(NotUnicode.into()),
            })
            .map(Option::as_ref)
            .with_context(|| format!("Invalid value for ${}", var))
    }
}

pub fn convert_string(s: &str) -> anyhow::Result<String> {
    Ok(s.to_owned())
}

pub fn convert_from_str<T>(s: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(T::from_str(s)?)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_unset_var() {
        let v: Option<&str> = crate::gn_env!("GN_TEST_ENV_HELPER_UNSET").unwrap();
        assert_eq!(None, v);
        let v: u32 = crate::gn_env!("GN_TEST_ENV_HELPER_UNSET_TYPED", type = u32, default = 7)
            .unwrap();
        assert_eq!(7, v);
    }

    #[test]
    fn test_parse_error() {
        std::env::set_var("GN_TEST_ENV_HELPER_BAD", "not a number");
        let err = crate::gn_env!("GN_TEST_ENV_HELPER_BAD", type = u32).unwrap_err();
        assert!(
            format!("{:#}", err).contains("Invalid value for $GN_TEST_ENV_HELPER_BAD"),
            "{:#}",
            err
        );
    }
}
