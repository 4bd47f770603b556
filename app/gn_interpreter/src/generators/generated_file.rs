/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use gn_core::origin::Origin;
use gn_core::origin::OriginContext;
use gn_node::action_values::OutputConversion;
use gn_node::target::Target;
use itertools::Itertools;
use thiserror::Error;

use crate::generators::origin_of;
use crate::generators::read_output_patterns;
use crate::generators::required;
use crate::value_extractors::ScopeFields;

#[derive(Debug, Error)]
enum GeneratedFileError {
    #[error("generated_file target must have exactly one output.\nFound {0}.")]
    NotOneOutput(usize),
    #[error("Can't specify both \"contents\" and \"data_keys\".")]
    BothContentsAndDataKeys,
    #[error("Either \"contents\" or \"data_keys\" should be set.")]
    NeitherContentsNorDataKeys,
    #[error("Not a valid output_conversion.\nGot \"{0}\", expected one of {1}.")]
    UnknownConversion(String, String),
}

pub(crate) fn fill_generated_file(
    fields: &ScopeFields<'_, '_>,
    target: &mut Target,
    declaration: &Origin,
) -> anyhow::Result<()> {
    let outputs = required(read_output_patterns(fields, "outputs")?, "outputs", declaration)?;
    if outputs.len() != 1 {
        return Err(GeneratedFileError::NotOneOutput(outputs.len()))
            .at(&origin_of(fields, "outputs", declaration));
    }
    target.action_values.outputs = outputs;

    let contents = fields.get("contents").map(|(v, _)| v.to_json());
    let data_keys = fields.strings("data_keys")?;
    match (&contents, &data_keys) {
        (Some(_), Some(_)) => {
            return Err(GeneratedFileError::BothContentsAndDataKeys)
                .at(&origin_of(fields, "data_keys", declaration));
        }
        (None, None) => return Err(GeneratedFileError::NeitherContentsNorDataKeys).at(declaration),
        _ => {}
    }
    let values = &mut target.generated_file;
    values.contents = contents;
    values.data_keys = data_keys.unwrap_or_default();
    values.walk_keys = fields.strings("walk_keys")?.unwrap_or_default();
    values.rebase = fields.source_dir("rebase")?;
    if let Some(conversion) = fields.read("output_conversion", |v| {
        let name = v.as_str()?;
        OutputConversion::from_name(name).ok_or_else(|| {
            GeneratedFileError::UnknownConversion(
                name.to_owned(),
                OutputConversion::ALL
                    .iter()
                    .map(|c| format!("\"{}\"", c))
                    .join(", "),
            )
            .into()
        })
    })? {
        values.output_conversion = conversion;
    }
    Ok(())
}
