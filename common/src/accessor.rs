use serde_yaml::Value;

use crate::{
    error::{ClusterApiError, Result},
    validators::Validator,
};

/// Walks a dotted key path through nested mappings.
///
/// Non-mapping intermediates and explicit `null` leaves count as absent.
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |node, key| node.get(key))
        .filter(|v| !v.is_null())
}

/// Extended get: deep lookup with an optional default and an optional validator.
///
/// The validator only runs on values actually present in `data`; a default is
/// returned as-is. Without a default, an absent path is a [`ClusterApiError::MissingKey`].
pub fn getx(
    data: &Value,
    path: &str,
    default: Option<Value>,
    validator: Option<Validator>,
) -> Result<Value> {
    let Some(value) = lookup(data, path) else {
        return default.ok_or_else(|| ClusterApiError::MissingKey {
            path: path.to_owned(),
        });
    };

    if let Some(validate) = validator {
        validate(value)?;
    }
    Ok(value.clone())
}
