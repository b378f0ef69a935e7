//! Validation of user-supplied values.

use smol_str::SmolStr;
use thiserror::Error;

use super::ConfigModel;
use crate::hir::{SymbolTable, SymbolType, Tristate, Value, evaluate, evaluate_value};

/// Why a `setValue` request was rejected. The model is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(SmolStr),

    #[error("`{0}` has no type and cannot be set")]
    Untyped(SmolStr),

    #[error("`{value}` is not a valid {ty} value for `{name}`")]
    InvalidValue {
        name: SmolStr,
        ty: SymbolType,
        value: String,
    },

    #[error("{value} is outside the range {low}..{high} of `{name}`")]
    OutOfRange {
        name: SmolStr,
        value: Value,
        low: Value,
        high: Value,
    },

    #[error("choice member `{0}` only accepts y or n")]
    ChoiceMemberValue(SmolStr),

    #[error("`{0}` is the selected member of a required choice; select another member instead")]
    ChoiceSelectionRequired(SmolStr),
}

/// One change to the user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEdit {
    pub name: SmolStr,
    /// `None` clears the user value.
    pub value: Option<Value>,
}

/// Check `raw` against the type, range, and choice rules of `name`.
///
/// Returns the user-value edits that apply it; selecting a choice member
/// also clears its siblings.
pub fn validate_value(
    symbols: &SymbolTable,
    model: &ConfigModel,
    name: &str,
    raw: &str,
) -> Result<Vec<UserEdit>, ValidationError> {
    let symbol = symbols
        .get(name)
        .ok_or_else(|| ValidationError::UnknownSymbol(name.into()))?;
    let ty = symbol
        .ty
        .ok_or_else(|| ValidationError::Untyped(name.into()))?;

    let invalid = || ValidationError::InvalidValue {
        name: name.into(),
        ty,
        value: raw.to_string(),
    };

    if let Some(choice_id) = symbol.choice {
        let choice = symbols.choice(choice_id);
        let value = match raw.trim() {
            "y" => Tristate::Yes,
            "n" => Tristate::No,
            _ => return Err(ValidationError::ChoiceMemberValue(name.into())),
        };
        if value == Tristate::Yes {
            let mut edits = vec![UserEdit {
                name: name.into(),
                value: Some(Value::Tristate(Tristate::Yes)),
            }];
            edits.extend(
                choice
                    .members
                    .iter()
                    .filter(|m| m.as_str() != name)
                    .map(|m| UserEdit {
                        name: m.clone(),
                        value: None,
                    }),
            );
            return Ok(edits);
        }

        let entry = model.get(name);
        let selected =
            entry.and_then(|e| e.value.as_ref()) == Some(&Value::Tristate(Tristate::Yes));
        if selected && entry.is_some_and(|e| e.visible) && !choice.optional {
            return Err(ValidationError::ChoiceSelectionRequired(name.into()));
        }
        return Ok(vec![UserEdit {
            name: name.into(),
            value: Some(Value::Tristate(Tristate::No)),
        }]);
    }

    let value = Value::parse(ty, raw).ok_or_else(invalid)?;

    if ty.is_numeric() {
        let dep = symbol
            .definitions
            .iter()
            .map(|d| evaluate(&d.dependency, model).value)
            .fold(Tristate::No, Tristate::or);
        let active_range = symbol
            .ranges
            .iter()
            .find(|r| evaluate(&r.cond, model).value.and(dep).is_on());
        if let Some(range) = active_range {
            let low = evaluate_value(&range.low, ty, model).value;
            let high = evaluate_value(&range.high, ty, model).value;
            if let (Some(low), Some(high)) = (low, high) {
                let (Some(v), Some(lo), Some(hi)) =
                    (value.as_number(), low.as_number(), high.as_number())
                else {
                    return Err(invalid());
                };
                if v < lo || v > hi {
                    return Err(ValidationError::OutOfRange {
                        name: name.into(),
                        value,
                        low,
                        high,
                    });
                }
            }
        }
    }

    Ok(vec![UserEdit {
        name: name.into(),
        value: Some(value),
    }])
}
