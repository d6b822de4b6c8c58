//! # Domain Invariants
//!
//! Pure checks shared by the action handlers. None of them touch state, so
//! every replica evaluates them identically given the same inputs.

use super::entities::EventParameter;
use super::errors::Rejection;
use super::value_objects::{DataType, ProposalStatus, StateAddress, Value};

// =============================================================================
// QUANTITIES
// =============================================================================

/// Quantities are finite and strictly positive.
pub fn check_quantity(field: &str, quantity: f64) -> Result<(), Rejection> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(Rejection::invariant(format!(
            "{field} must be a positive finite number, got {quantity}"
        )));
    }
    Ok(())
}

/// A transformation may consume at most what its input currently holds.
pub fn check_consumption(
    input: &StateAddress,
    available: f64,
    requested: f64,
) -> Result<(), Rejection> {
    check_quantity("quantity", requested)?;
    if requested > available {
        return Err(Rejection::invariant(format!(
            "cannot consume {requested} from {input}: only {available} available"
        )));
    }
    Ok(())
}

/// Output quantity of a transformation.
///
/// Summed in input order so every replica produces the same bits.
#[must_use]
pub fn transformation_output(quantities: &[f64], conversion_rate: f64) -> f64 {
    quantities.iter().sum::<f64>() * conversion_rate
}

// =============================================================================
// TYPED VALUES
// =============================================================================

/// The populated arm of `value` must match the declared data type.
pub fn check_value_matches(expected: DataType, value: &Value) -> Result<(), Rejection> {
    let actual = value.data_type();
    if actual != expected {
        return Err(Rejection::invariant(format!(
            "expected a {expected} value, got {actual}"
        )));
    }
    match value {
        Value::Number(n) if !n.is_finite() => {
            Err(Rejection::invariant("number values must be finite"))
        }
        Value::Location(location) if !location.is_valid() => Err(Rejection::invariant(
            "location values must lie within valid coordinates",
        )),
        _ => Ok(()),
    }
}

/// Check a description event value against the parameter it fills.
pub fn check_parameter_value(
    parameter: &EventParameter,
    data_type: DataType,
    value: &Value,
) -> Result<(), Rejection> {
    check_value_matches(data_type, value)?;
    match value {
        Value::Number(n) => {
            if let Some(min) = parameter.min_value {
                if *n < min {
                    return Err(Rejection::invariant(format!(
                        "value {n} for {} is below minimum {min}",
                        parameter.parameter_type
                    )));
                }
            }
            if let Some(max) = parameter.max_value {
                if *n > max {
                    return Err(Rejection::invariant(format!(
                        "value {n} for {} is above maximum {max}",
                        parameter.parameter_type
                    )));
                }
            }
        }
        Value::Text(text) => {
            let length = text.chars().count();
            if let Some(min) = parameter.min_length {
                if length < min as usize {
                    return Err(Rejection::invariant(format!(
                        "text for {} is shorter than {min} characters",
                        parameter.parameter_type
                    )));
                }
            }
            if let Some(max) = parameter.max_length {
                if length > max as usize {
                    return Err(Rejection::invariant(format!(
                        "text for {} is longer than {max} characters",
                        parameter.parameter_type
                    )));
                }
            }
        }
        Value::Bytes(_) | Value::Location(_) => {}
    }
    Ok(())
}

/// Bounds declared on an Event Type parameter must be consistent.
pub fn check_parameter_bounds(parameter: &EventParameter) -> Result<(), Rejection> {
    for bound in [parameter.min_value, parameter.max_value].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(Rejection::invariant(format!(
                "bounds of {} must be finite",
                parameter.parameter_type
            )));
        }
    }
    if let (Some(min), Some(max)) = (parameter.min_value, parameter.max_value) {
        if min > max {
            return Err(Rejection::invariant(format!(
                "min value {min} exceeds max value {max} for {}",
                parameter.parameter_type
            )));
        }
    }
    if let (Some(min), Some(max)) = (parameter.min_length, parameter.max_length) {
        if min > max {
            return Err(Rejection::invariant(format!(
                "min length {min} exceeds max length {max} for {}",
                parameter.parameter_type
            )));
        }
    }
    Ok(())
}

/// Bounds only make sense for the data type they constrain.
pub fn check_bounds_apply_to(
    parameter: &EventParameter,
    data_type: DataType,
) -> Result<(), Rejection> {
    let has_value_bounds = parameter.min_value.is_some() || parameter.max_value.is_some();
    let has_length_bounds = parameter.min_length.is_some() || parameter.max_length.is_some();
    if has_value_bounds && data_type != DataType::Number {
        return Err(Rejection::invariant(format!(
            "value bounds on {} require a number parameter, found {data_type}",
            parameter.parameter_type
        )));
    }
    if has_length_bounds && data_type != DataType::Text {
        return Err(Rejection::invariant(format!(
            "length bounds on {} require a string parameter, found {data_type}",
            parameter.parameter_type
        )));
    }
    Ok(())
}

// =============================================================================
// PROPOSALS
// =============================================================================

/// Side of a proposal the answering operator belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalParty {
    Sender,
    Receiver,
}

/// The sender may only cancel; the receiver may only accept or reject.
pub fn check_proposal_answer(
    party: ProposalParty,
    current: ProposalStatus,
    response: ProposalStatus,
) -> Result<(), Rejection> {
    if !current.can_transition_to(response) {
        return Err(Rejection::invariant(format!(
            "proposal cannot move from {current} to {response}"
        )));
    }
    let allowed = match party {
        ProposalParty::Sender => response == ProposalStatus::Canceled,
        ProposalParty::Receiver => {
            matches!(response, ProposalStatus::Accepted | ProposalStatus::Rejected)
        }
    };
    if !allowed {
        return Err(Rejection::unauthorized(format!(
            "the {} company cannot answer {response}",
            match party {
                ProposalParty::Sender => "sender",
                ProposalParty::Receiver => "receiver",
            }
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::addressing::{batch_address, event_parameter_type_address};
    use crate::domain::value_objects::Location;

    fn parameter() -> EventParameter {
        EventParameter {
            parameter_type: event_parameter_type_address("EPT1"),
            required: true,
            min_value: Some(0.0),
            max_value: Some(10.0),
            min_length: None,
            max_length: None,
        }
    }

    #[test]
    fn test_quantity_must_be_positive_and_finite() {
        assert!(check_quantity("quantity", 1.0).is_ok());
        assert!(check_quantity("quantity", 0.0).is_err());
        assert!(check_quantity("quantity", -3.0).is_err());
        assert!(check_quantity("quantity", f64::INFINITY).is_err());
        assert!(check_quantity("quantity", f64::NAN).is_err());
    }

    #[test]
    fn test_consumption_limited_by_available() {
        let input = batch_address("B1");
        assert!(check_consumption(&input, 10.0, 10.0).is_ok());
        assert!(check_consumption(&input, 10.0, 10.5).is_err());
    }

    #[test]
    fn test_transformation_output_exact() {
        assert_eq!(transformation_output(&[1000.0], 0.7), 700.0);
        assert_eq!(transformation_output(&[10.0, 30.0], 0.5), 20.0);
    }

    #[test]
    fn test_wrong_arm_rejected() {
        let err = check_value_matches(DataType::Number, &Value::Text("12".into())).unwrap_err();
        assert_eq!(err.to_string(), "expected a number value, got string");
        assert!(check_value_matches(DataType::Location, &Value::Location(Location::new(1.0, 2.0))).is_ok());
    }

    #[test]
    fn test_numeric_range_enforced() {
        let p = parameter();
        assert!(check_parameter_value(&p, DataType::Number, &Value::Number(10.0)).is_ok());
        assert!(check_parameter_value(&p, DataType::Number, &Value::Number(10.1)).is_err());
        assert!(check_parameter_value(&p, DataType::Number, &Value::Number(-0.1)).is_err());
    }

    #[test]
    fn test_text_length_counts_characters() {
        let p = EventParameter {
            min_value: None,
            max_value: None,
            min_length: Some(2),
            max_length: Some(3),
            ..parameter()
        };
        assert!(check_parameter_value(&p, DataType::Text, &Value::Text("àèì".into())).is_ok());
        assert!(check_parameter_value(&p, DataType::Text, &Value::Text("a".into())).is_err());
        assert!(check_parameter_value(&p, DataType::Text, &Value::Text("abcd".into())).is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let p = EventParameter {
            min_value: Some(5.0),
            max_value: Some(1.0),
            ..parameter()
        };
        assert!(check_parameter_bounds(&p).is_err());
        assert!(check_parameter_bounds(&parameter()).is_ok());
    }

    #[test]
    fn test_proposal_answer_by_party() {
        use ProposalParty::*;
        use ProposalStatus::*;
        assert!(check_proposal_answer(Sender, Issued, Canceled).is_ok());
        assert!(check_proposal_answer(Receiver, Issued, Accepted).is_ok());
        assert!(check_proposal_answer(Receiver, Issued, Rejected).is_ok());
        assert!(matches!(
            check_proposal_answer(Sender, Issued, Accepted),
            Err(Rejection::Unauthorized(_))
        ));
        assert!(matches!(
            check_proposal_answer(Receiver, Issued, Canceled),
            Err(Rejection::Unauthorized(_))
        ));
        assert!(check_proposal_answer(Receiver, Accepted, Rejected).is_err());
        assert!(check_proposal_answer(Sender, Issued, Issued).is_err());
    }

    #[test]
    fn test_bounds_must_match_data_type() {
        assert!(check_bounds_apply_to(&parameter(), DataType::Number).is_ok());
        assert!(check_bounds_apply_to(&parameter(), DataType::Text).is_err());
    }
}
