//! # Batch Ledger: Events
//!
//! Description events annotate a field or batch. Transformation events
//! consume quantity from fields or batches and create a new batch of a
//! derived product.
//!
//! ## Quantity conservation
//!
//! Each input loses exactly the consumed amount and the output batch holds
//! `sum(quantities) * conversion_rate`, summed in input order.

use std::collections::HashSet;

use tracing::info;

use crate::actions::authorization::{ensure_member_of, ensure_task_enabled, require_operator};
use crate::actions::{ensure_distinct, parse_address, Invocation, StateContext};
use crate::domain::{
    batch_address, check_consumption, check_parameter_value, check_quantity,
    transformation_output, Batch, Company, EntityKind, Event, EventDetail, EventParameterType,
    EventType, Field, Operator, ParameterValue, ProcessorError, ProductType, Rejection,
    StateAddress, Traceable, Typology, Value,
};
use crate::payload::{
    CreateDescriptionEventAction, CreateTransformationEventAction, EventTarget,
    TransformationInputs,
};

// =============================================================================
// DESCRIPTION EVENTS
// =============================================================================

pub fn create_description_event(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateDescriptionEventAction,
) -> Result<(), ProcessorError> {
    let event_type_address = parse_address("event_type", &action.event_type, EntityKind::EventType)?;
    if action.values.len() > inv.config.max_event_values {
        return Err(Rejection::malformed(format!(
            "at most {} parameter values are allowed",
            inv.config.max_event_values
        ))
        .into());
    }
    let values = action
        .values
        .iter()
        .map(|spec| {
            parse_address("values", &spec.parameter_type, EntityKind::EventParameterType).map(
                |parameter_type| ParameterValue {
                    parameter_type,
                    value: spec.value.clone(),
                },
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    let supplied: Vec<StateAddress> = values.iter().map(|v| v.parameter_type.clone()).collect();
    ensure_distinct("values", &supplied)?;

    let (target_kind, target) = match &action.target {
        EventTarget::Field(target) => (EntityKind::Field, target),
        EventTarget::Batch(target) => (EntityKind::Batch, target),
    };
    let target = parse_address("target", target, target_kind)?;

    let operator = require_operator(ctx, &inv.signer)?;
    let event_type = ctx.require::<EventType>(&event_type_address)?;
    if event_type.typology != Typology::Description {
        return Err(Rejection::invariant(format!(
            "{event_type_address} is not a description event type"
        ))
        .into());
    }

    let event = DescriptionEvent {
        operator: &operator,
        event_type_address: &event_type_address,
        event_type: &event_type,
    };
    match target_kind {
        EntityKind::Field => event.record::<Field>(ctx, inv, &target, values),
        _ => event.record::<Batch>(ctx, inv, &target, values),
    }
}

/// Validated description event, ready to be applied to its target.
struct DescriptionEvent<'a> {
    operator: &'a Operator,
    event_type_address: &'a StateAddress,
    event_type: &'a EventType,
}

impl DescriptionEvent<'_> {
    fn record<T: Traceable>(
        &self,
        ctx: &mut StateContext<'_>,
        inv: &Invocation<'_>,
        address: &StateAddress,
        values: Vec<ParameterValue>,
    ) -> Result<(), ProcessorError> {
        let (operator, event_type_address, event_type) =
            (self.operator, self.event_type_address, self.event_type);

        let mut target = ctx.require::<T>(address)?;
        ensure_member_of(operator, target.owner())?;
        if target.is_finalized() {
            return Err(Rejection::invariant(format!("{address} is finalized")).into());
        }
        ensure_task_enabled(operator, &event_type.enabled_task_types, "this event type")?;
        if !event_type.enabled_product_types.contains(target.product()) {
            return Err(Rejection::invariant(format!(
                "product {} is not enabled for event type {event_type_address}",
                target.product()
            ))
            .into());
        }

        let supplied: HashSet<&StateAddress> = values.iter().map(|v| &v.parameter_type).collect();
        if let Some(missing) = event_type
            .parameters
            .iter()
            .find(|parameter| parameter.required && !supplied.contains(&parameter.parameter_type))
        {
            return Err(Rejection::invariant(format!(
                "required parameter {} is missing",
                missing.parameter_type
            ))
            .into());
        }
        for value in &values {
            let parameter = event_type.parameter(&value.parameter_type).ok_or_else(|| {
                Rejection::invariant(format!(
                    "{} is not a parameter of event type {event_type_address}",
                    value.parameter_type
                ))
            })?;
            let parameter_type = ctx.require::<EventParameterType>(&value.parameter_type)?;
            check_parameter_value(parameter, parameter_type.data_type, &value.value)?;
            if let Value::Text(text) = &value.value {
                inv.check_text("values", text)?;
            }
        }

        target.push_event(Event {
            event_type: event_type_address.clone(),
            reporter: inv.signer.clone(),
            timestamp: inv.timestamp,
            detail: EventDetail::Description { values },
        });
        ctx.stage(address, &target)?;
        info!(target = %address, event_type = %event_type_address, "Description event recorded");
        Ok(())
    }
}

// =============================================================================
// TRANSFORMATION EVENTS
// =============================================================================

pub fn create_transformation_event(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateTransformationEventAction,
) -> Result<(), ProcessorError> {
    let event_type_address = parse_address("event_type", &action.event_type, EntityKind::EventType)?;
    let derived_product = parse_address(
        "derived_product",
        &action.derived_product,
        EntityKind::ProductType,
    )?;
    inv.require_text("output_batch_id", &action.output_batch_id)?;
    if action.inputs.is_empty() {
        return Err(Rejection::malformed("at least one input is required").into());
    }
    if action.inputs.len() > inv.config.max_transformation_inputs {
        return Err(Rejection::malformed(format!(
            "at most {} inputs are allowed",
            inv.config.max_transformation_inputs
        ))
        .into());
    }
    if action.quantities.len() != action.inputs.len() {
        return Err(Rejection::malformed(format!(
            "{} quantities supplied for {} inputs",
            action.quantities.len(),
            action.inputs.len()
        ))
        .into());
    }
    for quantity in &action.quantities {
        check_quantity("quantity", *quantity)?;
    }
    let (kind, raw_inputs) = match &action.inputs {
        TransformationInputs::Fields(inputs) => (EntityKind::Field, inputs),
        TransformationInputs::Batches(inputs) => (EntityKind::Batch, inputs),
    };
    let inputs = raw_inputs
        .iter()
        .map(|input| parse_address("inputs", input, kind))
        .collect::<Result<Vec<_>, _>>()?;
    ensure_distinct("inputs", &inputs)?;

    let operator = require_operator(ctx, &inv.signer)?;
    let event_type = ctx.require::<EventType>(&event_type_address)?;
    if event_type.typology != Typology::Transformation {
        return Err(Rejection::invariant(format!(
            "{event_type_address} is not a transformation event type"
        ))
        .into());
    }
    ensure_task_enabled(&operator, &event_type.enabled_task_types, "this event type")?;
    ctx.require::<ProductType>(&derived_product)?;
    if !event_type
        .enabled_derived_product_types
        .contains(&derived_product)
    {
        return Err(Rejection::invariant(format!(
            "{derived_product} is not a derived product of event type {event_type_address}"
        ))
        .into());
    }
    let mut company = ctx.require::<Company>(&operator.company)?;
    if !company.enabled_product_types.contains(&derived_product) {
        return Err(Rejection::invariant(format!(
            "{derived_product} is not enabled for company {}",
            operator.company
        ))
        .into());
    }
    let output_address = batch_address(&action.output_batch_id);
    ctx.ensure_vacant(&output_address)?;

    let plan = TransformationPlan {
        operator: &operator,
        event_type_address: &event_type_address,
        event_type: &event_type,
        derived_product: &derived_product,
        quantities: &action.quantities,
    };
    let quantity = match kind {
        EntityKind::Field => plan.consume::<Field>(ctx, inv, &inputs)?,
        _ => plan.consume::<Batch>(ctx, inv, &inputs)?,
    };

    let (parent_fields, parent_batches) = match kind {
        EntityKind::Field => (inputs, Vec::new()),
        _ => (Vec::new(), inputs),
    };
    let batch = Batch {
        id: action.output_batch_id.clone(),
        company: operator.company.clone(),
        product: derived_product,
        quantity,
        parent_fields,
        parent_batches,
        events: Vec::new(),
        properties: Vec::new(),
        certificates: Vec::new(),
        proposals: Vec::new(),
        finalization: None,
        timestamp: inv.timestamp,
    };
    company.batches.push(output_address.clone());
    ctx.stage(&output_address, &batch)?;
    ctx.stage(&operator.company, &company)?;
    info!(
        batch = %output_address,
        quantity = batch.quantity,
        inputs = batch.parent_fields.len() + batch.parent_batches.len(),
        "Transformation recorded"
    );
    Ok(())
}

/// Validated parts of a transformation shared by field and batch inputs.
struct TransformationPlan<'a> {
    operator: &'a Operator,
    event_type_address: &'a StateAddress,
    event_type: &'a EventType,
    derived_product: &'a StateAddress,
    quantities: &'a [f64],
}

impl TransformationPlan<'_> {
    /// Check and consume every input. Returns the output quantity.
    fn consume<T: Traceable>(
        &self,
        ctx: &mut StateContext<'_>,
        inv: &Invocation<'_>,
        inputs: &[StateAddress],
    ) -> Result<f64, ProcessorError> {
        let mut targets = ctx.require_all::<T>(inputs)?;

        let mut product: Option<&StateAddress> = None;
        for (address, target) in inputs.iter().zip(&targets) {
            ensure_member_of(self.operator, target.owner())?;
            if target.is_finalized() {
                return Err(Rejection::invariant(format!("{address} is finalized")).into());
            }
            match product {
                Some(shared) if shared != target.product() => {
                    return Err(Rejection::invariant(format!(
                        "inputs mix products {shared} and {}",
                        target.product()
                    ))
                    .into());
                }
                Some(_) => {}
                None => product = Some(target.product()),
            }
        }
        let input_product = product
            .cloned()
            .ok_or_else(|| Rejection::malformed("at least one input is required"))?;
        if !self.event_type.enabled_product_types.contains(&input_product) {
            return Err(Rejection::invariant(format!(
                "product {input_product} is not enabled for event type {}",
                self.event_type_address
            ))
            .into());
        }
        let conversion_rate = ctx
            .require::<ProductType>(&input_product)?
            .conversion_rate_to(self.derived_product)
            .ok_or_else(|| {
                Rejection::invariant(format!(
                    "{} is not a derived product of {input_product}",
                    self.derived_product
                ))
            })?;

        for ((address, target), requested) in inputs.iter().zip(&mut targets).zip(self.quantities) {
            check_consumption(address, target.quantity(), *requested)?;
            target.consume(
                *requested,
                Event {
                    event_type: self.event_type_address.clone(),
                    reporter: inv.signer.clone(),
                    timestamp: inv.timestamp,
                    detail: EventDetail::Transformation {
                        quantity: *requested,
                    },
                },
            );
            ctx.stage(address, target)?;
        }

        let output = transformation_output(self.quantities, conversion_rate);
        check_quantity("output quantity", output)?;
        Ok(output)
    }
}
