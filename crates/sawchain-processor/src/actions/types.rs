//! # Type Registry
//!
//! Task, product, event parameter, event and property types. All are
//! created once by the System Admin and never modified.

use tracing::info;

use crate::actions::authorization::require_system_admin;
use crate::actions::{ensure_distinct, parse_address, parse_addresses, Invocation, StateContext};
use crate::domain::{
    check_bounds_apply_to, check_parameter_bounds, check_quantity, event_parameter_type_address,
    event_type_address, product_type_address, property_type_address, task_type_address,
    DerivedProductType, EntityKind, EventParameter, EventParameterType, EventType,
    ProcessorError, ProductType, PropertyType, Rejection, StateAddress, TaskType, Typology,
};
use crate::payload::{
    CreateEventParameterTypeAction, CreateEventTypeAction, CreateProductTypeAction,
    CreatePropertyTypeAction, CreateTaskTypeAction,
};

pub fn create_task_type(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateTaskTypeAction,
) -> Result<(), ProcessorError> {
    inv.require_text("id", &action.id)?;
    inv.require_text("task", &action.task)?;

    require_system_admin(ctx, &inv.signer)?;
    let address = task_type_address(&action.id);
    ctx.ensure_vacant(&address)?;

    let task = TaskType {
        id: action.id.clone(),
        task: action.task.clone(),
    };
    ctx.stage(&address, &task)?;
    info!(id = %task.id, "Task Type created");
    Ok(())
}

pub fn create_product_type(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateProductTypeAction,
) -> Result<(), ProcessorError> {
    inv.require_text("id", &action.id)?;
    inv.require_text("name", &action.name)?;
    inv.check_text("description", &action.description)?;
    let derived = action
        .derived_product_types
        .iter()
        .map(|spec| -> Result<DerivedProductType, Rejection> {
            check_quantity("conversion_rate", spec.conversion_rate)?;
            Ok(DerivedProductType {
                product_type: parse_address(
                    "derived_product_types",
                    &spec.product_type,
                    EntityKind::ProductType,
                )?,
                conversion_rate: spec.conversion_rate,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let targets: Vec<StateAddress> = derived.iter().map(|d| d.product_type.clone()).collect();
    ensure_distinct("derived_product_types", &targets)?;

    require_system_admin(ctx, &inv.signer)?;
    let address = product_type_address(&action.id);
    ctx.ensure_vacant(&address)?;
    ctx.require_all::<ProductType>(&targets)?;

    let product = ProductType {
        id: action.id.clone(),
        name: action.name.clone(),
        description: action.description.clone(),
        measure: action.measure,
        derived_product_types: derived,
    };
    ctx.stage(&address, &product)?;
    info!(id = %product.id, derived = product.derived_product_types.len(), "Product Type created");
    Ok(())
}

pub fn create_event_parameter_type(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateEventParameterTypeAction,
) -> Result<(), ProcessorError> {
    inv.require_text("id", &action.id)?;
    inv.require_text("name", &action.name)?;

    require_system_admin(ctx, &inv.signer)?;
    let address = event_parameter_type_address(&action.id);
    ctx.ensure_vacant(&address)?;

    let parameter = EventParameterType {
        id: action.id.clone(),
        name: action.name.clone(),
        data_type: action.data_type,
    };
    ctx.stage(&address, &parameter)?;
    info!(id = %parameter.id, data_type = %parameter.data_type, "Event Parameter Type created");
    Ok(())
}

pub fn create_event_type(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreateEventTypeAction,
) -> Result<(), ProcessorError> {
    inv.require_text("id", &action.id)?;
    inv.require_text("name", &action.name)?;
    inv.check_text("description", &action.description)?;
    let tasks = parse_addresses(
        "enabled_task_types",
        &action.enabled_task_types,
        EntityKind::TaskType,
    )?;
    let products = parse_addresses(
        "enabled_product_types",
        &action.enabled_product_types,
        EntityKind::ProductType,
    )?;
    let derived = parse_addresses(
        "enabled_derived_product_types",
        &action.enabled_derived_product_types,
        EntityKind::ProductType,
    )?;
    let parameters = action
        .parameters
        .iter()
        .map(|spec| -> Result<EventParameter, Rejection> {
            let parameter = EventParameter {
                parameter_type: parse_address(
                    "parameters",
                    &spec.parameter_type,
                    EntityKind::EventParameterType,
                )?,
                required: spec.required,
                min_value: spec.min_value,
                max_value: spec.max_value,
                min_length: spec.min_length,
                max_length: spec.max_length,
            };
            check_parameter_bounds(&parameter)?;
            Ok(parameter)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let parameter_types: Vec<StateAddress> = parameters
        .iter()
        .map(|p| p.parameter_type.clone())
        .collect();
    ensure_distinct("parameters", &parameter_types)?;

    require_system_admin(ctx, &inv.signer)?;
    let address = event_type_address(&action.id);
    ctx.ensure_vacant(&address)?;
    ctx.require_all::<TaskType>(&tasks)?;
    let enabled_products = ctx.require_all::<ProductType>(&products)?;
    ctx.require_all::<ProductType>(&derived)?;
    let declared = ctx.require_all::<EventParameterType>(&parameter_types)?;
    for (parameter, parameter_type) in parameters.iter().zip(&declared) {
        check_bounds_apply_to(parameter, parameter_type.data_type)?;
    }

    match action.typology {
        Typology::Description => {
            if !derived.is_empty() {
                return Err(Rejection::invariant(
                    "description event types cannot enable derived product types",
                )
                .into());
            }
        }
        Typology::Transformation => {
            if enabled_products.is_empty() || derived.is_empty() {
                return Err(Rejection::invariant(
                    "transformation event types need input and derived product types",
                )
                .into());
            }
            for (product_address, product) in products.iter().zip(&enabled_products) {
                if let Some(target) = derived.iter().find(|target| !product.derives(target)) {
                    return Err(Rejection::invariant(format!(
                        "{target} is not a derived product of {product_address}"
                    ))
                    .into());
                }
            }
        }
    }

    let event_type = EventType {
        id: action.id.clone(),
        typology: action.typology,
        name: action.name.clone(),
        description: action.description.clone(),
        enabled_task_types: tasks,
        enabled_product_types: products,
        parameters,
        enabled_derived_product_types: derived,
    };
    ctx.stage(&address, &event_type)?;
    info!(id = %event_type.id, typology = ?event_type.typology, "Event Type created");
    Ok(())
}

pub fn create_property_type(
    ctx: &mut StateContext<'_>,
    inv: &Invocation<'_>,
    action: &CreatePropertyTypeAction,
) -> Result<(), ProcessorError> {
    inv.require_text("id", &action.id)?;
    inv.require_text("name", &action.name)?;
    let tasks = parse_addresses(
        "enabled_task_types",
        &action.enabled_task_types,
        EntityKind::TaskType,
    )?;
    let products = parse_addresses(
        "enabled_product_types",
        &action.enabled_product_types,
        EntityKind::ProductType,
    )?;

    require_system_admin(ctx, &inv.signer)?;
    let address = property_type_address(&action.id);
    ctx.ensure_vacant(&address)?;
    ctx.require_all::<TaskType>(&tasks)?;
    ctx.require_all::<ProductType>(&products)?;

    let property = PropertyType {
        id: action.id.clone(),
        name: action.name.clone(),
        data_type: action.data_type,
        enabled_task_types: tasks,
        enabled_product_types: products,
    };
    ctx.stage(&address, &property)?;
    info!(id = %property.id, data_type = %property.data_type, "Property Type created");
    Ok(())
}
