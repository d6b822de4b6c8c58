//! Shared fixtures for the SawChain integration tests.
//!
//! [`World`] builds a small supply chain through the public handler API:
//! one System Admin, three companies, operators, a certification authority,
//! the type taxonomy below, and one olive field owned by company A.
//!
//! ```text
//! PDT3 Olives ──0.7──> PDT1 Olive oil
//!      └──────0.9──> PDT4 Olive paste ──0.5──> PDT1 Olive oil
//! PDT2 Grapes
//! ```

#![allow(dead_code)]

use sawchain_processor::domain::{
    company_address, company_id, event_parameter_type_address, event_type_address,
    field_address, product_type_address, property_type_address, task_type_address, Record,
};
use sawchain_processor::payload::*;
use sawchain_processor::prelude::*;
use tracing_subscriber::EnvFilter;

// =============================================================================
// KEYS
// =============================================================================

pub const SYSTEM_ADMIN: u8 = 1;
pub const ADMIN_A: u8 = 2;
pub const ADMIN_B: u8 = 3;
pub const ADMIN_C: u8 = 4;
pub const OPERATOR_A: u8 = 10;
pub const OPERATOR_B: u8 = 11;
pub const OPERATOR_C: u8 = 12;
/// Company A operator whose task (TT2) is not enabled by any event type.
pub const BOTTLER_A: u8 = 13;
pub const AUTHORITY: u8 = 20;
pub const OUTSIDER: u8 = 99;

/// Deterministic compressed-looking public key for test participant `n`.
pub fn key(n: u8) -> String {
    format!("02{}{:02x}", "0".repeat(62), n)
}

pub fn public_key(n: u8) -> PublicKey {
    PublicKey::parse("key", &key(n)).expect("valid test key")
}

pub fn company_of(admin: u8) -> StateAddress {
    company_address(&company_id(&public_key(admin)))
}

pub fn s(address: &StateAddress) -> String {
    address.to_string()
}

pub fn product(id: &str) -> StateAddress {
    product_type_address(id)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// LEDGER
// =============================================================================

/// Handler plus in-memory state with a monotonic transaction clock.
pub struct Ledger {
    pub handler: SawChainHandler,
    pub store: InMemoryStateStore,
    clock: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        init_tracing();
        Self {
            handler: SawChainHandler::new(config),
            store: InMemoryStateStore::new(),
            clock: 1_700_000_000,
        }
    }

    pub fn submit(&mut self, signer: u8, action: Action) -> Result<(), ProcessorError> {
        self.clock += 1;
        let payload = Payload::new(self.clock, action)
            .to_bytes()
            .expect("encode payload");
        self.handler
            .apply(&TransactionRequest::new(key(signer), payload), &mut self.store)
    }

    #[track_caller]
    pub fn ok(&mut self, signer: u8, action: Action) {
        let name = action.name();
        if let Err(err) = self.submit(signer, action) {
            panic!("{name} should succeed: {err}");
        }
    }

    /// Submit an action expected to be rejected and check nothing was written.
    #[track_caller]
    pub fn rejected(&mut self, signer: u8, action: Action) -> Rejection {
        let before = self.store.snapshot();
        let writes = self.store.write_calls();
        let name = action.name();
        let err = match self.submit(signer, action) {
            Ok(()) => panic!("{name} should be rejected"),
            Err(err) => err,
        };
        assert_eq!(self.store.snapshot(), before, "rejected {name} changed state");
        assert_eq!(self.store.write_calls(), writes);
        err.rejection()
            .cloned()
            .unwrap_or_else(|| panic!("{name} failed with an internal error: {err}"))
    }

    #[track_caller]
    pub fn get<T: Record>(&self, address: &StateAddress) -> T {
        self.store
            .record(address)
            .expect("decodable record")
            .unwrap_or_else(|| panic!("no record at {address}"))
    }
}

// =============================================================================
// ACTION BUILDERS
// =============================================================================

pub fn task_type(id: &str, task: &str) -> Action {
    Action::CreateTaskType(CreateTaskTypeAction {
        id: id.to_string(),
        task: task.to_string(),
    })
}

pub fn product_type(id: &str, measure: UnitOfMeasure, derived: &[(&str, f64)]) -> Action {
    Action::CreateProductType(CreateProductTypeAction {
        id: id.to_string(),
        name: format!("Product {id}"),
        description: String::new(),
        measure,
        derived_product_types: derived
            .iter()
            .map(|(target, rate)| DerivedProductTypeSpec {
                product_type: s(&product(target)),
                conversion_rate: *rate,
            })
            .collect(),
    })
}

pub fn parameter_type(id: &str, data_type: DataType) -> Action {
    Action::CreateEventParameterType(CreateEventParameterTypeAction {
        id: id.to_string(),
        name: format!("Parameter {id}"),
        data_type,
    })
}

pub fn parameter(id: &str, required: bool) -> EventParameterSpec {
    EventParameterSpec {
        parameter_type: s(&event_parameter_type_address(id)),
        required,
        min_value: None,
        max_value: None,
        min_length: None,
        max_length: None,
    }
}

pub fn event_type(
    id: &str,
    typology: Typology,
    tasks: &[&str],
    products: &[&str],
    parameters: Vec<EventParameterSpec>,
    derived: &[&str],
) -> Action {
    Action::CreateEventType(CreateEventTypeAction {
        id: id.to_string(),
        typology,
        name: format!("Event {id}"),
        description: String::new(),
        enabled_task_types: tasks.iter().map(|t| s(&task_type_address(t))).collect(),
        enabled_product_types: products.iter().map(|p| s(&product(p))).collect(),
        parameters,
        enabled_derived_product_types: derived.iter().map(|p| s(&product(p))).collect(),
    })
}

pub fn company(admin: u8, products: &[&str]) -> Action {
    Action::CreateCompany(CreateCompanyAction {
        name: format!("Company {admin}"),
        description: "Cooperative".to_string(),
        website: format!("https://company{admin}.example"),
        admin: key(admin),
        enabled_product_types: products.iter().map(|p| s(&product(p))).collect(),
    })
}

pub fn operator(n: u8, task: &str) -> Action {
    Action::CreateOperator(CreateOperatorAction {
        public_key: key(n),
        task: s(&task_type_address(task)),
    })
}

pub fn field(id: &str, product_id: &str, quantity: f64) -> Action {
    Action::CreateField(CreateFieldAction {
        id: id.to_string(),
        description: format!("Field {id}"),
        product: s(&product(product_id)),
        quantity,
        location: Location::new(40.35, 18.17),
    })
}

pub fn temperature(value: f64) -> ParameterValueSpec {
    ParameterValueSpec {
        parameter_type: s(&event_parameter_type_address("EPT1")),
        value: Value::Number(value),
    }
}

pub fn describe(target: EventTarget, values: Vec<ParameterValueSpec>) -> Action {
    Action::CreateDescriptionEvent(CreateDescriptionEventAction {
        event_type: s(&event_type_address("ET1")),
        target,
        values,
    })
}

pub fn transform(
    event_type_id: &str,
    inputs: TransformationInputs,
    quantities: Vec<f64>,
    derived: &str,
    output_batch_id: &str,
) -> Action {
    Action::CreateTransformationEvent(CreateTransformationEventAction {
        event_type: s(&event_type_address(event_type_id)),
        inputs,
        quantities,
        derived_product: s(&product(derived)),
        output_batch_id: output_batch_id.to_string(),
    })
}

pub fn record_property(batch: &StateAddress, value: Value) -> Action {
    Action::RecordBatchProperty(RecordBatchPropertyAction {
        batch: s(batch),
        property_type: s(&property_type_address("PRT1")),
        value,
    })
}

pub fn certificate(batch: &StateAddress, hash: String) -> Action {
    Action::AddBatchCertificate(AddBatchCertificateAction {
        batch: s(batch),
        link: "https://certs.example/doc.pdf".to_string(),
        hash,
    })
}

pub fn propose(batch: &StateAddress, receiver: &StateAddress) -> Action {
    Action::CreateProposal(CreateProposalAction {
        batch: s(batch),
        receiver_company: s(receiver),
        notes: "Ready for pickup".to_string(),
    })
}

pub fn answer(batch: &StateAddress, response: ProposalStatus) -> Action {
    Action::AnswerProposal(AnswerProposalAction {
        batch: s(batch),
        response,
        motivation: "As agreed".to_string(),
    })
}

pub fn finalize(batch: &StateAddress) -> Action {
    Action::FinalizeBatch(FinalizeBatchAction {
        batch: s(batch),
        reason: FinalizationReason::Withdrawn,
        explanation: "Sold out".to_string(),
    })
}

// =============================================================================
// WORLD
// =============================================================================

pub struct World {
    pub ledger: Ledger,
    pub company_a: StateAddress,
    pub company_b: StateAddress,
    pub company_c: StateAddress,
    /// FLD1 of company A: 15000 kilos of olives.
    pub field: StateAddress,
}

impl World {
    pub fn new() -> Self {
        Self::with_ledger(Ledger::new())
    }

    pub fn with_ledger(mut ledger: Ledger) -> Self {
        ledger.ok(SYSTEM_ADMIN, Action::CreateSystemAdmin);

        ledger.ok(SYSTEM_ADMIN, task_type("TT1", "Harvesting"));
        ledger.ok(SYSTEM_ADMIN, task_type("TT2", "Bottling"));

        ledger.ok(SYSTEM_ADMIN, product_type("PDT1", UnitOfMeasure::Litre, &[]));
        ledger.ok(SYSTEM_ADMIN, product_type("PDT2", UnitOfMeasure::Kilos, &[]));
        ledger.ok(
            SYSTEM_ADMIN,
            product_type("PDT4", UnitOfMeasure::Kilos, &[("PDT1", 0.5)]),
        );
        ledger.ok(
            SYSTEM_ADMIN,
            product_type("PDT3", UnitOfMeasure::Kilos, &[("PDT1", 0.7), ("PDT4", 0.9)]),
        );

        ledger.ok(SYSTEM_ADMIN, parameter_type("EPT1", DataType::Number));
        ledger.ok(SYSTEM_ADMIN, parameter_type("EPT2", DataType::Text));

        let temperature = EventParameterSpec {
            min_value: Some(0.0),
            max_value: Some(50.0),
            ..parameter("EPT1", true)
        };
        let notes = EventParameterSpec {
            min_length: Some(1),
            max_length: Some(10),
            ..parameter("EPT2", false)
        };
        ledger.ok(
            SYSTEM_ADMIN,
            event_type(
                "ET1",
                Typology::Description,
                &["TT1"],
                &["PDT3", "PDT1", "PDT4"],
                vec![temperature, notes],
                &[],
            ),
        );
        ledger.ok(
            SYSTEM_ADMIN,
            event_type(
                "ET2",
                Typology::Transformation,
                &["TT1"],
                &["PDT3"],
                vec![],
                &["PDT1", "PDT4"],
            ),
        );
        ledger.ok(
            SYSTEM_ADMIN,
            event_type(
                "ET3",
                Typology::Transformation,
                &["TT1"],
                &["PDT4"],
                vec![],
                &["PDT1"],
            ),
        );
        ledger.ok(
            SYSTEM_ADMIN,
            Action::CreatePropertyType(CreatePropertyTypeAction {
                id: "PRT1".to_string(),
                name: "Acidity".to_string(),
                data_type: DataType::Number,
                enabled_task_types: vec![s(&task_type_address("TT1"))],
                enabled_product_types: vec![s(&product("PDT1"))],
            }),
        );

        ledger.ok(SYSTEM_ADMIN, company(ADMIN_A, &["PDT3", "PDT1", "PDT4"]));
        ledger.ok(SYSTEM_ADMIN, company(ADMIN_B, &["PDT1"]));
        ledger.ok(SYSTEM_ADMIN, company(ADMIN_C, &["PDT2"]));

        ledger.ok(ADMIN_A, operator(OPERATOR_A, "TT1"));
        ledger.ok(ADMIN_A, operator(BOTTLER_A, "TT2"));
        ledger.ok(ADMIN_B, operator(OPERATOR_B, "TT1"));
        ledger.ok(ADMIN_C, operator(OPERATOR_C, "TT1"));

        ledger.ok(
            SYSTEM_ADMIN,
            Action::CreateCertificationAuthority(CreateCertificationAuthorityAction {
                public_key: key(AUTHORITY),
                name: "Bio Cert".to_string(),
                website: "https://biocert.example".to_string(),
                enabled_product_types: vec![s(&product("PDT1"))],
            }),
        );

        ledger.ok(ADMIN_A, field("FLD1", "PDT3", 15000.0));

        let company_a = company_of(ADMIN_A);
        let field = field_address("FLD1", &company_id(&public_key(ADMIN_A)));
        Self {
            ledger,
            company_a,
            company_b: company_of(ADMIN_B),
            company_c: company_of(ADMIN_C),
            field,
        }
    }

    /// Press `quantity` olives from FLD1 into a new oil batch owned by A.
    pub fn press(&mut self, batch_id: &str, quantity: f64) -> StateAddress {
        self.ledger.ok(
            OPERATOR_A,
            transform(
                "ET2",
                TransformationInputs::Fields(vec![s(&self.field)]),
                vec![quantity],
                "PDT1",
                batch_id,
            ),
        );
        sawchain_processor::domain::batch_address(batch_id)
    }

    /// Turn `quantity` olives from FLD1 into a paste batch owned by A.
    pub fn crush(&mut self, batch_id: &str, quantity: f64) -> StateAddress {
        self.ledger.ok(
            OPERATOR_A,
            transform(
                "ET2",
                TransformationInputs::Fields(vec![s(&self.field)]),
                vec![quantity],
                "PDT4",
                batch_id,
            ),
        );
        sawchain_processor::domain::batch_address(batch_id)
    }
}
