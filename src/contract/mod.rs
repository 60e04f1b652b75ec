pub mod model_registry;
pub mod contract_parser;
pub mod response_validator;
pub mod catalog;

pub use model_registry::{
    ContractRegistry, ResourceSchema, FieldSpec, FieldType, EndpointContract,
    HttpMethod, BodyPolicy, ScenarioClass
};
pub use contract_parser::{ContractParser, ContractDocument};
pub use response_validator::{ResponseValidator, Violation, ViolationKind};
pub use catalog::{fake_rest_api_registry, fake_rest_api_suite};
