pub mod auth_service;
pub mod challan_number_service;
pub mod detection_service;
pub mod evidence_store_service;
pub mod hash_service;
pub mod integration;
pub mod jurisdiction_service;
pub mod metrics_service;
pub mod payment_gateway_service;
pub mod realtime_service;
pub mod registry_service;
pub mod sms_service;
pub mod validation_service;
