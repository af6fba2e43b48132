//! Parsers for analytics responses.
//!
//! # Parsers
//!
//! - [`field_mapping`]: Map dataset-specific columns onto observations
//! - [`json_parser`]: Parse the alerts payload (rows plus `latest` date)
//!
//! # Example
//!
//! ```
//! use gfw_widgets::parsing::{parse_payload_str, FieldMapping};
//!
//! let json = r#"{"alerts": [{"alert__count": 3, "alert__week": 5, "alert__year": 2020}], "latest": "2020-02-10"}"#;
//! let payload = parse_payload_str(json, &FieldMapping::glad()).unwrap();
//! assert_eq!(payload.observations.unwrap().len(), 1);
//! ```

pub mod field_mapping;
pub mod json_parser;


pub use field_mapping::{FieldMapping, MalformedRecord};
pub use json_parser::{parse_observations, parse_payload, parse_payload_str, AlertsPayload, ParseReport};
