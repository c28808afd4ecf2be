// Core value types: errors, identifiers, amounts, keys, status codes and the JSON document model.
pub mod amount;
pub mod document;
pub mod entity;
pub mod error;
pub mod key;
pub mod status;
