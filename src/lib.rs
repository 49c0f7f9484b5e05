// Smart-home back end: state-change auditing, voice commands and RFID access

// Shared error types
pub mod error;

// Inbound events and payload decoding
pub mod event;

// Device shadow documents
pub mod shadow;

// State diff engine and change processor
pub mod state;

// Audit log storage
pub mod audit;

// Voice command translation
pub mod command;

// RFID credential validation
pub mod credentials;

// User to device mapping
pub mod devices;

// Voice skill
pub mod voice;

// Configuration
pub mod config;

// NATS client integration
pub mod nats;

// HTTP APIs
pub mod api;
