pub mod identifiers;
pub mod premis;
pub mod verify;
