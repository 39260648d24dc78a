// API service wrappers
// One module per backend resource, mirroring the REST surface

pub mod barcode;
pub mod bottles;
pub mod recipes;
pub mod session;
pub mod spirit_types;
