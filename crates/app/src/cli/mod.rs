pub mod args;
pub mod op;
pub mod ops;

pub use ops::{
    Create, Download, Grant, Health, Import, Init, Ls, Mkdir, Put, Rm, Update, Validate, Version,
};
