pub mod issuer;

pub use issuer::TokenExchanger;
