//! Use-case layer: orchestration of domain operations over the ports

pub mod orders;

pub use orders::OrdersUseCase;
