//! # Keel Service Container
//!
//! Maps [`Token`]s to shared instances.
//!
//! - **Bindings**: transient ([`Container::bind`]), shared and lazily computed
//!   ([`Container::singleton`]), or pre-built ([`Container::instance`]).
//! - **Aliases**: alternative tokens for an existing binding, followed for a
//!   single hop.
//! - **Tags**: named, ordered groups of tokens resolved together with
//!   [`Container::tagged`].
//! - **Extenders**: transforms applied to each freshly computed instance, so a
//!   later provider can decorate a service declared by an earlier one.
//!
//! Types that know how to build themselves implement [`Injectable`] and can be
//! resolved with [`Container::make_type`] without being bound first.
pub mod error;
pub mod registry;
pub mod token;

pub use error::ContainerError;
pub use registry::{Container, Extender, Factory, Injectable, Instance, downcast};
pub use token::{Symbol, Token, TypeKey};
