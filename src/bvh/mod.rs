//! This module defines the [`BvhBuilder`] and the [`Bvh`] it produces.
//!
//! [`BvhBuilder`]: struct.BvhBuilder.html
//! [`Bvh`]: struct.Bvh.html
//!

mod builder;
mod bvh_impl;
mod bvh_node;
mod config;
mod stats;
mod strategy;

pub use self::builder::*;
pub use self::bvh_impl::*;
pub use self::bvh_node::*;
pub use self::config::*;
pub use self::stats::*;
pub use self::strategy::*;
