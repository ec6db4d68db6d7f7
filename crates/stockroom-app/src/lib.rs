// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod forms;
pub mod ids;
pub mod model;
pub mod normalize;
pub mod schema;
pub mod selection;
pub mod service;
pub mod sort;
pub mod state;
pub mod units;
pub mod values;

pub use forms::*;
pub use ids::*;
pub use model::*;
pub use normalize::*;
pub use schema::*;
pub use selection::*;
pub use service::*;
pub use sort::*;
pub use state::*;
pub use units::*;
