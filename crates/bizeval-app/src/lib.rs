// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod ids;
pub mod model;
pub mod presentation;
pub mod state;
pub mod typeahead;
pub mod workflow;

pub use ids::*;
pub use model::*;
pub use presentation::*;
pub use state::*;
pub use typeahead::*;
pub use workflow::*;
