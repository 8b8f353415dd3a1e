//! Small helpers shared between the docgraph derive macros and runtime.

pub mod case;
