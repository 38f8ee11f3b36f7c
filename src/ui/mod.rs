/// UI widgets
///
/// This module holds the before/after comparison renderer (comparison.rs),
/// an interactive canvas that maps pointer input to a reveal-slider
/// position. Everything else in the interface is plain iced widgets built
/// in main.rs.

pub mod comparison;
