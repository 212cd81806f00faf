//! Utility functions shared by the codec front ends

pub mod validation;
