#![allow(dead_code)]

pub mod class_builder;
pub mod fixtures;
