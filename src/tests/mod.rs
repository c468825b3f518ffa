pub mod support;

mod portfolio;
