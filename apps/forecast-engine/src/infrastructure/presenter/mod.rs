//! Presenter Adapters

pub mod console;

pub use console::ConsolePresenter;
