//! UI module - small widgets used by the plugin host window

pub mod components;
