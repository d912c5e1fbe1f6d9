// Application wiring: turns a validated AppConfig into a ready gateway.

pub mod bootstrap;
