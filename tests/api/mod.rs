mod associations;
mod decoder;
mod dispatch;
mod filters;
mod foreign_keys;
mod support;
mod targets;
