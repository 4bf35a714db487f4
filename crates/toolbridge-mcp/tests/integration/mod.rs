mod discovery;
mod dispatch;
mod registration;
mod resources;
